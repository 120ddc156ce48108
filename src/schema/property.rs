use crate::foundation::core::{Color, Vec2, Vec4};

/// Semantic type of a shader property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PropertyKind {
    /// RGBA color.
    Color,
    /// Four-component vector.
    Vector,
    /// Unbounded scalar.
    Float,
    /// Scalar bounded by a slider range.
    Range,
    /// Texture reference with tiling and offset.
    Texture,
    /// Integer.
    Int,
}

impl PropertyKind {
    /// All kinds in declaration order.
    pub const ALL: [PropertyKind; 6] = [
        PropertyKind::Color,
        PropertyKind::Vector,
        PropertyKind::Float,
        PropertyKind::Range,
        PropertyKind::Texture,
        PropertyKind::Int,
    ];

    /// `true` for the scalar kinds (`Float` and `Range`).
    pub fn is_scalar(self) -> bool {
        matches!(self, PropertyKind::Float | PropertyKind::Range)
    }

    pub(crate) fn tag(self) -> u8 {
        match self {
            PropertyKind::Color => 0,
            PropertyKind::Vector => 1,
            PropertyKind::Float => 2,
            PropertyKind::Range => 3,
            PropertyKind::Texture => 4,
            PropertyKind::Int => 5,
        }
    }
}

/// Whether a value of kind `a` may be carried into a property of kind `b`.
///
/// `Float` and `Range` are interchangeable; every other pair requires equal kinds.
pub fn is_type_compatible(a: PropertyKind, b: PropertyKind) -> bool {
    a == b || (a.is_scalar() && b.is_scalar())
}

/// Texture binding on a material: reference plus tiling and offset.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextureValue {
    /// Texture name/reference; `None` is an empty slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
    /// Tiling scale.
    #[serde(default = "default_texture_scale")]
    pub scale: Vec2,
    /// UV offset.
    #[serde(default)]
    pub offset: Vec2,
}

fn default_texture_scale() -> Vec2 {
    Vec2::ONE
}

impl TextureValue {
    /// Binding with identity tiling and zero offset.
    pub fn new(texture: Option<String>) -> Self {
        Self {
            texture,
            scale: Vec2::ONE,
            offset: Vec2::ZERO,
        }
    }
}

impl Default for TextureValue {
    fn default() -> Self {
        Self::new(None)
    }
}

/// A property value tagged with its representation.
///
/// `Range` properties carry [`TypedValue::Float`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypedValue {
    /// Color value.
    Color(Color),
    /// Vector value.
    Vector(Vec4),
    /// Scalar value (`Float` or `Range`).
    Float(f32),
    /// Integer value.
    Int(i32),
    /// Texture binding.
    Texture(TextureValue),
}

impl TypedValue {
    /// Whether this value can be stored into a property of `kind` without conversion.
    pub fn fits(&self, kind: PropertyKind) -> bool {
        match self {
            TypedValue::Color(_) => kind == PropertyKind::Color,
            TypedValue::Vector(_) => kind == PropertyKind::Vector,
            TypedValue::Float(_) => kind.is_scalar(),
            TypedValue::Int(_) => kind == PropertyKind::Int,
            TypedValue::Texture(_) => kind == PropertyKind::Texture,
        }
    }

    /// Short name of the representation, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            TypedValue::Color(_) => "color",
            TypedValue::Vector(_) => "vector",
            TypedValue::Float(_) => "float",
            TypedValue::Int(_) => "int",
            TypedValue::Texture(_) => "texture",
        }
    }

    /// Zero-ish default for a kind, used when a host provides nothing better.
    pub fn zero_for(kind: PropertyKind) -> Self {
        match kind {
            PropertyKind::Color => TypedValue::Color(Color::new(0.0, 0.0, 0.0, 0.0)),
            PropertyKind::Vector => TypedValue::Vector(Vec4::default()),
            PropertyKind::Float | PropertyKind::Range => TypedValue::Float(0.0),
            PropertyKind::Int => TypedValue::Int(0),
            PropertyKind::Texture => TypedValue::Texture(TextureValue::default()),
        }
    }
}

/// One property of a shader, as extracted into a [`crate::Schema`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PropertyDescriptor {
    /// Property identifier as used by material accessors.
    pub name: String,
    /// Human-readable description (display name).
    #[serde(default)]
    pub description: String,
    /// Semantic type.
    pub kind: PropertyKind,
    /// Default value declared by the shader.
    pub default: TypedValue,
    /// Presentation flag maintained by view filtering; not part of the property's semantics.
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl PropertyDescriptor {
    /// Text for the requested key: the name or the description.
    pub fn key_text(&self, key: crate::MatchKey) -> &str {
        match key {
            crate::MatchKey::Name => &self.name,
            crate::MatchKey::Description => &self.description,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/property.rs"]
mod tests;
