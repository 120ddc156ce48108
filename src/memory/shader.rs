use crate::{
    foundation::core::{Color, Vec4},
    host::ShaderHandle,
    schema::property::{PropertyKind, TextureValue, TypedValue},
};

/// One declared property of a [`MemoryShader`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShaderProperty {
    /// Property identifier.
    pub name: String,
    /// Display description.
    #[serde(default)]
    pub description: String,
    /// Declared kind.
    pub kind: PropertyKind,
    /// Declared default; a zero value of `kind` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<TypedValue>,
}

impl ShaderProperty {
    /// Effective default value.
    pub fn default_value(&self) -> TypedValue {
        match &self.default {
            Some(v) if v.fits(self.kind) => v.clone(),
            _ => TypedValue::zero_for(self.kind),
        }
    }
}

/// Shader held entirely in memory.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MemoryShader {
    /// Shader identity.
    pub name: String,
    /// Declared properties; the index is the slot.
    #[serde(default)]
    pub properties: Vec<ShaderProperty>,
    /// Marks a shader whose asset is gone; handles to it are invalid.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub missing: bool,
}

impl MemoryShader {
    /// Valid shader with no properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            missing: false,
        }
    }

    /// Handle to a shader that no longer exists.
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            missing: true,
            ..Self::new(name)
        }
    }

    /// Append a property with an explicit default.
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: PropertyKind,
        default: TypedValue,
    ) -> Self {
        self.properties.push(ShaderProperty {
            name: name.into(),
            description: description.into(),
            kind,
            default: Some(default),
        });
        self
    }

    /// Append a `Color` property.
    pub fn color(self, name: &str, description: &str, default: Color) -> Self {
        self.with_property(name, description, PropertyKind::Color, TypedValue::Color(default))
    }

    /// Append a `Vector` property.
    pub fn vector(self, name: &str, description: &str, default: Vec4) -> Self {
        self.with_property(name, description, PropertyKind::Vector, TypedValue::Vector(default))
    }

    /// Append a `Float` property.
    pub fn float(self, name: &str, description: &str, default: f32) -> Self {
        self.with_property(name, description, PropertyKind::Float, TypedValue::Float(default))
    }

    /// Append a `Range` property.
    pub fn range(self, name: &str, description: &str, default: f32) -> Self {
        self.with_property(name, description, PropertyKind::Range, TypedValue::Float(default))
    }

    /// Append an `Int` property.
    pub fn int(self, name: &str, description: &str, default: i32) -> Self {
        self.with_property(name, description, PropertyKind::Int, TypedValue::Int(default))
    }

    /// Append a `Texture` property; `default` names the default texture.
    pub fn texture(self, name: &str, description: &str, default: Option<&str>) -> Self {
        self.with_property(
            name,
            description,
            PropertyKind::Texture,
            TypedValue::Texture(TextureValue::new(default.map(str::to_string))),
        )
    }

    /// Declared property called `name`.
    pub fn property(&self, name: &str) -> Option<&ShaderProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Drop the property called `name`, as an external shader edit would.
    pub fn without_property(mut self, name: &str) -> Self {
        self.properties.retain(|p| p.name != name);
        self
    }
}

impl ShaderHandle for MemoryShader {
    fn is_valid(&self) -> bool {
        !self.missing
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn property_count(&self) -> usize {
        self.properties.len()
    }

    fn property_name(&self, slot: usize) -> String {
        self.properties[slot].name.clone()
    }

    fn property_description(&self, slot: usize) -> String {
        self.properties[slot].description.clone()
    }

    fn property_kind(&self, slot: usize) -> PropertyKind {
        self.properties[slot].kind
    }

    fn property_default_vector(&self, slot: usize) -> Vec4 {
        match self.properties[slot].default_value() {
            TypedValue::Color(c) => c.into(),
            TypedValue::Vector(v) => v,
            _ => Vec4::default(),
        }
    }

    fn property_default_float(&self, slot: usize) -> f32 {
        match self.properties[slot].default_value() {
            TypedValue::Float(f) => f,
            _ => 0.0,
        }
    }

    fn property_default_int(&self, slot: usize) -> i32 {
        match self.properties[slot].default_value() {
            TypedValue::Int(i) => i,
            _ => 0,
        }
    }

    fn property_default_texture(&self, slot: usize) -> Option<String> {
        match self.properties[slot].default_value() {
            TypedValue::Texture(t) => t.texture,
            _ => None,
        }
    }
}
