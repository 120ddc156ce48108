use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    foundation::core::{Color, Vec2, Vec4},
    foundation::error::PropertyAccessError,
    host::MaterialHandle,
    memory::shader::{MemoryShader, ShaderProperty},
    migrate::executor::MaterialFlags,
    schema::property::{PropertyKind, TextureValue, TypedValue, is_type_compatible},
};

/// Render queue of a material that does not override its shader's queue.
pub const DEFAULT_RENDER_QUEUE: i32 = 2000;

/// Material held entirely in memory.
///
/// Values are stored by property name and survive a shader swap, so a new shader sees any
/// same-named value left by the old one. Reads and writes are checked against the *current*
/// shader.
#[derive(Clone, Debug)]
pub struct MemoryMaterial {
    id: String,
    shader: Arc<MemoryShader>,
    values: BTreeMap<String, TypedValue>,
    flags: MaterialFlags,
    valid: bool,
}

impl MemoryMaterial {
    /// Material `id` on `shader` with no stored values and default flags.
    pub fn new(id: impl Into<String>, shader: Arc<MemoryShader>) -> Self {
        Self {
            id: id.into(),
            shader,
            values: BTreeMap::new(),
            flags: MaterialFlags {
                instancing: false,
                render_queue: DEFAULT_RENDER_QUEUE,
                double_sided_gi: false,
            },
            valid: true,
        }
    }

    /// Store a value by name without consulting the shader.
    pub fn with_value(mut self, name: impl Into<String>, value: TypedValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Replace the instancing, render queue, and double-sided GI flags.
    pub fn with_flags(mut self, flags: MaterialFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Mark the material as destroyed.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Shader currently assigned.
    pub fn shader(&self) -> &Arc<MemoryShader> {
        &self.shader
    }

    /// Swap the shader directly, as an edit made outside a migration would.
    pub fn replace_shader(&mut self, shader: Arc<MemoryShader>) {
        self.shader = shader;
    }

    /// Current instancing, render queue, and double-sided GI flags.
    pub fn flags(&self) -> MaterialFlags {
        self.flags
    }

    /// Raw stored values, including ones the current shader does not declare.
    pub fn stored_values(&self) -> &BTreeMap<String, TypedValue> {
        &self.values
    }

    /// Effective value of `name` under the current shader.
    pub fn value(&self, name: &str) -> Option<TypedValue> {
        let prop = self.shader.property(name)?;
        Some(self.effective(prop))
    }

    fn effective(&self, prop: &ShaderProperty) -> TypedValue {
        self.values
            .get(&prop.name)
            .filter(|v| v.fits(prop.kind))
            .cloned()
            .unwrap_or_else(|| prop.default_value())
    }

    fn declared(
        &self,
        name: &str,
        requested: PropertyKind,
    ) -> Result<&ShaderProperty, PropertyAccessError> {
        let prop = self
            .shader
            .property(name)
            .ok_or_else(|| PropertyAccessError::NotFound(name.to_string()))?;
        if !is_type_compatible(prop.kind, requested) {
            return Err(PropertyAccessError::KindMismatch {
                name: name.to_string(),
                requested,
                actual: prop.kind,
            });
        }
        Ok(prop)
    }

    fn get(&self, name: &str, requested: PropertyKind) -> Result<TypedValue, PropertyAccessError> {
        let prop = self.declared(name, requested)?;
        Ok(self.effective(prop))
    }

    fn put(
        &mut self,
        name: &str,
        requested: PropertyKind,
        value: TypedValue,
    ) -> Result<(), PropertyAccessError> {
        self.declared(name, requested)?;
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    fn texture_value(&self, name: &str) -> Result<TextureValue, PropertyAccessError> {
        match self.get(name, PropertyKind::Texture)? {
            TypedValue::Texture(t) => Ok(t),
            _ => Ok(TextureValue::default()),
        }
    }

    fn update_texture(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut TextureValue),
    ) -> Result<(), PropertyAccessError> {
        let mut t = self.texture_value(name)?;
        f(&mut t);
        self.values.insert(name.to_string(), TypedValue::Texture(t));
        Ok(())
    }
}

impl MaterialHandle for MemoryMaterial {
    type Shader = Arc<MemoryShader>;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn shader_name(&self) -> Option<String> {
        Some(self.shader.name.clone())
    }

    fn set_shader(&mut self, shader: &Self::Shader) {
        self.shader = Arc::clone(shader);
    }

    fn color(&self, name: &str) -> Result<Color, PropertyAccessError> {
        match self.get(name, PropertyKind::Color)? {
            TypedValue::Color(c) => Ok(c),
            _ => Ok(Color::default()),
        }
    }

    fn set_color(&mut self, name: &str, value: Color) -> Result<(), PropertyAccessError> {
        self.put(name, PropertyKind::Color, TypedValue::Color(value))
    }

    fn vector(&self, name: &str) -> Result<Vec4, PropertyAccessError> {
        match self.get(name, PropertyKind::Vector)? {
            TypedValue::Vector(v) => Ok(v),
            _ => Ok(Vec4::default()),
        }
    }

    fn set_vector(&mut self, name: &str, value: Vec4) -> Result<(), PropertyAccessError> {
        self.put(name, PropertyKind::Vector, TypedValue::Vector(value))
    }

    fn float(&self, name: &str) -> Result<f32, PropertyAccessError> {
        match self.get(name, PropertyKind::Float)? {
            TypedValue::Float(f) => Ok(f),
            _ => Ok(0.0),
        }
    }

    fn set_float(&mut self, name: &str, value: f32) -> Result<(), PropertyAccessError> {
        self.put(name, PropertyKind::Float, TypedValue::Float(value))
    }

    fn int(&self, name: &str) -> Result<i32, PropertyAccessError> {
        match self.get(name, PropertyKind::Int)? {
            TypedValue::Int(i) => Ok(i),
            _ => Ok(0),
        }
    }

    fn set_int(&mut self, name: &str, value: i32) -> Result<(), PropertyAccessError> {
        self.put(name, PropertyKind::Int, TypedValue::Int(value))
    }

    fn texture(&self, name: &str) -> Result<Option<String>, PropertyAccessError> {
        Ok(self.texture_value(name)?.texture)
    }

    fn set_texture(
        &mut self,
        name: &str,
        texture: Option<&str>,
    ) -> Result<(), PropertyAccessError> {
        self.update_texture(name, |t| t.texture = texture.map(str::to_string))
    }

    fn texture_scale(&self, name: &str) -> Result<Vec2, PropertyAccessError> {
        Ok(self.texture_value(name)?.scale)
    }

    fn set_texture_scale(&mut self, name: &str, value: Vec2) -> Result<(), PropertyAccessError> {
        self.update_texture(name, |t| t.scale = value)
    }

    fn texture_offset(&self, name: &str) -> Result<Vec2, PropertyAccessError> {
        Ok(self.texture_value(name)?.offset)
    }

    fn set_texture_offset(&mut self, name: &str, value: Vec2) -> Result<(), PropertyAccessError> {
        self.update_texture(name, |t| t.offset = value)
    }

    fn instancing(&self) -> bool {
        self.flags.instancing
    }

    fn set_instancing(&mut self, enabled: bool) {
        self.flags.instancing = enabled;
    }

    fn render_queue(&self) -> i32 {
        self.flags.render_queue
    }

    fn set_render_queue(&mut self, queue: i32) {
        self.flags.render_queue = queue;
    }

    fn double_sided_gi(&self) -> bool {
        self.flags.double_sided_gi
    }

    fn set_double_sided_gi(&mut self, enabled: bool) {
        self.flags.double_sided_gi = enabled;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/memory/material.rs"]
mod tests;
