use std::sync::Arc;

use crate::{
    foundation::core::{Color, Vec2, Vec4},
    foundation::error::PropertyAccessError,
    schema::property::PropertyKind,
};

/// Read-only view of a shader's declared properties.
///
/// Slot indices run `0..property_count()` in declaration order. Accessors for a slot are only
/// called with in-range indices, and the default accessors only for slots of the matching kind.
pub trait ShaderHandle {
    /// `false` when the handle refers to a destroyed or missing shader.
    fn is_valid(&self) -> bool {
        true
    }

    /// Shader identity; two handles with the same name address the same shader.
    fn name(&self) -> String;

    /// Number of declared properties.
    fn property_count(&self) -> usize;

    /// Property identifier at `slot`.
    fn property_name(&self, slot: usize) -> String;

    /// Human-readable description at `slot`.
    fn property_description(&self, slot: usize) -> String;

    /// Kind at `slot`.
    fn property_kind(&self, slot: usize) -> PropertyKind;

    /// Default of a `Color` or `Vector` property.
    fn property_default_vector(&self, slot: usize) -> Vec4;

    /// Default of a `Float` or `Range` property.
    fn property_default_float(&self, slot: usize) -> f32;

    /// Default of an `Int` property.
    fn property_default_int(&self, slot: usize) -> i32;

    /// Name of the default texture of a `Texture` property, if any.
    fn property_default_texture(&self, slot: usize) -> Option<String>;
}

impl<T: ShaderHandle + ?Sized> ShaderHandle for &T {
    fn is_valid(&self) -> bool {
        (**self).is_valid()
    }
    fn name(&self) -> String {
        (**self).name()
    }
    fn property_count(&self) -> usize {
        (**self).property_count()
    }
    fn property_name(&self, slot: usize) -> String {
        (**self).property_name(slot)
    }
    fn property_description(&self, slot: usize) -> String {
        (**self).property_description(slot)
    }
    fn property_kind(&self, slot: usize) -> PropertyKind {
        (**self).property_kind(slot)
    }
    fn property_default_vector(&self, slot: usize) -> Vec4 {
        (**self).property_default_vector(slot)
    }
    fn property_default_float(&self, slot: usize) -> f32 {
        (**self).property_default_float(slot)
    }
    fn property_default_int(&self, slot: usize) -> i32 {
        (**self).property_default_int(slot)
    }
    fn property_default_texture(&self, slot: usize) -> Option<String> {
        (**self).property_default_texture(slot)
    }
}

impl<T: ShaderHandle + ?Sized> ShaderHandle for Arc<T> {
    fn is_valid(&self) -> bool {
        (**self).is_valid()
    }
    fn name(&self) -> String {
        (**self).name()
    }
    fn property_count(&self) -> usize {
        (**self).property_count()
    }
    fn property_name(&self, slot: usize) -> String {
        (**self).property_name(slot)
    }
    fn property_description(&self, slot: usize) -> String {
        (**self).property_description(slot)
    }
    fn property_kind(&self, slot: usize) -> PropertyKind {
        (**self).property_kind(slot)
    }
    fn property_default_vector(&self, slot: usize) -> Vec4 {
        (**self).property_default_vector(slot)
    }
    fn property_default_float(&self, slot: usize) -> f32 {
        (**self).property_default_float(slot)
    }
    fn property_default_int(&self, slot: usize) -> i32 {
        (**self).property_default_int(slot)
    }
    fn property_default_texture(&self, slot: usize) -> Option<String> {
        (**self).property_default_texture(slot)
    }
}

/// Mutable access to one material instance.
///
/// Property accessors address properties by name against the material's *current* shader and
/// report failures per call; they never panic on unknown names.
pub trait MaterialHandle {
    /// Shader handle type this material can be assigned.
    type Shader: ShaderHandle;

    /// Stable identifier used in reports.
    fn id(&self) -> String;

    /// `false` when the handle refers to a destroyed or missing material.
    fn is_valid(&self) -> bool {
        true
    }

    /// Name of the shader currently assigned, if any.
    fn shader_name(&self) -> Option<String>;

    /// Assign a new shader.
    fn set_shader(&mut self, shader: &Self::Shader);

    /// Read a `Color` property.
    fn color(&self, name: &str) -> Result<Color, PropertyAccessError>;
    /// Write a `Color` property.
    fn set_color(&mut self, name: &str, value: Color) -> Result<(), PropertyAccessError>;

    /// Read a `Vector` property.
    fn vector(&self, name: &str) -> Result<Vec4, PropertyAccessError>;
    /// Write a `Vector` property.
    fn set_vector(&mut self, name: &str, value: Vec4) -> Result<(), PropertyAccessError>;

    /// Read a `Float` or `Range` property.
    fn float(&self, name: &str) -> Result<f32, PropertyAccessError>;
    /// Write a `Float` or `Range` property.
    fn set_float(&mut self, name: &str, value: f32) -> Result<(), PropertyAccessError>;

    /// Read an `Int` property.
    fn int(&self, name: &str) -> Result<i32, PropertyAccessError>;
    /// Write an `Int` property.
    fn set_int(&mut self, name: &str, value: i32) -> Result<(), PropertyAccessError>;

    /// Texture assigned to a `Texture` property, `None` when the slot is empty.
    fn texture(&self, name: &str) -> Result<Option<String>, PropertyAccessError>;
    /// Assign or clear the texture of a `Texture` property.
    fn set_texture(&mut self, name: &str, texture: Option<&str>)
    -> Result<(), PropertyAccessError>;

    /// Tiling scale of a `Texture` property.
    fn texture_scale(&self, name: &str) -> Result<Vec2, PropertyAccessError>;
    /// Set the tiling scale of a `Texture` property.
    fn set_texture_scale(&mut self, name: &str, value: Vec2) -> Result<(), PropertyAccessError>;

    /// UV offset of a `Texture` property.
    fn texture_offset(&self, name: &str) -> Result<Vec2, PropertyAccessError>;
    /// Set the UV offset of a `Texture` property.
    fn set_texture_offset(&mut self, name: &str, value: Vec2) -> Result<(), PropertyAccessError>;

    /// GPU instancing flag.
    fn instancing(&self) -> bool;
    /// Set the GPU instancing flag.
    fn set_instancing(&mut self, enabled: bool);

    /// Render queue.
    fn render_queue(&self) -> i32;
    /// Set the render queue.
    fn set_render_queue(&mut self, queue: i32);

    /// Double-sided global illumination flag.
    fn double_sided_gi(&self) -> bool;
    /// Set the double-sided global illumination flag.
    fn set_double_sided_gi(&mut self, enabled: bool);
}
