use std::ops::Index;

use xxhash_rust::xxh3::Xxh3;

use crate::{
    foundation::core::Color,
    foundation::error::{RemapError, RemapResult},
    host::ShaderHandle,
    schema::property::{PropertyDescriptor, PropertyKind, TextureValue, TypedValue},
};

const XXH3_SEED: u64 = 0x51a7_3c0d_e4b2_9f16;

/// Stable 128-bit digest of a schema's `(name, kind)` layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SchemaFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

/// Ordered property descriptors extracted from one shader.
///
/// The position of a descriptor is its slot, the only handle the mapping and migration code uses
/// to address a property. A schema is never edited in place; re-extraction replaces it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Schema {
    /// Name of the shader this schema was extracted from.
    pub shader: String,
    properties: Vec<PropertyDescriptor>,
}

impl Schema {
    /// Build a schema from already-extracted descriptors.
    pub fn new(shader: impl Into<String>, properties: Vec<PropertyDescriptor>) -> Self {
        Self {
            shader: shader.into(),
            properties,
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// `true` for a shader without properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Descriptor at `slot`.
    pub fn get(&self, slot: usize) -> Option<&PropertyDescriptor> {
        self.properties.get(slot)
    }

    /// First slot whose property is named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }

    /// Descriptors in slot order.
    pub fn iter(&self) -> std::slice::Iter<'_, PropertyDescriptor> {
        self.properties.iter()
    }

    /// All descriptors as a slice.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub(crate) fn properties_mut(&mut self) -> &mut [PropertyDescriptor] {
        &mut self.properties
    }

    /// Digest of slot count, names, and kinds; descriptions and defaults do not contribute.
    pub fn fingerprint(&self) -> SchemaFingerprint {
        let mut h = Xxh3::with_seed(XXH3_SEED);
        h.update(&(self.properties.len() as u64).to_le_bytes());
        for p in &self.properties {
            h.update(&(p.name.len() as u64).to_le_bytes());
            h.update(p.name.as_bytes());
            h.update(&[p.kind.tag()]);
        }
        let v = h.digest128();
        SchemaFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

impl Index<usize> for Schema {
    type Output = PropertyDescriptor;

    fn index(&self, slot: usize) -> &Self::Output {
        &self.properties[slot]
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a PropertyDescriptor;
    type IntoIter = std::slice::Iter<'a, PropertyDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}

/// Extract the property schema of `shader`.
///
/// Fails only for an invalid handle; a valid shader always yields a complete schema.
#[tracing::instrument(skip(shader), fields(shader = %shader.name()))]
pub fn extract<S: ShaderHandle + ?Sized>(shader: &S) -> RemapResult<Schema> {
    if !shader.is_valid() {
        return Err(RemapError::invalid_handle(format!(
            "shader '{}' is not valid",
            shader.name()
        )));
    }

    let count = shader.property_count();
    let mut properties = Vec::with_capacity(count);
    for slot in 0..count {
        let kind = shader.property_kind(slot);
        let default = match kind {
            PropertyKind::Color => {
                TypedValue::Color(Color::from(shader.property_default_vector(slot)))
            }
            PropertyKind::Vector => TypedValue::Vector(shader.property_default_vector(slot)),
            PropertyKind::Float | PropertyKind::Range => {
                TypedValue::Float(shader.property_default_float(slot))
            }
            PropertyKind::Int => TypedValue::Int(shader.property_default_int(slot)),
            PropertyKind::Texture => {
                TypedValue::Texture(TextureValue::new(shader.property_default_texture(slot)))
            }
        };
        properties.push(PropertyDescriptor {
            name: shader.property_name(slot),
            description: shader.property_description(slot),
            kind,
            default,
            visible: true,
        });
    }

    tracing::debug!(properties = properties.len(), "extracted schema");
    Ok(Schema::new(shader.name(), properties))
}

#[cfg(test)]
#[path = "../../tests/unit/schema/extract.rs"]
mod tests;
