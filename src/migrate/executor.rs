use std::collections::{BTreeMap, BTreeSet};

use crate::{
    foundation::error::{PropertyAccessError, RemapError, RemapResult},
    host::{MaterialHandle, ShaderHandle},
    mapping::table::MappingTable,
    schema::extract::Schema,
    schema::property::{PropertyDescriptor, PropertyKind, TextureValue, TypedValue},
};

/// Material state that belongs to no shader property and must survive a shader swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MaterialFlags {
    /// GPU instancing enabled.
    pub instancing: bool,
    /// Render queue override.
    pub render_queue: i32,
    /// Double-sided global illumination.
    pub double_sided_gi: bool,
}

impl MaterialFlags {
    /// Read the flags of `material`.
    pub fn capture<M: MaterialHandle + ?Sized>(material: &M) -> Self {
        Self {
            instancing: material.instancing(),
            render_queue: material.render_queue(),
            double_sided_gi: material.double_sided_gi(),
        }
    }

    /// Write these flags back onto `material`.
    pub fn restore<M: MaterialHandle + ?Sized>(self, material: &mut M) {
        material.set_instancing(self.instancing);
        material.set_render_queue(self.render_queue);
        material.set_double_sided_gi(self.double_sided_gi);
    }
}

/// Step of a migration that produced a warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStage {
    /// Snapshot of a source property; `slot` is a source slot.
    Read,
    /// Reset of a destination property to its default; `slot` is a destination slot.
    Reset,
    /// Write-back through the mapping; `slot` is a source slot.
    Write,
}

/// A per-property failure that did not stop the migration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SlotWarning {
    /// Step that failed.
    pub stage: MigrationStage,
    /// Source or destination slot, depending on `stage`.
    pub slot: usize,
    /// Name of the property addressed.
    pub property: String,
    /// Host error text.
    pub reason: String,
}

/// Outcome of migrating one material.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MigrationReport {
    /// [`MaterialHandle::id`] of the migrated material.
    pub material_id: String,
    /// Source slots whose value was read and written back.
    pub succeeded_slots: BTreeSet<usize>,
    /// Per-property failures, in the order they happened.
    pub warnings: Vec<SlotWarning>,
}

impl MigrationReport {
    fn new(material_id: String) -> Self {
        Self {
            material_id,
            ..Self::default()
        }
    }

    /// `true` when no property failed.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Warnings raised during `stage`.
    pub fn warnings_at(&self, stage: MigrationStage) -> impl Iterator<Item = &SlotWarning> {
        self.warnings.iter().filter(move |w| w.stage == stage)
    }

    fn warn(
        &mut self,
        stage: MigrationStage,
        slot: usize,
        property: &str,
        err: &PropertyAccessError,
    ) {
        tracing::warn!(?stage, slot, property, error = %err, "property migration failed");
        self.warnings.push(SlotWarning {
            stage,
            slot,
            property: property.to_string(),
            reason: err.to_string(),
        });
    }
}

/// Check that `mapping` and both schemas still describe `destination_shader`.
///
/// Runs before any material is touched; a failure here means the rule must be rebuilt.
pub fn check_destination<S: ShaderHandle + ?Sized>(
    source: &Schema,
    destination: &Schema,
    mapping: &MappingTable,
    destination_shader: &S,
) -> RemapResult<()> {
    if !destination_shader.is_valid() {
        return Err(RemapError::invalid_handle(format!(
            "destination shader '{}' is not valid",
            destination_shader.name()
        )));
    }
    mapping.check_shape(source, destination)?;
    let name = destination_shader.name();
    if name != destination.shader {
        return Err(RemapError::stale(format!(
            "destination shader '{name}' is not the shader schema '{}' was extracted from",
            destination.shader
        )));
    }
    let count = destination_shader.property_count();
    if count != destination.len() {
        return Err(RemapError::stale(format!(
            "destination shader '{name}' has {count} properties, schema has {}",
            destination.len()
        )));
    }
    Ok(())
}

/// Migrate one material from `source` to `destination` through `mapping`.
///
/// Order: capture flags, snapshot mapped source values, assign `destination_shader`, reset every
/// destination property to its default, write the snapshot back through the mapping, restore
/// flags. Property-level failures become warnings in the report. The call fails, without touching
/// the material, only for an invalid handle or a stale mapping.
#[tracing::instrument(skip_all, fields(material = %material.id()))]
pub fn migrate_material<M: MaterialHandle + ?Sized>(
    material: &mut M,
    source: &Schema,
    destination: &Schema,
    mapping: &MappingTable,
    destination_shader: &M::Shader,
) -> RemapResult<MigrationReport> {
    if !material.is_valid() {
        return Err(RemapError::invalid_handle(format!(
            "material '{}' is not valid",
            material.id()
        )));
    }
    check_destination(source, destination, mapping, destination_shader)?;

    let mut report = MigrationReport::new(material.id());
    let flags = MaterialFlags::capture(&*material);

    let mut snapshot = BTreeMap::new();
    for (slot, _) in mapping.mapped_pairs() {
        let desc = &source[slot];
        match read_value(&*material, desc) {
            Ok(value) => {
                snapshot.insert(slot, value);
            }
            Err(e) => report.warn(MigrationStage::Read, slot, &desc.name, &e),
        }
    }

    material.set_shader(destination_shader);

    // Hosts may carry same-named values across a shader swap; clear them all first.
    for (slot, desc) in destination.iter().enumerate() {
        if let Err(e) = write_value(material, desc, &desc.default) {
            report.warn(MigrationStage::Reset, slot, &desc.name, &e);
        }
    }

    for (slot, value) in &snapshot {
        let Some(dest_slot) = mapping.get(*slot) else {
            continue;
        };
        let desc = &destination[dest_slot];
        match write_value(material, desc, value) {
            Ok(()) => {
                report.succeeded_slots.insert(*slot);
            }
            Err(e) => report.warn(MigrationStage::Write, *slot, &source[*slot].name, &e),
        }
    }

    flags.restore(material);

    tracing::debug!(
        migrated = report.succeeded_slots.len(),
        warnings = report.warnings.len(),
        "material migrated"
    );
    Ok(report)
}

/// Read a property under its schema kind.
pub fn read_value<M: MaterialHandle + ?Sized>(
    material: &M,
    desc: &PropertyDescriptor,
) -> Result<TypedValue, PropertyAccessError> {
    let name = desc.name.as_str();
    Ok(match desc.kind {
        PropertyKind::Color => TypedValue::Color(material.color(name)?),
        PropertyKind::Vector => TypedValue::Vector(material.vector(name)?),
        PropertyKind::Float | PropertyKind::Range => TypedValue::Float(material.float(name)?),
        PropertyKind::Int => TypedValue::Int(material.int(name)?),
        PropertyKind::Texture => TypedValue::Texture(TextureValue {
            texture: material.texture(name)?,
            scale: material.texture_scale(name)?,
            offset: material.texture_offset(name)?,
        }),
    })
}

/// Write `value` into a property under its schema kind.
///
/// A texture value is written as one unit: if any of its reference, scale, or offset cannot be
/// stored, the parts already written are put back and the property keeps its previous value.
pub fn write_value<M: MaterialHandle + ?Sized>(
    material: &mut M,
    desc: &PropertyDescriptor,
    value: &TypedValue,
) -> Result<(), PropertyAccessError> {
    let name = desc.name.as_str();
    match (desc.kind, value) {
        (PropertyKind::Color, TypedValue::Color(c)) => material.set_color(name, *c),
        (PropertyKind::Vector, TypedValue::Vector(v)) => material.set_vector(name, *v),
        (PropertyKind::Float | PropertyKind::Range, TypedValue::Float(f)) => {
            material.set_float(name, *f)
        }
        (PropertyKind::Int, TypedValue::Int(i)) => material.set_int(name, *i),
        (PropertyKind::Texture, TypedValue::Texture(t)) => write_texture(material, name, t),
        (kind, value) => Err(PropertyAccessError::IncompatibleValue {
            name: desc.name.clone(),
            kind,
            value: value.type_name(),
        }),
    }
}

fn write_texture<M: MaterialHandle + ?Sized>(
    material: &mut M,
    name: &str,
    value: &TextureValue,
) -> Result<(), PropertyAccessError> {
    let previous = TextureValue {
        texture: material.texture(name)?,
        scale: material.texture_scale(name)?,
        offset: material.texture_offset(name)?,
    };
    if let Err(e) = set_texture_parts(material, name, value) {
        if let Err(undo) = set_texture_parts(material, name, &previous) {
            tracing::warn!(property = name, error = %undo, "texture rollback incomplete");
        }
        return Err(e);
    }
    Ok(())
}

fn set_texture_parts<M: MaterialHandle + ?Sized>(
    material: &mut M,
    name: &str,
    value: &TextureValue,
) -> Result<(), PropertyAccessError> {
    material.set_texture(name, value.texture.as_deref())?;
    material.set_texture_scale(name, value.scale)?;
    material.set_texture_offset(name, value.offset)
}

#[cfg(test)]
#[path = "../../tests/unit/migrate/executor.rs"]
mod tests;
