use crate::{
    foundation::core::SchemaSide,
    foundation::error::{RemapError, RemapResult},
    host::{MaterialHandle, ShaderHandle},
    mapping::auto::{MatchKey, auto_map},
    mapping::table::MappingTable,
    migrate::executor::{MigrationReport, migrate_material},
    schema::extract::{Schema, extract},
    schema::property::is_type_compatible,
    session::view::ViewFilter,
};

/// Source schema, destination schema, and the slot mapping between them.
///
/// The three parts are always (re)built together: a rule never holds a mapping sized for a
/// different schema than the one it owns.
#[derive(Clone, Debug, PartialEq)]
pub struct MigrationRule {
    source: Schema,
    destination: Schema,
    mapping: MappingTable,
}

impl MigrationRule {
    /// Extract both schemas and start from an all-UNSET mapping.
    ///
    /// Fails if either handle is invalid or both name the same shader.
    pub fn new<S: ShaderHandle + ?Sized>(source: &S, destination: &S) -> RemapResult<Self> {
        if source.name() == destination.name() {
            return Err(RemapError::validation(format!(
                "source and destination shader must differ (both are '{}')",
                source.name()
            )));
        }
        let source = extract(source)?;
        let destination = extract(destination)?;
        Ok(Self::from_schemas(source, destination))
    }

    /// Rule over already-extracted schemas with an all-UNSET mapping.
    pub fn from_schemas(source: Schema, destination: Schema) -> Self {
        let mapping = MappingTable::new(&source, &destination);
        Self {
            source,
            destination,
            mapping,
        }
    }

    /// Reassemble a rule from stored parts, checking that the mapping fits the schemas.
    pub fn from_parts(
        source: Schema,
        destination: Schema,
        mapping: MappingTable,
    ) -> RemapResult<Self> {
        mapping.check_shape(&source, &destination)?;
        Ok(Self {
            source,
            destination,
            mapping,
        })
    }

    /// Source shader schema.
    pub fn source(&self) -> &Schema {
        &self.source
    }

    /// Destination shader schema.
    pub fn destination(&self) -> &Schema {
        &self.destination
    }

    /// Current slot mapping.
    pub fn mapping(&self) -> &MappingTable {
        &self.mapping
    }

    pub(crate) fn parts_mut(&mut self) -> (&Schema, &Schema, &mut MappingTable) {
        (&self.source, &self.destination, &mut self.mapping)
    }

    /// Unchecked store; see [`MappingTable::set_mapping`].
    pub fn set_mapping(
        &mut self,
        source_slot: usize,
        destination_slot: Option<usize>,
    ) -> RemapResult<()> {
        self.mapping.set_mapping(source_slot, destination_slot)
    }

    /// Connect `source_slot` to `destination_slot` after checking kinds and ownership.
    ///
    /// This is the checked counterpart of [`MigrationRule::set_mapping`] for interactive
    /// authoring. Rejected requests leave the mapping untouched; reconnecting an existing pair is
    /// a no-op.
    pub fn connect(&mut self, source_slot: usize, destination_slot: usize) -> RemapResult<()> {
        let src = self.source.get(source_slot).ok_or(RemapError::SlotOutOfRange {
            side: SchemaSide::Source,
            slot: source_slot,
            len: self.source.len(),
        })?;
        let dst = self
            .destination
            .get(destination_slot)
            .ok_or(RemapError::SlotOutOfRange {
                side: SchemaSide::Destination,
                slot: destination_slot,
                len: self.destination.len(),
            })?;
        if !is_type_compatible(src.kind, dst.kind) {
            tracing::warn!(
                source = %src.name,
                destination = %dst.name,
                "connection rejected: kind mismatch"
            );
            return Err(RemapError::TypeMismatch {
                source_kind: src.kind,
                destination_kind: dst.kind,
            });
        }
        match self.mapping.source_for_destination(destination_slot) {
            Some(owner) if owner == source_slot => return Ok(()),
            Some(owner) => {
                tracing::warn!(
                    source = %src.name,
                    destination = %dst.name,
                    "connection rejected: destination already mapped"
                );
                return Err(RemapError::DuplicateDestination {
                    destination_slot,
                    claimed_by: owner,
                });
            }
            None => {}
        }
        self.mapping.set_mapping(source_slot, Some(destination_slot))
    }

    /// `true` when some source slot maps to `destination_slot`.
    pub fn is_destination_mapped(&self, destination_slot: usize) -> bool {
        self.mapping.is_destination_mapped(destination_slot)
    }

    /// Break one connection.
    pub fn clear(&mut self, source_slot: usize) {
        self.mapping.clear(source_slot);
    }

    /// Break every connection.
    pub fn reset_mapping(&mut self) {
        self.mapping.reset_all();
    }

    /// Fill gaps in the mapping; see [`crate::auto_map`].
    pub fn auto_map(&mut self, key: MatchKey) -> usize {
        auto_map(self, key)
    }

    /// Whether the slot on `side` takes part in a connection.
    pub fn is_connected(&self, side: SchemaSide, slot: usize) -> bool {
        match side {
            SchemaSide::Source => self.mapping.get(slot).is_some(),
            SchemaSide::Destination => self.mapping.is_destination_mapped(slot),
        }
    }

    /// Re-extract both shaders and compare layouts with the stored schemas.
    ///
    /// A rule loaded from disk must pass this before it is applied to live materials.
    pub fn check_against<S: ShaderHandle + ?Sized>(
        &self,
        source: &S,
        destination: &S,
    ) -> RemapResult<()> {
        for (side, stored, shader) in [
            (SchemaSide::Source, &self.source, source),
            (SchemaSide::Destination, &self.destination, destination),
        ] {
            let live = extract(shader)?;
            if live.fingerprint() != stored.fingerprint() {
                return Err(RemapError::stale(format!(
                    "{side} shader '{}' no longer matches the stored schema '{}'",
                    live.shader, stored.shader
                )));
            }
        }
        Ok(())
    }

    /// Recompute the `visible` flag of every descriptor.
    pub fn apply_view_filter(&mut self, filter: &ViewFilter) {
        let source_visible: Vec<bool> = (0..self.source.len())
            .map(|slot| filter.is_visible(self, SchemaSide::Source, slot))
            .collect();
        let destination_visible: Vec<bool> = (0..self.destination.len())
            .map(|slot| filter.is_visible(self, SchemaSide::Destination, slot))
            .collect();
        for (p, v) in self.source.properties_mut().iter_mut().zip(source_visible) {
            p.visible = v;
        }
        for (p, v) in self
            .destination
            .properties_mut()
            .iter_mut()
            .zip(destination_visible)
        {
            p.visible = v;
        }
    }

    /// Migrate one material with this rule; see [`migrate_material`].
    pub fn migrate<M: MaterialHandle>(
        &self,
        material: &mut M,
        destination_shader: &M::Shader,
    ) -> RemapResult<MigrationReport> {
        migrate_material(
            material,
            &self.source,
            &self.destination,
            &self.mapping,
            destination_shader,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/rule.rs"]
mod tests;
