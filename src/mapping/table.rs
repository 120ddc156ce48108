use crate::{
    foundation::core::SchemaSide,
    foundation::error::{RemapError, RemapResult},
    schema::extract::Schema,
};

/// Slot index mapping from a source schema to a destination schema.
///
/// `entries[source_slot]` is the destination slot or `None` (UNSET). The table is a plain store:
/// `set_mapping` range-checks but does not reject duplicate destinations. Callers that author
/// connections check [`MappingTable::is_destination_mapped`] first (see
/// [`crate::MigrationRule::connect`]).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MappingTable {
    entries: Vec<Option<usize>>,
    destination_len: usize,
}

impl MappingTable {
    /// All-UNSET table sized to `source`.
    pub fn new(source: &Schema, destination: &Schema) -> Self {
        Self::with_lengths(source.len(), destination.len())
    }

    /// All-UNSET table for schemas of the given lengths.
    pub fn with_lengths(source_len: usize, destination_len: usize) -> Self {
        Self {
            entries: vec![None; source_len],
            destination_len,
        }
    }

    /// Rebuild a table from stored entries, checking ranges.
    pub fn from_entries(entries: Vec<Option<usize>>, destination_len: usize) -> RemapResult<Self> {
        if let Some(slot) = entries.iter().flatten().find(|&&d| d >= destination_len) {
            return Err(RemapError::SlotOutOfRange {
                side: SchemaSide::Destination,
                slot: *slot,
                len: destination_len,
            });
        }
        Ok(Self {
            entries,
            destination_len,
        })
    }

    /// Number of source slots the table was built for.
    pub fn source_len(&self) -> usize {
        self.entries.len()
    }

    /// Number of destination slots the table was built for.
    pub fn destination_len(&self) -> usize {
        self.destination_len
    }

    /// One entry per source slot.
    pub fn entries(&self) -> &[Option<usize>] {
        &self.entries
    }

    /// Destination mapped from `source_slot`, `None` when UNSET or out of range.
    pub fn get(&self, source_slot: usize) -> Option<usize> {
        self.entries.get(source_slot).copied().flatten()
    }

    /// Point `source_slot` at `destination_slot` (or UNSET with `None`).
    pub fn set_mapping(
        &mut self,
        source_slot: usize,
        destination_slot: Option<usize>,
    ) -> RemapResult<()> {
        let source_len = self.entries.len();
        if source_slot >= source_len {
            return Err(RemapError::SlotOutOfRange {
                side: SchemaSide::Source,
                slot: source_slot,
                len: source_len,
            });
        }
        if let Some(d) = destination_slot
            && d >= self.destination_len
        {
            return Err(RemapError::SlotOutOfRange {
                side: SchemaSide::Destination,
                slot: d,
                len: self.destination_len,
            });
        }
        self.entries[source_slot] = destination_slot;
        Ok(())
    }

    /// `true` iff some source slot currently maps to `destination_slot`.
    pub fn is_destination_mapped(&self, destination_slot: usize) -> bool {
        self.source_for_destination(destination_slot).is_some()
    }

    /// Source slot mapped to `destination_slot`; the last one if the table holds duplicates.
    pub fn source_for_destination(&self, destination_slot: usize) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|&d| d == Some(destination_slot))
    }

    /// Set every entry to UNSET.
    pub fn reset_all(&mut self) {
        self.entries.fill(None);
    }

    /// Set one entry to UNSET. Out-of-range slots are ignored.
    pub fn clear(&mut self, source_slot: usize) {
        if let Some(e) = self.entries.get_mut(source_slot) {
            *e = None;
        }
    }

    /// `(source, destination)` pairs in source order.
    pub fn mapped_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(s, d)| d.map(|d| (s, d)))
    }

    /// Number of source slots with a destination.
    pub fn mapped_count(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    /// Whether two source slots share a destination.
    pub fn has_duplicate_destinations(&self) -> bool {
        let mut seen = vec![false; self.destination_len];
        for d in self.entries.iter().flatten() {
            match seen.get_mut(*d) {
                Some(s) if *s => return true,
                Some(s) => *s = true,
                None => {}
            }
        }
        false
    }

    /// Check that this table was built for schemas of these lengths.
    pub fn check_shape(&self, source: &Schema, destination: &Schema) -> RemapResult<()> {
        if self.entries.len() != source.len() {
            return Err(RemapError::stale(format!(
                "mapping has {} source slots but schema '{}' has {}",
                self.entries.len(),
                source.shader,
                source.len()
            )));
        }
        if self.destination_len != destination.len() {
            return Err(RemapError::stale(format!(
                "mapping was built for {} destination slots but schema '{}' has {}",
                self.destination_len,
                destination.shader,
                destination.len()
            )));
        }
        if let Some((s, d)) = self.mapped_pairs().find(|&(_, d)| d >= destination.len()) {
            return Err(RemapError::stale(format!(
                "source slot {s} maps to destination slot {d}, beyond schema '{}'",
                destination.shader
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/table.rs"]
mod tests;
