use crate::{
    mapping::table::MappingTable,
    schema::extract::Schema,
    schema::property::is_type_compatible,
    session::rule::MigrationRule,
};

/// Descriptor field compared by the auto-mapper and shown by views.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKey {
    /// Property identifier.
    #[default]
    Name,
    /// Human-readable description.
    Description,
}

/// Fill UNSET entries of `rule`'s mapping by exact `key` equality and kind compatibility.
///
/// Returns the number of entries assigned.
pub fn auto_map(rule: &mut MigrationRule, key: MatchKey) -> usize {
    let (source, destination, mapping) = rule.parts_mut();
    auto_map_table(source, destination, mapping, key)
}

/// Schema-level form of [`auto_map`].
///
/// For each UNSET source slot the first destination slot in order that matches `key`
/// (case-sensitive), has a compatible kind, and is not yet claimed, is assigned. Existing entries
/// are left alone, so repeated runs only fill gaps.
#[tracing::instrument(skip_all, fields(key = ?key))]
pub fn auto_map_table(
    source: &Schema,
    destination: &Schema,
    mapping: &mut MappingTable,
    key: MatchKey,
) -> usize {
    let mut assigned = 0;
    for (i, src) in source.iter().enumerate() {
        if mapping.get(i).is_some() {
            continue;
        }
        let wanted = src.key_text(key);
        let hit = destination.iter().enumerate().position(|(j, dst)| {
            dst.key_text(key) == wanted
                && is_type_compatible(src.kind, dst.kind)
                && !mapping.is_destination_mapped(j)
        });
        if let Some(j) = hit {
            // Both indices come from the schemas the table was sized for.
            if mapping.set_mapping(i, Some(j)).is_ok() {
                tracing::trace!(
                    source = %src.name,
                    destination = %destination[j].name,
                    "auto-mapped"
                );
                assigned += 1;
            }
        }
    }
    tracing::debug!(assigned, "auto-map finished");
    assigned
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/auto.rs"]
mod tests;
