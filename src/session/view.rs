use crate::{foundation::core::SchemaSide, mapping::auto::MatchKey, session::rule::MigrationRule};

/// Which descriptors a mapping view should show.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewFilter {
    /// Field used for display text and searching.
    pub key: MatchKey,
    /// Case-insensitive substring filter for the source list.
    pub source_search: String,
    /// Case-insensitive substring filter for the destination list.
    pub destination_search: String,
    /// Hide slots that take part in no connection.
    pub only_connected: bool,
}

impl ViewFilter {
    /// Whether the descriptor at `slot` on `side` passes this filter.
    pub fn is_visible(&self, rule: &MigrationRule, side: SchemaSide, slot: usize) -> bool {
        let (schema, search) = match side {
            SchemaSide::Source => (rule.source(), &self.source_search),
            SchemaSide::Destination => (rule.destination(), &self.destination_search),
        };
        let Some(desc) = schema.get(slot) else {
            return false;
        };
        if self.only_connected && !rule.is_connected(side, slot) {
            return false;
        }
        if search.is_empty() {
            return true;
        }
        desc.key_text(self.key)
            .to_lowercase()
            .contains(&search.to_lowercase())
    }
}
