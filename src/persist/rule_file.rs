use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use crate::{
    foundation::error::{RemapError, RemapResult},
    mapping::table::MappingTable,
    schema::extract::{Schema, SchemaFingerprint},
    session::rule::MigrationRule,
};

/// Current rule document format version.
pub const RULE_DOC_VERSION: u32 = 1;

/// JSON-facing form of a [`MigrationRule`].
///
/// Stores both schemas verbatim so a loaded rule reproduces the saved
/// `(source, destination, mapping)` triple exactly, plus fingerprints for detecting edits.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RuleDocument {
    /// Always [`RULE_DOC_VERSION`] when written by this crate.
    pub version: u32,
    /// Schema of the source shader at save time.
    pub source: Schema,
    /// Schema of the destination shader at save time.
    pub destination: Schema,
    /// Layout fingerprint of `source`.
    pub source_fingerprint: SchemaFingerprint,
    /// Layout fingerprint of `destination`.
    pub destination_fingerprint: SchemaFingerprint,
    /// `mapping[source_slot]`, `null` for UNSET.
    pub mapping: Vec<Option<usize>>,
}

impl RuleDocument {
    /// Capture `rule` with freshly computed fingerprints.
    pub fn from_rule(rule: &MigrationRule) -> Self {
        Self {
            version: RULE_DOC_VERSION,
            source: rule.source().clone(),
            destination: rule.destination().clone(),
            source_fingerprint: rule.source().fingerprint(),
            destination_fingerprint: rule.destination().fingerprint(),
            mapping: rule.mapping().entries().to_vec(),
        }
    }

    /// Validate the document and rebuild the rule.
    pub fn into_rule(self) -> RemapResult<MigrationRule> {
        if self.version != RULE_DOC_VERSION {
            return Err(RemapError::serde(format!(
                "unsupported rule document version {} (expected {RULE_DOC_VERSION})",
                self.version
            )));
        }
        if self.source.fingerprint() != self.source_fingerprint
            || self.destination.fingerprint() != self.destination_fingerprint
        {
            return Err(RemapError::serde(
                "rule document schemas do not match their recorded fingerprints",
            ));
        }
        if self.mapping.len() != self.source.len() {
            return Err(RemapError::serde(format!(
                "rule document maps {} source slots but the source schema has {}",
                self.mapping.len(),
                self.source.len()
            )));
        }
        let mapping = MappingTable::from_entries(self.mapping, self.destination.len())?;
        if mapping.has_duplicate_destinations() {
            return Err(RemapError::validation(
                "rule document maps two source slots to the same destination",
            ));
        }
        MigrationRule::from_parts(self.source, self.destination, mapping)
    }
}

impl MigrationRule {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> RemapResult<String> {
        serde_json::to_string_pretty(&RuleDocument::from_rule(self))
            .map_err(|e| RemapError::serde(format!("serialize rule: {e}")))
    }

    /// Parse a rule from JSON text.
    pub fn from_json(s: &str) -> RemapResult<Self> {
        let doc: RuleDocument = serde_json::from_str(s)
            .map_err(|e| RemapError::serde(format!("parse rule JSON: {e}")))?;
        doc.into_rule()
    }

    /// Parse a rule from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RemapResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RemapError::validation(format!("open rule JSON '{}': {e}", path.display()))
        })?;
        let doc: RuleDocument = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            RemapError::serde(format!("parse rule JSON '{}': {e}", path.display()))
        })?;
        doc.into_rule()
    }

    /// Write the rule as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> RemapResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                RemapError::validation(format!("create rule dir '{}': {e}", parent.display()))
            })?;
        }
        let f = File::create(path).map_err(|e| {
            RemapError::validation(format!("create rule JSON '{}': {e}", path.display()))
        })?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, &RuleDocument::from_rule(self))
            .map_err(|e| RemapError::serde(format!("serialize rule: {e}")))?;
        w.flush()
            .map_err(|e| RemapError::Other(anyhow::Error::new(e)))?;
        tracing::debug!(path = %path.display(), "rule saved");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/persist/rule_file.rs"]
mod tests;
