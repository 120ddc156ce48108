use crate::foundation::core::SchemaSide;
use crate::schema::property::PropertyKind;

/// Convenience result type used across the crate.
pub type RemapResult<T> = Result<T, RemapError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum RemapError {
    /// A shader or material handle is null or no longer valid.
    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    /// A connection was requested between incompatible property kinds.
    #[error("type mismatch: cannot map {source_kind:?} onto {destination_kind:?}")]
    TypeMismatch {
        /// Kind of the source property.
        source_kind: PropertyKind,
        /// Kind of the destination property.
        destination_kind: PropertyKind,
    },

    /// A connection was requested to a destination slot another source already claims.
    #[error(
        "duplicate destination: slot {destination_slot} is already mapped from source slot {claimed_by}"
    )]
    DuplicateDestination {
        /// Destination slot that was requested.
        destination_slot: usize,
        /// Source slot currently mapped to it.
        claimed_by: usize,
    },

    /// A slot index outside the addressed schema.
    #[error("slot out of range: {side} slot {slot} (schema has {len} properties)")]
    SlotOutOfRange {
        /// Which schema the slot addresses.
        side: SchemaSide,
        /// Requested slot.
        slot: usize,
        /// Length of the addressed schema.
        len: usize,
    },

    /// The mapping no longer corresponds to the schemas or shader it is applied with.
    #[error("stale mapping: {0}")]
    StaleMapping(String),

    /// Invalid user-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing rule or library documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RemapError {
    /// Build a [`RemapError::InvalidHandle`] value.
    pub fn invalid_handle(msg: impl Into<String>) -> Self {
        Self::InvalidHandle(msg.into())
    }

    /// Build a [`RemapError::StaleMapping`] value.
    pub fn stale(msg: impl Into<String>) -> Self {
        Self::StaleMapping(msg.into())
    }

    /// Build a [`RemapError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RemapError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Failure of a single typed property access on a material.
///
/// These never abort a migration; the executor turns them into report warnings.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyAccessError {
    /// The material's current shader has no property with this name.
    #[error("property '{0}' not found on current shader")]
    NotFound(String),

    /// The property exists but has a different kind than the one requested.
    #[error("property '{name}' is {actual:?}, not {requested:?}")]
    KindMismatch {
        /// Property name.
        name: String,
        /// Kind the caller asked for.
        requested: PropertyKind,
        /// Kind declared by the current shader.
        actual: PropertyKind,
    },

    /// A value of the wrong representation was offered for a property.
    #[error("cannot store a {value} value in {kind:?} property '{name}'")]
    IncompatibleValue {
        /// Property name.
        name: String,
        /// Kind declared by the schema.
        kind: PropertyKind,
        /// Representation of the rejected value.
        value: &'static str,
    },

    /// Any other host-side failure.
    #[error("{0}")]
    Host(String),
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
