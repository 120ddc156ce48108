//! shader-remap migrates material property values from one shader's property schema to another's.
//!
//! A host (game engine editor, asset pipeline, or the bundled CLI) supplies shaders and materials
//! through the [`ShaderHandle`] and [`MaterialHandle`] traits. The engine never talks to an asset
//! database itself.
//!
//! # Pipeline overview
//!
//! 1. **Extract**: `ShaderHandle -> Schema` (ordered property descriptors; slot = index)
//! 2. **Map**: build a [`MigrationRule`] over two schemas and fill its [`MappingTable`], either by
//!    [`auto_map`] or through checked [`MigrationRule::connect`] calls
//! 3. **Migrate**: per material, snapshot mapped values, swap the shader, reset every destination
//!    property to its default, write the snapshot back ([`migrate_material`])
//! 4. **Batch** (optional): run step 3 over many materials, sequentially or on a rayon pool
//!    ([`migrate_batch`])
//!
//! Per-property failures never abort a migration; they are collected into a [`MigrationReport`].
//! Only an invalid handle or a stale mapping fails a call, and both are detected before the
//! material is touched.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod host;
mod mapping;
mod migrate;
mod persist;
mod schema;
mod session;

pub mod memory;

pub use foundation::core::{Color, SchemaSide, Vec2, Vec4};
pub use foundation::error::{PropertyAccessError, RemapError, RemapResult};
pub use host::{MaterialHandle, ShaderHandle};
pub use mapping::auto::{MatchKey, auto_map, auto_map_table};
pub use mapping::table::MappingTable;
pub use migrate::batch::{
    BatchOptions, BatchOutcome, BatchStats, MaterialOutcome, migrate_batch, select_candidates,
};
pub use migrate::executor::{
    MaterialFlags, MigrationReport, MigrationStage, SlotWarning, check_destination,
    migrate_material, read_value, write_value,
};
pub use persist::rule_file::{RULE_DOC_VERSION, RuleDocument};
pub use schema::extract::{Schema, SchemaFingerprint, extract};
pub use schema::property::{
    PropertyDescriptor, PropertyKind, TextureValue, TypedValue, is_type_compatible,
};
pub use session::migration_session::MigrationSession;
pub use session::rule::MigrationRule;
pub use session::selection::{MaterialSelection, SelectionEntry};
pub use session::view::ViewFilter;
