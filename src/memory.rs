//! In-memory shaders and materials.
//!
//! A complete host for the [`crate::ShaderHandle`] and [`crate::MaterialHandle`] traits, loadable
//! from JSON. The CLI runs on it, and it is the reference for how a host should report property
//! access failures.

mod library;
mod material;
mod shader;

pub use library::MemoryLibrary;
pub use material::{DEFAULT_RENDER_QUEUE, MemoryMaterial};
pub use shader::{MemoryShader, ShaderProperty};
