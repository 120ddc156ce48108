use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;
use std::sync::Arc;

use crate::{
    foundation::error::{RemapError, RemapResult},
    host::MaterialHandle as _,
    memory::material::{DEFAULT_RENDER_QUEUE, MemoryMaterial},
    memory::shader::MemoryShader,
    migrate::executor::MaterialFlags,
    schema::property::TypedValue,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
struct LibraryDoc {
    #[serde(default)]
    shaders: Vec<MemoryShader>,
    #[serde(default)]
    materials: Vec<MaterialDoc>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
struct MaterialDoc {
    id: String,
    shader: String,
    #[serde(default)]
    values: BTreeMap<String, TypedValue>,
    #[serde(default)]
    instancing: bool,
    #[serde(default = "default_render_queue")]
    render_queue: i32,
    #[serde(default)]
    double_sided_gi: bool,
}

fn default_render_queue() -> i32 {
    DEFAULT_RENDER_QUEUE
}

/// Shaders and materials loaded from one JSON document.
///
/// ```json
/// {
///   "shaders": [{ "name": "Legacy/Diffuse", "properties": [
///     { "name": "_Color", "description": "Main Color", "kind": "Color",
///       "default": { "color": { "r": 1, "g": 1, "b": 1, "a": 1 } } } ] }],
///   "materials": [{ "id": "Rock", "shader": "Legacy/Diffuse",
///     "values": { "_Color": { "color": { "r": 0.5, "g": 0.4, "b": 0.3, "a": 1 } } } }]
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryLibrary {
    shaders: BTreeMap<String, Arc<MemoryShader>>,
    /// Materials in document order.
    pub materials: Vec<MemoryMaterial>,
}

impl MemoryLibrary {
    /// Parse a library from JSON text.
    pub fn from_json(s: &str) -> RemapResult<Self> {
        let doc: LibraryDoc = serde_json::from_str(s)
            .map_err(|e| RemapError::serde(format!("parse library JSON: {e}")))?;
        Self::from_doc(doc)
    }

    /// Parse a library from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RemapResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RemapError::validation(format!("open library JSON '{}': {e}", path.display()))
        })?;
        let doc: LibraryDoc = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            RemapError::serde(format!("parse library JSON '{}': {e}", path.display()))
        })?;
        Self::from_doc(doc)
    }

    fn from_doc(doc: LibraryDoc) -> RemapResult<Self> {
        let mut lib = Self::default();
        for shader in doc.shaders {
            lib.add_shader(shader)?;
        }
        for m in doc.materials {
            let shader = lib.shader(&m.shader).ok_or_else(|| {
                RemapError::validation(format!(
                    "material '{}' uses unknown shader '{}'",
                    m.id, m.shader
                ))
            })?;
            let mut material = MemoryMaterial::new(m.id, shader).with_flags(MaterialFlags {
                instancing: m.instancing,
                render_queue: m.render_queue,
                double_sided_gi: m.double_sided_gi,
            });
            for (name, value) in m.values {
                material = material.with_value(name, value);
            }
            lib.materials.push(material);
        }
        Ok(lib)
    }

    /// Register a shader; names must be unique.
    pub fn add_shader(&mut self, shader: MemoryShader) -> RemapResult<Arc<MemoryShader>> {
        if self.shaders.contains_key(&shader.name) {
            return Err(RemapError::validation(format!(
                "duplicate shader '{}'",
                shader.name
            )));
        }
        let shader = Arc::new(shader);
        self.shaders.insert(shader.name.clone(), Arc::clone(&shader));
        Ok(shader)
    }

    /// Shader registered under `name`.
    pub fn shader(&self, name: &str) -> Option<Arc<MemoryShader>> {
        self.shaders.get(name).cloned()
    }

    /// Look up a shader or fail with [`RemapError::InvalidHandle`].
    pub fn require_shader(&self, name: &str) -> RemapResult<Arc<MemoryShader>> {
        self.shader(name)
            .ok_or_else(|| RemapError::invalid_handle(format!("no shader named '{name}'")))
    }

    /// Registered shader names, sorted.
    pub fn shader_names(&self) -> impl Iterator<Item = &str> {
        self.shaders.keys().map(String::as_str)
    }

    fn to_doc(&self) -> LibraryDoc {
        LibraryDoc {
            shaders: self.shaders.values().map(|s| (**s).clone()).collect(),
            materials: self
                .materials
                .iter()
                .map(|m| {
                    let flags = m.flags();
                    MaterialDoc {
                        id: m.id(),
                        shader: m.shader().name.clone(),
                        values: m.stored_values().clone(),
                        instancing: flags.instancing,
                        render_queue: flags.render_queue,
                        double_sided_gi: flags.double_sided_gi,
                    }
                })
                .collect(),
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> RemapResult<String> {
        serde_json::to_string_pretty(&self.to_doc())
            .map_err(|e| RemapError::serde(format!("serialize library: {e}")))
    }

    /// Write the library as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> RemapResult<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| {
            RemapError::validation(format!("create library JSON '{}': {e}", path.display()))
        })?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, &self.to_doc())
            .map_err(|e| RemapError::serde(format!("serialize library: {e}")))?;
        w.flush()
            .map_err(|e| RemapError::Other(anyhow::Error::new(e)))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/memory/library.rs"]
mod tests;
