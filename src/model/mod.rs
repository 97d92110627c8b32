//! Meshes and the extension-keyed loader registry.

mod obj;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::gpu::TextureHandle;

pub use obj::load_obj;

/// Indexed triangle mesh, one vertex per unique corner
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    /// Empty when the source has no texture coordinates
    pub uvs: Vec<[f32; 2]>,
    /// Empty when the source has no normals
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A loaded mesh and the GPU texture painted on it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    pub mesh: Mesh,
    pub texture: TextureHandle,
}

/// Parses one model file into a mesh
pub type ModelLoader = Box<dyn Fn(&Path) -> Result<Mesh> + Send + Sync>;

/// Maps file extensions to model loaders.
///
/// Format modules add themselves with [`ModelFormats::register`]; the cache
/// only ever looks loaders up by extension.
#[derive(Default)]
pub struct ModelFormats {
    loaders: HashMap<String, ModelLoader>,
}

impl ModelFormats {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in formats (`obj`)
    pub fn with_defaults() -> Self {
        let mut formats = Self::new();
        formats.register("obj", load_obj);
        formats
    }

    /// Register `loader` for `extension` (case-insensitive, leading dot optional),
    /// replacing any previous loader for it.
    pub fn register<F>(&mut self, extension: &str, loader: F) -> &mut Self
    where
        F: Fn(&Path) -> Result<Mesh> + Send + Sync + 'static,
    {
        self.loaders
            .insert(normalize_extension(extension), Box::new(loader));
        self
    }

    pub fn get(&self, extension: &str) -> Option<&ModelLoader> {
        self.loaders.get(&normalize_extension(extension))
    }

    pub fn supports(&self, extension: &str) -> bool {
        self.get(extension).is_some()
    }

    /// Registered extensions, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.loaders.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

impl fmt::Debug for ModelFormats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelFormats")
            .field("extensions", &self.extensions())
            .finish()
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}
