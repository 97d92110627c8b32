use std::path::{Path, PathBuf};

use crate::atlas::NAMESPACE_SEPARATOR;
use crate::error::{Result, StitchError};

/// Directory holding stitched output, inside the textures directory
pub const STITCHED_DIR: &str = "stitched";
/// Directory name shared by model files and their textures
pub const MODELS_DIR: &str = "models";

/// On-disk layout of a resources tree:
///
/// ```text
/// <root>/textures/<ns>/.../*.png
/// <root>/textures/stitched/<key>.png|.info
/// <root>/models/<ns>/.../<file>.<ext>
/// <root>/textures/models/<ns>/.../<file>.png
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePaths {
    pub textures: PathBuf,
    pub models: PathBuf,
    pub stitched: PathBuf,
}

impl ResourcePaths {
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let textures = root.join("textures");
        Self {
            stitched: textures.join(STITCHED_DIR),
            models: root.join(MODELS_DIR),
            textures,
        }
    }

    pub fn atlas_image(&self, key: &str) -> PathBuf {
        self.stitched.join(format!("{}.png", key))
    }

    pub fn atlas_info(&self, key: &str) -> PathBuf {
        self.stitched.join(format!("{}.info", key))
    }

    /// `props:crate.obj` lives at `models/props/crate.obj`
    pub fn model_file(&self, name: &str) -> PathBuf {
        self.models.join(key_to_relative(name))
    }

    /// `props:crate.obj` is textured by `textures/models/props/crate.png`
    pub fn model_texture(&self, name: &str) -> PathBuf {
        self.textures
            .join(MODELS_DIR)
            .join(key_to_relative(name))
            .with_extension("png")
    }
}

/// Turn a directory path relative to the textures root into a namespaced key.
///
/// A segment containing the separator would alias another directory's key,
/// so it is rejected.
pub fn relative_to_key(relative: &Path) -> Result<String> {
    let mut segments = Vec::new();
    for component in relative.components() {
        let segment = component.as_os_str().to_string_lossy();
        if segment.contains(NAMESPACE_SEPARATOR) {
            return Err(StitchError::format(
                relative,
                0,
                format!("directory name '{}' contains '{}'", segment, NAMESPACE_SEPARATOR),
            ));
        }
        segments.push(segment);
    }
    Ok(segments.join(&NAMESPACE_SEPARATOR.to_string()))
}

fn key_to_relative(key: &str) -> PathBuf {
    key.split(NAMESPACE_SEPARATOR).collect()
}
