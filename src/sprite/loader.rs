use std::path::{Path, PathBuf};

use image::{ImageReader, RgbaImage};
use log::debug;
use rayon::prelude::*;

use super::SourceSprite;
use crate::error::{Result, StitchError};

/// List the `.png` files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into; each one is its own atlas source.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.[pP][nN][gG]",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    debug!("Listing images matching {}", pattern);

    let entries = glob::glob(&pattern).map_err(|e| StitchError::Io {
        path: dir.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| StitchError::Io {
            path: e.path().to_path_buf(),
            source: e.into(),
        })?;
        if path.is_file() {
            paths.push(path);
        }
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Decode every image in `dir` in parallel, preserving file-name order.
///
/// Any unreadable file fails the whole directory.
pub fn load_images(dir: &Path) -> Result<Vec<SourceSprite>> {
    let paths = list_images(dir)?;

    paths
        .par_iter()
        .map(|path| -> Result<SourceSprite> {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown")
                .to_string();
            Ok(SourceSprite {
                path: path.clone(),
                name,
                image: decode_image(path)?,
            })
        })
        .collect()
}

/// Decode a single file into RGBA8
pub fn decode_image(path: &Path) -> Result<RgbaImage> {
    let img = ImageReader::open(path)
        .map_err(|e| StitchError::Io {
            path: path.to_path_buf(),
            source: e,
        })?
        .with_guessed_format()
        .map_err(|e| StitchError::Io {
            path: path.to_path_buf(),
            source: e,
        })?
        .decode()
        .map_err(|e| StitchError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(img.into_rgba8())
}
