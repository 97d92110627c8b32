//! Startup content scan: stitch every texture directory and load the results.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use image::RgbaImage;
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::atlas::{Atlas, AtlasBuilder, AtlasInfo, AtlasKind, animation};
use crate::cache::ResourceCache;
use crate::cli::CompressionLevel;
use crate::error::{Result, StitchError};
use crate::gpu::GpuBackend;
use crate::output::{save_atlas_image, write_info};
use crate::paths::{MODELS_DIR, ResourcePaths, STITCHED_DIR, relative_to_key};
use crate::sprite::load_images;

/// Directories starting with this are built and persisted but not loaded
pub const PRIVATE_PREFIX: char = '$';

/// One atlas produced by a scan
#[derive(Debug, Clone, Serialize)]
pub struct BuiltAtlas {
    pub key: String,
    pub kind: AtlasKind,
    pub width: u32,
    pub height: u32,
    pub entries: usize,
    /// Directory name starts with `$`: persisted only
    pub private: bool,
    /// Uploaded into the cache by this scan
    pub loaded: bool,
}

/// A directory whose atlas could not be built
#[derive(Debug)]
pub struct ScanFailure {
    pub directory: PathBuf,
    pub error: StitchError,
}

/// Outcome of a scan; failures are isolated per directory
#[derive(Debug, Default)]
pub struct ScanReport {
    pub built: Vec<BuiltAtlas>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn loaded(&self) -> usize {
        self.built.iter().filter(|a| a.loaded).count()
    }
}

/// Walks a textures tree and stitches one atlas per directory.
#[derive(Debug, Clone, Default)]
pub struct ContentScanner {
    builder: AtlasBuilder,
    compress: Option<CompressionLevel>,
    exclude: Vec<Pattern>,
}

impl ContentScanner {
    pub fn new(builder: AtlasBuilder) -> Self {
        Self {
            builder,
            ..Self::default()
        }
    }

    pub fn compress(mut self, compress: Option<CompressionLevel>) -> Self {
        self.compress = compress;
        self
    }

    /// Skip directories whose path relative to `textures/` matches any pattern
    pub fn exclude(mut self, exclude: Vec<Pattern>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Build and persist every atlas under `paths.textures` without loading.
    pub fn scan(&self, paths: &ResourcePaths) -> ScanReport {
        let mut report = ScanReport::default();
        self.walk(
            paths,
            &mut |_key: &str, _image: &RgbaImage, _info: AtlasInfo| -> Result<bool> { Ok(false) },
            &mut report,
        );
        report
    }

    /// Build and persist every atlas, loading the public ones into `cache`.
    pub fn scan_into<G: GpuBackend>(&self, cache: &mut ResourceCache<G>) -> ScanReport {
        let paths = cache.paths().clone();
        let mut report = ScanReport::default();
        self.walk(
            &paths,
            &mut |key: &str, image: &RgbaImage, info: AtlasInfo| cache.insert_atlas(key, image, info),
            &mut report,
        );
        report
    }

    /// Stitch the images directly inside `dir` as atlas `key` and write
    /// `<out_dir>/<key>.png` and `.info`.
    ///
    /// Returns `Ok(None)` and writes nothing when `dir` holds no images.
    pub fn stitch_directory(
        &self,
        dir: &Path,
        key: &str,
        out_dir: &Path,
    ) -> Result<Option<(Atlas, AtlasInfo)>> {
        let sprites = load_images(dir)?;
        let animations = animation::load_descriptor(dir)?;
        let Some(atlas) = self.builder.build(key, sprites, animations.as_ref())? else {
            return Ok(None);
        };

        let info = AtlasInfo::from_atlas(&atlas);
        fs::create_dir_all(out_dir).map_err(|e| StitchError::OutputWrite {
            path: out_dir.to_path_buf(),
            source: e,
        })?;
        self.persist(&atlas, &info, out_dir, key)?;
        debug!("Wrote {}/{}.png", out_dir.display(), key);

        Ok(Some((atlas, info)))
    }

    /// Write the image and record side by side, then move both into place.
    ///
    /// On failure neither `<key>.png` nor `<key>.info` is left behind.
    fn persist(&self, atlas: &Atlas, info: &AtlasInfo, out_dir: &Path, key: &str) -> Result<()> {
        let image_path = out_dir.join(format!("{}.png", key));
        let info_path = out_dir.join(format!("{}.info", key));
        let image_partial = partial_path(&image_path);
        let info_partial = partial_path(&info_path);

        let written = save_atlas_image(&atlas.image, &image_partial, self.compress)
            .and_then(|()| write_info(info, &info_partial))
            .and_then(|()| move_into_place(&info_partial, &info_path))
            .and_then(|()| {
                move_into_place(&image_partial, &image_path).inspect_err(|_| {
                    discard(&info_path);
                })
            });

        if written.is_err() {
            discard(&image_partial);
            discard(&info_partial);
        }
        written
    }

    fn walk(
        &self,
        paths: &ResourcePaths,
        load: &mut dyn FnMut(&str, &RgbaImage, AtlasInfo) -> Result<bool>,
        report: &mut ScanReport,
    ) {
        if !paths.textures.is_dir() {
            warn!("No textures directory at {}", paths.textures.display());
            return;
        }
        info!("Scanning {}", paths.textures.display());
        self.visit(paths, &paths.textures, Path::new(""), load, report);
    }

    /// Children first, depth-first, then the directory itself
    fn visit(
        &self,
        paths: &ResourcePaths,
        dir: &Path,
        relative: &Path,
        load: &mut dyn FnMut(&str, &RgbaImage, AtlasInfo) -> Result<bool>,
        report: &mut ScanReport,
    ) {
        match subdirectories(dir) {
            Ok(children) => {
                for child in children {
                    let Some(name) = child.file_name() else {
                        continue;
                    };
                    let child_relative = relative.join(name);
                    if self.is_skipped(&child_relative) {
                        debug!("Skipping {}", child.display());
                        continue;
                    }
                    self.visit(paths, &child, &child_relative, load, report);
                }
            }
            Err(e) => {
                error!("{}", e);
                report.failures.push(ScanFailure {
                    directory: dir.to_path_buf(),
                    error: e,
                });
                return;
            }
        }

        // Images directly under textures/ have no namespace
        if relative.as_os_str().is_empty() {
            return;
        }

        let private = is_private(relative);
        let result = relative_to_key(relative).and_then(|key| {
            let built = self.stitch_directory(dir, &key, &paths.stitched)?;
            match built {
                Some((atlas, info)) => {
                    let summary = BuiltAtlas {
                        key: key.clone(),
                        kind: atlas.kind,
                        width: atlas.width,
                        height: atlas.height,
                        entries: atlas.entries.len(),
                        private,
                        loaded: false,
                    };
                    let loaded = if private {
                        false
                    } else {
                        load(&key, &atlas.image, info)?
                    };
                    Ok(Some(BuiltAtlas { loaded, ..summary }))
                }
                None => Ok(None),
            }
        });

        match result {
            Ok(Some(built)) => report.built.push(built),
            Ok(None) => debug!("No images in {}", dir.display()),
            Err(e) => {
                error!("Failed to stitch {}: {}", relative.display(), e);
                report.failures.push(ScanFailure {
                    directory: dir.to_path_buf(),
                    error: e,
                });
            }
        }
    }

    fn is_skipped(&self, relative: &Path) -> bool {
        if relative == Path::new(STITCHED_DIR) || relative == Path::new(MODELS_DIR) {
            return true;
        }
        self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

/// Scan `cache`'s textures tree and load every public atlas.
///
/// Any directory failure is returned as the error after the whole tree has
/// been visited, so the caller can refuse to start.
pub fn initialize_content<G: GpuBackend>(
    scanner: &ContentScanner,
    cache: &mut ResourceCache<G>,
) -> Result<ScanReport> {
    let mut report = scanner.scan_into(cache);
    info!(
        "Content ready: {} atlases built, {} loaded, {} failed",
        report.built.len(),
        report.loaded(),
        report.failures.len()
    );
    if report.failures.is_empty() {
        return Ok(report);
    }
    let first = report.failures.swap_remove(0);
    Err(first.error)
}

/// Only the directory's own name counts; children of a private directory load
fn is_private(relative: &Path) -> bool {
    relative
        .file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with(PRIVATE_PREFIX))
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

fn move_into_place(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|e| StitchError::OutputWrite {
        path: to.to_path_buf(),
        source: e,
    })
}

fn discard(path: &Path) {
    if path.is_file() {
        if let Err(e) = fs::remove_file(path) {
            warn!("Could not remove {}: {}", path.display(), e);
        }
    }
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |e| StitchError::Io {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}
