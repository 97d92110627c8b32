use std::collections::HashMap;
use std::path::Path;

use image::RgbaImage;
use log::{debug, info};

use super::texture::{
    ActiveResource, GlyphMetrics, ResourceKind, StandaloneTexture, StitchedTexture, Texture,
};
use crate::atlas::{AtlasInfo, AtlasKind, InfoEntry, UvRect};
use crate::error::{Result, StitchError};
use crate::gpu::{GpuBackend, TextureHandle};
use crate::model::{Model, ModelFormats};
use crate::output::read_info;
use crate::paths::ResourcePaths;
use crate::sprite::decode_image;

/// Which resource the next draw samples from
#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    Standalone(String),
    Atlas { atlas: String, region: Option<String> },
}

/// Single owner of every GPU-backed named resource.
///
/// Entries are created on the first successful load and never replaced;
/// loading a name that is already present does nothing. Handles are released
/// by [`evict`](Self::evict), [`clear_all`](Self::clear_all),
/// [`shutdown`](Self::shutdown) or when the cache is dropped.
pub struct ResourceCache<G: GpuBackend> {
    paths: ResourcePaths,
    gpu: G,
    formats: ModelFormats,
    atlases: HashMap<String, StitchedTexture>,
    standalone: HashMap<String, StandaloneTexture>,
    models: HashMap<String, Model>,
    binding: Option<Binding>,
}

impl<G: GpuBackend> ResourceCache<G> {
    /// Cache over `paths` with the built-in model formats
    pub fn new(paths: ResourcePaths, gpu: G) -> Self {
        Self::with_formats(paths, gpu, ModelFormats::with_defaults())
    }

    pub fn with_formats(paths: ResourcePaths, gpu: G, formats: ModelFormats) -> Self {
        Self {
            paths,
            gpu,
            formats,
            atlases: HashMap::new(),
            standalone: HashMap::new(),
            models: HashMap::new(),
            binding: None,
        }
    }

    pub fn paths(&self) -> &ResourcePaths {
        &self.paths
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    pub fn formats_mut(&mut self) -> &mut ModelFormats {
        &mut self.formats
    }

    /// Load the persisted atlas `name` from the stitched directory.
    ///
    /// Returns `Ok(false)` if it is already cached. On any error nothing is
    /// inserted and no GPU handle is left behind.
    pub fn load_atlas(&mut self, name: &str) -> Result<bool> {
        if self.atlases.contains_key(name) {
            return Ok(false);
        }

        let image_path = self.paths.atlas_image(name);
        let info_path = self.paths.atlas_info(name);
        for path in [&image_path, &info_path] {
            if !path.is_file() {
                return Err(StitchError::NotFound {
                    name: name.to_string(),
                    path: path.clone(),
                });
            }
        }

        let info = read_info(&info_path)?;
        let image = decode_image(&image_path)?;
        if image.dimensions() != (info.width, info.height) {
            return Err(StitchError::format(
                &image_path,
                0,
                format!(
                    "image size {}x{} does not match {}x{} in {}",
                    image.width(),
                    image.height(),
                    info.width,
                    info.height,
                    info_path.display()
                ),
            ));
        }

        self.insert_atlas(name, &image, info)
    }

    /// Upload an atlas already in memory, as produced by the content scan.
    pub fn insert_atlas(&mut self, name: &str, image: &RgbaImage, info: AtlasInfo) -> Result<bool> {
        if self.atlases.contains_key(name) {
            return Ok(false);
        }

        let handle = self.gpu.upload(image)?;
        info!(
            "Loaded {} atlas {} ({}x{}, {} entries)",
            info.kind.as_str(),
            name,
            info.width,
            info.height,
            info.len()
        );
        self.atlases
            .insert(name.to_string(), StitchedTexture { info, handle });
        Ok(true)
    }

    /// Load a single image from `path` as standalone texture `name`
    pub fn load_standalone(&mut self, name: &str, path: &Path) -> Result<bool> {
        if self.standalone.contains_key(name) {
            return Ok(false);
        }
        if !path.is_file() {
            return Err(StitchError::NotFound {
                name: name.to_string(),
                path: path.to_path_buf(),
            });
        }
        let image = decode_image(path)?;
        self.insert_standalone(name, &image)
    }

    pub fn insert_standalone(&mut self, name: &str, image: &RgbaImage) -> Result<bool> {
        if self.standalone.contains_key(name) {
            return Ok(false);
        }

        let handle = self.gpu.upload(image)?;
        debug!("Loaded texture {} ({}x{})", name, image.width(), image.height());
        self.standalone.insert(
            name.to_string(),
            StandaloneTexture {
                handle,
                width: image.width(),
                height: image.height(),
            },
        );
        Ok(true)
    }

    /// Load model `name` (`ns:...:file.ext`) with the loader for its extension
    /// and the texture stored next to it under `textures/models`.
    pub fn load_model(&mut self, name: &str) -> Result<bool> {
        if self.models.contains_key(name) {
            return Ok(false);
        }

        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or_default();
        let Some(loader) = self.formats.get(extension) else {
            return Err(StitchError::UnsupportedFormat {
                extension: extension.to_string(),
            });
        };

        let model_path = self.paths.model_file(name);
        let texture_path = self.paths.model_texture(name);
        for path in [&model_path, &texture_path] {
            if !path.is_file() {
                return Err(StitchError::NotFound {
                    name: name.to_string(),
                    path: path.clone(),
                });
            }
        }

        let mesh = loader(&model_path)?;
        let image = decode_image(&texture_path)?;
        let texture = self.gpu.upload(&image)?;
        info!(
            "Loaded model {} ({} vertices, {} triangles)",
            name,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        self.models
            .insert(name.to_string(), Model { mesh, texture });
        Ok(true)
    }

    /// Make `name` the active resource.
    ///
    /// Standalone textures win over atlases of the same name; failing both,
    /// `name` selects a region of the currently bound atlas. Returns `false`
    /// for unknown names and when `name` is already active.
    pub fn bind(&mut self, name: &str) -> bool {
        let Some((binding, handle)) = self.resolve(name) else {
            debug!("bind: no resource named {}", name);
            return false;
        };
        if self.binding.as_ref() == Some(&binding) {
            return false;
        }

        if self.bound_handle() != Some(handle) {
            self.gpu.bind(handle);
        }
        self.binding = Some(binding);
        true
    }

    fn resolve(&self, name: &str) -> Option<(Binding, TextureHandle)> {
        if let Some(texture) = self.standalone.get(name) {
            return Some((Binding::Standalone(name.to_string()), texture.handle));
        }
        if let Some(atlas) = self.atlases.get(name) {
            let binding = Binding::Atlas {
                atlas: name.to_string(),
                region: None,
            };
            return Some((binding, atlas.handle));
        }

        let Some(Binding::Atlas { atlas, .. }) = &self.binding else {
            return None;
        };
        let texture = self.atlases.get(atlas)?;
        if !texture.info.contains(name) {
            return None;
        }
        let binding = Binding::Atlas {
            atlas: atlas.clone(),
            region: Some(name.to_string()),
        };
        Some((binding, texture.handle))
    }

    fn bound_handle(&self) -> Option<TextureHandle> {
        match self.binding.as_ref()? {
            Binding::Standalone(name) => self.standalone.get(name).map(|t| t.handle),
            Binding::Atlas { atlas, .. } => self.atlases.get(atlas).map(|t| t.handle),
        }
    }

    /// Bound texture and, inside an atlas, the selected region
    pub fn active(&self) -> Option<ActiveResource<'_>> {
        match self.binding.as_ref()? {
            Binding::Standalone(name) => {
                let (name, texture) = self.standalone.get_key_value(name)?;
                Some(ActiveResource {
                    name,
                    texture: Texture::Standalone(texture),
                    region: None,
                })
            }
            Binding::Atlas { atlas, region } => {
                let (name, texture) = self.atlases.get_key_value(atlas)?;
                let region = match region {
                    Some(r) => Some(texture.info.get(r)?),
                    None => None,
                };
                Some(ActiveResource {
                    name,
                    texture: Texture::stitched(texture),
                    region,
                })
            }
        }
    }

    fn active_atlas(&self) -> Option<&StitchedTexture> {
        match self.binding.as_ref()? {
            Binding::Atlas { atlas, .. } => self.atlases.get(atlas),
            Binding::Standalone(_) => None,
        }
    }

    /// Entry `name` of the bound atlas
    pub fn region(&self, name: &str) -> Option<&InfoEntry> {
        self.active_atlas()?.info.get(name)
    }

    /// UV bounds of entry `name` in the bound atlas
    pub fn uv(&self, name: &str) -> Option<UvRect> {
        self.region(name).map(|entry| entry.uv)
    }

    /// UV bounds of one animation frame; the index wraps around
    pub fn uv_frame(&self, name: &str, frame: usize) -> Option<UvRect> {
        self.region(name).map(|entry| entry.frame(frame))
    }

    /// UV bounds of the current selection, the whole texture if none
    pub fn active_uv(&self) -> Option<UvRect> {
        self.active().map(|active| active.uv())
    }

    /// Glyph metrics, only while a font atlas is bound
    pub fn glyph(&self, name: &str) -> Option<GlyphMetrics> {
        self.active_atlas()?.glyph(name)
    }

    pub fn texture(&self, name: &str) -> Option<Texture<'_>> {
        if let Some(texture) = self.standalone.get(name) {
            return Some(Texture::Standalone(texture));
        }
        self.atlases.get(name).map(Texture::stitched)
    }

    pub fn atlas(&self, name: &str) -> Option<&StitchedTexture> {
        self.atlases.get(name)
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.atlases.contains_key(name)
            || self.standalone.contains_key(name)
            || self.models.contains_key(name)
    }

    /// Number of cached entries of `kind`
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.names(kind).len()
    }

    /// Remove `name` and release its GPU handle.
    ///
    /// Atlases are looked up first, then standalone textures, then models.
    pub fn evict(&mut self, name: &str) -> bool {
        self.evict_atlas(name) || self.evict_standalone(name) || self.evict_model(name)
    }

    /// Evict every entry of `kind`, returning how many were removed
    pub fn clear_all(&mut self, kind: ResourceKind) -> usize {
        let names = self.names(kind);
        for name in &names {
            match kind {
                ResourceKind::Atlases | ResourceKind::Fonts => self.evict_atlas(name),
                ResourceKind::Standalone => self.evict_standalone(name),
                ResourceKind::Models => self.evict_model(name),
            };
        }
        if !names.is_empty() {
            debug!("Cleared {} {:?}", names.len(), kind);
        }
        names.len()
    }

    fn names(&self, kind: ResourceKind) -> Vec<String> {
        let atlases_of = |wanted: AtlasKind| -> Vec<String> {
            self.atlases
                .iter()
                .filter(|(_, t)| t.kind() == wanted)
                .map(|(name, _)| name.clone())
                .collect()
        };
        match kind {
            ResourceKind::Atlases => atlases_of(AtlasKind::Texture),
            ResourceKind::Fonts => atlases_of(AtlasKind::Font),
            ResourceKind::Standalone => self.standalone.keys().cloned().collect(),
            ResourceKind::Models => self.models.keys().cloned().collect(),
        }
    }

    fn evict_atlas(&mut self, name: &str) -> bool {
        let Some(texture) = self.atlases.remove(name) else {
            return false;
        };
        self.gpu.delete(texture.handle);
        if matches!(&self.binding, Some(Binding::Atlas { atlas, .. }) if atlas == name) {
            self.binding = None;
        }
        debug!("Evicted atlas {}", name);
        true
    }

    fn evict_standalone(&mut self, name: &str) -> bool {
        let Some(texture) = self.standalone.remove(name) else {
            return false;
        };
        self.gpu.delete(texture.handle);
        if matches!(&self.binding, Some(Binding::Standalone(bound)) if bound == name) {
            self.binding = None;
        }
        debug!("Evicted texture {}", name);
        true
    }

    fn evict_model(&mut self, name: &str) -> bool {
        let Some(model) = self.models.remove(name) else {
            return false;
        };
        self.gpu.delete(model.texture);
        debug!("Evicted model {}", name);
        true
    }

    /// Release every GPU handle and empty the cache
    pub fn shutdown(&mut self) {
        let total = self.atlases.len() + self.standalone.len() + self.models.len();
        if total == 0 {
            return;
        }

        for (_, texture) in self.atlases.drain() {
            self.gpu.delete(texture.handle);
        }
        for (_, texture) in self.standalone.drain() {
            self.gpu.delete(texture.handle);
        }
        for (_, model) in self.models.drain() {
            self.gpu.delete(model.texture);
        }
        self.binding = None;
        info!("Released {} resources", total);
    }
}

impl<G: GpuBackend> Drop for ResourceCache<G> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{Atlas, AtlasEntry};
    use crate::gpu::HeadlessGpu;
    use crate::model::Mesh;
    use crate::output::write_info;
    use crate::sprite::PackedSprite;

    fn px(x: u32, y: u32, width: u32, height: u32) -> PackedSprite {
        PackedSprite {
            x,
            y,
            width,
            height,
        }
    }

    fn info(key: &str, names: &[&str]) -> AtlasInfo {
        let mut atlas = Atlas::new(key, AtlasKind::for_key(key), 32, 16);
        for (i, name) in names.iter().enumerate() {
            let x = u32::try_from(i).unwrap() * 16;
            atlas
                .entries
                .push(AtlasEntry::still(format!("{}:{}", key, name), px(x, 0, 16, 16)));
        }
        AtlasInfo::from_atlas(&atlas)
    }

    fn persist(paths: &ResourcePaths, key: &str, names: &[&str]) {
        std::fs::create_dir_all(&paths.stitched).unwrap();
        RgbaImage::new(32, 16).save(paths.atlas_image(key)).unwrap();
        write_info(&info(key, names), &paths.atlas_info(key)).unwrap();
    }

    fn cache() -> (tempfile::TempDir, ResourceCache<HeadlessGpu>) {
        let dir = tempfile::tempdir().unwrap();
        let paths = ResourcePaths::from_root(dir.path());
        (dir, ResourceCache::new(paths, HeadlessGpu::new()))
    }

    #[test]
    fn test_load_atlas_is_idempotent() {
        let (_dir, mut cache) = cache();
        persist(cache.paths(), "icons", &["a", "b"]);

        assert!(cache.load_atlas("icons").unwrap());
        assert!(!cache.load_atlas("icons").unwrap());
        assert_eq!(cache.gpu().uploads(), 1);
        assert_eq!(cache.count(ResourceKind::Atlases), 1);
        assert!(cache.atlas("icons").unwrap().info.contains("icons:b"));
    }

    #[test]
    fn test_missing_atlas_is_not_found() {
        let (_dir, mut cache) = cache();
        let err = cache.load_atlas("ghost").unwrap_err();
        assert!(matches!(err, StitchError::NotFound { .. }));

        // Image without its record
        std::fs::create_dir_all(&cache.paths().stitched).unwrap();
        RgbaImage::new(4, 4).save(cache.paths().atlas_image("half")).unwrap();
        let err = cache.load_atlas("half").unwrap_err();
        assert!(matches!(err, StitchError::NotFound { ref path, .. } if path.ends_with("half.info")));
        assert_eq!(cache.gpu().uploads(), 0);
    }

    #[test]
    fn test_size_mismatch_is_format_error() {
        let (_dir, mut cache) = cache();
        persist(cache.paths(), "icons", &["a"]);
        RgbaImage::new(8, 8).save(cache.paths().atlas_image("icons")).unwrap();

        let err = cache.load_atlas("icons").unwrap_err();
        match err {
            StitchError::Format { path, line, message } => {
                assert!(path.ends_with("icons.png"));
                assert_eq!(line, 0);
                assert!(message.starts_with("image size 8x8"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(cache.atlas("icons").is_none());
        assert_eq!(cache.gpu().uploads(), 0);
    }

    #[test]
    fn test_failed_upload_leaves_no_entry() {
        let (_dir, mut cache) = cache();
        persist(cache.paths(), "icons", &["a"]);
        cache.gpu_mut().fail_uploads(true);

        assert!(matches!(cache.load_atlas("icons"), Err(StitchError::Upload(_))));
        assert!(!cache.contains("icons"));

        cache.gpu_mut().fail_uploads(false);
        assert!(cache.load_atlas("icons").unwrap());
    }

    #[test]
    fn test_evict_then_reload_uploads_again() {
        let (_dir, mut cache) = cache();
        persist(cache.paths(), "icons", &["a"]);
        cache.load_atlas("icons").unwrap();
        assert!(cache.bind("icons"));

        assert!(cache.evict("icons"));
        assert!(cache.active().is_none());
        assert!(!cache.bind("icons"));
        assert!(!cache.evict("icons"));
        assert_eq!(cache.gpu().live_textures(), 0);

        assert!(cache.load_atlas("icons").unwrap());
        assert_eq!(cache.gpu().uploads(), 2);
    }

    #[test]
    fn test_standalone_wins_over_atlas() {
        let (_dir, mut cache) = cache();
        cache.insert_atlas("logo", &RgbaImage::new(32, 16), info("logo", &["a"])).unwrap();
        cache.insert_standalone("logo", &RgbaImage::new(5, 7)).unwrap();

        assert!(cache.bind("logo"));
        let active = cache.active().unwrap();
        assert!(matches!(active.texture, Texture::Standalone(_)));
        assert_eq!(active.texture.size(), (5, 7));
        assert_eq!(cache.active_uv(), Some(UvRect::FULL));

        // Evicting picks the atlas first and keeps the standalone binding
        assert!(cache.evict("logo"));
        assert!(cache.atlas("logo").is_none());
        assert!(cache.active().is_some());
    }

    #[test]
    fn test_texture_view_prefers_standalone() {
        let (_dir, mut cache) = cache();
        let font_info = info("fonts:body", &["A"]);
        cache.insert_atlas("fonts:body", &RgbaImage::new(32, 16), font_info).unwrap();
        cache.insert_atlas("logo", &RgbaImage::new(32, 16), info("logo", &["a"])).unwrap();
        cache.insert_standalone("logo", &RgbaImage::new(5, 7)).unwrap();

        let logo = cache.texture("logo").unwrap();
        assert_eq!(logo.kind(), ResourceKind::Standalone);
        assert_eq!(logo.size(), (5, 7));

        let font = cache.texture("fonts:body").unwrap();
        assert_eq!(font.kind(), ResourceKind::Fonts);
        assert!(font.region("fonts:body:A").is_some());
        assert!(cache.texture("ghost").is_none());
    }

    #[test]
    fn test_bind_region_of_active_atlas() {
        let (_dir, mut cache) = cache();
        cache.insert_atlas("icons", &RgbaImage::new(32, 16), info("icons", &["a", "b"])).unwrap();

        assert!(!cache.bind("icons:b"));
        assert!(cache.bind("icons"));
        assert!(!cache.bind("icons"));
        assert!(cache.bind("icons:b"));
        assert!(!cache.bind("icons:b"));
        assert!(cache.bind("icons:a"));

        let active = cache.active().unwrap();
        assert_eq!(active.name, "icons");
        assert_eq!(active.region.unwrap().name, "icons:a");
        assert!(active.uv().approx_eq(&cache.uv("icons:a").unwrap(), 1e-6));
        assert_eq!(cache.uv("icons:a").unwrap().max_u, 0.5);

        // One GPU bind: regions share the atlas texture
        assert_eq!(cache.gpu().binds(), 1);
        assert!(!cache.bind("nothing"));
        assert_eq!(cache.active().unwrap().region.unwrap().name, "icons:a");
    }

    #[test]
    fn test_glyph_needs_bound_font() {
        let (_dir, mut cache) = cache();
        cache
            .insert_atlas("fonts:title", &RgbaImage::new(32, 16), info("fonts:title", &["A"]))
            .unwrap();
        cache.insert_atlas("icons", &RgbaImage::new(32, 16), info("icons", &["a"])).unwrap();

        assert!(cache.glyph("fonts:title:A").is_none());
        cache.bind("fonts:title");
        let glyph = cache.glyph("fonts:title:A").unwrap();
        assert_eq!((glyph.width, glyph.height), (16, 16));
        assert!(matches!(cache.active().unwrap().texture, Texture::Font(_)));

        cache.bind("icons");
        assert!(cache.glyph("icons:a").is_none());
    }

    #[test]
    fn test_clear_all_by_kind() {
        let (_dir, mut cache) = cache();
        let image = RgbaImage::new(32, 16);
        cache.insert_atlas("icons", &image, info("icons", &["a"])).unwrap();
        cache.insert_atlas("ui:button", &image, info("ui:button", &["b"])).unwrap();
        cache.insert_atlas("fonts:title", &image, info("fonts:title", &["A"])).unwrap();
        cache.insert_standalone("splash", &image).unwrap();
        cache.bind("fonts:title");

        assert_eq!(cache.clear_all(ResourceKind::Atlases), 2);
        assert_eq!(cache.count(ResourceKind::Fonts), 1);
        assert!(cache.active().is_some());

        assert_eq!(cache.clear_all(ResourceKind::Fonts), 1);
        assert!(cache.active().is_none());
        assert_eq!(cache.clear_all(ResourceKind::Fonts), 0);
        assert_eq!(cache.gpu().live_textures(), 1);
    }

    #[test]
    fn test_load_model_with_texture() {
        let (_dir, mut cache) = cache();
        let paths = cache.paths().clone();
        let model_path = paths.model_file("props:tri.obj");
        std::fs::create_dir_all(model_path.parent().unwrap()).unwrap();
        std::fs::write(&model_path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let err = cache.load_model("props:tri.obj").unwrap_err();
        assert!(matches!(err, StitchError::NotFound { .. }));

        let texture_path = paths.model_texture("props:tri.obj");
        std::fs::create_dir_all(texture_path.parent().unwrap()).unwrap();
        RgbaImage::new(2, 2).save(&texture_path).unwrap();

        assert!(cache.load_model("props:tri.obj").unwrap());
        assert!(!cache.load_model("props:tri.obj").unwrap());
        assert_eq!(cache.model("props:tri.obj").unwrap().mesh.triangle_count(), 1);

        // Models are never bound
        assert!(!cache.bind("props:tri.obj"));
        assert_eq!(cache.clear_all(ResourceKind::Models), 1);
        assert_eq!(cache.gpu().live_textures(), 0);
    }

    #[test]
    fn test_custom_model_format_through_cache() {
        let (_dir, mut cache) = cache();
        let paths = cache.paths().clone();
        let model_path = paths.model_file("ui:panel.quad");
        std::fs::create_dir_all(model_path.parent().unwrap()).unwrap();
        std::fs::write(&model_path, "2 1").unwrap();
        let texture_path = paths.model_texture("ui:panel.quad");
        std::fs::create_dir_all(texture_path.parent().unwrap()).unwrap();
        RgbaImage::new(2, 2).save(&texture_path).unwrap();

        assert!(matches!(
            cache.load_model("ui:panel.quad"),
            Err(StitchError::UnsupportedFormat { .. })
        ));

        cache.formats_mut().register(".QUAD", |path: &Path| {
            let text = std::fs::read_to_string(path).map_err(|e| StitchError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
            let size: Vec<f32> = text
                .split_whitespace()
                .map(|v| v.parse().unwrap_or_default())
                .collect();
            Ok(Mesh {
                positions: vec![
                    [0.0, 0.0, 0.0],
                    [size[0], 0.0, 0.0],
                    [size[0], size[1], 0.0],
                    [0.0, size[1], 0.0],
                ],
                indices: vec![0, 1, 2, 0, 2, 3],
                ..Mesh::default()
            })
        });

        assert!(cache.load_model("ui:panel.quad").unwrap());
        let model = cache.model("ui:panel.quad").unwrap();
        assert_eq!(model.mesh.triangle_count(), 2);
        assert_eq!(model.mesh.positions[2], [2.0, 1.0, 0.0]);
        assert_eq!(cache.gpu().uploads(), 1);
    }

    #[test]
    fn test_unknown_model_extension() {
        let (_dir, mut cache) = cache();
        let err = cache.load_model("props:tree.fbx").unwrap_err();
        assert!(matches!(err, StitchError::UnsupportedFormat { ref extension } if extension == "fbx"));
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let (_dir, mut cache) = cache();
        let image = RgbaImage::new(32, 16);
        cache.insert_atlas("icons", &image, info("icons", &["a"])).unwrap();
        cache.insert_standalone("splash", &image).unwrap();
        cache.bind("splash");

        cache.shutdown();
        assert_eq!(cache.gpu().live_textures(), 0);
        assert_eq!(cache.gpu().deletes(), 2);
        assert!(cache.active().is_none());
        assert!(!cache.contains("icons"));
    }
}
