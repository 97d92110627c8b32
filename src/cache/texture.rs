use serde::Serialize;

use crate::atlas::{AtlasInfo, AtlasKind, InfoEntry, UvRect};
use crate::gpu::TextureHandle;

/// A stitched atlas resident on the GPU
#[derive(Debug, Clone, PartialEq)]
pub struct StitchedTexture {
    pub info: AtlasInfo,
    pub handle: TextureHandle,
}

impl StitchedTexture {
    pub fn kind(&self) -> AtlasKind {
        self.info.kind
    }

    /// Pixel dimensions of the whole atlas
    pub fn size(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    /// Layout metrics for a glyph; `None` unless this is a font atlas
    pub fn glyph(&self, name: &str) -> Option<GlyphMetrics> {
        if self.kind() != AtlasKind::Font {
            return None;
        }
        let entry = self.info.get(name)?;
        let rect = entry.uv.to_pixels(self.info.width, self.info.height);
        Some(GlyphMetrics {
            width: rect.width,
            height: rect.height,
            uv: entry.uv,
        })
    }
}

/// A single image uploaded on its own, with no sub-regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandaloneTexture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

/// Size and placement of one font glyph
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlyphMetrics {
    pub width: u32,
    pub height: u32,
    pub uv: UvRect,
}

/// Borrowed view over any cached texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Texture<'a> {
    Atlas(&'a StitchedTexture),
    Font(&'a StitchedTexture),
    Standalone(&'a StandaloneTexture),
}

impl<'a> Texture<'a> {
    pub(crate) fn stitched(texture: &'a StitchedTexture) -> Self {
        match texture.kind() {
            AtlasKind::Texture => Texture::Atlas(texture),
            AtlasKind::Font => Texture::Font(texture),
        }
    }

    pub fn handle(&self) -> TextureHandle {
        match self {
            Texture::Atlas(t) | Texture::Font(t) => t.handle,
            Texture::Standalone(t) => t.handle,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        match self {
            Texture::Atlas(t) | Texture::Font(t) => t.size(),
            Texture::Standalone(t) => (t.width, t.height),
        }
    }

    /// A named region; standalone textures have none
    pub fn region(&self, name: &str) -> Option<&'a InfoEntry> {
        match self {
            Texture::Atlas(t) | Texture::Font(t) => t.info.get(name),
            Texture::Standalone(_) => None,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Texture::Atlas(_) => ResourceKind::Atlases,
            Texture::Font(_) => ResourceKind::Fonts,
            Texture::Standalone(_) => ResourceKind::Standalone,
        }
    }
}

/// Groups of cache entries that can be cleared together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Plain stitched atlases
    Atlases,
    /// Font atlases
    Fonts,
    /// Standalone textures
    Standalone,
    Models,
}

/// What the next draw call will sample from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveResource<'a> {
    pub name: &'a str,
    pub texture: Texture<'a>,
    /// Region selected inside the bound atlas, if any
    pub region: Option<&'a InfoEntry>,
}

impl ActiveResource<'_> {
    /// UV of the selected region, or the whole texture
    pub fn uv(&self) -> UvRect {
        self.region.map(|r| r.uv).unwrap_or(UvRect::FULL)
    }

    /// UV of animation frame `frame` of the selected region
    pub fn uv_frame(&self, frame: usize) -> UvRect {
        self.region.map(|r| r.frame(frame)).unwrap_or(UvRect::FULL)
    }
}
