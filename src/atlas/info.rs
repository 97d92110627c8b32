use std::collections::HashMap;

use serde::Serialize;

use super::{Atlas, AtlasEntry, AtlasKind};
use crate::sprite::PackedSprite;

/// Texture coordinates of a region, normalized to `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct UvRect {
    pub min_u: f32,
    pub max_u: f32,
    pub min_v: f32,
    pub max_v: f32,
}

impl UvRect {
    pub const FULL: UvRect = UvRect {
        min_u: 0.0,
        max_u: 1.0,
        min_v: 0.0,
        max_v: 1.0,
    };

    /// Normalize a pixel rectangle against the atlas dimensions
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_pixels(rect: &PackedSprite, atlas_width: u32, atlas_height: u32) -> Self {
        let w = f64::from(atlas_width.max(1));
        let h = f64::from(atlas_height.max(1));
        Self {
            min_u: (f64::from(rect.x) / w) as f32,
            max_u: (f64::from(rect.x + rect.width) / w) as f32,
            min_v: (f64::from(rect.y) / h) as f32,
            max_v: (f64::from(rect.y + rect.height) / h) as f32,
        }
    }

    /// Recover the pixel rectangle this UV rectangle was made from
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_pixels(&self, atlas_width: u32, atlas_height: u32) -> PackedSprite {
        let w = f64::from(atlas_width);
        let h = f64::from(atlas_height);
        let x0 = (f64::from(self.min_u) * w).round().max(0.0) as u32;
        let x1 = (f64::from(self.max_u) * w).round().max(0.0) as u32;
        let y0 = (f64::from(self.min_v) * h).round().max(0.0) as u32;
        let y1 = (f64::from(self.max_v) * h).round().max(0.0) as u32;
        PackedSprite {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    /// Map a local `(u, v)` in `[0, 1]` into this region
    pub fn lerp(&self, u: f32, v: f32) -> (f32, f32) {
        (
            self.min_u + (self.max_u - self.min_u) * u,
            self.min_v + (self.max_v - self.min_v) * v,
        )
    }

    pub fn approx_eq(&self, other: &UvRect, tolerance: f32) -> bool {
        (self.min_u - other.min_u).abs() <= tolerance
            && (self.max_u - other.max_u).abs() <= tolerance
            && (self.min_v - other.min_v).abs() <= tolerance
            && (self.max_v - other.max_v).abs() <= tolerance
    }
}

/// One named region as persisted in an info record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoEntry {
    pub name: String,
    pub uv: UvRect,
    /// Per-frame UVs for animated entries
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<UvRect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_duration_ms: Option<u32>,
}

impl InfoEntry {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// UV of animation frame `index`; still entries answer frame 0 with their own UV.
    /// Indices past the end wrap around so callers can pass a running tick.
    pub fn frame(&self, index: usize) -> UvRect {
        if self.frames.is_empty() {
            self.uv
        } else {
            self.frames[index % self.frames.len()]
        }
    }
}

/// Serializable description of a stitched atlas: size, kind and named UV regions
#[derive(Debug, Clone, Serialize)]
pub struct AtlasInfo {
    pub width: u32,
    pub height: u32,
    pub kind: AtlasKind,
    entries: Vec<InfoEntry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl AtlasInfo {
    pub fn new(width: u32, height: u32, kind: AtlasKind, entries: Vec<InfoEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();
        Self {
            width,
            height,
            kind,
            entries,
            index,
        }
    }

    pub fn from_atlas(atlas: &Atlas) -> Self {
        let entries = atlas
            .entries
            .iter()
            .map(|entry| info_entry(entry, atlas.width, atlas.height))
            .collect();
        Self::new(atlas.width, atlas.height, atlas.kind, entries)
    }

    pub fn entries(&self) -> &[InfoEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&InfoEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pixel rectangle of an entry, recovered from its UVs
    pub fn pixel_rect(&self, name: &str) -> Option<PackedSprite> {
        self.get(name).map(|e| e.uv.to_pixels(self.width, self.height))
    }
}

impl PartialEq for AtlasInfo {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.kind == other.kind
            && self.entries == other.entries
    }
}

fn info_entry(entry: &AtlasEntry, width: u32, height: u32) -> InfoEntry {
    InfoEntry {
        name: entry.name.clone(),
        uv: UvRect::from_pixels(&entry.rect, width, height),
        frames: entry
            .frames
            .iter()
            .map(|f| UvRect::from_pixels(f, width, height))
            .collect(),
        frame_duration_ms: entry.frame_duration_ms,
    }
}
