use image::RgbaImage;
use serde::Serialize;

use crate::sprite::PackedSprite;

/// How a stitched atlas is interpreted at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AtlasKind {
    /// Opaque named regions
    Texture,
    /// Regions are glyphs; their pixel size is used for layout
    Font,
}

impl AtlasKind {
    /// Reserved namespace whose atlases are fonts
    pub const FONT_NAMESPACE: &'static str = "fonts";

    /// Derive the kind from a namespaced key such as `fonts:title`
    pub fn for_key(key: &str) -> Self {
        let first = key.split(super::NAMESPACE_SEPARATOR).next().unwrap_or_default();
        if first == Self::FONT_NAMESPACE {
            AtlasKind::Font
        } else {
            AtlasKind::Texture
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AtlasKind::Texture => "texture",
            AtlasKind::Font => "font",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "texture" => Some(AtlasKind::Texture),
            "font" => Some(AtlasKind::Font),
            _ => None,
        }
    }
}

/// A named region of a stitched atlas, in pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasEntry {
    /// Namespaced logical name (`icons:a`)
    pub name: String,
    /// Region of the first (or only) frame
    pub rect: PackedSprite,
    /// Animation frames in playback order; empty for still images
    pub frames: Vec<PackedSprite>,
    /// Milliseconds per frame for animated entries
    pub frame_duration_ms: Option<u32>,
}

impl AtlasEntry {
    pub fn still(name: impl Into<String>, rect: PackedSprite) -> Self {
        Self {
            name: name.into(),
            rect,
            frames: Vec::new(),
            frame_duration_ms: None,
        }
    }

    pub fn is_animated(&self) -> bool {
        !self.frames.is_empty()
    }
}

/// A completed, rendered texture atlas
#[derive(Debug)]
pub struct Atlas {
    /// Namespaced key (`ui:button`)
    pub key: String,
    pub kind: AtlasKind,
    pub width: u32,
    pub height: u32,
    /// Rendered atlas image
    pub image: RgbaImage,
    /// Entries in build order
    pub entries: Vec<AtlasEntry>,
    /// Packed area divided by canvas area
    pub occupancy: f64,
}

impl Atlas {
    pub fn new(key: impl Into<String>, kind: AtlasKind, width: u32, height: u32) -> Self {
        Self {
            key: key.into(),
            kind,
            width,
            height,
            image: RgbaImage::new(width, height),
            entries: Vec::new(),
            occupancy: 0.0,
        }
    }

    pub fn entry(&self, name: &str) -> Option<&AtlasEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_for_key() {
        assert_eq!(AtlasKind::for_key("fonts:title"), AtlasKind::Font);
        assert_eq!(AtlasKind::for_key("fonts"), AtlasKind::Font);
        assert_eq!(AtlasKind::for_key("ui:button"), AtlasKind::Texture);
        assert_eq!(AtlasKind::for_key("fontsy:title"), AtlasKind::Texture);
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [AtlasKind::Texture, AtlasKind::Font] {
            assert_eq!(AtlasKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(AtlasKind::parse("sprite"), None);
    }

    #[test]
    fn test_entry_with_frames_is_animated() {
        let rect = PackedSprite {
            x: 0,
            y: 0,
            width: 8,
            height: 8,
        };
        let mut entry = AtlasEntry::still("hero:walk", rect);
        assert!(!entry.is_animated());

        entry.frames = vec![rect, PackedSprite { x: 8, ..rect }];
        entry.frame_duration_ms = Some(100);
        assert!(entry.is_animated());
    }
}
