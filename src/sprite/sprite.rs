use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::packing::Rect;

/// A decoded source image waiting to be packed
#[derive(Debug, Clone)]
pub struct SourceSprite {
    /// Original file path
    pub path: PathBuf,
    /// File stem, unique within its directory
    pub name: String,
    /// RGBA pixel data
    pub image: RgbaImage,
}

impl SourceSprite {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(format!("{}.png", name)),
            name,
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Result of placing a sprite in the atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PackedSprite {
    /// Position in atlas (x coordinate)
    pub x: u32,
    /// Position in atlas (y coordinate)
    pub y: u32,
    /// Width in atlas
    pub width: u32,
    /// Height in atlas
    pub height: u32,
}

impl PackedSprite {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

impl From<Rect> for PackedSprite {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}
