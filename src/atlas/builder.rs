use std::collections::{HashMap, HashSet};
use std::path::Path;

use image::{RgbaImage, imageops};
use log::{debug, info};

use super::animation::{AnimationSet, FrameSource};
use super::{Atlas, AtlasEntry, AtlasKind, qualify};
use crate::cli::PackingHeuristic;
use crate::error::{Result, StitchError};
use crate::packing::{MaxRectsPacker, Rect};
use crate::sprite::{PackedSprite, SourceSprite};

/// All concrete heuristics to try when using "Best" mode
const ALL_HEURISTICS: [PackingHeuristic; 5] = [
    PackingHeuristic::BestShortSideFit,
    PackingHeuristic::BestLongSideFit,
    PackingHeuristic::BestAreaFit,
    PackingHeuristic::BottomLeft,
    PackingHeuristic::ContactPoint,
];

/// Largest canvas side an atlas may grow to by default
pub const DEFAULT_MAX_SIZE: u32 = 16384;

/// Configuration for atlas building
#[derive(Debug, Clone)]
pub struct AtlasBuilder {
    pub max_size: u32,
    pub padding: u32,
    pub heuristic: PackingHeuristic,
    pub power_of_two: bool,
    pub extrude: u32,
}

/// An entry waiting for its images to be placed
struct PlannedEntry {
    name: String,
    /// Indices into the packed image list; more than one for animations
    images: Vec<usize>,
    frame_duration_ms: Option<u32>,
}

/// Images to place, plus how placements map back to named entries
struct PackPlan {
    images: Vec<SourceSprite>,
    entries: Vec<PlannedEntry>,
}

/// Result of packing every image onto one canvas size
struct PackingLayout {
    /// Content rectangle per image, index-aligned with the plan's images
    rects: Vec<Rect>,
    max_x: u32,
    max_y: u32,
    occupancy: f64,
}

impl PackingLayout {
    /// Returns true if this layout is better than another.
    /// Priority: 1) smaller used area, 2) higher occupancy.
    fn is_better_than(&self, other: &PackingLayout) -> bool {
        let self_area = u64::from(self.max_x) * u64::from(self.max_y);
        let other_area = u64::from(other.max_x) * u64::from(other.max_y);

        if self_area != other_area {
            return self_area < other_area;
        }

        self.occupancy > other.occupancy
    }
}

impl Default for AtlasBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AtlasBuilder {
    pub fn new() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            padding: 0,
            heuristic: PackingHeuristic::BestShortSideFit,
            power_of_two: false,
            extrude: 0,
        }
    }

    pub fn max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    pub fn padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub fn heuristic(mut self, heuristic: PackingHeuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn power_of_two(mut self, pot: bool) -> Self {
        self.power_of_two = pot;
        self
    }

    pub fn extrude(mut self, extrude: u32) -> Self {
        self.extrude = extrude;
        self
    }

    /// Pack `sprites` into one atlas keyed `key`.
    ///
    /// Returns `Ok(None)` when there is nothing to pack. Entry names are
    /// `key:<file stem>`; animations from `animations` become one entry each
    /// and swallow the images they reference.
    pub fn build(
        &self,
        key: &str,
        sprites: Vec<SourceSprite>,
        animations: Option<&AnimationSet>,
    ) -> Result<Option<Atlas>> {
        if sprites.is_empty() {
            return Ok(None);
        }

        let plan = plan_entries(key, sprites, animations)?;
        let layout = self.find_layout(key, &plan.images)?;
        let atlas = self.apply_layout(key, plan, layout);

        info!(
            "Atlas {}: {}x{} with {} entries ({:.1}% efficiency)",
            atlas.key,
            atlas.width,
            atlas.height,
            atlas.entries.len(),
            atlas.occupancy * 100.0,
        );

        Ok(Some(atlas))
    }

    fn margin(&self) -> u32 {
        self.padding + self.extrude
    }

    fn padded_size(&self, sprite: &SourceSprite) -> (u32, u32) {
        (
            sprite.width() + self.margin() * 2,
            sprite.height() + self.margin() * 2,
        )
    }

    /// Grow the canvas from a first guess until every image fits
    fn find_layout(&self, key: &str, images: &[SourceSprite]) -> Result<PackingLayout> {
        let mut widest = 1;
        let mut tallest = 1;
        let mut total_area = 0u64;

        for sprite in images {
            let (w, h) = self.padded_size(sprite);
            if w > self.max_size || h > self.max_size {
                return Err(StitchError::SpriteTooLarge {
                    name: qualify(key, &sprite.name),
                    width: sprite.width(),
                    height: sprite.height(),
                    max_size: self.max_size,
                });
            }
            widest = widest.max(w);
            tallest = tallest.max(h);
            total_area += u64::from(w) * u64::from(h);
        }

        let area_side = u32::try_from(total_area.isqrt()).unwrap_or(u32::MAX);
        let side = next_power_of_two(widest.max(tallest).max(area_side));
        let (mut width, mut height) = (side.min(self.max_size), side.min(self.max_size));

        // Larger images first packs tighter; stable sort keeps file order on ties
        let mut order: Vec<usize> = (0..images.len()).collect();
        order.sort_by(|&a, &b| {
            let area_a = u64::from(images[a].width()) * u64::from(images[a].height());
            let area_b = u64::from(images[b].width()) * u64::from(images[b].height());
            area_b.cmp(&area_a)
        });

        loop {
            if let Some(layout) = self.pack_canvas(images, &order, width, height) {
                return Ok(layout);
            }

            debug!("{} does not fit in {}x{}, growing canvas", key, width, height);
            if width <= height && width < self.max_size {
                width = width.saturating_mul(2).min(self.max_size);
            } else if height < self.max_size {
                height = height.saturating_mul(2).min(self.max_size);
            } else if width < self.max_size {
                width = width.saturating_mul(2).min(self.max_size);
            } else {
                return Err(StitchError::AtlasOverflow {
                    key: key.to_string(),
                    max_size: self.max_size,
                });
            }
        }
    }

    /// Best layout on a fixed canvas, or `None` if some image does not fit
    fn pack_canvas(
        &self,
        images: &[SourceSprite],
        order: &[usize],
        width: u32,
        height: u32,
    ) -> Option<PackingLayout> {
        let heuristics: &[PackingHeuristic] = if self.heuristic == PackingHeuristic::Best {
            &ALL_HEURISTICS
        } else {
            std::slice::from_ref(&self.heuristic)
        };

        let mut best: Option<PackingLayout> = None;
        for &heuristic in heuristics {
            let Some(layout) = self.try_pack(images, order, width, height, heuristic) else {
                continue;
            };

            debug!(
                "Heuristic {:?} on {}x{}: used {}x{}, occupancy {:.1}%",
                heuristic,
                width,
                height,
                layout.max_x,
                layout.max_y,
                layout.occupancy * 100.0
            );

            let dominated = best.as_ref().is_some_and(|b| !layout.is_better_than(b));
            if !dominated {
                best = Some(layout);
            }
        }

        best
    }

    fn try_pack(
        &self,
        images: &[SourceSprite],
        order: &[usize],
        width: u32,
        height: u32,
        heuristic: PackingHeuristic,
    ) -> Option<PackingLayout> {
        let mut packer = MaxRectsPacker::new(width, height);
        let mut rects = vec![Rect::default(); images.len()];
        let mut max_x = 0u32;
        let mut max_y = 0u32;
        let mut used_area = 0u64;

        for &i in order {
            let sprite = &images[i];
            let (padded_w, padded_h) = self.padded_size(sprite);
            let slot = packer.insert(padded_w, padded_h, heuristic)?;

            rects[i] = Rect::new(
                slot.x + self.margin(),
                slot.y + self.margin(),
                sprite.width(),
                sprite.height(),
            );
            max_x = max_x.max(slot.right());
            max_y = max_y.max(slot.bottom());
            used_area += slot.area();
        }

        let occupancy = used_area as f64 / (u64::from(max_x) * u64::from(max_y)).max(1) as f64;
        Some(PackingLayout {
            rects,
            max_x,
            max_y,
            occupancy,
        })
    }

    /// Render the chosen layout and resolve entry rectangles
    fn apply_layout(&self, key: &str, plan: PackPlan, layout: PackingLayout) -> Atlas {
        let (final_width, final_height) = if self.power_of_two {
            (
                next_power_of_two(layout.max_x),
                next_power_of_two(layout.max_y),
            )
        } else {
            (layout.max_x, layout.max_y)
        };

        let mut atlas = Atlas::new(key, AtlasKind::for_key(key), final_width, final_height);
        let used: u64 = layout.rects.iter().map(Rect::area).sum();
        atlas.occupancy =
            used as f64 / (u64::from(final_width) * u64::from(final_height)).max(1) as f64;

        for (sprite, rect) in plan.images.iter().zip(&layout.rects) {
            if self.extrude > 0 {
                self.extrude_image(&mut atlas.image, &sprite.image, rect.x, rect.y);
            }
            imageops::overlay(
                &mut atlas.image,
                &sprite.image,
                i64::from(rect.x),
                i64::from(rect.y),
            );
        }

        for planned in plan.entries {
            let mut rects = planned
                .images
                .iter()
                .map(|&i| PackedSprite::from(layout.rects[i]));

            let entry = if planned.frame_duration_ms.is_some() {
                let frames: Vec<_> = rects.collect();
                AtlasEntry {
                    name: planned.name,
                    rect: frames.first().copied().unwrap_or_default(),
                    frames,
                    frame_duration_ms: planned.frame_duration_ms,
                }
            } else {
                AtlasEntry::still(planned.name, rects.next().unwrap_or_default())
            };
            atlas.entries.push(entry);
        }

        atlas
    }

    fn extrude_image(&self, atlas: &mut RgbaImage, img: &RgbaImage, x: u32, y: u32) {
        let (w, h) = img.dimensions();

        for e in 1..=self.extrude {
            for sx in 0..w {
                atlas.put_pixel(x + sx, y - e, *img.get_pixel(sx, 0));
                atlas.put_pixel(x + sx, y + h - 1 + e, *img.get_pixel(sx, h - 1));
            }

            for sy in 0..h {
                atlas.put_pixel(x - e, y + sy, *img.get_pixel(0, sy));
                atlas.put_pixel(x + w - 1 + e, y + sy, *img.get_pixel(w - 1, sy));
            }

            // Corners
            for c in 1..=self.extrude {
                atlas.put_pixel(x - e, y - c, *img.get_pixel(0, 0));
                atlas.put_pixel(x + w - 1 + e, y - c, *img.get_pixel(w - 1, 0));
                atlas.put_pixel(x - e, y + h - 1 + c, *img.get_pixel(0, h - 1));
                atlas.put_pixel(x + w - 1 + e, y + h - 1 + c, *img.get_pixel(w - 1, h - 1));
            }
        }
    }
}

/// Resolve animations against the directory's images and list every entry.
///
/// Still images come first in file order, then animations in descriptor order.
/// Images only reachable through a strip are not packed themselves.
fn plan_entries(
    key: &str,
    sprites: Vec<SourceSprite>,
    animations: Option<&AnimationSet>,
) -> Result<PackPlan> {
    let mut by_name: HashMap<String, usize> = HashMap::with_capacity(sprites.len());
    for (i, sprite) in sprites.iter().enumerate() {
        if let Some(&first) = by_name.get(&sprite.name) {
            return Err(StitchError::format(
                &sprite.path,
                0,
                format!(
                    "'{}' and '{}' both map to '{}'",
                    sprites[first].path.display(),
                    sprite.path.display(),
                    sprite.name
                ),
            ));
        }
        by_name.insert(sprite.name.clone(), i);
    }

    let (descriptor, specs) = match animations {
        Some(set) => (set.path.as_path(), set.specs.as_slice()),
        None => (Path::new(""), &[][..]),
    };
    let fail = |line: usize, message: String| StitchError::format(descriptor, line, message);

    let mut consumed = vec![false; sprites.len()];
    let mut referenced = vec![false; sprites.len()];
    let mut cells: Vec<SourceSprite> = Vec::new();
    let mut animated: Vec<(PlannedEntry, usize)> = Vec::new();

    for spec in specs {
        let lookup = |file: &str| {
            by_name.get(file).copied().ok_or_else(|| {
                fail(
                    spec.line,
                    format!("animation '{}' references missing image '{}'", spec.name, file),
                )
            })
        };

        let images = match &spec.source {
            FrameSource::Frames(files) => {
                let mut indices = Vec::with_capacity(files.len());
                for file in files {
                    let i = lookup(file)?;
                    consumed[i] = true;
                    referenced[i] = true;
                    indices.push(i);
                }
                indices
            }
            FrameSource::Strip {
                file,
                cell_width,
                cell_height,
            } => {
                let i = lookup(file)?;
                consumed[i] = true;
                let source = &sprites[i];
                let (w, h) = (source.width(), source.height());
                if w % cell_width != 0 || h % cell_height != 0 || *cell_width > w || *cell_height > h {
                    return Err(fail(
                        spec.line,
                        format!(
                            "{}x{} cells do not divide '{}' ({}x{})",
                            cell_width, cell_height, file, w, h
                        ),
                    ));
                }

                let mut indices = Vec::new();
                for row in 0..h / cell_height {
                    for col in 0..w / cell_width {
                        let cell = imageops::crop_imm(
                            &source.image,
                            col * cell_width,
                            row * cell_height,
                            *cell_width,
                            *cell_height,
                        )
                        .to_image();
                        indices.push(sprites.len() + cells.len());
                        cells.push(SourceSprite {
                            path: source.path.clone(),
                            name: format!("{}#{}", spec.name, indices.len() - 1),
                            image: cell,
                        });
                    }
                }
                indices
            }
        };

        animated.push((
            PlannedEntry {
                name: qualify(key, &spec.name),
                images,
                frame_duration_ms: Some(spec.frame_duration_ms),
            },
            spec.line,
        ));
    }

    let mut entries: Vec<PlannedEntry> = sprites
        .iter()
        .enumerate()
        .filter(|(i, _)| !consumed[*i])
        .map(|(i, s)| PlannedEntry {
            name: qualify(key, &s.name),
            images: vec![i],
            frame_duration_ms: None,
        })
        .collect();

    let mut names: HashSet<String> = entries.iter().map(|e| e.name.clone()).collect();
    for (entry, line) in animated {
        if !names.insert(entry.name.clone()) {
            return Err(fail(
                line,
                format!("animation name '{}' collides with an image", entry.name),
            ));
        }
        entries.push(entry);
    }

    // Compact: drop images nothing refers to and renumber
    let keep: Vec<bool> = (0..sprites.len())
        .map(|i| !consumed[i] || referenced[i])
        .chain(std::iter::repeat_n(true, cells.len()))
        .collect();
    let mut remap = vec![usize::MAX; keep.len()];
    let mut images = Vec::with_capacity(keep.len());
    for (i, sprite) in sprites.into_iter().chain(cells).enumerate() {
        if keep[i] {
            remap[i] = images.len();
            images.push(sprite);
        }
    }
    for entry in &mut entries {
        for i in &mut entry.images {
            *i = remap[*i];
        }
    }

    Ok(PackPlan { images, entries })
}

fn next_power_of_two(n: u32) -> u32 {
    if n == 0 {
        return 1;
    }
    let mut v = n - 1;
    v |= v >> 1;
    v |= v >> 2;
    v |= v >> 4;
    v |= v >> 8;
    v |= v >> 16;
    v + 1
}
