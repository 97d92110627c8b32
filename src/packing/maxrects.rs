use super::Rect;
use crate::cli::PackingHeuristic;

/// MaxRects bin packer over a fixed-size canvas
pub struct MaxRectsPacker {
    bin_width: u32,
    bin_height: u32,
    free_rects: Vec<Rect>,
    used_rects: Vec<Rect>,
}

impl MaxRectsPacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bin_width: width,
            bin_height: height,
            free_rects: vec![Rect::new(0, 0, width, height)],
            used_rects: Vec::new(),
        }
    }

    /// Try to insert a rectangle with the given dimensions.
    /// Returns the placed rectangle if successful.
    pub fn insert(&mut self, width: u32, height: u32, heuristic: PackingHeuristic) -> Option<Rect> {
        if width == 0 || height == 0 {
            return None;
        }
        let best_rect = self.find_position(width, height, heuristic)?;
        self.place_rect(best_rect);
        Some(best_rect)
    }

    /// Check if a rectangle of the given size can fit
    pub fn can_fit(&self, width: u32, height: u32) -> bool {
        self.free_rects
            .iter()
            .any(|r| width <= r.width && height <= r.height)
    }

    fn find_position(&self, width: u32, height: u32, heuristic: PackingHeuristic) -> Option<Rect> {
        let mut best_score = (i64::MAX, i64::MAX);
        let mut best_rect = None;

        for free_rect in &self.free_rects {
            if width <= free_rect.width && height <= free_rect.height {
                let candidate = Rect::new(free_rect.x, free_rect.y, width, height);
                let score = self.score_rect(free_rect, &candidate, heuristic);
                if score < best_score {
                    best_score = score;
                    best_rect = Some(candidate);
                }
            }
        }

        best_rect
    }

    fn score_rect(&self, free_rect: &Rect, candidate: &Rect, heuristic: PackingHeuristic) -> (i64, i64) {
        let leftover_h = i64::from(free_rect.width - candidate.width);
        let leftover_v = i64::from(free_rect.height - candidate.height);
        let short = leftover_h.min(leftover_v);
        let long = leftover_h.max(leftover_v);

        match heuristic {
            PackingHeuristic::BestShortSideFit | PackingHeuristic::Best => (short, long),
            PackingHeuristic::BestLongSideFit => (long, short),
            PackingHeuristic::BestAreaFit => (free_rect.area() as i64 - candidate.area() as i64, short),
            PackingHeuristic::BottomLeft => (i64::from(candidate.bottom()), i64::from(candidate.x)),
            // More contact is better, so negate to keep "lower wins"
            PackingHeuristic::ContactPoint => (-i64::from(self.contact_score(candidate)), short),
        }
    }

    /// Total edge length shared with the canvas border and already placed rectangles
    fn contact_score(&self, candidate: &Rect) -> u32 {
        let mut score = 0;

        if candidate.x == 0 || candidate.right() == self.bin_width {
            score += candidate.height;
        }
        if candidate.y == 0 || candidate.bottom() == self.bin_height {
            score += candidate.width;
        }

        for used in &self.used_rects {
            if used.x == candidate.right() || used.right() == candidate.x {
                score += Rect::overlap_len(candidate.y, candidate.bottom(), used.y, used.bottom());
            }
            if used.y == candidate.bottom() || used.bottom() == candidate.y {
                score += Rect::overlap_len(candidate.x, candidate.right(), used.x, used.right());
            }
        }

        score
    }

    fn place_rect(&mut self, rect: Rect) {
        let mut new_rects = Vec::new();

        self.free_rects.retain(|free_rect| {
            if !rect.intersects(free_rect) {
                return true;
            }

            // Split the free rectangle around the placed one
            if rect.x > free_rect.x {
                new_rects.push(Rect::new(
                    free_rect.x,
                    free_rect.y,
                    rect.x - free_rect.x,
                    free_rect.height,
                ));
            }

            if rect.right() < free_rect.right() {
                new_rects.push(Rect::new(
                    rect.right(),
                    free_rect.y,
                    free_rect.right() - rect.right(),
                    free_rect.height,
                ));
            }

            if rect.y > free_rect.y {
                new_rects.push(Rect::new(
                    free_rect.x,
                    free_rect.y,
                    free_rect.width,
                    rect.y - free_rect.y,
                ));
            }

            if rect.bottom() < free_rect.bottom() {
                new_rects.push(Rect::new(
                    free_rect.x,
                    rect.bottom(),
                    free_rect.width,
                    free_rect.bottom() - rect.bottom(),
                ));
            }

            false
        });

        self.free_rects.extend(new_rects);
        self.prune_free_rects();
        self.used_rects.push(rect);
    }

    fn prune_free_rects(&mut self) {
        // Drop free rectangles fully contained within others
        let mut i = 0;
        while i < self.free_rects.len() {
            let mut j = i + 1;
            while j < self.free_rects.len() {
                if self.free_rects[i].contains(&self.free_rects[j]) {
                    self.free_rects.swap_remove(j);
                } else if self.free_rects[j].contains(&self.free_rects[i]) {
                    self.free_rects.swap_remove(i);
                    j = i + 1;
                    continue;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }

    /// Placed rectangles, in insertion order
    pub fn used_rects(&self) -> &[Rect] {
        &self.used_rects
    }

    /// Fraction of the canvas covered by placed rectangles (0.0 to 1.0)
    pub fn occupancy(&self) -> f64 {
        let total_area = u64::from(self.bin_width) * u64::from(self.bin_height);
        if total_area == 0 {
            return 0.0;
        }
        let used_area: u64 = self.used_rects.iter().map(Rect::area).sum();
        used_area as f64 / total_area as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONCRETE: [PackingHeuristic; 5] = [
        PackingHeuristic::BestShortSideFit,
        PackingHeuristic::BestLongSideFit,
        PackingHeuristic::BestAreaFit,
        PackingHeuristic::BottomLeft,
        PackingHeuristic::ContactPoint,
    ];

    #[test]
    fn test_single_insert() {
        let mut packer = MaxRectsPacker::new(64, 64);
        let rect = packer
            .insert(16, 16, PackingHeuristic::BestShortSideFit)
            .unwrap();

        assert_eq!(rect, Rect::new(0, 0, 16, 16));
    }

    #[test]
    fn test_four_quadrants_fill_the_bin() {
        for heuristic in CONCRETE {
            let mut packer = MaxRectsPacker::new(32, 32);
            let placed: Vec<_> = (0..4).map(|_| packer.insert(16, 16, heuristic).unwrap()).collect();

            for (i, a) in placed.iter().enumerate() {
                assert!(a.fits_in(32, 32));
                for b in &placed[i + 1..] {
                    assert!(!a.intersects(b), "{:?}: {:?} overlaps {:?}", heuristic, a, b);
                }
            }
            assert!((packer.occupancy() - 1.0).abs() < f64::EPSILON);
            assert!(!packer.can_fit(1, 1));
        }
    }

    #[test]
    fn test_too_large() {
        let mut packer = MaxRectsPacker::new(32, 32);
        assert!(packer.insert(33, 8, PackingHeuristic::BottomLeft).is_none());
        assert!(packer.used_rects().is_empty());
    }

    #[test]
    fn test_zero_sized_rect_is_rejected() {
        let mut packer = MaxRectsPacker::new(32, 32);
        assert!(packer.insert(0, 8, PackingHeuristic::BestAreaFit).is_none());
    }

    #[test]
    fn test_contact_point_hugs_placed_rect() {
        let mut packer = MaxRectsPacker::new(64, 64);
        packer.insert(16, 16, PackingHeuristic::ContactPoint).unwrap();
        let second = packer.insert(16, 16, PackingHeuristic::ContactPoint).unwrap();

        // Must touch the first rectangle and a canvas border
        assert!(second == Rect::new(16, 0, 16, 16) || second == Rect::new(0, 16, 16, 16));
    }

    #[test]
    fn test_occupancy_is_used_area() {
        let mut packer = MaxRectsPacker::new(100, 100);
        packer.insert(50, 50, PackingHeuristic::BestShortSideFit).unwrap();
        assert!((packer.occupancy() - 0.25).abs() < 1e-9);
    }
}
