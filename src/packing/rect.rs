/// An axis-aligned pixel rectangle inside an atlas canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Check if this rectangle intersects with another
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Check if this rectangle fully contains another
    pub fn contains(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// Check that the rectangle lies inside a `width` x `height` canvas
    pub fn fits_in(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }

    /// Length of the shared edge segment between `[a0, a1)` and `[b0, b1)`
    pub(crate) fn overlap_len(a0: u32, a1: u32, b0: u32, b1: u32) -> u32 {
        a1.min(b1).saturating_sub(a0.max(b0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects() {
        let a = Rect::new(0, 0, 16, 16);
        let b = Rect::new(8, 8, 16, 16);
        let c = Rect::new(32, 0, 16, 16);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0, 0, 16, 16);
        let b = Rect::new(16, 0, 16, 16);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_contains_and_fits() {
        let outer = Rect::new(0, 0, 32, 32);
        let inner = Rect::new(4, 4, 8, 8);
        let partial = Rect::new(24, 24, 16, 16);

        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&partial));
        assert!(inner.fits_in(12, 12));
        assert!(!partial.fits_in(32, 32));
    }

    #[test]
    fn test_overlap_len() {
        assert_eq!(Rect::overlap_len(0, 10, 5, 20), 5);
        assert_eq!(Rect::overlap_len(0, 10, 10, 20), 0);
    }
}
