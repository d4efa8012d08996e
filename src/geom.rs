/// Axis-aligned rectangle in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Shrink the rect inward by `dx` on both horizontal sides and `dy` on
    /// both vertical sides.
    pub fn deflate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w - 2.0 * dx, self.h - 2.0 * dy)
    }

    /// Shrink the rect inward by per-edge amounts (horizontal is symmetric).
    pub fn inset(&self, dx: f64, top: f64, bottom: f64) -> Rect {
        Rect::new(
            self.x + dx,
            self.y + top,
            self.w - 2.0 * dx,
            self.h - top - bottom,
        )
    }

    /// Horizontal interval overlap, inclusive at the edges:
    /// `!(a.right < b.left || a.left > b.right)`.
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        !(self.right() < other.x || self.x > other.right())
    }

    /// Strict AABB intersection (touching edges do not count).
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deflate_shrinks_all_sides() {
        let r = Rect::new(10.0, 20.0, 100.0, 60.0).deflate(5.0, 10.0);
        assert_eq!(r, Rect::new(15.0, 30.0, 90.0, 40.0));
    }

    #[test]
    fn test_inset_asymmetric_vertical() {
        let r = Rect::new(0.0, 0.0, 60.0, 60.0).inset(6.0, 6.0, 1.2);
        assert_eq!(r.x, 6.0);
        assert_eq!(r.y, 6.0);
        assert_eq!(r.w, 48.0);
        assert!((r.h - 52.8).abs() < 1e-9);
    }

    #[test]
    fn test_overlap_x_is_inclusive_at_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        let apart = Rect::new(10.5, 0.0, 10.0, 10.0);
        assert!(a.overlaps_x(&touching));
        assert!(!a.overlaps_x(&apart));
    }

    #[test]
    fn test_intersects_excludes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        let overlapping = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(!a.intersects(&touching));
        assert!(a.intersects(&overlapping));
        assert!(overlapping.intersects(&a));
    }
}
