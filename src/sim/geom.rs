//! Axis-aligned rectangles in screen/world pixel space
//!
//! x grows to the right, y grows downward (screen convention).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rect whose bottom edge is centred on `(cx, bottom)`
    pub fn from_midbottom(cx: f32, bottom: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w / 2.0, bottom - h, w, h)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x(), self.center_y())
    }

    /// Strict overlap test (touching edges do not collide)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Grow (positive) or shrink (negative) around the centre
    pub fn inflate(&self, dw: f32, dh: f32) -> Rect {
        let w = (self.w + dw).max(0.0);
        let h = (self.h + dh).max(0.0);
        Rect::new(self.center_x() - w / 2.0, self.center_y() - h / 2.0, w, h)
    }

    /// Same rect shifted vertically (world -> screen with a camera offset)
    pub fn shifted_y(&self, dy: f32) -> Rect {
        Rect::new(self.x, self.y + dy, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_excludes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        let c = Rect::new(9.5, 9.5, 2.0, 2.0);
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn test_inflate_keeps_center() {
        let r = Rect::new(100.0, 50.0, 160.0, 160.0);
        let inset = r.inflate(-40.0, -40.0);
        assert_eq!(inset.center(), r.center());
        assert_eq!(inset.w, 120.0);
        assert_eq!(inset.right(), r.right() - 20.0);
    }

    #[test]
    fn test_midbottom() {
        let r = Rect::from_midbottom(200.0, 400.0, 48.0, 60.0);
        assert_eq!(r.center_x(), 200.0);
        assert_eq!(r.bottom(), 400.0);
        assert_eq!(r.top(), 340.0);
    }
}
