//! Screen-space geometry shared by the list views, the controller and the
//! renderer.
//!
//! These types are deliberately backend-neutral; the egui front-end converts
//! them to `Pos2` / `Rect` at the paint boundary.

use serde::{Deserialize, Serialize};

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in screen coordinates (min inclusive, max inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn from_min_max(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Build a rectangle from left/top/width/height.
    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Point::new(x, y),
            max: Point::new(x + w, y + h),
        }
    }

    pub fn left(&self) -> f32 {
        self.min.x
    }
    pub fn right(&self) -> f32 {
        self.max.x
    }
    pub fn top(&self) -> f32 {
        self.min.y
    }
    pub fn bottom(&self) -> f32 {
        self.max.y
    }
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) * 0.5, (self.min.y + self.max.y) * 0.5)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Clamp an x coordinate into `[left, right]`.
    pub fn clamp_x(&self, x: f32) -> f32 {
        x.max(self.min.x).min(self.max.x)
    }

    /// Returns true if the segment `a`-`b` touches this rectangle.
    ///
    /// Liang-Barsky clipping: the segment is parametrised as `a + t (b - a)`
    /// and `t` is narrowed against each of the four edges.
    pub fn intersects_segment(&self, a: Point, b: Point) -> bool {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let mut t0 = 0.0_f32;
        let mut t1 = 1.0_f32;
        let edges = [
            (-dx, a.x - self.min.x),
            (dx, self.max.x - a.x),
            (-dy, a.y - self.min.y),
            (dy, self.max.y - a.y),
        ];
        for (p, q) in edges {
            if p == 0.0 {
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                if t > t1 {
                    return false;
                }
                t0 = t0.max(t);
            } else {
                if t < t0 {
                    return false;
                }
                t1 = t1.min(t);
            }
        }
        t0 <= t1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_and_center() {
        let r = Rect::from_xywh(10.0, 20.0, 100.0, 50.0);
        assert!(r.contains(Point::new(10.0, 20.0)));
        assert!(r.contains(Point::new(110.0, 70.0)));
        assert!(!r.contains(Point::new(111.0, 70.0)));
        assert_eq!(r.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_segment_crossing_rect() {
        let r = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        // Both endpoints outside, segment passes straight through.
        assert!(r.intersects_segment(Point::new(-5.0, 5.0), Point::new(15.0, 5.0)));
        // Diagonal through a corner region.
        assert!(r.intersects_segment(Point::new(-5.0, -5.0), Point::new(20.0, 20.0)));
    }

    #[test]
    fn test_segment_missing_rect() {
        let r = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        assert!(!r.intersects_segment(Point::new(-5.0, 15.0), Point::new(15.0, 15.0)));
        assert!(!r.intersects_segment(Point::new(-5.0, 0.0), Point::new(0.0, -5.0 - 1.0)));
        // Vertical segment left of the rect.
        assert!(!r.intersects_segment(Point::new(-1.0, -20.0), Point::new(-1.0, 20.0)));
    }

    #[test]
    fn test_clamp_x() {
        let r = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        assert_eq!(r.clamp_x(-3.0), 0.0);
        assert_eq!(r.clamp_x(4.0), 4.0);
        assert_eq!(r.clamp_x(12.0), 10.0);
    }
}
