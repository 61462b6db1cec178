//! Planar geometry used by the rasterizer and the tray post-processor.
//!
//! All coordinates are machine millimeters in the XY plane.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A point (or vector) in the XY plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    /// X coordinate in millimeters
    pub x: f64,
    /// Y coordinate in millimeters
    pub y: f64,
}

impl Point2 {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The origin (0, 0)
    pub const fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point2) -> f64 {
        distance(*self, other)
    }

    /// Linear interpolation: `t = 0` is `self`, `t = 1` is `other`
    pub fn lerp(&self, other: Point2, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// The point `dist` millimeters from `self` along the segment toward `target`.
    ///
    /// Returns `self` when the two points coincide.
    pub fn toward(&self, target: Point2, dist: f64) -> Self {
        let total = self.distance_to(target);
        if total <= f64::EPSILON {
            return *self;
        }
        self.lerp(target, dist / total)
    }

    /// The point at `radius` from `self` on the ray through `target`.
    ///
    /// `None` when `target` coincides with `self` and the direction is undefined.
    pub fn radial_toward(&self, target: Point2, radius: f64) -> Option<Self> {
        let total = self.distance_to(target);
        if total <= f64::EPSILON {
            return None;
        }
        Some(self.lerp(target, radius / total))
    }
}

impl Add for Point2 {
    type Output = Point2;

    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;

    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Euclidean distance between two points
pub fn distance(a: Point2, b: Point2) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}
