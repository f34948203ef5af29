use serde::{Deserialize, Serialize};

pub const FULL_CIRCLE: f64 = 360.0;

/// A position on the drawing surface. Canvas space is y-down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

/// Wraps any angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(FULL_CIRCLE);
    // rem_euclid rounds tiny negatives up to exactly 360
    if wrapped >= FULL_CIRCLE { 0.0 } else { wrapped }
}

/// Angle of `tap` around `center` in degrees, in `[0, 360)`.
///
/// 0° points along +x and angles grow clockwise on a y-down surface, which is
/// the same convention cairo uses for arcs.
pub fn click_angle(tap: Point, center: Point) -> f64 {
    let (dx, dy) = (tap.x - center.x, tap.y - center.y);
    normalize_degrees(dy.atan2(dx).to_degrees())
}
