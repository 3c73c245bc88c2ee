//! Polar to pixel conversion for the half-disc display.
//!
//! Angles are measured from the left end of the baseline (0°) through the
//! top (90°) to the right end (180°). Offsets are taken from the center of
//! the baseline with `y` pointing up.

use serde::{Deserialize, Serialize};

/// Default outer ring distance in centimetres.
pub const MAX_DISTANCE: f64 = 100.0;

pub const MIN_ANGLE: f64 = 0.0;
pub const MAX_ANGLE: f64 = 180.0;

/// Cartesian offset from the baseline center, `y` up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelOffset {
    pub x: f64,
    pub y: f64,
}

impl PixelOffset {
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Clamps an angle into the visible half disc. NaN maps to the left baseline.
pub fn clamp_angle(angle: f64) -> f64 {
    if angle.is_nan() {
        MIN_ANGLE
    } else {
        angle.clamp(MIN_ANGLE, MAX_ANGLE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryHelper {
    max_distance: f64,
}

impl GeometryHelper {
    pub fn new(max_distance: f64) -> Self {
        Self { max_distance }
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn clamp_distance(&self, distance: f64) -> f64 {
        if distance.is_nan() {
            0.0
        } else {
            distance.clamp(0.0, self.max_distance)
        }
    }

    /// Maps `(angle, distance)` onto a half disc of `radius` pixels.
    ///
    /// Out of range inputs are clamped first. The result never leaves the
    /// disc and never dips below the baseline, even when trigonometry at
    /// 0° or 180° overshoots by a rounding error.
    pub fn to_pixel(&self, angle: f64, distance: f64, radius: f64) -> PixelOffset {
        let radius = radius.max(0.0);
        let angle = clamp_angle(angle);
        let distance = self.clamp_distance(distance);

        let reach = if self.max_distance > 0.0 {
            distance / self.max_distance * radius
        } else {
            0.0
        };
        let theta = (MAX_ANGLE - angle).to_radians();
        let mut x = reach * theta.cos();
        let mut y = (reach * theta.sin()).max(0.0);

        let length = x.hypot(y);
        if length > radius && length > 0.0 {
            let scale = radius / length;
            x *= scale;
            y *= scale;
        }

        PixelOffset { x, y }
    }

    /// Point on the outer ring at `angle`, used for the sweep line tip.
    pub fn rim(&self, angle: f64, radius: f64) -> PixelOffset {
        self.to_pixel(angle, self.max_distance, radius)
    }
}

impl Default for GeometryHelper {
    fn default() -> Self {
        Self::new(MAX_DISTANCE)
    }
}
