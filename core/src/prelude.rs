use crate::math::geometry::PixelOffset;
use crate::processing::fade::FadedPoint;

/// Milliseconds since an arbitrary monotonic epoch chosen by the driver.
pub type Millis = f64;

/// Common error type for the radar core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RadarError {
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    #[error("angle {0} lies on the baseline and is not a detection")]
    BaselineAngle(f64),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type RadarResult<T> = Result<T, RadarError>;

/// Paints final pixel, opacity and color values. Holds no radar logic.
///
/// Offsets are relative to the center of the baseline with `y` growing
/// upwards, so implementors typically map them as `(cx + x, cy - y)`.
pub trait RenderSurface {
    fn draw_grid(&mut self, radius: f64, max_distance: f64);
    fn draw_sweep(&mut self, tip: PixelOffset, angle_deg: f64);
    fn draw_blip(&mut self, position: PixelOffset, blip: &FadedPoint);
}
