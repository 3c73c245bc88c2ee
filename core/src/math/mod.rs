pub mod geometry;
pub mod window;

pub use geometry::{clamp_angle, GeometryHelper, PixelOffset, MAX_DISTANCE};
pub use window::SweepWindow;
