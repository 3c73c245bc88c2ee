//! Sweep, reveal and fade engine for the ultrasonic radar display.
//!
//! The crate tracks a simulated sweep line against servo telemetry, holds
//! detections until the sweep passes over them and ages revealed points
//! out. Drawing and transport are left to the caller through
//! [`prelude::RenderSurface`] and plain message bodies.

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod wire;

pub use config::RadarConfig;
pub use engine::{RadarEngine, RadarFrame};
pub use prelude::{Millis, RadarError, RadarResult, RenderSurface};
