pub mod metrics;

pub use metrics::{Counter, MetricsRecorder, MetricsSnapshot};
