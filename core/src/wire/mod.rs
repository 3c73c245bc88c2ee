pub mod record;
pub mod sample;

pub use record::RadarRecord;
pub use sample::SensorSample;
