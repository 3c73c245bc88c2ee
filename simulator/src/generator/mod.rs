pub mod servo;

pub use servo::{Obstacle, ServoConfig, ServoSweep, TimedSample};
