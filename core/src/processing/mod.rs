pub mod fade;
pub mod queue;
pub mod sweep;

pub use fade::{EchoPalette, EchoStrength, FadeFrame, FadeManager, FadedPoint, RevealedPoint};
pub use queue::{DetectionQueue, PendingDetection, SweepDrain};
pub use sweep::{SweepDirection, SweepMode, SweepState, SweepSynchronizer};
