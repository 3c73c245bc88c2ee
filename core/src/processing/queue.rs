use crate::config::QueueConfig;
use crate::math::geometry::{clamp_angle, GeometryHelper, MAX_ANGLE, MIN_ANGLE};
use crate::math::window::SweepWindow;
use crate::prelude::{Millis, RadarError, RadarResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingDetection {
    pub angle: f64,
    pub distance: f64,
    pub received_at: Millis,
}

/// Result of one drain pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepDrain {
    /// Detections now under the sweep, in no particular order.
    pub released: Vec<PendingDetection>,
    /// Detections dropped because the sweep never reached them in time.
    pub stale: usize,
}

pub struct DetectionQueue {
    config: QueueConfig,
    geometry: GeometryHelper,
    pending: Vec<PendingDetection>,
}

impl DetectionQueue {
    pub fn new(config: QueueConfig, geometry: GeometryHelper) -> Self {
        Self {
            config,
            geometry,
            pending: Vec::new(),
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.config.tolerance_deg
    }

    pub fn pending(&self) -> &[PendingDetection] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queues a detection. Values are clamped into range; anything that
    /// lands on the baseline (0° or 180°) is not a detection and is refused.
    pub fn enqueue(&mut self, angle: f64, distance: f64, now: Millis) -> RadarResult<()> {
        let clamped = clamp_angle(angle);
        if clamped <= MIN_ANGLE || clamped >= MAX_ANGLE {
            return Err(RadarError::BaselineAngle(angle));
        }
        self.pending.push(PendingDetection {
            angle: clamped,
            distance: self.geometry.clamp_distance(distance),
            received_at: now,
        });
        Ok(())
    }

    /// Removes stale entries, then releases every entry inside the window
    /// `[sweep_angle - tolerance, sweep_angle + tolerance]`.
    pub fn drain_swept(&mut self, sweep_angle: f64, tolerance: f64, now: Millis) -> SweepDrain {
        let timeout = self.config.pending_timeout_ms;
        let before = self.pending.len();
        self.pending
            .retain(|detection| now - detection.received_at <= timeout);
        let stale = before - self.pending.len();

        let window = SweepWindow::new(sweep_angle, tolerance);
        let (released, kept): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|detection| window.contains(detection.angle));
        self.pending = kept;

        SweepDrain { released, stale }
    }
}

impl Default for DetectionQueue {
    fn default() -> Self {
        Self::new(QueueConfig::default(), GeometryHelper::default())
    }
}
