use crate::prelude::{RadarError, RadarResult};
use serde::{Deserialize, Serialize};

/// Display geometry limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Farthest distance (cm) drawn on the outer ring.
    pub max_distance: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            max_distance: 100.0,
        }
    }
}

/// Tuning for the sweep synchroniser.
///
/// The pause and smoothing values were tuned against one servo rig and
/// should be recalibrated when the hardware changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Deviation (degrees) above which the displayed angle snaps to telemetry.
    pub sync_threshold_deg: f64,
    /// Blend factor applied to telemetry below the sync threshold.
    pub smoothing: f64,
    /// Angle change (degrees) under which two samples count as stationary.
    pub pause_epsilon_deg: f64,
    /// Gap (ms) between stationary samples that marks the servo as paused.
    pub pause_detect_ms: f64,
    /// How long (ms) a pause is held before the sweep is presumed restarting.
    pub pause_delay_ms: f64,
    /// Angle change (degrees) needed before the direction is updated.
    pub direction_threshold_deg: f64,
    /// Telemetry older than this (ms) no longer holds the sweep in place.
    pub stale_after_ms: f64,
    /// Degrees advanced per tick while running autonomously.
    pub autonomous_step_deg: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sync_threshold_deg: 5.0,
            smoothing: 0.1,
            pause_epsilon_deg: 1.0,
            pause_detect_ms: 2000.0,
            pause_delay_ms: 3000.0,
            direction_threshold_deg: 2.0,
            stale_after_ms: 2000.0,
            autonomous_step_deg: 1.0,
        }
    }
}

/// Pending detection handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Half width (degrees) of the window around the sweep that reveals detections.
    pub tolerance_deg: f64,
    /// Pending detections older than this (ms) are discarded unrevealed.
    pub pending_timeout_ms: f64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            tolerance_deg: 3.0,
            pending_timeout_ms: 10_000.0,
        }
    }
}

/// Revealed point ageing and echo palette thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeConfig {
    pub lifetime_ms: f64,
    pub fade_duration_ms: f64,
    pub ping_window_ms: f64,
    pub ping_intensity: f64,
    /// Echoes closer than this (cm) use the strong palette.
    pub strong_below_cm: f64,
    /// Echoes closer than this (cm) use the medium palette.
    pub medium_below_cm: f64,
    pub weak_base_opacity: f64,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            lifetime_ms: 3000.0,
            fade_duration_ms: 2000.0,
            ping_window_ms: 200.0,
            ping_intensity: 1.5,
            strong_below_cm: 20.0,
            medium_below_cm: 50.0,
            weak_base_opacity: 0.3,
        }
    }
}

/// Full configuration of the radar engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub geometry: GeometryConfig,
    pub sweep: SweepConfig,
    pub queue: QueueConfig,
    pub fade: FadeConfig,
}

impl RadarConfig {
    /// Rejects values that would break the engine invariants.
    pub fn validate(&self) -> RadarResult<()> {
        if !(self.geometry.max_distance > 0.0) {
            return Err(RadarError::InvalidConfig(
                "geometry.max_distance must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.sweep.smoothing) {
            return Err(RadarError::InvalidConfig(
                "sweep.smoothing must lie in [0, 1]".into(),
            ));
        }
        if !(self.sweep.autonomous_step_deg > 0.0) {
            return Err(RadarError::InvalidConfig(
                "sweep.autonomous_step_deg must be positive".into(),
            ));
        }
        if self.queue.tolerance_deg < 0.0 {
            return Err(RadarError::InvalidConfig(
                "queue.tolerance_deg must not be negative".into(),
            ));
        }
        if !(self.fade.fade_duration_ms > 0.0) || self.fade.lifetime_ms < self.fade.fade_duration_ms
        {
            return Err(RadarError::InvalidConfig(format!(
                "fade.lifetime_ms ({}) must be at least fade.fade_duration_ms ({}) and both positive",
                self.fade.lifetime_ms, self.fade.fade_duration_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_constants() {
        let cfg = RadarConfig::default();
        assert_eq!(cfg.geometry.max_distance, 100.0);
        assert_eq!(cfg.queue.tolerance_deg, 3.0);
        assert_eq!(cfg.queue.pending_timeout_ms, 10_000.0);
        assert_eq!(cfg.fade.lifetime_ms, 3000.0);
        assert_eq!(cfg.fade.fade_duration_ms, 2000.0);
        assert_eq!(cfg.sweep.sync_threshold_deg, 5.0);
        assert_eq!(cfg.sweep.pause_delay_ms, 3000.0);
        assert_eq!(cfg.sweep.smoothing, 0.1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: RadarConfig =
            serde_json::from_str(r#"{"sweep": {"smoothing": 0.25}}"#).unwrap();
        assert_eq!(cfg.sweep.smoothing, 0.25);
        assert_eq!(cfg.sweep.sync_threshold_deg, 5.0);
        assert_eq!(cfg.fade, FadeConfig::default());
    }

    #[test]
    fn validate_rejects_lifetime_shorter_than_fade() {
        let mut cfg = RadarConfig::default();
        cfg.fade.lifetime_ms = 1000.0;
        assert!(matches!(cfg.validate(), Err(RadarError::InvalidConfig(_))));
    }
}
