use crate::config::SweepConfig;
use crate::math::geometry::{clamp_angle, MAX_ANGLE, MIN_ANGLE};
use crate::prelude::Millis;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepDirection {
    /// Towards increasing angle.
    Forward,
    /// Towards decreasing angle.
    Backward,
}

impl SweepDirection {
    fn sign(self) -> f64 {
        match self {
            SweepDirection::Forward => 1.0,
            SweepDirection::Backward => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepMode {
    Autonomous,
    Synchronized,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepState {
    pub angle: f64,
    pub direction: SweepDirection,
    pub last_telemetry_angle: Option<f64>,
    pub last_telemetry_at: Option<Millis>,
    pub synchronized: bool,
    pub paused: bool,
    pub pause_started_at: Option<Millis>,
}

impl Default for SweepState {
    fn default() -> Self {
        Self {
            angle: MIN_ANGLE,
            direction: SweepDirection::Forward,
            last_telemetry_angle: None,
            last_telemetry_at: None,
            synchronized: false,
            paused: false,
            pause_started_at: None,
        }
    }
}

impl SweepState {
    pub fn mode(&self) -> SweepMode {
        if self.paused {
            SweepMode::Paused
        } else if self.synchronized {
            SweepMode::Synchronized
        } else {
            SweepMode::Autonomous
        }
    }
}

pub struct SweepSynchronizer {
    config: SweepConfig,
    state: SweepState,
}

impl SweepSynchronizer {
    pub fn new(config: SweepConfig) -> Self {
        Self {
            config,
            state: SweepState::default(),
        }
    }

    pub fn state(&self) -> &SweepState {
        &self.state
    }

    pub fn angle(&self) -> f64 {
        self.state.angle
    }

    pub fn mode(&self) -> SweepMode {
        self.state.mode()
    }

    /// Reconciles the sweep with a telemetry sample taken at `now`.
    pub fn on_telemetry(&mut self, angle: f64, now: Millis) {
        let angle = clamp_angle(angle);
        let cfg = &self.config;
        let state = &mut self.state;

        if let (Some(last_angle), Some(last_at)) =
            (state.last_telemetry_angle, state.last_telemetry_at)
        {
            let delta_angle = angle - last_angle;
            let delta_t = now - last_at;

            if delta_angle.abs() < cfg.pause_epsilon_deg && delta_t > cfg.pause_detect_ms {
                if !state.paused {
                    debug!("servo stationary at {:.1} deg, pausing sweep", angle);
                    state.paused = true;
                    state.pause_started_at = Some(now);
                }
            } else {
                state.paused = false;
                state.pause_started_at = None;
                if delta_angle.abs() > cfg.direction_threshold_deg {
                    state.direction = if delta_angle > 0.0 {
                        SweepDirection::Forward
                    } else {
                        SweepDirection::Backward
                    };
                }
            }
        }

        let deviation = (state.angle - angle).abs();
        if !state.synchronized || deviation > cfg.sync_threshold_deg {
            if state.synchronized {
                debug!(
                    "hard resync from {:.1} to {:.1} deg (off by {:.1})",
                    state.angle, angle, deviation
                );
            }
            state.angle = angle;
            state.synchronized = true;
        } else {
            let k = cfg.smoothing;
            state.angle = clamp_angle(state.angle * (1.0 - k) + angle * k);
        }

        state.last_telemetry_angle = Some(angle);
        state.last_telemetry_at = Some(now);
    }

    /// Advances the sweep by one display tick.
    pub fn advance(&mut self, now: Millis) {
        let cfg = &self.config;
        let state = &mut self.state;

        if state.paused {
            let held = state.pause_started_at.map_or(0.0, |start| now - start);
            if held > cfg.pause_delay_ms {
                debug!("pause held {:.0} ms, presuming servo restart", held);
                state.paused = false;
                state.pause_started_at = None;
            }
            return;
        }

        let telemetry_fresh = state
            .last_telemetry_at
            .map_or(false, |at| now - at <= cfg.stale_after_ms);
        if telemetry_fresh {
            return;
        }

        if state.synchronized {
            debug!("telemetry stale, sweeping autonomously");
        }
        state.synchronized = false;

        let next = state.angle + cfg.autonomous_step_deg * state.direction.sign();
        if next >= MAX_ANGLE {
            state.angle = MAX_ANGLE;
            state.direction = SweepDirection::Backward;
        } else if next <= MIN_ANGLE {
            state.angle = MIN_ANGLE;
            state.direction = SweepDirection::Forward;
        } else {
            state.angle = next;
        }
    }
}

impl Default for SweepSynchronizer {
    fn default() -> Self {
        Self::new(SweepConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_snaps_and_synchronizes() {
        let mut sweep = SweepSynchronizer::default();
        assert_eq!(sweep.mode(), SweepMode::Autonomous);
        sweep.on_telemetry(45.0, 0.0);
        assert_eq!(sweep.angle(), 45.0);
        assert!(sweep.state().synchronized);
        assert_eq!(sweep.mode(), SweepMode::Synchronized);
    }

    #[test]
    fn small_deviation_is_blended() {
        let mut sweep = SweepSynchronizer::default();
        sweep.on_telemetry(40.0, 0.0);
        sweep.on_telemetry(44.0, 30.0);
        assert!((sweep.angle() - 40.4).abs() < 1e-9);
    }

    #[test]
    fn large_deviation_snaps() {
        let mut sweep = SweepSynchronizer::default();
        sweep.on_telemetry(40.0, 0.0);
        sweep.on_telemetry(60.0, 30.0);
        assert_eq!(sweep.angle(), 60.0);
    }

    #[test]
    fn stationary_samples_far_apart_pause_the_sweep() {
        let mut sweep = SweepSynchronizer::default();
        sweep.on_telemetry(10.0, 0.0);
        sweep.on_telemetry(10.5, 2500.0);
        assert!(sweep.state().paused);
        assert_eq!(sweep.state().pause_started_at, Some(2500.0));
        assert_eq!(sweep.mode(), SweepMode::Paused);

        sweep.on_telemetry(10.6, 4600.0);
        assert_eq!(sweep.state().pause_started_at, Some(2500.0));
    }

    #[test]
    fn movement_clears_pause_and_sets_direction() {
        let mut sweep = SweepSynchronizer::default();
        sweep.on_telemetry(100.0, 0.0);
        sweep.on_telemetry(100.0, 2500.0);
        assert!(sweep.state().paused);

        sweep.on_telemetry(96.0, 2530.0);
        assert!(!sweep.state().paused);
        assert_eq!(sweep.state().pause_started_at, None);
        assert_eq!(sweep.state().direction, SweepDirection::Backward);

        sweep.on_telemetry(99.0, 2560.0);
        assert_eq!(sweep.state().direction, SweepDirection::Forward);
    }

    #[test]
    fn jitter_below_direction_threshold_keeps_direction() {
        let mut sweep = SweepSynchronizer::default();
        sweep.on_telemetry(50.0, 0.0);
        sweep.on_telemetry(55.0, 30.0);
        assert_eq!(sweep.state().direction, SweepDirection::Forward);
        sweep.on_telemetry(53.5, 60.0);
        assert_eq!(sweep.state().direction, SweepDirection::Forward);
    }

    #[test]
    fn pause_holds_angle_until_delay_then_releases() {
        let mut sweep = SweepSynchronizer::default();
        sweep.on_telemetry(180.0, 0.0);
        sweep.on_telemetry(180.0, 2500.0);

        sweep.advance(4000.0);
        assert!(sweep.state().paused);
        assert_eq!(sweep.angle(), 180.0);

        sweep.advance(5600.0);
        assert!(!sweep.state().paused);
        assert_eq!(sweep.angle(), 180.0);

        sweep.advance(5617.0);
        assert_eq!(sweep.angle(), 180.0);
        assert_eq!(sweep.state().direction, SweepDirection::Backward);
        assert_eq!(sweep.mode(), SweepMode::Autonomous);

        sweep.advance(5634.0);
        assert_eq!(sweep.angle(), 179.0);
    }

    #[test]
    fn fresh_telemetry_holds_the_sweep() {
        let mut sweep = SweepSynchronizer::default();
        sweep.on_telemetry(70.0, 0.0);
        sweep.advance(16.0);
        sweep.advance(1999.0);
        assert_eq!(sweep.angle(), 70.0);
        assert!(sweep.state().synchronized);
    }

    #[test]
    fn autonomous_sweep_reverses_at_both_ends() {
        let mut sweep = SweepSynchronizer::default();
        let mut now = 0.0;
        let mut seen_top = false;
        for _ in 0..400 {
            now += 16.0;
            sweep.advance(now);
            let angle = sweep.angle();
            assert!((0.0..=180.0).contains(&angle));
            if angle == 180.0 {
                seen_top = true;
                assert_eq!(sweep.state().direction, SweepDirection::Backward);
            }
        }
        assert!(seen_top);
        assert_eq!(sweep.state().direction, SweepDirection::Forward);
        assert!(sweep.angle() < 180.0 && sweep.angle() > 0.0);
    }

    #[test]
    fn small_deviation_after_going_stale_snaps() {
        let mut sweep = SweepSynchronizer::default();
        sweep.on_telemetry(30.0, 0.0);
        sweep.advance(2100.0);
        assert!(!sweep.state().synchronized);
        let displayed = sweep.angle();
        assert_eq!(displayed, 31.0);

        sweep.on_telemetry(displayed + 3.0, 2110.0);
        assert_eq!(sweep.angle(), 34.0);
        assert!(sweep.state().synchronized);
    }

    #[test]
    fn stale_telemetry_degrades_to_autonomous() {
        let mut sweep = SweepSynchronizer::default();
        sweep.on_telemetry(30.0, 0.0);
        sweep.on_telemetry(34.0, 30.0);
        sweep.advance(2100.0);
        assert_eq!(sweep.mode(), SweepMode::Autonomous);
        assert!(sweep.angle() > 30.0);
    }
}
