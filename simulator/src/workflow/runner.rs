use crate::broker::RadarHub;
use crate::generator::{ServoConfig, ServoSweep};
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use sweepcore::diagnostics::MetricsSnapshot;
use sweepcore::processing::SweepMode;
use sweepcore::wire::RadarRecord;
use sweepcore::RadarEngine;
use tokio::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct OfflineSummary {
    pub frames: usize,
    pub samples: usize,
    pub frames_synchronized: usize,
    pub frames_paused: usize,
    pub frames_autonomous: usize,
    pub peak_blips: usize,
    pub counters: MetricsSnapshot,
}

/// Drives a headless engine over generated telemetry on a synthetic clock.
#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> anyhow::Result<OfflineSummary> {
        let mut engine =
            RadarEngine::new(self.config.radar.clone()).context("building radar engine")?;
        let fps = self.config.frames_per_second.max(1.0);
        let frame_ms = 1000.0 / fps;
        let frames = (self.config.offline_seconds.max(0.0) * fps).round() as usize;

        let mut telemetry = ServoSweep::new(self.config.servo.clone()).peekable();
        let mut summary = OfflineSummary {
            frames,
            samples: 0,
            frames_synchronized: 0,
            frames_paused: 0,
            frames_autonomous: 0,
            peak_blips: 0,
            counters: MetricsSnapshot::default(),
        };

        for index in 0..frames {
            let now = index as f64 * frame_ms;
            while let Some(next) = telemetry.next_if(|sample| sample.at_ms <= now) {
                let record = RadarRecord::new(
                    format!("offline-{}", summary.samples),
                    next.sample.angle,
                    next.sample.distance,
                );
                let body = serde_json::to_string(&record).context("encoding record")?;
                if let Err(err) = engine.ingest_message(&body, next.at_ms) {
                    warn!("offline sample rejected: {}", err);
                }
                summary.samples += 1;
            }

            let frame = engine.tick(now);
            match frame.mode {
                SweepMode::Synchronized => summary.frames_synchronized += 1,
                SweepMode::Paused => summary.frames_paused += 1,
                SweepMode::Autonomous => summary.frames_autonomous += 1,
            }
            summary.peak_blips = summary.peak_blips.max(frame.blips.len());
        }

        summary.counters = engine.metrics();
        Ok(summary)
    }
}

/// Publishes generated samples on the hub in real time until cancelled.
pub async fn publish_generated(hub: Arc<RadarHub>, servo: ServoConfig) {
    let start = Instant::now();
    info!(
        "publishing generated sweep {:.0}-{:.0} deg every {:.0} ms",
        servo.min_angle, servo.max_angle, servo.step_delay_ms
    );
    for timed in ServoSweep::new(servo) {
        let due = start + Duration::from_secs_f64(timed.at_ms.max(0.0) / 1000.0);
        tokio::time::sleep_until(due).await;
        if let Err(err) = hub.publish_sample(timed.sample) {
            warn!("generated sample not published: {}", err);
        }
    }
}
