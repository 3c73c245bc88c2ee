//! Per-frame driver tying the synchroniser, queue and fade manager together.
//!
//! A driver calls [`RadarEngine::ingest_message`] whenever the transport
//! delivers a body and [`RadarEngine::tick`] once per display refresh, both
//! from the same thread. Each call leaves every component consistent
//! before it returns.

use crate::config::RadarConfig;
use crate::diagnostics::{Counter, MetricsRecorder, MetricsSnapshot};
use crate::math::geometry::GeometryHelper;
use crate::prelude::{Millis, RadarError, RadarResult, RenderSurface};
use crate::processing::{
    DetectionQueue, FadeManager, FadedPoint, PendingDetection, RevealedPoint, SweepMode,
    SweepState, SweepSynchronizer,
};
use crate::wire::SensorSample;
use log::{debug, trace};

/// Snapshot of everything the display needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarFrame {
    pub now: Millis,
    pub sweep_angle: f64,
    pub mode: SweepMode,
    pub max_distance: f64,
    pub pending: usize,
    pub blips: Vec<FadedPoint>,
}

impl RadarFrame {
    /// Hands the frame to a surface: grid first, then sweep, then blips.
    pub fn paint<S: RenderSurface>(&self, radius: f64, surface: &mut S) {
        let geometry = GeometryHelper::new(self.max_distance);
        surface.draw_grid(radius, self.max_distance);
        surface.draw_sweep(geometry.rim(self.sweep_angle, radius), self.sweep_angle);
        for blip in &self.blips {
            let position = geometry.to_pixel(blip.angle, blip.distance, radius);
            surface.draw_blip(position, blip);
        }
    }
}

pub struct RadarEngine {
    config: RadarConfig,
    sweep: SweepSynchronizer,
    queue: DetectionQueue,
    fade: FadeManager,
    metrics: MetricsRecorder,
    clock: Option<Millis>,
    last_sample: Option<SensorSample>,
}

impl RadarEngine {
    pub fn new(config: RadarConfig) -> RadarResult<Self> {
        config.validate()?;
        let geometry = GeometryHelper::new(config.geometry.max_distance);
        Ok(Self {
            sweep: SweepSynchronizer::new(config.sweep.clone()),
            queue: DetectionQueue::new(config.queue.clone(), geometry),
            fade: FadeManager::new(config.fade.clone()),
            metrics: MetricsRecorder::new(),
            clock: None,
            last_sample: None,
            config,
        })
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    pub fn sweep_state(&self) -> &SweepState {
        self.sweep.state()
    }

    pub fn pending(&self) -> &[PendingDetection] {
        self.queue.pending()
    }

    pub fn revealed(&self) -> &[RevealedPoint] {
        self.fade.revealed()
    }

    pub fn last_sample(&self) -> Option<SensorSample> {
        self.last_sample
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Parses and applies one transport message body.
    ///
    /// Malformed bodies leave the engine untouched and come back as
    /// [`RadarError::MalformedMessage`] for the caller to log and drop.
    pub fn ingest_message(&mut self, body: &str, now: Millis) -> RadarResult<SensorSample> {
        match SensorSample::parse(body) {
            Ok(sample) => {
                self.ingest(sample, now);
                Ok(sample)
            }
            Err(err) => {
                self.metrics.record(Counter::MalformedMessage);
                debug!("dropping telemetry: {}", err);
                Err(err)
            }
        }
    }

    /// Applies one sample. Returns whether it was queued as a detection;
    /// baseline samples still steer the sweep.
    pub fn ingest(&mut self, sample: SensorSample, now: Millis) -> bool {
        let now = self.observe(now);
        self.last_sample = Some(sample);
        self.metrics.record(Counter::SampleAccepted);
        self.sweep.on_telemetry(sample.angle, now);

        match self.queue.enqueue(sample.angle, sample.distance, now) {
            Ok(()) => true,
            Err(RadarError::BaselineAngle(angle)) => {
                self.metrics.record(Counter::BaselineRejected);
                trace!("baseline sample at {} deg is not a detection", angle);
                false
            }
            Err(err) => {
                debug!("detection not queued: {}", err);
                false
            }
        }
    }

    /// Advances one display frame.
    pub fn tick(&mut self, now: Millis) -> RadarFrame {
        let now = self.observe(now);
        self.sweep.advance(now);

        let sweep_angle = self.sweep.angle();
        let drain = self
            .queue
            .drain_swept(sweep_angle, self.queue.tolerance(), now);
        if drain.stale > 0 {
            self.metrics.record_n(Counter::StaleDiscarded, drain.stale as u64);
            debug!("discarded {} stale detections", drain.stale);
        }
        self.metrics
            .record_n(Counter::Revealed, drain.released.len() as u64);
        for detection in drain.released {
            self.fade.reveal(detection, now);
        }

        let faded = self.fade.tick(now);
        self.metrics.record_n(Counter::Expired, faded.expired as u64);

        RadarFrame {
            now,
            sweep_angle,
            mode: self.sweep.mode(),
            max_distance: self.config.geometry.max_distance,
            pending: self.queue.len(),
            blips: faded.points,
        }
    }

    /// Holds the clock at the latest timestamp seen so ages never go negative.
    fn observe(&mut self, now: Millis) -> Millis {
        let now = match self.clock {
            Some(latest) if !(now >= latest) => latest,
            _ => now,
        };
        self.clock = Some(now);
        now
    }
}

impl Default for RadarEngine {
    fn default() -> Self {
        Self {
            config: RadarConfig::default(),
            sweep: SweepSynchronizer::default(),
            queue: DetectionQueue::default(),
            fade: FadeManager::default(),
            metrics: MetricsRecorder::new(),
            clock: None,
            last_sample: None,
        }
    }
}
