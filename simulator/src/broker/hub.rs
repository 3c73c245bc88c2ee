use log::{debug, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use sweepcore::diagnostics::{Counter, MetricsRecorder, MetricsSnapshot};
use sweepcore::prelude::{RadarError, RadarResult};
use sweepcore::wire::{RadarRecord, SensorSample};
use tokio::sync::broadcast;

const TOPIC_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize)]
pub struct HubStats {
    pub subscribers: usize,
    #[serde(flatten)]
    pub counters: MetricsSnapshot,
}

/// Single radar topic: validates records and fans them out as JSON bodies.
///
/// Only the most recent record is kept; nothing is persisted.
pub struct RadarHub {
    sender: broadcast::Sender<String>,
    latest: RwLock<Option<RadarRecord>>,
    metrics: MetricsRecorder,
    sequence: AtomicU64,
}

impl RadarHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(TOPIC_CAPACITY);
        Self {
            sender,
            latest: RwLock::new(None),
            metrics: MetricsRecorder::new(),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn publish(&self, record: RadarRecord) -> RadarResult<RadarRecord> {
        if let Err(err) = record.validate() {
            self.metrics.record(Counter::RecordRejected);
            warn!("rejecting radar record: {}", err);
            return Err(err);
        }

        let body = serde_json::to_string(&record)
            .map_err(|err| RadarError::InvalidRecord(err.to_string()))?;

        *self
            .latest
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(record.clone());
        self.metrics.record(Counter::Published);

        // Sending only fails when nobody listens, which is fine.
        if self.sender.send(body).is_err() {
            debug!("record {:?} published with no subscribers", record.id);
        }
        Ok(record)
    }

    /// Publishes a generated sample under a fresh `sim-N` id.
    pub fn publish_sample(&self, sample: SensorSample) -> RadarResult<RadarRecord> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.publish(RadarRecord::new(
            format!("sim-{}", id),
            sample.angle,
            sample.distance,
        ))
    }

    pub fn latest(&self) -> Option<RadarRecord> {
        self.latest
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            subscribers: self.subscriber_count(),
            counters: self.metrics.snapshot(),
        }
    }
}

impl Default for RadarHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_updates_latest_and_reaches_subscribers() {
        let hub = RadarHub::new();
        let mut updates = hub.subscribe();
        hub.publish(RadarRecord::new("a", 30.0, 40.0)).unwrap();

        assert_eq!(hub.latest(), Some(RadarRecord::new("a", 30.0, 40.0)));
        let body = updates.try_recv().unwrap();
        assert_eq!(
            SensorSample::parse(&body).unwrap(),
            SensorSample::new(30.0, 40.0)
        );
        assert_eq!(hub.stats().counters.published, 1);
        assert_eq!(hub.stats().subscribers, 1);
    }

    #[test]
    fn invalid_record_is_not_broadcast() {
        let hub = RadarHub::new();
        let mut updates = hub.subscribe();
        let record = RadarRecord {
            id: Some("b".into()),
            distance: None,
            angle: Some(10.0),
        };
        assert!(hub.publish(record).is_err());
        assert!(updates.try_recv().is_err());
        assert_eq!(hub.latest(), None);
        assert_eq!(hub.stats().counters.records_rejected, 1);
    }

    #[test]
    fn generated_samples_get_sequential_ids() {
        let hub = RadarHub::new();
        let first = hub.publish_sample(SensorSample::new(10.0, 20.0)).unwrap();
        let second = hub.publish_sample(SensorSample::new(12.0, 20.0)).unwrap();
        assert_eq!(first.id.as_deref(), Some("sim-1"));
        assert_eq!(second.id.as_deref(), Some("sim-2"));
    }
}
