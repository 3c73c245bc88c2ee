use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Events counted across the engine and the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    SampleAccepted,
    MalformedMessage,
    BaselineRejected,
    Revealed,
    StaleDiscarded,
    Expired,
    Published,
    RecordRejected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub samples_accepted: u64,
    pub malformed_messages: u64,
    pub baseline_rejected: u64,
    pub revealed: u64,
    pub stale_discarded: u64,
    pub expired: u64,
    pub published: u64,
    pub records_rejected: u64,
}

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record(&self, counter: Counter) {
        self.record_n(counter, 1);
    }

    pub fn record_n(&self, counter: Counter, amount: u64) {
        if amount == 0 {
            return;
        }
        if let Ok(mut metrics) = self.inner.lock() {
            let slot = match counter {
                Counter::SampleAccepted => &mut metrics.samples_accepted,
                Counter::MalformedMessage => &mut metrics.malformed_messages,
                Counter::BaselineRejected => &mut metrics.baseline_rejected,
                Counter::Revealed => &mut metrics.revealed,
                Counter::StaleDiscarded => &mut metrics.stale_discarded,
                Counter::Expired => &mut metrics.expired,
                Counter::Published => &mut metrics.published,
                Counter::RecordRejected => &mut metrics.records_rejected,
            };
            *slot += amount;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MetricsRecorder")
            .field(&self.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = MetricsRecorder::new();
        metrics.record(Counter::SampleAccepted);
        metrics.record(Counter::SampleAccepted);
        metrics.record_n(Counter::Expired, 3);
        metrics.record_n(Counter::Revealed, 0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.samples_accepted, 2);
        assert_eq!(snapshot.expired, 3);
        assert_eq!(snapshot.revealed, 0);
        assert_eq!(snapshot.published, 0);
    }
}
