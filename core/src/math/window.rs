use crate::math::geometry::{MAX_ANGLE, MIN_ANGLE};

/// Angular band `[center - tolerance, center + tolerance]` around the sweep.
///
/// The sweep reverses at the ends instead of wrapping, but a window that
/// spills past 0° also covers the matching band below 180° (and the other
/// way round) so that detections reported exactly at an edge are caught
/// before the reversal shows up in telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepWindow {
    low: f64,
    high: f64,
}

impl SweepWindow {
    pub fn new(center: f64, tolerance: f64) -> Self {
        let tolerance = tolerance.abs();
        Self {
            low: center - tolerance,
            high: center + tolerance,
        }
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.low, self.high)
    }

    pub fn contains(&self, angle: f64) -> bool {
        if angle >= self.low && angle <= self.high {
            return true;
        }
        if self.low < MIN_ANGLE && angle >= MAX_ANGLE + self.low {
            return true;
        }
        if self.high > MAX_ANGLE && angle <= self.high - MAX_ANGLE {
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_window_is_a_plain_interval() {
        let window = SweepWindow::new(88.0, 3.0);
        assert_eq!(window.bounds(), (85.0, 91.0));
        assert!(window.contains(90.0));
        assert!(window.contains(85.0));
        assert!(window.contains(91.0));
        assert!(!window.contains(91.5));
        assert!(!window.contains(50.0));
    }

    #[test]
    fn low_edge_window_spills_into_high_band() {
        let window = SweepWindow::new(1.0, 3.0);
        assert!(window.contains(0.5));
        assert!(window.contains(178.5));
        assert!(!window.contains(177.5));
    }

    #[test]
    fn high_edge_window_spills_into_low_band() {
        let window = SweepWindow::new(179.0, 3.0);
        assert!(window.contains(180.0));
        assert!(window.contains(1.5));
        assert!(!window.contains(2.5));
    }
}
