use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sweepcore::wire::SensorSample;

/// Reflecting object in front of the rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Bearing of the obstacle center in degrees.
    pub angle: f64,
    /// Angular half width in degrees.
    pub half_width: f64,
    /// Distance in centimetres.
    pub distance: f64,
}

/// Emulates the servo-mounted ultrasonic sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    pub min_angle: f64,
    pub max_angle: f64,
    pub step_deg: f64,
    pub step_delay_ms: f64,
    /// Dwell at each end of the sweep before reversing.
    pub end_pause_ms: f64,
    /// Distance reported when nothing reflects, usually past the display range.
    pub background_distance: f64,
    pub noise: f64,
    pub seed: u64,
    pub obstacles: Vec<Obstacle>,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            min_angle: 0.0,
            max_angle: 180.0,
            step_deg: 2.0,
            step_delay_ms: 30.0,
            end_pause_ms: 2500.0,
            background_distance: 400.0,
            noise: 0.5,
            seed: 0,
            obstacles: vec![
                Obstacle {
                    angle: 45.0,
                    half_width: 4.0,
                    distance: 15.0,
                },
                Obstacle {
                    angle: 100.0,
                    half_width: 6.0,
                    distance: 38.0,
                },
                Obstacle {
                    angle: 140.0,
                    half_width: 3.0,
                    distance: 72.0,
                },
            ],
        }
    }
}

impl ServoConfig {
    fn normalized_range(&self) -> (f64, f64) {
        let low = self.min_angle.clamp(0.0, 180.0);
        let high = self.max_angle.clamp(0.0, 180.0);
        if low <= high {
            (low, high)
        } else {
            (high, low)
        }
    }

    fn normalized_step(&self) -> f64 {
        self.step_deg.abs().max(0.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSample {
    /// Milliseconds since the generator started.
    pub at_ms: f64,
    pub sample: SensorSample,
}

/// Endless back and forth sweep.
///
/// The end angle is reported once on arrival and again after the end pause
/// when the reverse leg starts, like the rig's sketch does.
pub struct ServoSweep {
    config: ServoConfig,
    rng: StdRng,
    low: f64,
    high: f64,
    angle: f64,
    direction: f64,
    at_ms: f64,
}

impl ServoSweep {
    pub fn new(config: ServoConfig) -> Self {
        let (low, high) = config.normalized_range();
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            low,
            high,
            angle: low,
            direction: 1.0,
            at_ms: 0.0,
            config,
        }
    }

    fn echo(&mut self, angle: f64) -> f64 {
        let base = self
            .config
            .obstacles
            .iter()
            .filter(|obstacle| (obstacle.angle - angle).abs() <= obstacle.half_width)
            .map(|obstacle| obstacle.distance)
            .fold(None, |nearest: Option<f64>, d| {
                Some(nearest.map_or(d, |n| n.min(d)))
            })
            .unwrap_or(self.config.background_distance);

        let noise = self.config.noise.abs();
        let jitter = if noise > 0.0 {
            self.rng.gen_range(-noise..noise)
        } else {
            0.0
        };
        ((base + jitter).max(0.0) * 100.0).round() / 100.0
    }
}

impl Iterator for ServoSweep {
    type Item = TimedSample;

    fn next(&mut self) -> Option<Self::Item> {
        let angle = self.angle;
        let distance = self.echo(angle);
        let emitted = TimedSample {
            at_ms: self.at_ms,
            sample: SensorSample::new(angle, distance),
        };

        let at_end = (self.direction > 0.0 && angle >= self.high)
            || (self.direction < 0.0 && angle <= self.low);
        if at_end {
            self.direction = -self.direction;
            self.at_ms += self.config.end_pause_ms + self.config.step_delay_ms;
        } else {
            let step = self.config.normalized_step() * self.direction;
            self.angle = (angle + step).clamp(self.low, self.high);
            self.at_ms += self.config.step_delay_ms;
        }

        Some(emitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet(min_angle: f64, max_angle: f64, step_deg: f64) -> ServoConfig {
        ServoConfig {
            min_angle,
            max_angle,
            step_deg,
            noise: 0.0,
            obstacles: Vec::new(),
            ..Default::default()
        }
    }

    #[test]
    fn sweep_reverses_and_repeats_end_angle_after_pause() {
        let samples: Vec<_> = ServoSweep::new(quiet(10.0, 16.0, 2.0)).take(10).collect();
        let angles: Vec<f64> = samples.iter().map(|s| s.sample.angle).collect();
        assert_eq!(
            angles,
            vec![10.0, 12.0, 14.0, 16.0, 16.0, 14.0, 12.0, 10.0, 10.0, 12.0]
        );
        assert_eq!(samples[1].at_ms, 30.0);
        assert_eq!(samples[4].at_ms - samples[3].at_ms, 2530.0);
    }

    #[test]
    fn obstacles_return_nearest_echo() {
        let config = ServoConfig {
            obstacles: vec![
                Obstacle {
                    angle: 20.0,
                    half_width: 5.0,
                    distance: 60.0,
                },
                Obstacle {
                    angle: 22.0,
                    half_width: 5.0,
                    distance: 25.0,
                },
            ],
            ..quiet(18.0, 30.0, 2.0)
        };
        let samples: Vec<_> = ServoSweep::new(config).take(7).collect();
        assert_eq!(samples[0].sample.distance, 25.0);
        assert_eq!(samples[6].sample.distance, 400.0);
    }

    #[test]
    fn seeded_noise_is_repeatable() {
        let config = ServoConfig {
            seed: 7,
            noise: 2.0,
            ..Default::default()
        };
        let a: Vec<_> = ServoSweep::new(config.clone()).take(50).collect();
        let b: Vec<_> = ServoSweep::new(config).take(50).collect();
        assert_eq!(a, b);
    }
}
