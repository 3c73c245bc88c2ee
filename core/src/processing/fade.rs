use crate::config::FadeConfig;
use crate::prelude::Millis;
use crate::processing::queue::PendingDetection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealedPoint {
    pub angle: f64,
    pub distance: f64,
    pub revealed_at: Millis,
}

/// Echo strength bucket, chosen by distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EchoStrength {
    Strong,
    Medium,
    Weak,
}

/// Color and glow used to paint one echo bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoPalette {
    pub rgb: [f32; 3],
    pub glow: f32,
    pub base_opacity: f64,
}

impl EchoStrength {
    pub fn palette(self, config: &FadeConfig) -> EchoPalette {
        match self {
            EchoStrength::Strong => EchoPalette {
                rgb: [1.0, 0.27, 0.2],
                glow: 10.0,
                base_opacity: 1.0,
            },
            EchoStrength::Medium => EchoPalette {
                rgb: [1.0, 0.75, 0.2],
                glow: 7.0,
                base_opacity: 1.0,
            },
            EchoStrength::Weak => EchoPalette {
                rgb: [0.2, 1.0, 0.45],
                glow: 4.0,
                base_opacity: config.weak_base_opacity,
            },
        }
    }
}

/// Everything a surface needs to paint one revealed point at `now`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadedPoint {
    pub angle: f64,
    pub distance: f64,
    pub age_ms: Millis,
    /// `1 - fade progress`, never increases with age.
    pub opacity: f64,
    /// Ping emphasis multiplier, above 1 right after reveal.
    pub intensity: f64,
    pub echo: EchoStrength,
    pub palette: EchoPalette,
}

impl FadedPoint {
    /// Final paint alpha, the fade scaled by the palette's base opacity.
    pub fn alpha(&self) -> f32 {
        (self.opacity * self.palette.base_opacity).clamp(0.0, 1.0) as f32
    }

    /// Glow radius in pixels with the ping emphasis applied.
    pub fn glow(&self) -> f32 {
        self.palette.glow * self.intensity as f32
    }
}

/// Result of one fade pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FadeFrame {
    pub points: Vec<FadedPoint>,
    pub expired: usize,
}

pub struct FadeManager {
    config: FadeConfig,
    revealed: Vec<RevealedPoint>,
}

impl FadeManager {
    pub fn new(config: FadeConfig) -> Self {
        Self {
            config,
            revealed: Vec::new(),
        }
    }

    pub fn revealed(&self) -> &[RevealedPoint] {
        &self.revealed
    }

    pub fn reveal(&mut self, detection: PendingDetection, now: Millis) {
        self.revealed.push(RevealedPoint {
            angle: detection.angle,
            distance: detection.distance,
            revealed_at: now,
        });
    }

    pub fn classify(&self, distance: f64) -> EchoStrength {
        if distance < self.config.strong_below_cm {
            EchoStrength::Strong
        } else if distance < self.config.medium_below_cm {
            EchoStrength::Medium
        } else {
            EchoStrength::Weak
        }
    }

    /// Drops expired points and returns the visual weight of the rest.
    ///
    /// Repeating the call with the same `now` yields the same points.
    pub fn tick(&mut self, now: Millis) -> FadeFrame {
        let lifetime = self.config.lifetime_ms;
        let before = self.revealed.len();
        self.revealed
            .retain(|point| age_at(point, now) < lifetime);
        let expired = before - self.revealed.len();

        let points = self
            .revealed
            .iter()
            .map(|point| self.weigh(point, now))
            .collect();

        FadeFrame { points, expired }
    }

    fn weigh(&self, point: &RevealedPoint, now: Millis) -> FadedPoint {
        let cfg = &self.config;
        let age = age_at(point, now);
        let progress = (age / cfg.fade_duration_ms).clamp(0.0, 1.0);
        let intensity = if age < cfg.ping_window_ms {
            cfg.ping_intensity
        } else {
            1.0
        };
        let echo = self.classify(point.distance);

        FadedPoint {
            angle: point.angle,
            distance: point.distance,
            age_ms: age,
            opacity: 1.0 - progress,
            intensity,
            echo,
            palette: echo.palette(cfg),
        }
    }
}

impl Default for FadeManager {
    fn default() -> Self {
        Self::new(FadeConfig::default())
    }
}

fn age_at(point: &RevealedPoint, now: Millis) -> Millis {
    (now - point.revealed_at).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(angle: f64, distance: f64) -> PendingDetection {
        PendingDetection {
            angle,
            distance,
            received_at: 0.0,
        }
    }

    #[test]
    fn tick_is_idempotent_for_same_instant() {
        let mut fade = FadeManager::default();
        fade.reveal(detection(30.0, 10.0), 0.0);
        fade.reveal(detection(60.0, 70.0), 500.0);
        let first = fade.tick(1200.0);
        let second = fade.tick(1200.0);
        assert_eq!(first.points, second.points);
        assert_eq!(second.expired, 0);
    }

    #[test]
    fn opacity_never_increases_and_point_expires_at_lifetime() {
        let mut fade = FadeManager::default();
        fade.reveal(detection(90.0, 35.0), 1000.0);

        let mut previous = f64::INFINITY;
        let mut now = 1000.0;
        while now < 4000.0 {
            let frame = fade.tick(now);
            assert_eq!(frame.points.len(), 1, "at {now}");
            let opacity = frame.points[0].opacity;
            assert!(opacity <= previous);
            assert!((0.0..=1.0).contains(&opacity));
            previous = opacity;
            now += 50.0;
        }
        assert_eq!(previous, 0.0);

        let frame = fade.tick(4000.0);
        assert!(frame.points.is_empty());
        assert_eq!(frame.expired, 1);
        assert!(fade.revealed().is_empty());
    }

    #[test]
    fn fade_reaches_zero_at_fade_duration() {
        let mut fade = FadeManager::default();
        fade.reveal(detection(90.0, 35.0), 0.0);
        assert_eq!(fade.tick(1000.0).points[0].opacity, 0.5);
        assert_eq!(fade.tick(2000.0).points[0].opacity, 0.0);
        assert_eq!(fade.tick(2999.0).points[0].opacity, 0.0);
    }

    #[test]
    fn ping_emphasis_only_right_after_reveal() {
        let mut fade = FadeManager::default();
        fade.reveal(detection(90.0, 35.0), 0.0);
        assert_eq!(fade.tick(0.0).points[0].intensity, 1.5);
        assert_eq!(fade.tick(199.0).points[0].intensity, 1.5);
        assert_eq!(fade.tick(200.0).points[0].intensity, 1.0);
    }

    #[test]
    fn palette_bucketed_by_distance() {
        let mut fade = FadeManager::default();
        fade.reveal(detection(20.0, 5.0), 0.0);
        fade.reveal(detection(40.0, 20.0), 0.0);
        fade.reveal(detection(60.0, 49.9), 0.0);
        fade.reveal(detection(80.0, 50.0), 0.0);

        let frame = fade.tick(0.0);
        let echoes: Vec<_> = frame.points.iter().map(|p| p.echo).collect();
        assert_eq!(
            echoes,
            vec![
                EchoStrength::Strong,
                EchoStrength::Medium,
                EchoStrength::Medium,
                EchoStrength::Weak
            ]
        );
        assert!((frame.points[3].alpha() - 0.3).abs() < 1e-6);
        assert_eq!(frame.points[0].alpha(), 1.0);
    }

    #[test]
    fn age_is_never_negative() {
        let mut fade = FadeManager::default();
        fade.reveal(detection(90.0, 35.0), 500.0);
        let frame = fade.tick(100.0);
        assert_eq!(frame.points[0].age_ms, 0.0);
        assert_eq!(frame.points[0].opacity, 1.0);
    }
}
