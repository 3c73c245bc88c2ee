use crate::prelude::{RadarError, RadarResult};
use serde::{Deserialize, Serialize};

/// One angle/distance reading as delivered on the radar topic.
///
/// Extra fields in the message body are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    /// Servo angle in degrees, nominally 0-180.
    pub angle: f64,
    /// Echo distance in centimetres.
    pub distance: f64,
}

impl SensorSample {
    pub fn new(angle: f64, distance: f64) -> Self {
        Self { angle, distance }
    }

    /// Parses a message body. Missing or non-numeric fields are malformed.
    pub fn parse(body: &str) -> RadarResult<Self> {
        let sample: SensorSample = serde_json::from_str(body)
            .map_err(|err| RadarError::MalformedMessage(err.to_string()))?;
        if !sample.angle.is_finite() || !sample.distance.is_finite() {
            return Err(RadarError::MalformedMessage(
                "angle and distance must be finite".into(),
            ));
        }
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_record_with_extra_fields() {
        let sample =
            SensorSample::parse(r#"{"id":"a1","angle":45.5,"distance":23.25}"#).unwrap();
        assert_eq!(sample, SensorSample::new(45.5, 23.25));
    }

    #[test]
    fn missing_or_non_numeric_fields_are_malformed() {
        for body in [
            r#"{"angle": 10}"#,
            r#"{"distance": 10}"#,
            r#"{"angle": "10", "distance": 3}"#,
            r#"{"angle": null, "distance": 3}"#,
            "not json",
            "",
        ] {
            assert!(
                matches!(SensorSample::parse(body), Err(RadarError::MalformedMessage(_))),
                "{body}"
            );
        }
    }
}
