use crate::prelude::{RadarError, RadarResult};
use crate::wire::sample::SensorSample;
use serde::{Deserialize, Serialize};

/// Record posted by the sensor bridge and fanned out to subscribers.
///
/// Every field is optional on the wire so that a missing one can be
/// reported precisely instead of failing deserialisation wholesale.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RadarRecord {
    pub id: Option<String>,
    pub distance: Option<f64>,
    pub angle: Option<f64>,
}

impl RadarRecord {
    pub fn new(id: impl Into<String>, angle: f64, distance: f64) -> Self {
        Self {
            id: Some(id.into()),
            distance: Some(distance),
            angle: Some(angle),
        }
    }

    /// Checks that id, distance and angle are all present.
    pub fn validate(&self) -> RadarResult<SensorSample> {
        if self.id.as_deref().map_or(true, |id| id.trim().is_empty()) {
            return Err(RadarError::InvalidRecord("missing id".into()));
        }
        let distance = self
            .distance
            .ok_or_else(|| RadarError::InvalidRecord("missing distance".into()))?;
        let angle = self
            .angle
            .ok_or_else(|| RadarError::InvalidRecord("missing angle".into()))?;
        Ok(SensorSample::new(angle, distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_record_yields_sample() {
        let record = RadarRecord::new("r-1", 90.0, 12.5);
        assert_eq!(record.validate().unwrap(), SensorSample::new(90.0, 12.5));
    }

    #[test]
    fn each_missing_field_is_reported() {
        let mut record = RadarRecord::new("r-1", 90.0, 12.5);
        record.id = None;
        assert_eq!(
            record.validate(),
            Err(RadarError::InvalidRecord("missing id".into()))
        );

        let mut record = RadarRecord::new("r-1", 90.0, 12.5);
        record.distance = None;
        assert_eq!(
            record.validate(),
            Err(RadarError::InvalidRecord("missing distance".into()))
        );

        let mut record = RadarRecord::new("r-1", 90.0, 12.5);
        record.angle = None;
        assert_eq!(
            record.validate(),
            Err(RadarError::InvalidRecord("missing angle".into()))
        );
    }

    #[test]
    fn serialized_record_parses_as_sample() {
        let body = serde_json::to_string(&RadarRecord::new("r-2", 30.0, 70.0)).unwrap();
        assert_eq!(SensorSample::parse(&body).unwrap(), SensorSample::new(30.0, 70.0));
    }
}
