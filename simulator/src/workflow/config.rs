use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use sweepcore::RadarConfig;

use crate::generator::ServoConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub bind: String,
    pub port: u16,
    /// Simulated time covered by an offline run.
    pub offline_seconds: f64,
    /// Display refresh rate emulated by an offline run.
    pub frames_per_second: f64,
    pub servo: ServoConfig,
    pub radar: RadarConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8080,
            offline_seconds: 30.0,
            frames_per_second: 60.0,
            servo: ServoConfig::default(),
            radar: RadarConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .radar
            .validate()
            .with_context(|| format!("validating workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.bind, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_bind_localhost() {
        let cfg = WorkflowConfig::default();
        assert_eq!(cfg.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"port: 9100\nservo:\n  step_deg: 1.0\n  obstacles:\n    - angle: 60\n      half_width: 2\n      distance: 12\nradar:\n  queue:\n    tolerance_deg: 4.0\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.servo.step_deg, 1.0);
        assert_eq!(cfg.servo.obstacles.len(), 1);
        assert_eq!(cfg.radar.queue.tolerance_deg, 4.0);
        assert_eq!(cfg.radar.fade.lifetime_ms, 3000.0);
    }

    #[test]
    fn config_load_rejects_invalid_radar_section() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"radar:\n  sweep:\n    smoothing: 3.0\n").unwrap();
        let path = temp.into_temp_path();
        assert!(WorkflowConfig::load(&path).is_err());
    }
}
