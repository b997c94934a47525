//! Bridge configuration

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use paddle_calibration::CalibrationRange;
use paddle_hid::AxisScale;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BridgeError, BridgeResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Seconds between status log lines
    pub status_interval_secs: u64,
    /// Packets held between the receiver and the worker
    pub queue_capacity: usize,
    /// Capture window used by `calibrate` without an explicit duration
    pub default_calibration_ms: u64,
    pub axis_scale: AxisScale,
    /// UDP address the development transport listens on
    pub listen: SocketAddr,
    /// Range applied at start-up instead of the identity mapping
    pub initial_calibration: Option<CalibrationRange>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            status_interval_secs: 10,
            queue_capacity: 32,
            default_calibration_ms: 5_000,
            axis_scale: AxisScale::Wide,
            listen: SocketAddr::from(([0, 0, 0, 0], 4210)),
            initial_calibration: None,
        }
    }
}

impl BridgeConfig {
    /// Loads a YAML (`.yaml`/`.yml`) or JSON file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if the file cannot be read, parsed or
    /// fails [`validate`](Self::validate).
    pub fn load(path: &Path) -> BridgeResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::parse(&content, is_yaml(path))?;
        config.validate()?;
        debug!(path = %path.display(), "loaded bridge config");
        Ok(config)
    }

    /// Loads `path` if given, falling back to defaults with a warning.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        Self::load(path).unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if the text is not valid for the format.
    pub fn parse(content: &str, yaml: bool) -> BridgeResult<Self> {
        if yaml {
            serde_yaml::from_str(content).map_err(|e| BridgeError::Config(e.to_string()))
        } else {
            serde_json::from_str(content).map_err(|e| BridgeError::Config(e.to_string()))
        }
    }

    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] for a zero queue capacity or status
    /// interval.
    pub fn validate(&self) -> BridgeResult<()> {
        if self.queue_capacity == 0 {
            return Err(BridgeError::Config("queue_capacity must be at least 1".into()));
        }
        if self.status_interval_secs == 0 {
            return Err(BridgeError::Config(
                "status_interval_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}
