//! Application configuration file

use crate::logging::LogConfig;
use anyhow::Context;
use linewatch_core::{LineSegment, TrackerConfig};
use linewatch_cv::{DetectorConfig, DisplayConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Everything a tracking run can be configured with. Every field is optional in
/// the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tracker: TrackerConfig,
    pub detector: DetectorConfig,
    pub display: DisplayConfig,
    /// Preset line of interest, skipping interactive selection
    pub line: Option<LineSegment>,
    /// How often the main thread samples the tracker status
    pub status_poll_interval_ms: u64,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            detector: DetectorConfig::default(),
            display: DisplayConfig::default(),
            line: None,
            status_poll_interval_ms: 1000,
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid config: {:?}", path))
    }

    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_millis(self.status_poll_interval_ms.max(1))
    }
}
