//! Tracker configuration

use crate::detection::TargetClasses;
use serde::{Deserialize, Serialize};

/// Frame loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Detection labels eligible for intersection testing
    pub target_classes: Vec<String>,
    /// Processed frames between throughput log lines (0 disables)
    pub status_log_interval: u64,
    /// Keep testing detections after the first hit so every crossing box is drawn
    pub annotate_crossings: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            target_classes: vec!["car".into(), "motorcycle".into(), "truck".into()],
            status_log_interval: 30,
            annotate_crossings: true,
        }
    }
}

impl TrackerConfig {
    pub fn target_classes(&self) -> TargetClasses {
        TargetClasses::new(self.target_classes.iter().cloned())
    }
}
