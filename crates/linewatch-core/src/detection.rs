//! Detections reported for a single frame and the target-class allowlist

use crate::geometry::BoundingBox;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One object reported by a detection backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f64, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }
}

/// Labels eligible for intersection testing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetClasses {
    labels: HashSet<String>,
}

impl TargetClasses {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Detection is in the allowlist and its box is usable
    pub fn retains(&self, detection: &Detection) -> bool {
        self.contains(&detection.label) && detection.bbox.is_valid()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist_filtering() {
        let targets = TargetClasses::new(["car", "truck"]);
        let bbox = BoundingBox::new(0.0, 0.0, 4.0, 4.0);

        assert!(targets.retains(&Detection::new("car", 0.9, bbox)));
        assert!(!targets.retains(&Detection::new("person", 0.9, bbox)));
        assert!(!targets.retains(&Detection::new("Car", 0.9, bbox)));
    }

    #[test]
    fn test_invalid_box_not_retained() {
        let targets = TargetClasses::new(["car"]);
        let inverted = BoundingBox::new(4.0, 0.0, 0.0, 4.0);

        assert!(!targets.retains(&Detection::new("car", 0.9, inverted)));
    }
}
