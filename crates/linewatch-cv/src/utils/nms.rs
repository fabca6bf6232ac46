//! Non-maximum suppression over labeled detections

use linewatch_core::Detection;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Greedy IoU suppression, highest confidence first
pub struct NonMaxSuppression;

impl NonMaxSuppression {
    /// Suppress overlapping boxes regardless of their label
    pub fn apply(mut detections: Vec<Detection>, threshold: f64) -> Vec<Detection> {
        if detections.is_empty() {
            return detections;
        }

        sort_by_confidence(&mut detections);

        let mut keep: Vec<Detection> = Vec::with_capacity(detections.len());
        for detection in detections {
            if keep
                .iter()
                .all(|kept| kept.bbox.iou(&detection.bbox) <= threshold)
            {
                keep.push(detection);
            }
        }
        keep
    }

    /// Suppress overlapping boxes within each label only
    pub fn apply_per_class(detections: Vec<Detection>, threshold: f64) -> Vec<Detection> {
        let mut groups: HashMap<String, Vec<Detection>> = HashMap::new();
        for detection in detections {
            groups
                .entry(detection.label.clone())
                .or_default()
                .push(detection);
        }

        let mut result: Vec<Detection> = groups
            .into_values()
            .flat_map(|group| Self::apply(group, threshold))
            .collect();
        sort_by_confidence(&mut result);
        result
    }
}

fn sort_by_confidence(detections: &mut [Detection]) {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use linewatch_core::BoundingBox;

    fn det(label: &str, confidence: f64, x: f64, y: f64) -> Detection {
        Detection::new(label, confidence, BoundingBox::from_xywh(x, y, 10.0, 10.0))
    }

    #[test]
    fn test_nms_keeps_best_of_overlap() {
        let result = NonMaxSuppression::apply(
            vec![
                det("car", 0.8, 1.0, 1.0),
                det("car", 0.9, 0.0, 0.0),
                det("car", 0.7, 20.0, 20.0),
            ],
            0.5,
        );

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].confidence, 0.9);
        assert_eq!(result[1].confidence, 0.7);
    }

    #[test]
    fn test_class_nms_keeps_other_labels() {
        let result = NonMaxSuppression::apply_per_class(
            vec![
                det("car", 0.9, 0.0, 0.0),
                det("truck", 0.8, 1.0, 1.0),
                det("car", 0.6, 1.0, 1.0),
            ],
            0.5,
        );

        let labels: Vec<_> = result.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["car", "truck"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(NonMaxSuppression::apply_per_class(Vec::new(), 0.5).is_empty());
    }
}
