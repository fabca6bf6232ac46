//! Detection configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// YOLO detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// ONNX export of a YOLOv8 detection model
    pub model_path: PathBuf,
    /// Square network input side, in pixels
    pub input_size: i32,
    pub confidence_threshold: f64,
    /// IoU above which same-class boxes are suppressed
    pub iou_threshold: f64,
    /// One class name per line; the COCO names when unset
    pub class_names_path: Option<PathBuf>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: "yolov8s.onnx".into(),
            input_size: 640,
            confidence_threshold: 0.3,
            iou_threshold: 0.5,
            class_names_path: None,
        }
    }
}
