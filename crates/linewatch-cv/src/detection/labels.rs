//! Class names of the detection model

use crate::Result;
use anyhow::{Context, ensure};
use std::fs;
use std::path::Path;

/// Classes of the COCO dataset, in model output order
pub const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch", "potted plant",
    "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone",
    "microwave", "oven", "toaster", "sink", "refrigerator", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

pub fn coco_class_names() -> Vec<String> {
    COCO_CLASSES.iter().map(|name| name.to_string()).collect()
}

/// Parse one class name per line, ignoring blank lines
pub fn parse_class_names(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Load class names from a text file
pub fn load_class_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read class names: {:?}", path))?;

    let names = parse_class_names(&content);
    ensure!(!names.is_empty(), "No class names in {:?}", path);
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coco_vehicle_ids() {
        let names = coco_class_names();
        assert_eq!(names.len(), 80);
        assert_eq!(names[2], "car");
        assert_eq!(names[3], "motorcycle");
        assert_eq!(names[7], "truck");
    }

    #[test]
    fn test_parse_class_names() {
        let names = parse_class_names("car\n\n  truck \r\nbus\n");
        assert_eq!(names, vec!["car", "truck", "bus"]);
    }

    #[test]
    fn test_missing_file() {
        assert!(load_class_names("does/not/exist.names").is_err());
    }
}
