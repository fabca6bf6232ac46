//! Object detection backend

pub mod config;
pub mod detector;
pub mod labels;

pub use config::DetectorConfig;
pub use detector::YoloDetector;
