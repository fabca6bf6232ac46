//! Linewatch Computer Vision Library
//!
//! OpenCV implementations of the tracker collaborators: video capture, YOLO
//! detection through the DNN module, interactive line selection and the
//! annotated preview window.

pub mod bbox;
pub mod detection;
pub mod display;
pub mod selector;
pub mod source;
pub mod utils;

// Re-export commonly used types
pub use detection::{DetectorConfig, YoloDetector};
pub use display::{DisplayConfig, HighGuiDisplay};
pub use selector::HighGuiLineSelector;
pub use source::{VideoInput, VideoSource};

// Frame type of every collaborator in this crate
pub use opencv::core::Mat;

// Error handling
pub type Result<T> = anyhow::Result<T>;
