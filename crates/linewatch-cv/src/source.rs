//! Frame source backed by OpenCV video capture

use crate::Result;
use anyhow::{Context, bail};
use linewatch_core::traits::FrameSource;
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

/// Where frames come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoInput {
    File(PathBuf),
    /// Network stream such as `rtsp://...` or `http://...`
    Url(String),
    /// Local camera index
    Camera(i32),
}

impl FromStr for VideoInput {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty video source".to_string());
        }
        if let Ok(index) = s.parse::<i32>() {
            if index < 0 {
                return Err(format!("invalid camera index: {}", index));
            }
            return Ok(VideoInput::Camera(index));
        }
        if s.contains("://") {
            return Ok(VideoInput::Url(s.to_string()));
        }
        Ok(VideoInput::File(PathBuf::from(s)))
    }
}

impl fmt::Display for VideoInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoInput::File(path) => write!(f, "{}", path.display()),
            VideoInput::Url(url) => f.write_str(url),
            VideoInput::Camera(index) => write!(f, "camera {}", index),
        }
    }
}

/// Sequential frames of a video file, stream or camera
pub struct VideoSource {
    input: VideoInput,
    capture: Option<VideoCapture>,
    frames_read: u64,
}

impl VideoSource {
    pub fn new(input: VideoInput) -> Self {
        Self {
            input,
            capture: None,
            frames_read: 0,
        }
    }

    fn create_capture(&self) -> Result<VideoCapture> {
        let capture = match &self.input {
            VideoInput::File(path) => {
                if !path.exists() {
                    bail!("Video file not found: {:?}", path);
                }
                let path = path
                    .to_str()
                    .with_context(|| format!("Video path is not valid UTF-8: {:?}", path))?;
                VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
            VideoInput::Url(url) => VideoCapture::from_file(url, videoio::CAP_ANY)?,
            VideoInput::Camera(index) => VideoCapture::new(*index, videoio::CAP_ANY)?,
        };
        Ok(capture)
    }
}

impl FrameSource<Mat> for VideoSource {
    fn open(&mut self) -> Result<()> {
        let capture = self
            .create_capture()
            .with_context(|| format!("Failed to open video source: {}", self.input))?;
        if !capture.is_opened()? {
            bail!("Failed to open video source: {}", self.input);
        }

        let fps = capture.get(videoio::CAP_PROP_FPS).unwrap_or(0.0);
        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH).unwrap_or(0.0);
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT).unwrap_or(0.0);
        info!(
            "Opened {}: {}x{} at {:.1} FPS",
            self.input, width as i32, height as i32, fps
        );

        self.capture = Some(capture);
        self.frames_read = 0;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let Some(capture) = self.capture.as_mut() else {
            bail!("Video source {} is not open", self.input);
        };

        let mut frame = Mat::default();
        if !capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }

        self.frames_read += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.release() {
                warn!("Failed to release {}: {}", self.input, e);
            }
            info!("Released {} after {} frames", self.input, self.frames_read);
        }
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        self.release();
    }
}
