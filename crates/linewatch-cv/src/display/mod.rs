//! Preview window for tracking sessions

pub mod annotate;

use crate::Result;
use crate::utils::ImageUtils;
use anyhow::Context;
use linewatch_core::traits::DisplaySink;
use linewatch_core::{FrameOverlay, TrackerHandle};
use opencv::{
    core::{Mat, Size},
    highgui,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const KEY_ESC: i32 = 27;
const KEY_QUIT: i32 = b'q' as i32;

/// Window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Size frames are shown at, regardless of capture resolution
    pub width: i32,
    pub height: i32,
    pub window_name: String,
    /// Window used to pick the line of interest
    pub setup_window_name: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
            window_name: "Tracking".to_string(),
            setup_window_name: "Setup".to_string(),
        }
    }
}

impl DisplayConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Whether a `wait_key` result asks to quit
pub(crate) fn is_quit_key(key: i32) -> bool {
    key >= 0 && matches!(key & 0xFF, KEY_QUIT | KEY_ESC)
}

/// Shows annotated frames in a HighGUI window.
///
/// Pressing `q` or Esc asks the tracker to stop through its handle.
pub struct HighGuiDisplay {
    config: DisplayConfig,
    stop: Option<TrackerHandle>,
    window_open: bool,
}

impl HighGuiDisplay {
    pub fn new(config: DisplayConfig) -> Self {
        Self {
            config,
            stop: None,
            window_open: false,
        }
    }

    /// Stop this tracker when the user quits from the window
    pub fn with_stop_handle(mut self, handle: TrackerHandle) -> Self {
        self.stop = Some(handle);
        self
    }

    fn ensure_window(&mut self) -> Result<()> {
        if !self.window_open {
            highgui::named_window(&self.config.window_name, highgui::WINDOW_AUTOSIZE)
                .with_context(|| format!("Failed to open window {}", self.config.window_name))?;
            self.window_open = true;
            debug!("Opened window {}", self.config.window_name);
        }
        Ok(())
    }
}

impl DisplaySink<Mat> for HighGuiDisplay {
    fn render(&mut self, mut frame: Mat, overlay: &FrameOverlay) -> Result<()> {
        annotate::draw_overlay(&mut frame, overlay)?;
        let resized = ImageUtils::resize(&frame, self.config.size())?;

        self.ensure_window()?;
        highgui::imshow(&self.config.window_name, &resized)?;

        let key = highgui::wait_key(1)?;
        if is_quit_key(key) {
            info!("Quit requested from the display window");
            match &self.stop {
                Some(handle) => handle.stop(),
                None => warn!("No tracker handle attached, ignoring quit key"),
            }
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.window_open {
            if let Err(e) = highgui::destroy_window(&self.config.window_name) {
                warn!("Failed to close window {}: {}", self.config.window_name, e);
            }
            self.window_open = false;
        }
    }
}
