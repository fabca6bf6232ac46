//! Interactive selection of the line of interest

use crate::Result;
use crate::bbox::Scale;
use crate::display::{DisplayConfig, annotate, is_quit_key};
use crate::utils::ImageUtils;
use anyhow::Context;
use linewatch_core::traits::LineSelector;
use linewatch_core::{LineSegment, Point};
use opencv::{core::Mat, highgui};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Clicks collected by the mouse callback, in window coordinates
#[derive(Debug, Default)]
struct Clicks {
    points: Vec<Point>,
}

impl Clicks {
    /// Record a click, ignoring any beyond the second
    fn push(&mut self, point: Point) -> bool {
        if self.points.len() >= 2 {
            return false;
        }
        self.points.push(point);
        true
    }

    fn line(&self) -> Option<LineSegment> {
        match self.points.as_slice() {
            [p1, p2, ..] => Some(LineSegment::new(*p1, *p2)),
            _ => None,
        }
    }
}

/// Lets the user click the two endpoints of the line on the first frame.
///
/// The frame is shown at the display size; clicks are mapped back to the
/// capture resolution. Pressing `q` or Esc cancels.
pub struct HighGuiLineSelector {
    config: DisplayConfig,
}

impl HighGuiLineSelector {
    pub fn new(config: DisplayConfig) -> Self {
        Self { config }
    }

    fn run_window(
        &self,
        preview: &Mat,
        clicks: &Arc<Mutex<Clicks>>,
    ) -> Result<Option<LineSegment>> {
        let window = self.config.setup_window_name.as_str();
        highgui::named_window(window, highgui::WINDOW_NORMAL)
            .with_context(|| format!("Failed to open window {}", window))?;

        let callback_clicks = Arc::clone(clicks);
        highgui::set_mouse_callback(
            window,
            Some(Box::new(move |event, x, y, _flags| {
                if event != highgui::EVENT_LBUTTONDOWN {
                    return;
                }
                let mut clicks = callback_clicks
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                if clicks.push(Point::new(x as f64, y as f64)) {
                    debug!("Line point {} at ({}, {})", clicks.points.len(), x, y);
                }
            })),
        )?;

        info!("Click the two endpoints of the line of interest, 'q' to cancel");
        loop {
            let points = clicks
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .points
                .clone();

            let mut canvas = preview.clone();
            annotate::draw_selection(&mut canvas, &points)?;
            highgui::imshow(window, &canvas)?;

            if let Some(line) = clicks.lock().unwrap_or_else(PoisonError::into_inner).line() {
                return Ok(Some(line));
            }
            if is_quit_key(highgui::wait_key(1)?) {
                info!("Line selection cancelled");
                return Ok(None);
            }
        }
    }
}

impl LineSelector<Mat> for HighGuiLineSelector {
    fn select(&mut self, first_frame: &Mat) -> Result<Option<LineSegment>> {
        let frame_size = ImageUtils::size(first_frame)?;
        let preview = ImageUtils::resize(first_frame, self.config.size())?;
        let to_frame = Scale::between(self.config.size(), frame_size);

        let clicks = Arc::new(Mutex::new(Clicks::default()));
        let result = self.run_window(&preview, &clicks);

        if let Err(e) = highgui::destroy_window(&self.config.setup_window_name) {
            warn!("Failed to close window {}: {}", self.config.setup_window_name, e);
        }

        Ok(result?.map(|line| to_frame.line(&line)))
    }
}
