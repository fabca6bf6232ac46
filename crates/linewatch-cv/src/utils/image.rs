//! Frame helpers on top of OpenCV

use crate::Result;
use anyhow::{Context, bail};
use opencv::{
    core::{CV_8UC3, Mat, Scalar, Size},
    imgproc::{self, INTER_LINEAR},
    prelude::*,
};

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Pixel size of a frame
    pub fn size(frame: &Mat) -> Result<Size> {
        frame.size().context("Failed to read frame size")
    }

    /// Copy of `frame` resized to exactly `size`
    pub fn resize(frame: &Mat, size: Size) -> Result<Mat> {
        if frame.empty() {
            bail!("Cannot resize an empty frame");
        }
        if Self::size(frame)? == size {
            return Ok(frame.clone());
        }

        let mut resized = Mat::default();
        imgproc::resize(frame, &mut resized, size, 0.0, 0.0, INTER_LINEAR)
            .with_context(|| format!("Failed to resize frame to {}x{}", size.width, size.height))?;
        Ok(resized)
    }

    /// Solid 8-bit BGR frame
    pub fn blank(size: Size, color: Scalar) -> Result<Mat> {
        Mat::new_rows_cols_with_default(size.height, size.width, CV_8UC3, color)
            .context("Failed to allocate frame")
    }
}
