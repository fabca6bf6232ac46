//! Conversions between tracker geometry and OpenCV types
//!
//! Frames are shown and fed to the network at different resolutions than they
//! are captured at; [`Scale`] maps coordinates between those spaces.

use linewatch_core::{BoundingBox, LineSegment, Point};
use opencv::core::{self, Rect, Size};

/// Per-axis factor from one image resolution to another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    pub const IDENTITY: Scale = Scale { x: 1.0, y: 1.0 };

    /// Factor taking coordinates in `from` to coordinates in `to`.
    ///
    /// Degenerate sizes map to the identity.
    pub fn between(from: Size, to: Size) -> Self {
        if from.width <= 0 || from.height <= 0 || to.width <= 0 || to.height <= 0 {
            return Self::IDENTITY;
        }
        Self {
            x: to.width as f64 / from.width as f64,
            y: to.height as f64 / from.height as f64,
        }
    }

    pub fn point(&self, point: Point) -> Point {
        Point::new(point.x * self.x, point.y * self.y)
    }

    pub fn line(&self, line: &LineSegment) -> LineSegment {
        LineSegment::new(self.point(line.p1), self.point(line.p2))
    }

    pub fn bbox(&self, bbox: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            bbox.x1 * self.x,
            bbox.y1 * self.y,
            bbox.x2 * self.x,
            bbox.y2 * self.y,
        )
    }
}

/// Convert to an OpenCV pixel point
pub fn to_cv_point(point: Point) -> core::Point {
    core::Point::new(point.x.round() as i32, point.y.round() as i32)
}

/// Convert to an OpenCV rectangle
pub fn to_rect(bbox: &BoundingBox) -> Rect {
    let x = bbox.x1.round() as i32;
    let y = bbox.y1.round() as i32;
    Rect::new(
        x,
        y,
        bbox.x2.round() as i32 - x,
        bbox.y2.round() as i32 - y,
    )
}
