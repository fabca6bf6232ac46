//! Drawing of tracker overlays on frames

use crate::Result;
use crate::bbox::{to_cv_point, to_rect};
use linewatch_core::{FrameOverlay, LineSegment, Point};
use opencv::{
    core::{self, Mat, Scalar},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
};

// BGR
pub const BOX_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0);
pub const LINE_COLOR: (f64, f64, f64) = (0.0, 255.0, 255.0);
pub const PENDING_LINE_COLOR: (f64, f64, f64) = (255.0, 0.0, 0.0);
pub const POINT_COLOR: (f64, f64, f64) = (0.0, 0.0, 255.0);

fn scalar((b, g, r): (f64, f64, f64)) -> Scalar {
    Scalar::new(b, g, r, 0.0)
}

/// Draw the crossing boxes with their labels, then the line of interest
pub fn draw_overlay(frame: &mut Mat, overlay: &FrameOverlay) -> Result<()> {
    let color = scalar(BOX_COLOR);
    for detection in &overlay.intersecting {
        let rect = to_rect(&detection.bbox);
        imgproc::rectangle(frame, rect, color, 2, LINE_8, 0)?;
        imgproc::put_text(
            frame,
            &detection.label,
            core::Point::new(rect.x, rect.y.saturating_sub(5)),
            FONT_HERSHEY_SIMPLEX,
            0.5,
            color,
            1,
            LINE_8,
            false,
        )?;
    }

    draw_line(frame, &overlay.line, scalar(LINE_COLOR))
}

/// Draw the points clicked so far and, once both exist, the pending line
pub fn draw_selection(frame: &mut Mat, points: &[Point]) -> Result<()> {
    for point in points {
        imgproc::circle(
            frame,
            to_cv_point(*point),
            5,
            scalar(POINT_COLOR),
            -1,
            LINE_8,
            0,
        )?;
    }
    if let [p1, p2, ..] = points {
        draw_line(frame, &LineSegment::new(*p1, *p2), scalar(PENDING_LINE_COLOR))?;
    }
    Ok(())
}

fn draw_line(frame: &mut Mat, line: &LineSegment, color: Scalar) -> Result<()> {
    imgproc::line(
        frame,
        to_cv_point(line.p1),
        to_cv_point(line.p2),
        color,
        2,
        LINE_8,
        0,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ImageUtils;
    use linewatch_core::{BoundingBox, Detection};
    use opencv::core::{Size, Vec3b};
    use opencv::prelude::*;

    fn pixel(frame: &Mat, x: i32, y: i32) -> Result<Vec3b> {
        Ok(*frame.at_2d::<Vec3b>(y, x)?)
    }

    #[test]
    fn test_overlay_draws_boxes_and_line() -> Result<()> {
        let mut frame = ImageUtils::blank(Size::new(200, 100), Scalar::all(0.0))?;
        let overlay = FrameOverlay {
            index: 1,
            line: LineSegment::new(Point::new(0.0, 80.0), Point::new(199.0, 80.0)),
            intersecting: vec![Detection::new(
                "car",
                0.9,
                BoundingBox::new(20.0, 20.0, 60.0, 90.0),
            )],
            crossing: true,
        };

        draw_overlay(&mut frame, &overlay)?;

        // Left edge of the box, away from the line
        assert_eq!(pixel(&frame, 20, 50)?, Vec3b::from([0, 255, 0]));
        // The line is drawn last, over the box
        assert_eq!(pixel(&frame, 20, 80)?, Vec3b::from([0, 255, 255]));
        assert_eq!(pixel(&frame, 150, 80)?, Vec3b::from([0, 255, 255]));
        // Untouched background
        assert_eq!(pixel(&frame, 150, 20)?, Vec3b::from([0, 0, 0]));
        Ok(())
    }

    #[test]
    fn test_selection_draws_points_then_line() -> Result<()> {
        let mut frame = ImageUtils::blank(Size::new(100, 100), Scalar::all(0.0))?;

        draw_selection(&mut frame, &[Point::new(10.0, 50.0)])?;
        assert_eq!(pixel(&frame, 10, 50)?, Vec3b::from([0, 0, 255]));
        assert_eq!(pixel(&frame, 50, 50)?, Vec3b::from([0, 0, 0]));

        draw_selection(&mut frame, &[Point::new(10.0, 50.0), Point::new(90.0, 50.0)])?;
        assert_eq!(pixel(&frame, 50, 50)?, Vec3b::from([255, 0, 0]));
        Ok(())
    }
}
