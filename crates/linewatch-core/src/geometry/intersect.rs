//! Segment/box intersection test

use super::{BoundingBox, LineSegment, Point};

/// Sign of the turn `a -> b -> c`: `1` counter-clockwise, `-1` clockwise, `0` collinear.
fn orientation(a: Point, b: Point, c: Point) -> i8 {
    let cross = (c.y - a.y) * (b.x - a.x) - (b.y - a.y) * (c.x - a.x);
    if cross > 0.0 {
        1
    } else if cross < 0.0 {
        -1
    } else {
        0
    }
}

/// Segment `ab` against segment `cd`.
///
/// Fully collinear pairs have every orientation equal to zero and are never reported,
/// even when they overlap.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    orientation(a, c, d) != orientation(b, c, d) && orientation(a, b, c) != orientation(a, b, d)
}

/// Whether `line` touches `bbox`.
///
/// Each of the four box edges is tested against the line first. A line lying
/// completely inside the box crosses no edge, so an endpoint inside the closed
/// bounds also counts.
pub fn intersects(line: &LineSegment, bbox: &BoundingBox) -> bool {
    let corners = bbox.corners();

    let crosses_edge = (0..corners.len()).any(|i| {
        let start = corners[i];
        let end = corners[(i + 1) % corners.len()];
        segments_intersect(line.p1, line.p2, start, end)
    });

    crosses_edge || bbox.contains(line.p1) || bbox.contains(line.p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> LineSegment {
        LineSegment::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn test_diagonal_through_box() {
        let diagonal = line(0.0, 0.0, 10.0, 10.0);
        assert!(intersects(&diagonal, &BoundingBox::new(2.0, 2.0, 8.0, 8.0)));
        assert!(!intersects(&diagonal, &BoundingBox::new(20.0, 20.0, 30.0, 30.0)));
    }

    #[test]
    fn test_line_outside_small_box() {
        let outside = line(5.0, 5.0, 6.0, 6.0);
        assert!(!intersects(&outside, &BoundingBox::new(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_line_fully_inside_box() {
        let inside = line(1.0, 1.0, 2.0, 2.0);
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);

        let crosses_edge = bbox
            .corners()
            .iter()
            .zip(bbox.corners().iter().cycle().skip(1))
            .any(|(c, d)| segments_intersect(inside.p1, inside.p2, *c, *d));
        assert!(!crosses_edge);
        assert!(intersects(&inside, &bbox));
    }

    #[test]
    fn test_one_endpoint_inside() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(intersects(&line(5.0, 5.0, 50.0, 5.0), &bbox));
    }

    #[test]
    fn test_horizontal_crossing_without_endpoints_inside() {
        let bbox = BoundingBox::new(100.0, 100.0, 200.0, 180.0);
        assert!(intersects(&line(0.0, 150.0, 640.0, 150.0), &bbox));
        assert!(!intersects(&line(0.0, 90.0, 640.0, 90.0), &bbox));
    }

    #[test]
    fn test_collinear_segments_not_reported() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!(!segments_intersect(a, b, Point::new(2.0, 0.0), Point::new(8.0, 0.0)));
    }

    #[test]
    fn test_collinear_with_edge_outside_box() {
        // Same supporting line as the top edge, but beyond the right corner
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(!intersects(&line(12.0, 0.0, 20.0, 0.0), &bbox));
        assert!(!intersects(&line(20.0, 0.0, 12.0, 0.0), &bbox));
    }

    #[test]
    fn test_endpoint_order_independence() {
        let boxes = [
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            BoundingBox::new(3.0, 4.0, 7.0, 5.0),
            BoundingBox::new(5.0, 0.0, 8.0, 5.0),
            BoundingBox::new(-4.0, 2.0, 0.0, 12.0),
        ];

        for bbox in &boxes {
            for x1 in (-6..=16).step_by(3) {
                for y1 in (-6..=16).step_by(4) {
                    for x2 in (-5..=15).step_by(5) {
                        for y2 in (-5..=15).step_by(2) {
                            let segment = line(x1 as f64, y1 as f64, x2 as f64, y2 as f64);
                            assert_eq!(
                                intersects(&segment, bbox),
                                intersects(&segment.reversed(), bbox),
                                "asymmetric result for {} against {:?}",
                                segment,
                                bbox
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_disjoint_with_gap() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(!intersects(&line(11.0, -5.0, 30.0, 20.0), &bbox));
        assert!(!intersects(&line(-5.0, 11.0, 20.0, 11.0), &bbox));
    }

    #[test]
    fn test_inputs_untouched() {
        let segment = line(0.0, 0.0, 10.0, 10.0);
        let bbox = BoundingBox::new(2.0, 2.0, 8.0, 8.0);
        let _ = intersects(&segment, &bbox);
        assert_eq!(segment, line(0.0, 0.0, 10.0, 10.0));
        assert_eq!(bbox, BoundingBox::new(2.0, 2.0, 8.0, 8.0));
    }
}
