//! Per-frame evaluation: detect, filter, test against the line, publish, display

use crate::config::TrackerConfig;
use crate::detection::{Detection, TargetClasses};
use crate::error::FrameProcessingError;
use crate::geometry::{LineSegment, intersects};
use crate::status::StatusRegister;
use crate::traits::{DetectionBackend, DisplaySink, FrameSource};
use std::time::Instant;
use tracing::{debug, info, warn};

/// What the display needs to annotate a frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOverlay {
    /// 1-based index among frames handed to the detection backend
    pub index: u64,
    pub line: LineSegment,
    /// Retained detections touching the line
    pub intersecting: Vec<Detection>,
    /// Whether this frame counts as a crossing
    pub crossing: bool,
}

/// Keeps the frame source and display open for one session.
///
/// Both are released when the guard goes out of scope, whichever way the
/// session ends.
pub(crate) struct SessionGuard<'a, F> {
    source: &'a mut (dyn FrameSource<F> + Send),
    display: &'a mut (dyn DisplaySink<F> + Send),
}

impl<'a, F> SessionGuard<'a, F> {
    pub(crate) fn open(
        source: &'a mut (dyn FrameSource<F> + Send),
        display: &'a mut (dyn DisplaySink<F> + Send),
    ) -> crate::Result<Self> {
        source.open()?;
        debug!("frame source opened");
        Ok(Self { source, display })
    }

    pub(crate) fn source(&mut self) -> &mut (dyn FrameSource<F> + Send) {
        &mut *self.source
    }

    fn display(&mut self) -> &mut (dyn DisplaySink<F> + Send) {
        &mut *self.display
    }
}

impl<F> Drop for SessionGuard<'_, F> {
    fn drop(&mut self) {
        self.source.release();
        self.display.close();
        debug!("frame source and display released");
    }
}

/// Frame counters of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LoopStats {
    pub processed: u64,
    pub skipped: u64,
    pub crossings: u64,
}

pub(crate) struct FrameLoop<'a, F> {
    line: LineSegment,
    targets: TargetClasses,
    annotate: bool,
    log_interval: u64,
    status: &'a StatusRegister,
    backend: &'a mut (dyn DetectionBackend<F> + Send),
    next_index: u64,
    stats: LoopStats,
    started: Instant,
}

impl<'a, F> FrameLoop<'a, F> {
    pub(crate) fn new(
        line: LineSegment,
        config: &TrackerConfig,
        status: &'a StatusRegister,
        backend: &'a mut (dyn DetectionBackend<F> + Send),
    ) -> Self {
        Self {
            line,
            targets: config.target_classes(),
            annotate: config.annotate_crossings,
            log_interval: config.status_log_interval,
            status,
            backend,
            next_index: 1,
            stats: LoopStats::default(),
            started: Instant::now(),
        }
    }

    pub(crate) fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Runs one iteration. Returns `false` once the source is exhausted.
    pub(crate) fn step(&mut self, session: &mut SessionGuard<'_, F>) -> bool {
        match self.process(session) {
            Ok(Some(crossing)) => {
                self.stats.processed += 1;
                if crossing {
                    self.stats.crossings += 1;
                }
                self.log_progress();
                true
            }
            Ok(None) => {
                info!("frame source exhausted");
                false
            }
            Err(e) => {
                self.stats.skipped += 1;
                warn!("skipping frame: {}", e);
                true
            }
        }
    }

    /// `Ok(None)` at end of stream, otherwise whether the frame was a crossing
    fn process(
        &mut self,
        session: &mut SessionGuard<'_, F>,
    ) -> Result<Option<bool>, FrameProcessingError> {
        let index = self.next_index;

        let frame = match session.source().next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(None),
            Err(source) => {
                self.next_index += 1;
                return Err(FrameProcessingError::Acquire { index, source });
            }
        };
        self.next_index += 1;

        let detections = self
            .backend
            .detect(&frame)
            .map_err(|source| FrameProcessingError::Detect { index, source })?;

        let overlay = self.evaluate(index, detections);
        let crossing = overlay.crossing;

        // The status is already published; a display failure only loses the picture
        if let Err(source) = session.display().render(frame, &overlay) {
            warn!("{}", FrameProcessingError::Display { index, source });
        }

        Ok(Some(crossing))
    }

    /// Resets the status, then raises it on the first retained detection touching the line
    fn evaluate(&self, index: u64, detections: Vec<Detection>) -> FrameOverlay {
        self.status.set(false);

        let mut overlay = FrameOverlay {
            index,
            line: self.line,
            intersecting: Vec::new(),
            crossing: false,
        };

        for detection in detections {
            if !self.targets.retains(&detection) {
                if self.targets.contains(&detection.label) {
                    debug!(
                        "frame {}: ignoring malformed box {:?} ({})",
                        index, detection.bbox, detection.label
                    );
                }
                continue;
            }
            if !intersects(&self.line, &detection.bbox) {
                continue;
            }

            debug!(
                "frame {}: {} ({:.2}) on the line",
                index, detection.label, detection.confidence
            );
            if !overlay.crossing {
                overlay.crossing = true;
                self.status.set(true);
            }
            overlay.intersecting.push(detection);

            if !self.annotate {
                break;
            }
        }

        overlay
    }

    fn log_progress(&self) {
        if self.log_interval == 0 || self.stats.processed % self.log_interval != 0 {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let fps = if elapsed > 0.0 {
            self.stats.processed as f64 / elapsed
        } else {
            0.0
        };
        info!("frame {}, FPS: {:.2}", self.stats.processed, fps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Point};
    use crate::traits::MockDetectionBackend;

    fn frame_loop<'a>(
        config: &TrackerConfig,
        status: &'a StatusRegister,
        backend: &'a mut MockDetectionBackend<u8>,
    ) -> FrameLoop<'a, u8> {
        let line = LineSegment::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        FrameLoop::new(line, config, status, backend)
    }

    fn detection(label: &str, bbox: BoundingBox) -> Detection {
        Detection::new(label, 0.8, bbox)
    }

    #[test]
    fn test_no_detections_clears_status() {
        let status = StatusRegister::new();
        status.set(true);
        let mut backend = MockDetectionBackend::new();
        let config = TrackerConfig::default();

        let overlay = frame_loop(&config, &status, &mut backend).evaluate(1, vec![]);

        assert!(!overlay.crossing);
        assert!(!status.get());
    }

    #[test]
    fn test_only_target_classes_count() {
        let status = StatusRegister::new();
        let mut backend = MockDetectionBackend::new();
        let config = TrackerConfig::default();
        let on_line = BoundingBox::new(2.0, 2.0, 8.0, 8.0);

        let overlay = frame_loop(&config, &status, &mut backend)
            .evaluate(1, vec![detection("person", on_line)]);

        assert!(!overlay.crossing);
        assert!(!status.get());
    }

    #[test]
    fn test_malformed_box_is_skipped() {
        let status = StatusRegister::new();
        let mut backend = MockDetectionBackend::new();
        let config = TrackerConfig::default();

        let overlay = frame_loop(&config, &status, &mut backend).evaluate(
            1,
            vec![
                detection("car", BoundingBox::new(8.0, 8.0, 2.0, 2.0)),
                detection("truck", BoundingBox::new(20.0, 20.0, 30.0, 30.0)),
            ],
        );

        assert!(!overlay.crossing);
        assert!(overlay.intersecting.is_empty());
    }

    #[test]
    fn test_annotation_collects_every_crossing_box() {
        let status = StatusRegister::new();
        let mut backend = MockDetectionBackend::new();
        let config = TrackerConfig::default();
        let detections = vec![
            detection("car", BoundingBox::new(2.0, 2.0, 4.0, 4.0)),
            detection("truck", BoundingBox::new(20.0, 0.0, 30.0, 5.0)),
            detection("motorcycle", BoundingBox::new(6.0, 6.0, 8.0, 8.0)),
        ];

        let overlay = frame_loop(&config, &status, &mut backend).evaluate(7, detections);

        assert!(overlay.crossing);
        assert!(status.get());
        assert_eq!(overlay.index, 7);
        let labels: Vec<_> = overlay.intersecting.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["car", "motorcycle"]);
    }

    #[test]
    fn test_without_annotation_stops_at_first_hit() {
        let status = StatusRegister::new();
        let mut backend = MockDetectionBackend::new();
        let config = TrackerConfig {
            annotate_crossings: false,
            ..Default::default()
        };
        let detections = vec![
            detection("car", BoundingBox::new(2.0, 2.0, 4.0, 4.0)),
            detection("car", BoundingBox::new(6.0, 6.0, 8.0, 8.0)),
        ];

        let overlay = frame_loop(&config, &status, &mut backend).evaluate(1, detections);

        assert!(overlay.crossing);
        assert_eq!(overlay.intersecting.len(), 1);
    }
}
