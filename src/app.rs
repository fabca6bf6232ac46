//! Wiring of a tracking run: collaborators, worker thread and status polling

use crate::config::AppConfig;
use anyhow::{Context, bail};
use linewatch_core::traits::FixedLineSelector;
use linewatch_core::{ConfigurationError, LineCrossingTracker, SessionSummary, TrackerError};
use linewatch_cv::{
    HighGuiDisplay, HighGuiLineSelector, Mat, VideoInput, VideoSource, YoloDetector,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::info;

/// A single invocation of the tool
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub source: VideoInput,
    pub config: AppConfig,
    pub headless: bool,
    pub summary_json: Option<PathBuf>,
}

pub fn run(options: RunOptions) -> anyhow::Result<()> {
    let tracker = build_tracker(&options)?;

    let summary = match supervise(tracker, options.config.status_poll_interval())? {
        Ok(summary) => summary,
        Err(TrackerError::Configuration(ConfigurationError::Cancelled)) => {
            info!("No line of interest selected, nothing to track");
            return Ok(());
        }
        Err(e) => return Err(e).context("Tracking failed"),
    };

    if let Some(path) = &options.summary_json {
        write_summary(path, &summary)?;
        info!("Session summary written to {:?}", path);
    }
    Ok(())
}

fn build_tracker(options: &RunOptions) -> anyhow::Result<LineCrossingTracker<Mat>> {
    let config = &options.config;
    let source = VideoSource::new(options.source.clone());
    let detector = YoloDetector::new(config.detector.clone());

    let tracker = match (config.line, options.headless) {
        (Some(line), _) => {
            info!("Using preset line of interest {}", line);
            LineCrossingTracker::new(
                config.tracker.clone(),
                source,
                detector,
                FixedLineSelector::new(line),
            )
        }
        (None, true) => bail!("Headless runs need a preset line (--line or \"line\" in the config)"),
        (None, false) => LineCrossingTracker::new(
            config.tracker.clone(),
            source,
            detector,
            HighGuiLineSelector::new(config.display.clone()),
        ),
    };

    if options.headless {
        return Ok(tracker);
    }
    let display = HighGuiDisplay::new(config.display.clone()).with_stop_handle(tracker.handle());
    Ok(tracker.with_display(display))
}

/// Run the tracker on a worker thread and poll its status until it finishes.
///
/// Status changes are logged as they are observed; the poller never blocks the
/// worker.
pub fn supervise<F: 'static>(
    mut tracker: LineCrossingTracker<F>,
    poll_interval: Duration,
) -> anyhow::Result<Result<SessionSummary, TrackerError>> {
    let handle = tracker.handle();
    let (done_tx, done_rx) = mpsc::channel();

    let worker = thread::Builder::new()
        .name("tracker".to_string())
        .spawn(move || {
            let result = tracker.run();
            // The receiver only disappears if the poller is already gone
            let _ = done_tx.send(());
            result
        })
        .context("Failed to spawn tracker thread")?;

    let mut last_status = handle.get_status();
    loop {
        match done_rx.recv_timeout(poll_interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                let status = handle.get_status();
                if status != last_status {
                    info!(
                        "Object on line: {} ({})",
                        if status { "yes" } else { "no" },
                        handle.state()
                    );
                    last_status = status;
                }
            }
        }
    }

    match worker.join() {
        Ok(result) => Ok(result),
        Err(_) => bail!("Tracker thread panicked"),
    }
}

pub fn write_summary(path: &Path, summary: &SessionSummary) -> anyhow::Result<()> {
    let json =
        serde_json::to_string_pretty(summary).context("Failed to serialize session summary")?;
    fs::write(path, json).with_context(|| format!("Failed to write summary: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linewatch_core::traits::{DetectionBackend, FrameSource};
    use linewatch_core::{BoundingBox, Detection, LineSegment, Point, StopReason, TrackerConfig};

    /// Endless frames, each paced to keep the worker busy
    struct PacedSource {
        delay: Duration,
    }

    impl FrameSource<()> for PacedSource {
        fn open(&mut self) -> linewatch_core::Result<()> {
            Ok(())
        }

        fn next_frame(&mut self) -> linewatch_core::Result<Option<()>> {
            thread::sleep(self.delay);
            Ok(Some(()))
        }

        fn release(&mut self) {}
    }

    struct AlwaysCar;

    impl DetectionBackend<()> for AlwaysCar {
        fn load(&mut self) -> linewatch_core::Result<()> {
            Ok(())
        }

        fn detect(&mut self, _frame: &()) -> linewatch_core::Result<Vec<Detection>> {
            Ok(vec![Detection::new(
                "car",
                0.9,
                BoundingBox::new(0.0, 0.0, 20.0, 20.0),
            )])
        }
    }

    fn line() -> LineSegment {
        LineSegment::new(Point::new(0.0, 10.0), Point::new(100.0, 10.0))
    }

    #[test]
    fn test_supervise_until_stopped() -> anyhow::Result<()> {
        let tracker = LineCrossingTracker::new(
            TrackerConfig::default(),
            PacedSource {
                delay: Duration::from_millis(2),
            },
            AlwaysCar,
            FixedLineSelector::new(line()),
        );
        let handle = tracker.handle();

        let stopper = thread::spawn(move || {
            while !handle.get_status() {
                thread::sleep(Duration::from_millis(1));
            }
            handle.stop();
        });

        let summary = supervise(tracker, Duration::from_millis(5))??;
        stopper.join().unwrap();

        assert_eq!(summary.reason, StopReason::Requested);
        assert!(summary.crossing_frames >= 1);
        assert_eq!(summary.frames_processed, summary.crossing_frames);
        Ok(())
    }

    #[test]
    fn test_headless_without_line_is_rejected() {
        let options = RunOptions {
            source: VideoInput::File("clip.mp4".into()),
            config: AppConfig::default(),
            headless: true,
            summary_json: None,
        };
        assert!(build_tracker(&options).is_err());
    }

    #[test]
    fn test_write_summary() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!("linewatch-summary-{}.json", std::process::id()));
        let summary = SessionSummary {
            reason: StopReason::SourceExhausted,
            line: Some(line()),
            frames_processed: 12,
            frames_skipped: 1,
            crossing_frames: 4,
            elapsed: Duration::from_millis(1500),
        };

        write_summary(&path, &summary)?;
        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        fs::remove_file(&path)?;

        assert_eq!(written["reason"], "SourceExhausted");
        assert_eq!(written["frames_processed"], 12);
        assert_eq!(written["line"]["p2"]["x"], 100.0);
        Ok(())
    }
}
