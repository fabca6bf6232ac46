//! Linewatch Core Library
//!
//! Line-crossing tracking engine: geometry, the shared status register and the
//! per-frame tracker loop. Frame sources, detection backends, point selection and
//! display are reached only through the traits in [`traits`].

pub mod config;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod status;
pub mod tracker;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use detection::{Detection, TargetClasses};
pub use error::{ConfigurationError, TrackerError};
pub use geometry::{BoundingBox, LineSegment, Point, intersects};
pub use status::StatusRegister;
pub use tracker::{
    FrameOverlay, LineCrossingTracker, SessionSummary, StopReason, TrackerHandle, TrackerState,
};

// Error handling
pub type Result<T> = anyhow::Result<T>;

/// Collaborator seams of the tracker
pub mod traits {
    use super::*;

    #[cfg(test)]
    use mockall::automock;

    /// Ordered source of frames, opened once per tracking session.
    pub trait FrameSource<F> {
        /// Acquire the underlying stream.
        fn open(&mut self) -> Result<()>;

        /// Next frame, or `None` once the stream is exhausted.
        fn next_frame(&mut self) -> Result<Option<F>>;

        /// Release the underlying stream. Called exactly once, on every exit path.
        fn release(&mut self);
    }

    /// Object detector turning a frame into labeled boxes.
    #[cfg_attr(test, automock)]
    pub trait DetectionBackend<F> {
        /// Load model weights. A failure here ends the session.
        fn load(&mut self) -> Result<()>;

        /// Detect objects in a single frame. A failure here only skips the frame.
        fn detect(&mut self, frame: &F) -> Result<Vec<Detection>>;
    }

    /// Produces the line of interest from the first frame of the stream.
    pub trait LineSelector<F> {
        /// Returns `None` when the user abandons the selection.
        fn select(&mut self, first_frame: &F) -> Result<Option<LineSegment>>;
    }

    /// Presentation side branch of the frame loop.
    #[cfg_attr(test, automock)]
    pub trait DisplaySink<F> {
        fn render(&mut self, frame: F, overlay: &FrameOverlay) -> Result<()>;

        fn close(&mut self) {}
    }

    /// Selector returning a preconfigured line without user interaction.
    #[derive(Debug, Clone, Copy)]
    pub struct FixedLineSelector {
        line: LineSegment,
    }

    impl FixedLineSelector {
        pub fn new(line: LineSegment) -> Self {
            Self { line }
        }
    }

    impl<F> LineSelector<F> for FixedLineSelector {
        fn select(&mut self, _first_frame: &F) -> Result<Option<LineSegment>> {
            Ok(Some(self.line))
        }
    }

    /// Display that drops every frame, for headless sessions.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct NullDisplay;

    impl<F> DisplaySink<F> for NullDisplay {
        fn render(&mut self, _frame: F, _overlay: &FrameOverlay) -> Result<()> {
            Ok(())
        }
    }
}
