//! Line-crossing tracker lifecycle
//!
//! The tracker owns its collaborators and runs on a single worker thread.
//! Everything other threads need (status, stop request, state) is reached
//! through a cloneable [`TrackerHandle`].

mod frame_loop;

pub use frame_loop::FrameOverlay;

use crate::config::TrackerConfig;
use crate::error::{ConfigurationError, TrackerError};
use crate::geometry::LineSegment;
use crate::status::StatusRegister;
use crate::traits::{DetectionBackend, DisplaySink, FrameSource, LineSelector, NullDisplay};
use frame_loop::{FrameLoop, SessionGuard};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Lifecycle of a tracker; `Stopped` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackerState {
    Uninitialized,
    AwaitingLine,
    Running,
    Stopped,
}

impl TrackerState {
    pub fn can_transition_to(self, next: TrackerState) -> bool {
        use TrackerState::*;
        matches!(
            (self, next),
            (Uninitialized, AwaitingLine)
                | (Uninitialized, Stopped)
                | (AwaitingLine, Running)
                | (AwaitingLine, Stopped)
                | (Running, Stopped)
        )
    }
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackerState::Uninitialized => "uninitialized",
            TrackerState::AwaitingLine => "awaiting-line",
            TrackerState::Running => "running",
            TrackerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Why a session ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// `stop()` was called
    Requested,
    /// The frame source ran out of frames
    SourceExhausted,
}

/// Statistics of a finished session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub reason: StopReason,
    pub line: Option<LineSegment>,
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub crossing_frames: u64,
    pub elapsed: Duration,
}

/// State shared between the worker and every handle
#[derive(Debug)]
struct Shared {
    status: StatusRegister,
    stop_requested: AtomicBool,
    state: Mutex<TrackerState>,
}

impl Shared {
    fn state(&self) -> TrackerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, next: TrackerState) -> Result<(), TrackerError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let from = *state;
        if !from.can_transition_to(next) {
            return Err(TrackerError::InvalidTransition { from, to: next });
        }
        *state = next;
        drop(state);

        debug!("tracker state {} -> {}", from, next);
        Ok(())
    }

    /// Moves to `Stopped` from wherever the session currently is
    fn finish(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != TrackerState::Stopped {
            debug!("tracker state {} -> {}", *state, TrackerState::Stopped);
            *state = TrackerState::Stopped;
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }
}

/// Thread-safe view of a tracker for pollers and controllers
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    shared: Arc<Shared>,
}

impl TrackerHandle {
    /// Whether a target object was on the line in the last completed frame
    pub fn get_status(&self) -> bool {
        self.shared.status.get()
    }

    /// Ask the worker to stop after its current frame. Never blocks.
    pub fn stop(&self) {
        if !self.shared.stop_requested.swap(true, Ordering::AcqRel) {
            info!("stop requested");
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.shared.stop_requested()
    }

    pub fn state(&self) -> TrackerState {
        self.shared.state()
    }
}

/// Monitors a frame stream for target objects crossing a line of interest
pub struct LineCrossingTracker<F> {
    config: TrackerConfig,
    source: Box<dyn FrameSource<F> + Send>,
    backend: Box<dyn DetectionBackend<F> + Send>,
    selector: Box<dyn LineSelector<F> + Send>,
    display: Box<dyn DisplaySink<F> + Send>,
    line: Option<LineSegment>,
    shared: Arc<Shared>,
}

impl<F: 'static> LineCrossingTracker<F> {
    /// Create a tracker with a headless display
    pub fn new<S, B, L>(config: TrackerConfig, source: S, backend: B, selector: L) -> Self
    where
        S: FrameSource<F> + Send + 'static,
        B: DetectionBackend<F> + Send + 'static,
        L: LineSelector<F> + Send + 'static,
    {
        Self {
            config,
            source: Box::new(source),
            backend: Box::new(backend),
            selector: Box::new(selector),
            display: Box::new(NullDisplay),
            line: None,
            shared: Arc::new(Shared {
                status: StatusRegister::new(),
                stop_requested: AtomicBool::new(false),
                state: Mutex::new(TrackerState::Uninitialized),
            }),
        }
    }

    /// Replace the display sink
    pub fn with_display<D>(mut self, display: D) -> Self
    where
        D: DisplaySink<F> + Send + 'static,
    {
        self.display = Box::new(display);
        self
    }

    pub fn handle(&self) -> TrackerHandle {
        TrackerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn get_status(&self) -> bool {
        self.shared.status.get()
    }

    pub fn stop(&self) {
        self.handle().stop();
    }

    pub fn state(&self) -> TrackerState {
        self.shared.state()
    }

    /// The captured line of interest, once configuration succeeded
    pub fn line(&self) -> Option<LineSegment> {
        self.line
    }

    /// Configure the line, then process frames until stopped.
    ///
    /// Blocks the calling thread for the whole session. The frame source and the
    /// display are released on every return path.
    pub fn run(&mut self) -> Result<SessionSummary, TrackerError> {
        let state = self.shared.state();
        if state != TrackerState::Uninitialized {
            return Err(TrackerError::AlreadyStarted(state));
        }

        let started = Instant::now();
        let result = self.run_session(started);
        self.shared.finish();

        match &result {
            Ok(summary) => info!(
                "tracking finished ({:?}): {} frames processed, {} skipped, {} with a crossing",
                summary.reason,
                summary.frames_processed,
                summary.frames_skipped,
                summary.crossing_frames
            ),
            Err(e) => error!("tracking aborted: {}", e),
        }

        result
    }

    fn run_session(&mut self, started: Instant) -> Result<SessionSummary, TrackerError> {
        let stopped_early = |line| SessionSummary {
            reason: StopReason::Requested,
            line,
            frames_processed: 0,
            frames_skipped: 0,
            crossing_frames: 0,
            elapsed: started.elapsed(),
        };

        if self.shared.stop_requested() {
            info!("stop requested before start, no frames will be processed");
            return Ok(stopped_early(None));
        }

        let mut session = SessionGuard::open(self.source.as_mut(), self.display.as_mut())
            .map_err(TrackerError::SourceUnavailable)?;
        self.shared.transition(TrackerState::AwaitingLine)?;

        info!("waiting for the line of interest");
        let first_frame = match session.source().next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Err(ConfigurationError::NoFirstFrame.into()),
            Err(e) => {
                warn!("failed to read the first frame: {:#}", e);
                return Err(ConfigurationError::NoFirstFrame.into());
            }
        };
        let line = match self.selector.select(&first_frame) {
            Ok(Some(line)) => line,
            Ok(None) => return Err(ConfigurationError::Cancelled.into()),
            Err(e) => return Err(ConfigurationError::Selector(e).into()),
        };
        info!("line of interest set: {}", line);
        self.line = Some(line);

        if self.shared.stop_requested() {
            info!("stop requested during configuration, no frames will be processed");
            return Ok(stopped_early(Some(line)));
        }

        self.shared.transition(TrackerState::Running)?;

        info!("loading detection backend");
        self.backend
            .load()
            .map_err(TrackerError::BackendInitialization)?;
        info!("detection backend ready, processing started");

        let mut frame_loop = FrameLoop::new(
            line,
            &self.config,
            &self.shared.status,
            self.backend.as_mut(),
        );

        // A stop raised while the backend loads ends the session before any detection
        let reason = loop {
            if self.shared.stop_requested() {
                break StopReason::Requested;
            }
            if !frame_loop.step(&mut session) {
                break StopReason::SourceExhausted;
            }
        };

        let stats = frame_loop.stats();
        Ok(SessionSummary {
            reason,
            line: Some(line),
            frames_processed: stats.processed,
            frames_skipped: stats.skipped,
            crossing_frames: stats.crossings,
            elapsed: started.elapsed(),
        })
    }
}
