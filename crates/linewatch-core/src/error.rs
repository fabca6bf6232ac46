//! Session-ending errors of the tracker

use crate::tracker::TrackerState;
use thiserror::Error;

/// Reasons the line of interest could not be captured
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("line selection was cancelled")]
    Cancelled,
    #[error("frame source produced no frame to select the line on")]
    NoFirstFrame,
    #[error("line selection failed: {0}")]
    Selector(#[source] anyhow::Error),
}

/// Errors that terminate a tracking session
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("no line of interest: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("frame source could not be opened: {0}")]
    SourceUnavailable(#[source] anyhow::Error),
    #[error("detection backend failed to load: {0}")]
    BackendInitialization(#[source] anyhow::Error),
    #[error("tracker already started (state: {0})")]
    AlreadyStarted(TrackerState),
    #[error("invalid tracker transition {from} -> {to}")]
    InvalidTransition { from: TrackerState, to: TrackerState },
}

/// Failure confined to a single frame; logged and skipped by the loop
#[derive(Debug, Error)]
pub(crate) enum FrameProcessingError {
    #[error("frame {index}: acquisition failed: {source}")]
    Acquire { index: u64, source: anyhow::Error },
    #[error("frame {index}: detection failed: {source}")]
    Detect { index: u64, source: anyhow::Error },
    #[error("frame {index}: display failed: {source}")]
    Display { index: u64, source: anyhow::Error },
}
