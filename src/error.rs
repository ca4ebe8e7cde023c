//! Error handling for the placement engine
//!
//! Every error knows which placement stage produced it so the UI can
//! show a stage-tagged message without parsing strings.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::HostError;

/// Result type alias for placement operations
pub type Result<T> = std::result::Result<T, PlacementError>;

/// Where an error was raised
///
/// The placement stages that can abort a call, in execution order, plus
/// `Setup` for work around a call (config and scene files, the host lock).
/// Bin filing and verification never abort, so they have no stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Setup,
    Validate,
    Timeline,
    Resolve,
    Provision,
    Insert,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::Validate => "validate",
            Stage::Timeline => "timeline",
            Stage::Resolve => "resolve",
            Stage::Provision => "provision",
            Stage::Insert => "insert",
        };
        write!(f, "{}", name)
    }
}

/// Main error type for placement operations
#[derive(Error, Debug)]
pub enum PlacementError {
    // Request Errors
    #[error("Invalid placement request: {reason}")]
    InvalidRequest { reason: String },

    // Host State Errors
    #[error("No active timeline in the host project")]
    NoActiveTimeline,

    #[error("Import of '{path}' failed: {source}")]
    ImportFailure {
        path: String,
        #[source]
        source: HostError,
    },

    #[error("No project item found for '{path}' after import")]
    ItemNotFound { path: String },

    // Track Errors
    #[error("Track creation degraded: reusing track {track_index} ({reason})")]
    TrackCreationDegraded { track_index: usize, reason: String },

    #[error("Timeline has no tracks and none could be created")]
    NoTrackAvailable,

    // Insertion Errors
    #[error("Insertion onto track {track_index} at {at_seconds:.3}s failed: {source}")]
    InsertFailure {
        track_index: usize,
        at_seconds: f64,
        #[source]
        source: HostError,
    },

    #[error("Host call failed: {0}")]
    Host(#[from] HostError),

    // Configuration Errors
    #[error("Invalid configuration in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlacementError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            PlacementError::InvalidRequest { .. } => "INVALID_REQUEST",
            PlacementError::NoActiveTimeline => "NO_ACTIVE_TIMELINE",
            PlacementError::ImportFailure { .. } => "IMPORT_FAILURE",
            PlacementError::ItemNotFound { .. } => "ITEM_NOT_FOUND",
            PlacementError::TrackCreationDegraded { .. } => "TRACK_CREATION_DEGRADED",
            PlacementError::NoTrackAvailable => "NO_TRACK_AVAILABLE",
            PlacementError::InsertFailure { .. } => "INSERT_FAILURE",
            PlacementError::Host(_) => "HOST_ERROR",
            PlacementError::Config { .. } => "CONFIG_ERROR",
            PlacementError::Io(_) => "IO_ERROR",
            PlacementError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// The placement stage this error belongs to
    pub fn stage(&self) -> Stage {
        match self {
            PlacementError::InvalidRequest { .. } => Stage::Validate,
            PlacementError::NoActiveTimeline => Stage::Timeline,
            PlacementError::ImportFailure { .. } | PlacementError::ItemNotFound { .. } => {
                Stage::Resolve
            }
            PlacementError::TrackCreationDegraded { .. } | PlacementError::NoTrackAvailable => {
                Stage::Provision
            }
            PlacementError::InsertFailure { .. } => Stage::Insert,
            PlacementError::Host(_)
            | PlacementError::Config { .. }
            | PlacementError::Io(_)
            | PlacementError::Serialization(_) => Stage::Setup,
        }
    }

    /// Check if this error still allows the placement to complete
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PlacementError::TrackCreationDegraded { .. })
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            PlacementError::NoActiveTimeline => vec![
                "Open or create a sequence in the editor",
                "Make sure the sequence is focused before generating",
            ],
            PlacementError::ImportFailure { .. } => vec![
                "Check that the generated file still exists on disk",
                "Try importing the file manually to see the host's error",
            ],
            PlacementError::ItemNotFound { .. } => vec![
                "The host accepted the import but the item could not be located",
                "Look for the file in the project panel and drag it in manually",
            ],
            PlacementError::TrackCreationDegraded { .. } => vec![
                "The sound was placed on an existing track and may overlap other audio",
                "Add an empty audio track and generate again to avoid overlaps",
            ],
            PlacementError::NoTrackAvailable => vec!["Add an audio track to the sequence"],
            PlacementError::InsertFailure { .. } => vec![
                "Unlock the target track",
                "Move the playhead inside the sequence and try again",
            ],
            PlacementError::InvalidRequest { .. } => {
                vec!["Use a non-negative target time and buffer and a non-empty bin name"]
            }
            PlacementError::Config { .. } => vec!["Fix the configuration file or remove it to use defaults"],
            PlacementError::Host(_) => vec!["Restart the panel to reconnect to the host"],
            PlacementError::Io(_) | PlacementError::Serialization(_) => vec![],
        }
    }
}
