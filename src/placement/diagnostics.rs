//! Structured record of one placement call
//!
//! Everything the coordinator learned along the way ends up here so the
//! UI (or a bug report) can show why a sound landed where it did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::host::ProjectItemHandle;
use crate::timeline::ClipInterval;

/// How the asset's project item was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    /// Already in the project before this call
    Existing,
    /// Imported; found by media path
    MediaPath,
    /// Imported; found by exact file name
    FileName,
    /// Imported; found by file name without extension
    BaseName,
    /// Imported; found by case-insensitive name
    CaseInsensitive,
    /// Imported; found because its name contains the base name
    Substring,
    /// Imported; last media item in the project root
    MostRecent,
}

/// Result of asset resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionReport {
    pub handle: ProjectItemHandle,
    pub method: ResolutionMethod,
    /// Number of tree passes needed after the import (0 when not imported)
    pub search_passes: u32,
}

/// What happened while filing the item into its bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BinOutcome {
    Moved { bin: ProjectItemHandle, created_bin: bool },
    AlreadyInBin { bin: ProjectItemHandle },
    Failed { reason: String },
}

impl BinOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, BinOutcome::Failed { .. })
    }
}

/// Scan verdict for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackScanEntry {
    pub index: usize,
    pub free: bool,
    /// First interval found inside the buffered window
    pub conflict: Option<ClipInterval>,
}

/// Tri-state outcome of one track-creation strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum StrategyOutcome {
    Succeeded,
    NotApplicable,
    FailedSilently(String),
}

/// One row of the provisioning log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAttempt {
    pub strategy: String,
    pub outcome: StrategyOutcome,
    pub tracks_before: usize,
    pub tracks_after: usize,
}

/// Post-insert check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub verified: bool,
    pub tolerance_seconds: f64,
    /// Start of the new interval found near the target
    pub landed_at: Option<f64>,
}

/// Everything recorded during one placement call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub timeline_name: Option<String>,
    pub resolution: Option<ResolutionReport>,
    pub bin: Option<BinOutcome>,
    pub scan: Vec<TrackScanEntry>,
    /// Scan of the refreshed timeline after a track was created
    pub rescan: Vec<TrackScanEntry>,
    pub strategies: Vec<StrategyAttempt>,
    pub verification: Option<VerificationReport>,
    pub warnings: Vec<String>,
}

impl Diagnostics {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            elapsed_ms: 0,
            timeline_name: None,
            resolution: None,
            bin: None,
            scan: Vec::new(),
            rescan: Vec::new(),
            strategies: Vec::new(),
            verification: None,
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn finish(&mut self) {
        let elapsed = Utc::now() - self.started_at;
        self.elapsed_ms = elapsed.num_milliseconds().max(0) as u64;
    }

    /// Whether track provisioning was attempted during this call
    pub fn provisioned(&self) -> bool {
        !self.strategies.is_empty()
    }
}
