//! Placement results as handed back to the UI

use serde::{Deserialize, Serialize};

use super::diagnostics::Diagnostics;
use crate::error::{PlacementError, Stage};
use crate::host::ProjectItemHandle;

/// Outcome of one placement call
///
/// Serialized as camelCase JSON for the panel bridge. `degraded` marks a
/// successful insertion that had to reuse a possibly-conflicting track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementResult {
    pub success: bool,
    pub track_index: Option<usize>,
    pub created_new_track: bool,
    pub verified: bool,
    pub degraded: bool,
    pub message: String,
    /// Stage that failed, for unsuccessful results
    pub stage: Option<Stage>,
    pub error_code: Option<String>,
    pub file_name: String,
    pub position_formatted: Option<String>,
    pub item: Option<ProjectItemHandle>,
    /// What the user can do about a failure or a degraded placement
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl PlacementResult {
    /// Failed result tagged with the error's stage
    pub fn failure(error: &PlacementError, file_name: &str, diagnostics: Diagnostics) -> Self {
        let stage = error.stage();
        Self {
            success: false,
            track_index: None,
            created_new_track: false,
            verified: false,
            degraded: false,
            message: format!("[{}] {}", stage, error),
            stage: Some(stage),
            error_code: Some(error.error_code().to_string()),
            file_name: file_name.to_string(),
            position_formatted: None,
            item: None,
            suggestions: owned(error.recovery_suggestions()),
            diagnostics,
        }
    }

    /// Serialize for the UI bridge
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

pub(crate) fn owned(suggestions: Vec<&'static str>) -> Vec<String> {
    suggestions.into_iter().map(str::to_string).collect()
}
