//! Engine configuration
//!
//! Defaults for everything a placement request does not spell out. The
//! file format is JSON; every field is optional.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlacementError, Result};

/// Padding applied around existing clips when testing for conflicts (seconds)
pub const DEFAULT_CONFLICT_BUFFER_SECONDS: f64 = 0.1;

/// Bin generated sound effects are filed into
pub const DEFAULT_BIN_NAME: &str = "AI SFX";

/// Passes over the project tree while looking for a freshly imported item
pub const DEFAULT_IMPORT_SEARCH_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub conflict_buffer_seconds: f64,
    pub bin_name: String,
    pub starting_track_index: usize,
    pub import_search_attempts: u32,
    /// Pause between search passes; hosts that import asynchronously need one
    pub import_poll_interval_ms: u64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            conflict_buffer_seconds: DEFAULT_CONFLICT_BUFFER_SECONDS,
            bin_name: DEFAULT_BIN_NAME.to_string(),
            starting_track_index: 0,
            import_search_attempts: DEFAULT_IMPORT_SEARCH_ATTEMPTS,
            import_poll_interval_ms: 0,
        }
    }
}

impl PlacementConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PlacementError::Config {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            PlacementError::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        config.validate().map_err(|reason| PlacementError::Config {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }

    /// Check value ranges, returning the first problem found
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.conflict_buffer_seconds.is_finite() || self.conflict_buffer_seconds < 0.0 {
            return Err(format!(
                "conflict_buffer_seconds must be a non-negative number, got {}",
                self.conflict_buffer_seconds
            ));
        }
        if self.bin_name.trim().is_empty() {
            return Err("bin_name must not be empty".to_string());
        }
        if self.import_search_attempts == 0 {
            return Err("import_search_attempts must be at least 1".to_string());
        }
        Ok(())
    }
}
