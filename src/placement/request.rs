//! Placement requests

use serde::{Deserialize, Serialize};

use crate::config::PlacementConfig;
use crate::error::{PlacementError, Result};

/// A rendered audio file on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetReference {
    pub source_path: String,
    pub display_name: String,
}

impl AssetReference {
    /// Reference a file, naming it after its file name
    pub fn new(source_path: impl Into<String>) -> Self {
        let source_path = source_path.into();
        let display_name = file_name(&source_path).to_string();
        Self {
            source_path,
            display_name,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Last path segment of the source path
    pub fn file_name(&self) -> &str {
        file_name(&self.source_path)
    }
}

/// Everything one placement call needs
///
/// Track targeting and the conflict buffer come from the caller's UI
/// state; the engine reads nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRequest {
    pub asset: AssetReference,
    pub target_seconds: f64,
    #[serde(default)]
    pub starting_track_index: usize,
    pub bin_name: String,
    pub conflict_buffer_seconds: f64,
}

impl PlacementRequest {
    /// Request using the configured bin, buffer and starting track
    pub fn from_config(asset: AssetReference, target_seconds: f64, config: &PlacementConfig) -> Self {
        Self {
            asset,
            target_seconds,
            starting_track_index: config.starting_track_index,
            bin_name: config.bin_name.clone(),
            conflict_buffer_seconds: config.conflict_buffer_seconds,
        }
    }

    pub fn with_starting_track(mut self, index: usize) -> Self {
        self.starting_track_index = index;
        self
    }

    pub fn with_buffer(mut self, seconds: f64) -> Self {
        self.conflict_buffer_seconds = seconds;
        self
    }

    pub fn with_bin(mut self, name: impl Into<String>) -> Self {
        self.bin_name = name.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(PlacementError::InvalidRequest { reason });

        if self.asset.source_path.trim().is_empty() {
            return invalid("asset source path is empty".to_string());
        }
        if !self.target_seconds.is_finite() || self.target_seconds < 0.0 {
            return invalid(format!(
                "target time must be a non-negative number of seconds, got {}",
                self.target_seconds
            ));
        }
        if !self.conflict_buffer_seconds.is_finite() || self.conflict_buffer_seconds < 0.0 {
            return invalid(format!(
                "conflict buffer must be a non-negative number of seconds, got {}",
                self.conflict_buffer_seconds
            ));
        }
        if self.bin_name.trim().is_empty() {
            return invalid("bin name is empty".to_string());
        }
        Ok(())
    }
}

pub(crate) fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/Users/me/Desktop/SFX AI/boom.mp3", "boom.mp3" ; "unix")]
    #[test_case("C:\\sfx\\door slam.wav", "door slam.wav" ; "windows")]
    #[test_case("whoosh.wav", "whoosh.wav" ; "bare")]
    fn test_display_name_defaults_to_file_name(path: &str, expected: &str) {
        assert_eq!(AssetReference::new(path).display_name, expected);
    }

    #[test]
    fn test_from_config() {
        let config = PlacementConfig::default();
        let request = PlacementRequest::from_config(AssetReference::new("/a.wav"), 4.0, &config);
        assert_eq!(request.bin_name, "AI SFX");
        assert_eq!(request.conflict_buffer_seconds, 0.1);
        assert!(request.validate().is_ok());
    }

    #[test_case(-1.0, 0.1, "AI SFX" ; "negative target")]
    #[test_case(f64::NAN, 0.1, "AI SFX" ; "nan target")]
    #[test_case(1.0, -0.1, "AI SFX" ; "negative buffer")]
    #[test_case(1.0, 0.1, " " ; "blank bin")]
    fn test_invalid_requests(target: f64, buffer: f64, bin: &str) {
        let request = PlacementRequest::from_config(
            AssetReference::new("/a.wav"),
            target,
            &PlacementConfig::default(),
        )
        .with_buffer(buffer)
        .with_bin(bin);
        let err = request.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_REQUEST");
    }
}
