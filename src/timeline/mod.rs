//! Timeline snapshots
//!
//! Read-only views of the host's active sequence. A snapshot is taken at
//! the start of every placement call and thrown away afterwards; nothing
//! here is cached across calls because the user can edit the sequence at
//! any time.

pub mod timecode;

use serde::{Deserialize, Serialize};

pub use timecode::format_position;

/// Time range occupied by one clip on a track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipInterval {
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl ClipInterval {
    pub fn new(start_seconds: f64, end_seconds: f64) -> Self {
        Self {
            start_seconds,
            end_seconds,
        }
    }

    /// Whether `seconds` falls inside the interval padded by `buffer` on both ends
    ///
    /// Bounds are inclusive.
    pub fn conflicts_with(&self, seconds: f64, buffer: f64) -> bool {
        seconds >= self.start_seconds - buffer && seconds <= self.end_seconds + buffer
    }
}

/// One track of the active sequence at scan time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSnapshot {
    pub index: usize,
    pub display_name: String,
    #[serde(default)]
    pub intervals: Vec<ClipInterval>,
}

impl TrackSnapshot {
    pub fn new(index: usize, display_name: impl Into<String>) -> Self {
        Self {
            index,
            display_name: display_name.into(),
            intervals: Vec::new(),
        }
    }

    pub fn with_interval(mut self, start_seconds: f64, end_seconds: f64) -> Self {
        self.intervals
            .push(ClipInterval::new(start_seconds, end_seconds));
        self
    }

    /// First interval that conflicts with `seconds`, if any
    pub fn first_conflict(&self, seconds: f64, buffer: f64) -> Option<ClipInterval> {
        self.intervals
            .iter()
            .find(|interval| interval.conflicts_with(seconds, buffer))
            .copied()
    }
}

/// Snapshot of the active sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub name: String,
    /// Frames per second, when the host reports one
    #[serde(default)]
    pub frame_rate: Option<f64>,
    #[serde(default)]
    pub tracks: Vec<TrackSnapshot>,
}

impl Timeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frame_rate: None,
            tracks: Vec::new(),
        }
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn track(&self, index: usize) -> Option<&TrackSnapshot> {
        self.tracks.iter().find(|track| track.index == index)
    }

    /// Highest track index, or `None` for a sequence without tracks
    pub fn last_track_index(&self) -> Option<usize> {
        self.tracks.iter().map(|track| track.index).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_bounds_are_inclusive() {
        let clip = ClipInterval::new(9.0, 11.0);
        assert!(clip.conflicts_with(8.5, 0.5));
        assert!(clip.conflicts_with(11.5, 0.5));
        assert!(!clip.conflicts_with(11.6, 0.5));
        assert!(!clip.conflicts_with(8.4, 0.5));
    }

    #[test]
    fn test_last_track_index() {
        let mut timeline = Timeline::new("Main");
        assert_eq!(timeline.last_track_index(), None);

        timeline.tracks.push(TrackSnapshot::new(0, "Audio 1"));
        timeline.tracks.push(TrackSnapshot::new(1, "Audio 2"));
        assert_eq!(timeline.last_track_index(), Some(1));
        assert_eq!(timeline.track(1).map(|t| t.display_name.as_str()), Some("Audio 2"));
    }

    #[test]
    fn test_first_conflict() {
        let track = TrackSnapshot::new(0, "Audio 1")
            .with_interval(0.0, 5.0)
            .with_interval(9.0, 11.0);
        assert_eq!(track.first_conflict(10.0, 0.0), Some(ClipInterval::new(9.0, 11.0)));
        assert_eq!(track.first_conflict(7.0, 0.5), None);
    }
}
