//! Conflict scanning
//!
//! A track is free at time `t` when no clip on it, padded by the conflict
//! buffer on both ends, contains `t`. Tracks are visited in ascending
//! index order from the requested starting track and the lowest free
//! index wins, so the same snapshot always produces the same answer.

use tracing::debug;

use super::diagnostics::TrackScanEntry;
use crate::timeline::TrackSnapshot;

/// Scan verdicts for every track at or after `start_index`, in index order
pub fn scan(
    tracks: &[TrackSnapshot],
    target_seconds: f64,
    buffer: f64,
    start_index: usize,
) -> Vec<TrackScanEntry> {
    let mut candidates: Vec<&TrackSnapshot> = tracks
        .iter()
        .filter(|track| track.index >= start_index)
        .collect();
    candidates.sort_by_key(|track| track.index);

    candidates
        .into_iter()
        .map(|track| {
            let conflict = track.first_conflict(target_seconds, buffer);
            TrackScanEntry {
                index: track.index,
                free: conflict.is_none(),
                conflict,
            }
        })
        .collect()
}

/// Lowest free track index at or after `start_index`
pub fn find_free_track(
    tracks: &[TrackSnapshot],
    target_seconds: f64,
    buffer: f64,
    start_index: usize,
) -> Option<usize> {
    first_free(&scan(tracks, target_seconds, buffer, start_index))
}

/// Lowest free index in a scan report
pub fn first_free(report: &[TrackScanEntry]) -> Option<usize> {
    let found = report.iter().find(|entry| entry.free).map(|entry| entry.index);
    debug!(
        scanned = report.len(),
        free_track = ?found,
        "conflict scan complete"
    );
    found
}
