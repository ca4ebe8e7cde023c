//! Clip insertion and verification

use tracing::{debug, warn};

use super::diagnostics::VerificationReport;
use crate::error::{PlacementError, Result};
use crate::host::{Host, ProjectItemHandle};
use crate::timeline::ClipInterval;

/// Smallest tolerance used when checking where a clip landed (seconds)
pub const MIN_VERIFY_TOLERANCE_SECONDS: f64 = 0.001;

/// Inserts items and checks that they show up on the track
#[derive(Debug, Clone, Default)]
pub struct PlacementExecutor;

impl PlacementExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Insert `item` on `track_index` at `target_seconds` and verify it
    ///
    /// A host rejection is fatal. A clip that does not show up is only
    /// reported as unverified, because some hosts update their timeline
    /// model asynchronously.
    pub fn place(
        &self,
        host: &mut dyn Host,
        item: &ProjectItemHandle,
        track_index: usize,
        target_seconds: f64,
        buffer: f64,
    ) -> Result<VerificationReport> {
        let before = track_intervals(host, track_index);

        host.insert_clip(item, track_index, target_seconds)
            .map_err(|source| PlacementError::InsertFailure {
                track_index,
                at_seconds: target_seconds,
                source,
            })?;

        let tolerance = buffer.max(MIN_VERIFY_TOLERANCE_SECONDS);
        let after = track_intervals(host, track_index);
        let landed_at = added_intervals(before, after)
            .into_iter()
            .map(|interval| interval.start_seconds)
            .find(|start| (start - target_seconds).abs() <= tolerance);

        let verified = landed_at.is_some();
        if verified {
            debug!(track_index, ?landed_at, "insertion verified");
        } else {
            warn!(track_index, target_seconds, "insertion not visible on the timeline yet");
        }

        Ok(VerificationReport {
            verified,
            tolerance_seconds: tolerance,
            landed_at,
        })
    }
}

fn track_intervals(host: &dyn Host, track_index: usize) -> Vec<ClipInterval> {
    host.active_timeline()
        .and_then(|timeline| timeline.track(track_index).map(|track| track.intervals.clone()))
        .unwrap_or_default()
}

/// Intervals of `after` left over once each `before` entry cancels one equal
/// occurrence, so a clip identical to an existing one still counts as new
fn added_intervals(mut before: Vec<ClipInterval>, after: Vec<ClipInterval>) -> Vec<ClipInterval> {
    after
        .into_iter()
        .filter(|interval| match before.iter().position(|old| old == interval) {
            Some(found) => {
                before.swap_remove(found);
                false
            }
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostFaults, InMemoryHost};
    use approx::assert_relative_eq;

    fn host_with_item(faults: HostFaults) -> (InMemoryHost, ProjectItemHandle) {
        let host = InMemoryHost::with_empty_tracks(2)
            .with_media("a.wav", "/sfx/a.wav")
            .with_faults(faults);
        let item = host.project_root().children()[0].handle.clone();
        (host, item)
    }

    #[test]
    fn test_insert_is_verified() {
        let (mut host, item) = host_with_item(HostFaults::default());

        let report = PlacementExecutor::new()
            .place(&mut host, &item, 1, 7.25, 0.1)
            .unwrap();

        assert!(report.verified);
        assert_relative_eq!(report.landed_at.unwrap(), 7.25);
        assert_relative_eq!(report.tolerance_seconds, 0.1);
    }

    #[test]
    fn test_zero_buffer_uses_minimum_tolerance() {
        let (mut host, item) = host_with_item(HostFaults::default());
        let report = PlacementExecutor::new()
            .place(&mut host, &item, 0, 1.0, 0.0)
            .unwrap();
        assert!(report.verified);
        assert_relative_eq!(report.tolerance_seconds, MIN_VERIFY_TOLERANCE_SECONDS);
    }

    #[test]
    fn test_rejected_insert_is_fatal() {
        let (mut host, item) = host_with_item(HostFaults {
            reject_insert: true,
            ..HostFaults::default()
        });

        let err = PlacementExecutor::new()
            .place(&mut host, &item, 0, 1.0, 0.1)
            .unwrap_err();

        assert_eq!(err.error_code(), "INSERT_FAILURE");
        assert_eq!(host.calls().inserts, 1);
    }

    #[test]
    fn test_deferred_insert_is_unverified() {
        let (mut host, item) = host_with_item(HostFaults {
            defer_insert_reflection: true,
            ..HostFaults::default()
        });

        let report = PlacementExecutor::new()
            .place(&mut host, &item, 0, 3.0, 0.1)
            .unwrap();

        assert!(!report.verified);
        assert_eq!(report.landed_at, None);
    }

    #[test]
    fn test_added_intervals_counts_duplicates() {
        let clip = ClipInterval::new(5.0, 7.0);
        let added = added_intervals(vec![clip], vec![clip, clip]);
        assert_eq!(added, vec![clip]);
        assert!(added_intervals(vec![clip], vec![clip]).is_empty());
    }

    #[test]
    fn test_unknown_item_is_insert_failure() {
        let (mut host, _) = host_with_item(HostFaults::default());
        let err = PlacementExecutor::new()
            .place(&mut host, &ProjectItemHandle::new("missing"), 0, 3.0, 0.1)
            .unwrap_err();
        assert!(matches!(err, PlacementError::InsertFailure { track_index: 0, .. }));
    }
}
