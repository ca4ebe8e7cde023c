//! Track provisioning
//!
//! When every candidate track conflicts we try to add a fresh audio track.
//! Hosts expose different track-creation calls (or none), so each call is
//! wrapped in a [`TrackStrategy`] and the strategies are tried in a fixed
//! order. A strategy only counts as successful if the re-read track count
//! actually grew. When the whole table is exhausted the last existing track
//! is reused; the caller gets a placement that may overlap instead of no
//! placement at all.

use tracing::{debug, info, warn};

use super::diagnostics::{StrategyAttempt, StrategyOutcome};
use crate::error::{PlacementError, Result};
use crate::host::{ChannelLayout, Host, HostError, TrackAddition};

/// One way of asking the host for a new audio track
pub trait TrackStrategy {
    /// Stable name used in diagnostics
    fn name(&self) -> &'static str;

    /// Issue the host call(s). `track_count` is the count before the attempt.
    fn attempt(&self, host: &mut dyn Host, track_count: usize) -> StrategyOutcome;
}

fn outcome_of(result: std::result::Result<(), HostError>) -> StrategyOutcome {
    match result {
        Ok(()) => StrategyOutcome::Succeeded,
        Err(err) if err.is_unsupported() => StrategyOutcome::NotApplicable,
        Err(err) => StrategyOutcome::FailedSilently(err.to_string()),
    }
}

/// Enable extended scripting, then add one stereo track after the last one
#[derive(Debug, Clone, Copy, Default)]
pub struct AddTracksAtPosition;

impl TrackStrategy for AddTracksAtPosition {
    fn name(&self) -> &'static str {
        "add-tracks-at-position"
    }

    fn attempt(&self, host: &mut dyn Host, track_count: usize) -> StrategyOutcome {
        if let Err(err) = host.enable_extended_scripting() {
            return outcome_of(Err(err));
        }
        outcome_of(host.add_tracks(TrackAddition {
            count: 1,
            position: track_count,
            layout: ChannelLayout::Stereo,
        }))
    }
}

/// Insert one track at a fixed insertion point (the end of the list)
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertTracks;

impl TrackStrategy for InsertTracks {
    fn name(&self) -> &'static str {
        "insert-tracks"
    }

    fn attempt(&self, host: &mut dyn Host, track_count: usize) -> StrategyOutcome {
        outcome_of(host.insert_tracks(track_count, 1))
    }
}

/// Generic single-track insertion
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertAudioTrack;

impl TrackStrategy for InsertAudioTrack {
    fn name(&self) -> &'static str {
        "insert-audio-track"
    }

    fn attempt(&self, host: &mut dyn Host, _track_count: usize) -> StrategyOutcome {
        outcome_of(host.insert_audio_track())
    }
}

/// Where the placement should go after provisioning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    /// Track to use: the first new track, or the reused last track
    pub index: usize,
    /// False when no strategy grew the track list
    pub created: bool,
    pub attempts: Vec<StrategyAttempt>,
}

impl Provisioned {
    /// The non-fatal warning for a forced reuse, if this was one
    pub fn degradation(&self) -> Option<PlacementError> {
        if self.created {
            return None;
        }
        let reason = if self.attempts.is_empty() {
            "no track-creation strategy configured".to_string()
        } else {
            let tried: Vec<String> = self
                .attempts
                .iter()
                .map(|attempt| format!("{}: {}", attempt.strategy, describe(&attempt.outcome)))
                .collect();
            tried.join("; ")
        };
        Some(PlacementError::TrackCreationDegraded {
            track_index: self.index,
            reason,
        })
    }
}

fn describe(outcome: &StrategyOutcome) -> String {
    match outcome {
        StrategyOutcome::Succeeded => "succeeded".to_string(),
        StrategyOutcome::NotApplicable => "not available".to_string(),
        StrategyOutcome::FailedSilently(reason) => reason.clone(),
    }
}

/// Ordered table of track-creation strategies
pub struct TrackProvisioner {
    strategies: Vec<Box<dyn TrackStrategy>>,
}

impl Default for TrackProvisioner {
    fn default() -> Self {
        Self::new(vec![
            Box::new(AddTracksAtPosition),
            Box::new(InsertTracks),
            Box::new(InsertAudioTrack),
        ])
    }
}

impl std::fmt::Debug for TrackProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackProvisioner")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

impl TrackProvisioner {
    pub fn new(strategies: Vec<Box<dyn TrackStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Create a track, or fall back to the last existing one
    ///
    /// `track_count` is the number of tracks in the snapshot the caller
    /// scanned. Fails only when there is no track at all to fall back to.
    pub fn create_track(&self, host: &mut dyn Host, track_count: usize) -> Result<Provisioned> {
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let before = current_track_count(host).unwrap_or(track_count);
            let mut outcome = strategy.attempt(host, before);
            let after = current_track_count(host).unwrap_or(before);

            if outcome == StrategyOutcome::Succeeded && after <= before {
                outcome = StrategyOutcome::FailedSilently(format!(
                    "track count stayed at {}",
                    after
                ));
            }
            debug!(strategy = strategy.name(), ?outcome, before, after, "track strategy attempted");

            let succeeded = outcome == StrategyOutcome::Succeeded;
            attempts.push(StrategyAttempt {
                strategy: strategy.name().to_string(),
                outcome,
                tracks_before: before,
                tracks_after: after,
            });

            if succeeded {
                info!(strategy = strategy.name(), index = before, "created audio track");
                return Ok(Provisioned {
                    index: before,
                    created: true,
                    attempts,
                });
            }
        }

        let last = host
            .active_timeline()
            .map(|timeline| timeline.last_track_index())
            .unwrap_or_else(|| track_count.checked_sub(1))
            .ok_or(PlacementError::NoTrackAvailable)?;
        warn!(index = last, "no track could be created, reusing last track");
        Ok(Provisioned {
            index: last,
            created: false,
            attempts,
        })
    }
}

fn current_track_count(host: &dyn Host) -> Option<usize> {
    host.active_timeline().map(|timeline| timeline.track_count())
}
