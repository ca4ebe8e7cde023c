//! Placement orchestration
//!
//! One synchronous call per request: validate, snapshot the timeline,
//! resolve the asset, file it into its bin, pick or provision a track,
//! insert and verify. Nothing is retried and nothing is remembered between
//! calls. Failures before insertion abort the call; bin problems and track
//! provisioning fallbacks only add warnings.

use std::sync::Mutex;
use std::time::Duration;

use tracing::{info, warn};

use super::bins::BinOrganizer;
use super::diagnostics::{Diagnostics, VerificationReport};
use super::executor::PlacementExecutor;
use super::provisioner::TrackProvisioner;
use super::request::PlacementRequest;
use super::resolver::AssetResolver;
use super::result::{owned, PlacementResult};
use super::scanner;
use crate::config::PlacementConfig;
use crate::error::{PlacementError, Result};
use crate::host::{Host, HostError, ProjectItemHandle};
use crate::timeline::format_position;

/// Everything decided by a successful run
struct Placed {
    item: ProjectItemHandle,
    track_index: usize,
    created_new_track: bool,
    degraded: bool,
    suggestions: Vec<String>,
    verification: VerificationReport,
    frame_rate: Option<f64>,
}

/// Runs placement requests against a host
#[derive(Debug, Default)]
pub struct PlacementCoordinator {
    resolver: AssetResolver,
    bins: BinOrganizer,
    provisioner: TrackProvisioner,
    executor: PlacementExecutor,
}

impl PlacementCoordinator {
    pub fn new(config: &PlacementConfig) -> Self {
        Self {
            resolver: AssetResolver::new(
                config.import_search_attempts,
                Duration::from_millis(config.import_poll_interval_ms),
            ),
            ..Self::default()
        }
    }

    /// Replace the track-creation strategy table
    pub fn with_provisioner(mut self, provisioner: TrackProvisioner) -> Self {
        self.provisioner = provisioner;
        self
    }

    /// Place the requested asset and report what happened
    pub fn place(&self, host: &mut dyn Host, request: &PlacementRequest) -> PlacementResult {
        let mut diagnostics = Diagnostics::start();
        let outcome = self.run(host, request, &mut diagnostics);
        diagnostics.finish();

        let file_name = request.asset.file_name().to_string();
        match outcome {
            Ok(placed) => self.success(request, placed, file_name, diagnostics),
            Err(err) => {
                warn!(
                    stage = %err.stage(),
                    code = err.error_code(),
                    recoverable = err.is_recoverable(),
                    error = %err,
                    "placement failed"
                );
                PlacementResult::failure(&err, &file_name, diagnostics)
            }
        }
    }

    /// Place while holding the host lock for the whole call
    ///
    /// Two submissions racing between scan and insert could otherwise pick
    /// the same free track.
    pub fn place_shared<H: Host>(&self, host: &Mutex<H>, request: &PlacementRequest) -> PlacementResult {
        match host.lock() {
            Ok(mut guard) => self.place(&mut *guard, request),
            Err(_) => {
                let err = PlacementError::Host(HostError::rejected("lock", "host state poisoned"));
                PlacementResult::failure(&err, request.asset.file_name(), Diagnostics::start())
            }
        }
    }

    fn run(
        &self,
        host: &mut dyn Host,
        request: &PlacementRequest,
        diagnostics: &mut Diagnostics,
    ) -> Result<Placed> {
        request.validate()?;
        let target = request.target_seconds;
        let buffer = request.conflict_buffer_seconds;

        let timeline = host.active_timeline().ok_or(PlacementError::NoActiveTimeline)?;
        diagnostics.timeline_name = Some(timeline.name.clone());

        let resolution = self.resolver.resolve(host, &request.asset.source_path)?;
        let item = resolution.handle.clone();
        diagnostics.resolution = Some(resolution);

        let bin = self.bins.organize(host, &item, &request.bin_name);
        if bin.is_failure() {
            diagnostics.warn(format!("asset left outside bin '{}'", request.bin_name));
        }
        diagnostics.bin = Some(bin);

        let scan = scanner::scan(&timeline.tracks, target, buffer, request.starting_track_index);
        let free = scanner::first_free(&scan);
        diagnostics.scan = scan;

        let mut suggestions = Vec::new();
        let (track_index, created_new_track, degraded) = match free {
            Some(index) => (index, false, false),
            None => {
                let provisioned = self.provisioner.create_track(host, timeline.track_count())?;
                diagnostics.strategies = provisioned.attempts.clone();

                if let Some(degradation) = provisioned.degradation() {
                    warn!(error = %degradation, "degraded placement");
                    diagnostics.warn(degradation.to_string());
                    suggestions = owned(degradation.recovery_suggestions());
                    (provisioned.index, false, true)
                } else {
                    let refreshed = host.active_timeline().ok_or(PlacementError::NoActiveTimeline)?;
                    let rescan =
                        scanner::scan(&refreshed.tracks, target, buffer, request.starting_track_index);
                    let index = scanner::first_free(&rescan).unwrap_or(provisioned.index);
                    diagnostics.rescan = rescan;
                    (index, true, false)
                }
            }
        };

        let verification = self
            .executor
            .place(host, &item, track_index, target, buffer)?;
        if !verification.verified {
            diagnostics.warn("inserted clip not visible on the timeline yet");
        }
        diagnostics.verification = Some(verification.clone());

        Ok(Placed {
            item,
            track_index,
            created_new_track,
            degraded,
            suggestions,
            verification,
            frame_rate: timeline.frame_rate,
        })
    }

    fn success(
        &self,
        request: &PlacementRequest,
        placed: Placed,
        file_name: String,
        diagnostics: Diagnostics,
    ) -> PlacementResult {
        let position = format_position(request.target_seconds, placed.frame_rate);
        let track_number = placed.track_index + 1;
        let name = &request.asset.display_name;

        let mut message = if placed.degraded {
            format!(
                "Degraded placement: {} placed on track {} at {}, no new track could be created and it may overlap existing audio",
                name, track_number, position
            )
        } else if placed.created_new_track {
            format!("{} placed on new track {} at {}", name, track_number, position)
        } else {
            format!("{} placed on track {} at {}", name, track_number, position)
        };
        if !placed.verification.verified {
            message.push_str(" (not yet visible on the timeline)");
        }

        info!(
            track = placed.track_index,
            created = placed.created_new_track,
            degraded = placed.degraded,
            verified = placed.verification.verified,
            "{}",
            message
        );

        PlacementResult {
            success: true,
            track_index: Some(placed.track_index),
            created_new_track: placed.created_new_track,
            verified: placed.verification.verified,
            degraded: placed.degraded,
            message,
            stage: None,
            error_code: None,
            file_name,
            position_formatted: Some(position),
            item: Some(placed.item),
            suggestions: placed.suggestions,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use crate::host::{HostCapabilities, HostFaults, InMemoryHost};
    use crate::placement::request::AssetReference;
    use crate::timeline::{Timeline, TrackSnapshot};

    fn request(target: f64) -> PlacementRequest {
        PlacementRequest::from_config(
            AssetReference::new("/sfx/boom.wav"),
            target,
            &PlacementConfig::default(),
        )
    }

    #[test]
    fn test_happy_path() {
        let mut host = InMemoryHost::with_empty_tracks(2);
        let result = PlacementCoordinator::default().place(&mut host, &request(4.0));

        assert!(result.success, "{}", result.message);
        assert_eq!(result.track_index, Some(0));
        assert!(result.verified);
        assert!(!result.created_new_track);
        assert_eq!(result.position_formatted.as_deref(), Some("00:00:04:00"));
        assert_eq!(result.file_name, "boom.wav");
        assert!(result.diagnostics.warnings.is_empty());
    }

    #[test]
    fn test_validation_happens_before_any_host_call() {
        let mut host = InMemoryHost::with_empty_tracks(1);
        let result = PlacementCoordinator::default().place(&mut host, &request(-3.0));

        assert_eq!(result.stage, Some(Stage::Validate));
        assert_eq!(host.calls().imports, 0);
    }

    #[test]
    fn test_no_timeline_aborts_before_import() {
        let mut host = InMemoryHost::new();
        let result = PlacementCoordinator::default().place(&mut host, &request(1.0));

        assert!(!result.success);
        assert_eq!(result.stage, Some(Stage::Timeline));
        assert_eq!(host.calls().imports, 0);
        assert!(host.project_root().children().is_empty());
    }

    #[test]
    fn test_bin_failure_is_a_warning() {
        let mut host = InMemoryHost::with_empty_tracks(1).with_faults(HostFaults {
            reject_move: true,
            ..HostFaults::default()
        });
        let result = PlacementCoordinator::default().place(&mut host, &request(1.0));

        assert!(result.success);
        assert!(result.diagnostics.bin.as_ref().unwrap().is_failure());
        assert_eq!(result.diagnostics.warnings.len(), 1);
    }

    #[test]
    fn test_insert_failure_is_fatal() {
        let mut host = InMemoryHost::with_empty_tracks(1).with_faults(HostFaults {
            reject_insert: true,
            ..HostFaults::default()
        });
        let result = PlacementCoordinator::default().place(&mut host, &request(1.0));

        assert!(!result.success);
        assert_eq!(result.stage, Some(Stage::Insert));
        assert_eq!(result.error_code.as_deref(), Some("INSERT_FAILURE"));
        assert_eq!(result.suggestions[0], "Unlock the target track");
        assert!(result.diagnostics.resolution.is_some());
    }

    #[test]
    fn test_unverified_insert_still_succeeds() {
        let mut host = InMemoryHost::with_empty_tracks(1).with_faults(HostFaults {
            defer_insert_reflection: true,
            ..HostFaults::default()
        });
        let result = PlacementCoordinator::default().place(&mut host, &request(1.0));

        assert!(result.success);
        assert!(!result.verified);
        assert!(result.message.contains("not yet visible"));
    }

    #[test]
    fn test_empty_timeline_without_track_creation_fails_at_provision() {
        let mut host = InMemoryHost::new()
            .with_timeline(Timeline::new("Empty"))
            .with_capabilities(HostCapabilities::none());
        let result = PlacementCoordinator::default().place(&mut host, &request(1.0));

        assert_eq!(result.stage, Some(Stage::Provision));
        assert_eq!(result.error_code.as_deref(), Some("NO_TRACK_AVAILABLE"));
    }

    #[test]
    fn test_degraded_duplicate_clip_is_verified() {
        let mut host = InMemoryHost::with_empty_tracks(1).with_capabilities(HostCapabilities::none());
        let coordinator = PlacementCoordinator::default();

        let first = coordinator.place(&mut host, &request(5.0));
        let second = coordinator.place(&mut host, &request(5.0));

        assert!(first.verified);
        assert!(second.success);
        assert!(second.degraded);
        assert!(second.verified, "{}", second.message);
        assert!(second.suggestions.iter().any(|s| s.contains("empty audio track")));
        assert!(first.suggestions.is_empty());
        assert!(!second.message.contains("not yet visible"));
        let track = host.active_timeline().unwrap().tracks[0].clone();
        assert_eq!(track.intervals.len(), 2);
        assert_eq!(track.intervals[0], track.intervals[1]);
    }

    #[test]
    fn test_place_shared_serializes_submissions() {
        let mut timeline = Timeline::new("Seq");
        timeline.tracks.push(TrackSnapshot::new(0, "Audio 1"));
        let host = Mutex::new(InMemoryHost::new().with_timeline(timeline));
        let coordinator = PlacementCoordinator::default();

        let first = coordinator.place_shared(&host, &request(2.0));
        let second = coordinator.place_shared(&host, &request(2.0));

        assert_eq!(first.track_index, Some(0));
        assert_eq!(second.track_index, Some(1));
        assert!(second.created_new_track);
    }
}
