//! Bin management
//!
//! Generated sounds are collected in one bin directly under the project
//! root. Filing is cosmetic: the item is usable wherever it sits, so a
//! failure here is reported and then ignored.

use tracing::{debug, warn};

use super::diagnostics::BinOutcome;
use crate::error::Result;
use crate::host::{tree, Host, ProjectItemHandle};

/// Keeps imported items in the managed bin
#[derive(Debug, Clone, Default)]
pub struct BinOrganizer;

impl BinOrganizer {
    pub fn new() -> Self {
        Self
    }

    /// Existing root-level bin named exactly `name`
    pub fn find_bin(&self, host: &dyn Host, name: &str) -> Option<ProjectItemHandle> {
        host.project_root()
            .children()
            .iter()
            .find(|item| item.is_bin() && item.name == name)
            .map(|item| item.handle.clone())
    }

    /// Handle of the root-level bin named `name`, creating it when absent
    ///
    /// The boolean is true when the bin was created by this call.
    pub fn ensure_bin(&self, host: &mut dyn Host, name: &str) -> Result<(ProjectItemHandle, bool)> {
        if let Some(handle) = self.find_bin(host, name) {
            return Ok((handle, false));
        }
        debug!(name, "creating bin");
        let handle = host.create_container(name)?;
        Ok((handle, true))
    }

    /// Move `item` into `bin` unless it is already there
    ///
    /// Returns whether a move was issued.
    pub fn move_into(
        &self,
        host: &mut dyn Host,
        item: &ProjectItemHandle,
        bin: &ProjectItemHandle,
    ) -> Result<bool> {
        let root = host.project_root();
        let already_there = tree::parent_of(&root, item)
            .map(|parent| &parent.handle == bin)
            .unwrap_or(false);
        if already_there {
            return Ok(false);
        }
        host.move_item(item, bin)?;
        Ok(true)
    }

    /// Ensure the bin and file the item, never failing
    pub fn organize(&self, host: &mut dyn Host, item: &ProjectItemHandle, name: &str) -> BinOutcome {
        let (bin, created_bin) = match self.ensure_bin(host, name) {
            Ok(found) => found,
            Err(err) => {
                warn!(name, error = %err, "could not create bin");
                return BinOutcome::Failed {
                    reason: format!("bin '{}' unavailable: {}", name, err),
                };
            }
        };

        match self.move_into(host, item, &bin) {
            Ok(true) => BinOutcome::Moved { bin, created_bin },
            Ok(false) => BinOutcome::AlreadyInBin { bin },
            Err(err) => {
                warn!(%item, error = %err, "could not move item into bin");
                BinOutcome::Failed {
                    reason: format!("move into '{}' failed: {}", name, err),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostFaults, InMemoryHost};
    use pretty_assertions::assert_eq;

    fn host_with_item() -> (InMemoryHost, ProjectItemHandle) {
        let host = InMemoryHost::with_empty_tracks(1).with_media("a.wav", "/sfx/a.wav");
        let item = host.project_root().children()[0].handle.clone();
        (host, item)
    }

    #[test]
    fn test_bin_created_once() {
        let (mut host, _) = host_with_item();
        let organizer = BinOrganizer::new();

        let (first, created) = organizer.ensure_bin(&mut host, "AI SFX").unwrap();
        let (second, created_again) = organizer.ensure_bin(&mut host, "AI SFX").unwrap();

        assert!(created);
        assert!(!created_again);
        assert_eq!(first, second);
        assert_eq!(host.calls().containers_created, 1);
    }

    #[test]
    fn test_nested_bin_with_same_name_is_ignored() {
        let (mut host, _) = host_with_item();
        let organizer = BinOrganizer::new();
        let outer = host.create_container("Other").unwrap();
        let nested = host.create_container("AI SFX").unwrap();
        host.move_item(&nested, &outer).unwrap();

        let (bin, created) = organizer.ensure_bin(&mut host, "AI SFX").unwrap();

        assert!(created);
        assert_ne!(bin, nested);
    }

    #[test]
    fn test_organize_moves_then_skips() {
        let (mut host, item) = host_with_item();
        let organizer = BinOrganizer::new();

        let first = organizer.organize(&mut host, &item, "AI SFX");
        let second = organizer.organize(&mut host, &item, "AI SFX");

        let bin = organizer.find_bin(&host, "AI SFX").unwrap();
        assert_eq!(first, BinOutcome::Moved { bin: bin.clone(), created_bin: true });
        assert_eq!(second, BinOutcome::AlreadyInBin { bin });
        assert_eq!(host.calls().moves, 1);
    }

    #[test]
    fn test_move_failure_is_reported_not_raised() {
        let (mut host, item) = host_with_item();
        host.faults_mut().reject_move = true;

        let outcome = BinOrganizer::new().organize(&mut host, &item, "AI SFX");

        assert!(outcome.is_failure());
    }

    #[test]
    fn test_bin_creation_failure_is_reported() {
        let (host, item) = host_with_item();
        let mut host = host.with_faults(HostFaults {
            reject_create_container: true,
            ..HostFaults::default()
        });

        let outcome = BinOrganizer::new().organize(&mut host, &item, "AI SFX");

        assert!(matches!(outcome, BinOutcome::Failed { reason } if reason.contains("AI SFX")));
    }
}
