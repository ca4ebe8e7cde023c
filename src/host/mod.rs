//! Host capability interface
//!
//! The engine never talks to an editor directly. It drives a [`Host`],
//! which exposes the handful of primitives placement needs: timeline
//! snapshots, the project item tree, import, bins, clip insertion and a
//! set of optional track-creation calls. Hosts differ in which of the
//! track-creation calls they expose, so those default to
//! [`HostError::Unsupported`].

pub mod memory;
pub mod tree;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timeline::Timeline;

pub use memory::{HostCapabilities, HostFaults, InMemoryHost};

/// Result type for host primitives
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Errors reported by a host primitive
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("host does not support {capability}")]
    Unsupported { capability: &'static str },

    #[error("{operation} rejected: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    #[error("{what} not found")]
    NotFound { what: String },
}

impl HostError {
    pub fn unsupported(capability: &'static str) -> Self {
        HostError::Unsupported { capability }
    }

    pub fn rejected(operation: &'static str, reason: impl Into<String>) -> Self {
        HostError::Rejected {
            operation,
            reason: reason.into(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, HostError::Unsupported { .. })
    }
}

/// Opaque identifier of an item in the host project
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectItemHandle(pub String);

impl ProjectItemHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a project item is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// Imported media backed by a file on disk
    Media {
        media_path: String,
        #[serde(default)]
        duration_seconds: Option<f64>,
    },
    /// Folder-like container
    Bin {
        #[serde(default)]
        children: Vec<ProjectItem>,
    },
}

/// A node of the host's project tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub handle: ProjectItemHandle,
    pub name: String,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl ProjectItem {
    pub fn media(
        handle: ProjectItemHandle,
        name: impl Into<String>,
        media_path: impl Into<String>,
    ) -> Self {
        Self {
            handle,
            name: name.into(),
            kind: ItemKind::Media {
                media_path: media_path.into(),
                duration_seconds: None,
            },
        }
    }

    pub fn bin(handle: ProjectItemHandle, name: impl Into<String>) -> Self {
        Self {
            handle,
            name: name.into(),
            kind: ItemKind::Bin {
                children: Vec::new(),
            },
        }
    }

    pub fn is_bin(&self) -> bool {
        matches!(self.kind, ItemKind::Bin { .. })
    }

    pub fn media_path(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Media { media_path, .. } => Some(media_path),
            ItemKind::Bin { .. } => None,
        }
    }

    pub fn children(&self) -> &[ProjectItem] {
        match &self.kind {
            ItemKind::Bin { children } => children,
            ItemKind::Media { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<ProjectItem>> {
        match &mut self.kind {
            ItemKind::Bin { children } => Some(children),
            ItemKind::Media { .. } => None,
        }
    }
}

/// Channel layout of a new audio track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelLayout {
    Mono,
    Stereo,
}

/// Arguments of the "add N tracks at position" primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackAddition {
    pub count: usize,
    /// Index the first new track receives
    pub position: usize,
    pub layout: ChannelLayout,
}

/// Primitives the placement engine drives
pub trait Host {
    /// Snapshot of the active sequence, or `None` when nothing is open
    fn active_timeline(&self) -> Option<Timeline>;

    /// Snapshot of the project item tree; the root is always a bin
    fn project_root(&self) -> ProjectItem;

    /// Import a file into the project root. No handle is returned.
    fn import_media(&mut self, path: &str) -> HostResult<()>;

    /// Create a bin directly under the project root
    fn create_container(&mut self, name: &str) -> HostResult<ProjectItemHandle>;

    /// Move an item into a bin
    fn move_item(
        &mut self,
        item: &ProjectItemHandle,
        container: &ProjectItemHandle,
    ) -> HostResult<()>;

    /// Insert a media item onto a track at the given time
    fn insert_clip(
        &mut self,
        item: &ProjectItemHandle,
        track_index: usize,
        at_seconds: f64,
    ) -> HostResult<()>;

    /// Handles of every item matching `predicate`, in tree order
    fn find_project_items(&self, predicate: &dyn Fn(&ProjectItem) -> bool) -> Vec<ProjectItemHandle> {
        let root = self.project_root();
        tree::find_all(&root, |item| predicate(item))
            .into_iter()
            .map(|item| item.handle.clone())
            .collect()
    }

    /// Turn on the host's extended scripting layer; enabling twice is a no-op
    fn enable_extended_scripting(&mut self) -> HostResult<()> {
        Err(HostError::unsupported("extended scripting"))
    }

    /// Add tracks at a position (extended scripting)
    fn add_tracks(&mut self, _addition: TrackAddition) -> HostResult<()> {
        Err(HostError::unsupported("add tracks"))
    }

    /// Insert audio tracks at a fixed insertion point
    fn insert_tracks(&mut self, _at_index: usize, _count: usize) -> HostResult<()> {
        Err(HostError::unsupported("insert tracks"))
    }

    /// Generic "insert audio track" call
    fn insert_audio_track(&mut self) -> HostResult<()> {
        Err(HostError::unsupported("insert audio track"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BareHost;

    impl Host for BareHost {
        fn active_timeline(&self) -> Option<Timeline> {
            None
        }

        fn project_root(&self) -> ProjectItem {
            let mut root = ProjectItem::bin(ProjectItemHandle::new("root"), "Project");
            if let Some(children) = root.children_mut() {
                children.push(ProjectItem::media(
                    ProjectItemHandle::new("a"),
                    "a.wav",
                    "/sfx/a.wav",
                ));
            }
            root
        }

        fn import_media(&mut self, _path: &str) -> HostResult<()> {
            Ok(())
        }

        fn create_container(&mut self, _name: &str) -> HostResult<ProjectItemHandle> {
            Err(HostError::unsupported("bins"))
        }

        fn move_item(&mut self, _: &ProjectItemHandle, _: &ProjectItemHandle) -> HostResult<()> {
            Ok(())
        }

        fn insert_clip(&mut self, _: &ProjectItemHandle, _: usize, _: f64) -> HostResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_track_primitives_default_to_unsupported() {
        let mut host = BareHost;
        assert!(host.enable_extended_scripting().unwrap_err().is_unsupported());
        assert!(host.insert_tracks(0, 1).unwrap_err().is_unsupported());
        assert!(host.insert_audio_track().unwrap_err().is_unsupported());
    }

    #[test]
    fn test_find_project_items_walks_tree() {
        let host = BareHost;
        let found = host.find_project_items(&|item: &ProjectItem| item.media_path() == Some("/sfx/a.wav"));
        assert_eq!(found, vec![ProjectItemHandle::new("a")]);
    }

    #[test]
    fn test_item_serializes_flat() {
        let item = ProjectItem::media(ProjectItemHandle::new("x"), "x.wav", "/x.wav");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "media");
        assert_eq!(json["handle"], "x");
        assert_eq!(json["media_path"], "/x.wav");
    }
}
