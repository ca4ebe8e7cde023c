//! SFX Placer - Timeline placement for generated sound effects
//!
//! Takes a freshly rendered audio file and a target time and lands it on
//! the host editor's active sequence:
//! 1. Import the file once (or reuse the existing project item)
//! 2. File it into the managed bin
//! 3. Pick the first track with no clip near the target time, creating a
//!    track if every candidate conflicts
//! 4. Insert and verify the clip
//!
//! # Architecture
//!
//! - `host`: the capability trait the engine drives, plus an in-memory host
//! - `timeline`: per-call snapshots of tracks and clips
//! - `placement`: the engine itself
//!
//! The engine is stateless: every call re-reads the host.

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod placement;
pub mod timeline;

pub use config::PlacementConfig;
pub use error::{PlacementError, Result, Stage};
pub use host::{Host, HostError, InMemoryHost, ProjectItem, ProjectItemHandle};
pub use placement::{AssetReference, PlacementCoordinator, PlacementRequest, PlacementResult};
pub use timeline::{ClipInterval, Timeline, TrackSnapshot};
