//! Timeline placement engine
//!
//! Gets a rendered sound effect into the project exactly once, files it
//! into the managed bin, finds (or creates) a track where it does not
//! collide with existing clips, inserts it and checks where it landed.
//!
//! Stages, in call order:
//! - [`resolver`]: locate or import the project item
//! - [`bins`]: file it into the managed bin (best effort)
//! - [`scanner`]: pick the first conflict-free track
//! - [`provisioner`]: create a track when none is free
//! - [`executor`]: insert and verify
//! - [`coordinator`]: run the above as one request

pub mod bins;
pub mod coordinator;
pub mod diagnostics;
pub mod executor;
pub mod provisioner;
pub mod request;
pub mod resolver;
pub mod result;
pub mod scanner;

pub use bins::BinOrganizer;
pub use coordinator::PlacementCoordinator;
pub use diagnostics::{
    BinOutcome, Diagnostics, ResolutionMethod, ResolutionReport, StrategyAttempt, StrategyOutcome,
    TrackScanEntry, VerificationReport,
};
pub use executor::PlacementExecutor;
pub use provisioner::{
    AddTracksAtPosition, InsertAudioTrack, InsertTracks, Provisioned, TrackProvisioner,
    TrackStrategy,
};
pub use request::{AssetReference, PlacementRequest};
pub use resolver::{normalize_media_path, AssetResolver};
pub use result::PlacementResult;
pub use scanner::find_free_track;
