//! CLI Module
//!
//! Drives the placement engine against a JSON scene (a serialized
//! in-memory host).

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SFX Placer - place generated sound effects on a timeline
#[derive(Parser, Debug)]
#[command(name = "sfx-placer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Place an audio file on the scene's active sequence
    #[command(name = "place")]
    Place {
        /// Scene file
        #[arg(short, long)]
        scene: PathBuf,

        /// Audio file to place
        #[arg(short, long)]
        asset: String,

        /// Target time in seconds
        #[arg(long)]
        at: f64,

        /// First track to consider (0-based)
        #[arg(short, long)]
        track: Option<usize>,

        /// Bin to file the asset into
        #[arg(short, long)]
        bin: Option<String>,

        /// Conflict buffer in seconds
        #[arg(long)]
        buffer: Option<f64>,

        /// Save the updated scene back to disk
        #[arg(short, long)]
        write_back: bool,
    },

    /// Report which tracks are free at a time
    #[command(name = "scan")]
    Scan {
        /// Scene file
        #[arg(short, long)]
        scene: PathBuf,

        /// Target time in seconds
        #[arg(long)]
        at: f64,

        /// First track to consider (0-based)
        #[arg(short, long)]
        track: Option<usize>,

        /// Conflict buffer in seconds
        #[arg(long)]
        buffer: Option<f64>,
    },

    /// Write a starter scene
    #[command(name = "init-scene")]
    InitScene {
        /// Path for the new scene
        path: PathBuf,

        /// Number of empty audio tracks
        #[arg(short, long, default_value_t = 2)]
        tracks: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_place() {
        let cli = Cli::try_parse_from([
            "sfx-placer", "place", "--scene", "s.json", "--asset", "/sfx/a.wav", "--at", "12.5",
            "--buffer", "0.5", "-w",
        ])
        .unwrap();
        match cli.command {
            Commands::Place {
                at,
                buffer,
                write_back,
                track,
                ..
            } => {
                assert_eq!(at, 12.5);
                assert_eq!(buffer, Some(0.5));
                assert!(write_back);
                assert_eq!(track, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_init_scene_default_tracks() {
        let cli = Cli::try_parse_from(["sfx-placer", "init-scene", "scene.json"]).unwrap();
        assert!(matches!(cli.command, Commands::InitScene { tracks: 2, .. }));
    }
}
