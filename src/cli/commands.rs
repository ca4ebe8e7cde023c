//! CLI Command Implementations

use std::path::Path;

use tracing::info;

use crate::config::PlacementConfig;
use crate::error::{PlacementError, Result};
use crate::host::InMemoryHost;
use crate::placement::{scanner, AssetReference, PlacementCoordinator, PlacementRequest, PlacementResult};

/// Load the config file, or defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<PlacementConfig> {
    match path {
        Some(path) => PlacementConfig::load(path),
        None => Ok(PlacementConfig::default()),
    }
}

/// Options of the `place` command
#[derive(Debug, Clone, Default)]
pub struct PlaceOptions {
    pub track: Option<usize>,
    pub bin: Option<String>,
    pub buffer: Option<f64>,
    pub write_back: bool,
}

/// Place an asset on the scene's active sequence and print the result.
pub fn place(
    config: &PlacementConfig,
    scene: &Path,
    asset: &str,
    at: f64,
    options: &PlaceOptions,
) -> Result<PlacementResult> {
    info!("Placing {} at {}s using scene {}", asset, at, scene.display());

    let mut host = InMemoryHost::load_scene(scene)?;
    let mut request = PlacementRequest::from_config(AssetReference::new(asset), at, config);
    if let Some(track) = options.track {
        request = request.with_starting_track(track);
    }
    if let Some(bin) = &options.bin {
        request = request.with_bin(bin.clone());
    }
    if let Some(buffer) = options.buffer {
        request = request.with_buffer(buffer);
    }

    let result = PlacementCoordinator::new(config).place(&mut host, &request);
    println!("{}", serde_json::to_string_pretty(&result)?);

    if options.write_back && result.success {
        host.save_scene(scene)?;
        info!("Scene updated: {}", scene.display());
    }

    Ok(result)
}

/// Print the conflict scan for a time.
pub fn scan(
    config: &PlacementConfig,
    scene: &Path,
    at: f64,
    track: Option<usize>,
    buffer: Option<f64>,
) -> Result<Option<usize>> {
    let host = InMemoryHost::load_scene(scene)?;
    let timeline = host.timeline().ok_or(PlacementError::NoActiveTimeline)?;
    let buffer = buffer.unwrap_or(config.conflict_buffer_seconds);
    let start = track.unwrap_or(config.starting_track_index);

    let report = scanner::scan(&timeline.tracks, at, buffer, start);
    let free = scanner::first_free(&report);

    println!("Scan of '{}' at {}s (buffer {}s):", timeline.name, at, buffer);
    println!("{:-<60}", "");
    for entry in &report {
        match entry.conflict {
            Some(conflict) => println!(
                "  track {:>3}: busy ({:.3}s - {:.3}s)",
                entry.index, conflict.start_seconds, conflict.end_seconds
            ),
            None => println!("  track {:>3}: free", entry.index),
        }
    }
    println!("{:-<60}", "");
    match free {
        Some(index) => println!("First free track: {}", index),
        None => println!("No free track; placement would provision a new one"),
    }

    Ok(free)
}

/// Write a starter scene with empty audio tracks.
pub fn init_scene(path: &Path, tracks: usize) -> Result<()> {
    info!("Creating scene at: {}", path.display());
    InMemoryHost::with_empty_tracks(tracks).save_scene(path)?;
    println!("Scene created: {} ({} tracks)", path.display(), tracks);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_place_with_write_back() {
        let dir = TempDir::new().unwrap();
        let scene = dir.path().join("scene.json");
        init_scene(&scene, 1).unwrap();

        let options = PlaceOptions {
            write_back: true,
            ..PlaceOptions::default()
        };
        let config = PlacementConfig::default();
        let first = place(&config, &scene, "/sfx/boom.wav", 1.0, &options).unwrap();
        let second = place(&config, &scene, "/sfx/boom.wav", 1.0, &options).unwrap();

        assert_eq!(first.track_index, Some(0));
        assert_eq!(second.track_index, Some(1));
        assert!(second.created_new_track);
        assert_eq!(scan(&config, &scene, 1.0, None, None).unwrap(), None);
    }

    #[test]
    fn test_scan_without_timeline() {
        let dir = TempDir::new().unwrap();
        let scene = dir.path().join("scene.json");
        InMemoryHost::new().save_scene(&scene).unwrap();

        let err = scan(&PlacementConfig::default(), &scene, 1.0, None, None).unwrap_err();
        assert!(matches!(err, PlacementError::NoActiveTimeline));
    }
}
