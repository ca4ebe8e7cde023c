//! SFX Placer CLI
//!
//! Command-line front end for the timeline placement engine.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sfx_placer::cli::commands::{self, PlaceOptions};
use sfx_placer::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("SFX Placer v{}", env!("CARGO_PKG_VERSION"));

    let config = commands::load_config(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Place {
            scene,
            asset,
            at,
            track,
            bin,
            buffer,
            write_back,
        } => {
            let options = PlaceOptions {
                track,
                bin,
                buffer,
                write_back,
            };
            let result = commands::place(&config, &scene, &asset, at, &options)
                .with_context(|| format!("placing {}", asset))?;
            if !result.success {
                std::process::exit(2);
            }
        }
        Commands::Scan {
            scene,
            at,
            track,
            buffer,
        } => {
            commands::scan(&config, &scene, at, track, buffer)
                .with_context(|| format!("scanning {}", scene.display()))?;
        }
        Commands::InitScene { path, tracks } => {
            commands::init_scene(&path, tracks)
                .with_context(|| format!("creating scene {}", path.display()))?;
        }
    }

    Ok(())
}
