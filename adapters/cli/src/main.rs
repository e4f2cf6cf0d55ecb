#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a seeded runner track simulation.

mod manifest;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use runner_track_core::{EntityKind, PlatformId};
use runner_track_system_driver::{RecordingPool, TrackDriver};
use runner_track_world::query;

use crate::manifest::TrackManifest;

/// Generates an endless-runner track and prints what every platform holds.
#[derive(Debug, Parser)]
#[command(name = "runner-track", version, about)]
struct Args {
    /// Track manifest to load.
    #[arg(long, default_value_os_t = TrackManifest::default_path())]
    manifest: PathBuf,
    /// Seed of the pattern generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Number of extension passes to simulate.
    #[arg(long, default_value_t = 8)]
    batches: usize,
    /// Platforms kept behind the player before they are removed.
    #[arg(long, default_value_t = 1)]
    keep_behind: usize,
}

/// Entry point for the runner track command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let manifest = TrackManifest::from_path(&args.manifest)?;
    info!(
        "loaded {} platform templates and {} pattern tables from {}",
        manifest.track.templates.len(),
        manifest.generation.pattern_tables.len(),
        args.manifest.display()
    );

    let mut driver = TrackDriver::new(
        manifest.track,
        manifest.generation,
        args.seed,
        RecordingPool::new(),
    )
    .context("failed to build track driver")?;

    simulate(&mut driver, args.batches, args.keep_behind);
    print_summary(&driver);
    Ok(())
}

/// Extends the track, moving the player to the start of each new batch.
fn simulate(driver: &mut TrackDriver<RecordingPool>, batches: usize, keep_behind: usize) {
    let _ = driver.spawn_initial_platform();

    for batch in 1..=batches {
        let spawned = driver.spawn_platforms();
        info!(
            "batch {batch}: {} platforms added, frontier at {:.1}",
            spawned.len(),
            query::frontier(driver.track())
        );

        let active: Vec<PlatformId> = query::platforms(driver.track())
            .map(|platform| platform.id())
            .collect();
        let passed = active.len().saturating_sub(spawned.len() + keep_behind);
        for platform in &active[..passed] {
            let _ = driver.remove_platform(*platform);
        }
    }
}

fn print_summary(driver: &TrackDriver<RecordingPool>) {
    for platform in query::platforms(driver.track()) {
        let geometry = platform.geometry();
        let pattern = match platform.pattern() {
            Some((kind, category)) => format!("{kind:?} ({category:?})"),
            None => "empty".to_owned(),
        };
        println!(
            "{:>5}  z {:>7.1}..{:<7.1}  {:<28} {:>3} entities",
            platform.id(),
            geometry.near_bound(),
            geometry.far_bound(),
            pattern,
            platform.entities().len()
        );
    }

    let pool = driver.pool();
    let counts = EntityKind::ALL
        .iter()
        .map(|kind| format!("{kind:?}={}", pool.count_of(*kind)))
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "live entities: {} ({counts}); acquired {} released {}",
        pool.active_count(),
        pool.acquired(),
        pool.released()
    );
}
