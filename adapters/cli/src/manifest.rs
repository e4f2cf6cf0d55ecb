use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use log::warn;
use runner_track_system_generation::GenerationConfig;
use runner_track_world::TrackConfig;
use serde::Deserialize;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Track and generation settings read from a manifest file.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TrackManifest {
    /// Platform templates, slot spacing and capacity.
    pub(crate) track: TrackConfig,
    /// Hazard templates, pattern tables and pattern tuning.
    pub(crate) generation: GenerationConfig,
}

impl TrackManifest {
    /// Returns the default manifest path relative to the repository root.
    #[must_use]
    pub(crate) fn default_path() -> PathBuf {
        PathBuf::from("assets/track.toml")
    }

    /// Loads the manifest located at the provided path.
    pub(crate) fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read track manifest at {}",
                manifest_path.display()
            )
        })?;
        parse_manifest(&contents)
            .with_context(|| format!("invalid track manifest {}", manifest_path.display()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    #[serde(default)]
    track: TrackConfig,
    #[serde(default)]
    generation: GenerationConfig,
}

fn parse_manifest(contents: &str) -> Result<TrackManifest> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse track manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported track manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    manifest
        .track
        .validate()
        .context("track section cannot drive a track")?;

    if manifest.generation.hazard_templates.is_empty() {
        warn!("manifest lists no hazard templates; generated platforms will stay empty");
    }
    if manifest.generation.pattern_tables.is_empty() {
        warn!("manifest lists no pattern tables; table patterns will abort");
    }

    Ok(TrackManifest {
        track: manifest.track,
        generation: manifest.generation,
    })
}
