#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative track state for the runner track generator.
//!
//! The track owns the ordered list of active platforms together with the slot
//! grid derived for each of them. All mutations flow through [`apply`]; read
//! access goes through the [`query`] module.

pub mod grid;
pub mod ledger;

use std::collections::BTreeMap;

use glam::DVec3;
use log::{debug, error, warn};
use rand::Rng;
use runner_track_core::{
    Command, EntityHandle, Event, GenerationError, PatternCategory, PatternKind,
    PlatformGeometry, PlatformId, PlatformRole, TemplateId,
};
use serde::Deserialize;
use thiserror::Error;

pub use grid::{build_rows, SlotGrid, SlotTuning, MIN_ITEM_SIZE};
pub use ledger::{OccupiedLedger, DEFAULT_MAX_RETRIES};

/// Default ceiling on simultaneously active platforms.
pub const DEFAULT_CAPACITY: usize = 9;

/// Largest number of platforms a single batch may append.
pub const MAX_PLATFORMS_PER_BATCH: usize = 3;

/// Static geometry of a platform prefab.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PlatformTemplate {
    /// Name used in logs and manifests.
    pub name: String,
    /// Extent along the travel axis.
    pub length: f64,
    /// Extent across the travel axis.
    pub width: f64,
}

impl PlatformTemplate {
    /// Creates a new template description.
    #[must_use]
    pub fn new(name: impl Into<String>, length: f64, width: f64) -> Self {
        Self {
            name: name.into(),
            length,
            width,
        }
    }
}

/// Configuration of the track layout.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Platform prefabs that batches may choose from.
    pub templates: Vec<PlatformTemplate>,
    /// Slot spacing shared by every platform.
    pub slots: SlotTuning,
    /// Maximum number of simultaneously active platforms.
    pub capacity: usize,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            templates: vec![PlatformTemplate::new("straight", 30.0, 9.0)],
            slots: SlotTuning::default(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl TrackConfig {
    /// Checks that the configuration can drive a track.
    pub fn validate(&self) -> Result<(), TrackConfigError> {
        if self.templates.is_empty() {
            return Err(TrackConfigError::NoTemplates);
        }
        if self.capacity == 0 {
            return Err(TrackConfigError::ZeroCapacity);
        }
        if self.slots.items_per_row == 0 {
            return Err(TrackConfigError::NoColumns);
        }
        if let Some(template) = self
            .templates
            .iter()
            .find(|template| !template.length.is_finite() || !template.width.is_finite())
        {
            return Err(TrackConfigError::NonFiniteTemplate {
                name: template.name.clone(),
            });
        }
        Ok(())
    }
}

/// Reasons a track configuration may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TrackConfigError {
    /// No platform templates were provided.
    #[error("track configuration lists no platform templates")]
    NoTemplates,
    /// The capacity leaves no room for any platform.
    #[error("track capacity must be at least one platform")]
    ZeroCapacity,
    /// The slot tuning has no columns.
    #[error("slot tuning must lay out at least one column")]
    NoColumns,
    /// A template has a non-finite dimension.
    #[error("platform template '{name}' has a non-finite dimension")]
    NonFiniteTemplate {
        /// Name of the offending template.
        name: String,
    },
}

/// Slot drawn uniformly from a platform's grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomSlot {
    /// Resolved world position of the slot.
    pub position: DVec3,
    /// Index of the drawn row.
    pub row: usize,
    /// Index of the drawn column.
    pub column: usize,
}

/// A platform section on the active track.
#[derive(Clone, Debug)]
pub struct Platform {
    id: PlatformId,
    template: TemplateId,
    role: PlatformRole,
    geometry: PlatformGeometry,
    grid: SlotGrid,
    pattern: Option<(PatternKind, PatternCategory)>,
    entities: Vec<EntityHandle>,
}

impl Platform {
    /// Creates a platform and derives its slot grid.
    #[must_use]
    pub fn new(
        id: PlatformId,
        template: TemplateId,
        role: PlatformRole,
        geometry: PlatformGeometry,
        slots: &SlotTuning,
    ) -> Self {
        Self {
            id,
            template,
            role,
            grid: SlotGrid::for_geometry(&geometry, slots),
            geometry,
            pattern: None,
            entities: Vec::new(),
        }
    }

    /// Identifier assigned to the platform.
    #[must_use]
    pub const fn id(&self) -> PlatformId {
        self.id
    }

    /// Template the platform was built from.
    #[must_use]
    pub const fn template(&self) -> TemplateId {
        self.template
    }

    /// Role of the platform on the track.
    #[must_use]
    pub const fn role(&self) -> PlatformRole {
        self.role
    }

    /// Physical extent of the platform.
    #[must_use]
    pub const fn geometry(&self) -> &PlatformGeometry {
        &self.geometry
    }

    /// Slot grid derived from the geometry.
    #[must_use]
    pub const fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    /// Pattern that populated the platform, if any.
    #[must_use]
    pub const fn pattern(&self) -> Option<(PatternKind, PatternCategory)> {
        self.pattern
    }

    /// Pool handles of the entities attached to the platform.
    #[must_use]
    pub fn entities(&self) -> &[EntityHandle] {
        &self.entities
    }

    /// Resolves a slot to a world position, reporting bad columns.
    pub fn try_resolve(&self, row_normalized: f64, column: usize) -> Result<DVec3, GenerationError> {
        let offset = self.grid.column_offset(column)?;
        let near = self.geometry.near_bound();
        let far = self.geometry.far_bound();
        Ok(DVec3::new(
            self.geometry.lateral_center() + offset,
            self.geometry.origin().y,
            near + (far - near) * row_normalized,
        ))
    }

    /// Resolves a slot to a world position.
    ///
    /// A column outside the grid is logged and yields [`DVec3::ZERO`].
    #[must_use]
    pub fn resolve(&self, row_normalized: f64, column: usize) -> DVec3 {
        match self.try_resolve(row_normalized, column) {
            Ok(position) => position,
            Err(reason) => {
                error!("platform {}: {reason}; using zero position", self.id);
                DVec3::ZERO
            }
        }
    }

    /// Resolves a slot addressed by discrete row index.
    ///
    /// Row indices wrap around the row count.
    #[must_use]
    pub fn resolve_slot(&self, row: usize, column: usize) -> DVec3 {
        let rows = self.grid.rows();
        self.resolve(rows[row % rows.len()], column)
    }

    /// Draws a slot uniformly and resolves it.
    pub fn resolve_random<R: Rng>(&self, rng: &mut R) -> RandomSlot {
        let row = rng.gen_range(0..self.grid.row_count());
        let columns = self.grid.items_per_row();
        if columns == 0 {
            error!("platform {}: grid has no columns", self.id);
            return RandomSlot {
                position: DVec3::ZERO,
                row,
                column: 0,
            };
        }

        let column = rng.gen_range(0..columns);
        RandomSlot {
            position: self.resolve_slot(row, column),
            row,
            column,
        }
    }
}

/// Represents the authoritative runner track.
#[derive(Debug)]
pub struct Track {
    config: TrackConfig,
    platforms: BTreeMap<PlatformId, Platform>,
    next_platform_id: PlatformId,
    frontier: f64,
}

impl Track {
    /// Creates an empty track using the provided configuration.
    pub fn new(config: TrackConfig) -> Result<Self, TrackConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            platforms: BTreeMap::new(),
            next_platform_id: PlatformId::new(0),
            frontier: 0.0,
        })
    }

    fn allocate_platform_id(&mut self) -> PlatformId {
        let id = self.next_platform_id;
        self.next_platform_id = PlatformId::new(id.get().wrapping_add(1));
        id
    }

    fn spawn(
        &mut self,
        template: TemplateId,
        role: PlatformRole,
        gap: f64,
        out_events: &mut Vec<Event>,
    ) {
        if self.platforms.len() >= self.config.capacity {
            let reason = GenerationError::CapacityReached {
                capacity: self.config.capacity,
            };
            warn!("rejecting {template}: {reason}");
            out_events.push(Event::PlatformRejected { template, reason });
            return;
        }

        let Some(prefab) = usize::try_from(template.get())
            .ok()
            .and_then(|index| self.config.templates.get(index))
            .cloned()
        else {
            let reason = GenerationError::UnknownTemplate { template };
            warn!("rejecting {template}: {reason}");
            out_events.push(Event::PlatformRejected { template, reason });
            return;
        };

        let length = prefab.length.max(0.0);
        let near = self.frontier + gap.max(0.0);
        let geometry = PlatformGeometry::new(
            length,
            prefab.width,
            DVec3::new(0.0, 0.0, near + length * 0.5),
        );
        self.frontier = near + length;

        let id = self.allocate_platform_id();
        debug!(
            "spawned platform {id} from '{}' spanning z {:.2}..{:.2}",
            prefab.name,
            geometry.near_bound(),
            geometry.far_bound()
        );
        let platform = Platform::new(id, template, role, geometry, &self.config.slots);
        let _ = self.platforms.insert(id, platform);
        out_events.push(Event::PlatformSpawned {
            platform: id,
            template,
            geometry,
            role,
        });
    }

    fn drain_entities(&mut self) -> Vec<EntityHandle> {
        let mut entities = Vec::new();
        for platform in self.platforms.values_mut() {
            entities.append(&mut platform.entities);
        }
        self.platforms.clear();
        entities
    }
}

impl Default for Track {
    fn default() -> Self {
        Self {
            config: TrackConfig::default(),
            platforms: BTreeMap::new(),
            next_platform_id: PlatformId::new(0),
            frontier: 0.0,
        }
    }
}

/// Applies the provided command to the track, mutating state deterministically.
pub fn apply(track: &mut Track, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnInitialPlatform { template } => {
            track.spawn(template, PlatformRole::Initial, 0.0, out_events);
        }
        Command::SpawnPlatforms { gap, templates } => {
            for template in templates.into_iter().take(MAX_PLATFORMS_PER_BATCH) {
                track.spawn(template, PlatformRole::Generated, gap, out_events);
            }
        }
        Command::RecordPattern {
            platform,
            pattern,
            category,
            entities,
        } => match track.platforms.get_mut(&platform) {
            Some(target) => {
                let entity_count = entities.len();
                target.pattern = Some((pattern, category));
                target.entities.extend(entities);
                out_events.push(Event::PatternApplied {
                    platform,
                    pattern,
                    category,
                    entity_count,
                });
            }
            None => {
                warn!("discarding {pattern:?} for platform {platform}: not on the track");
                out_events.push(Event::PatternDiscarded { platform, entities });
            }
        },
        Command::RemovePlatform { platform } => match track.platforms.remove(&platform) {
            Some(removed) => out_events.push(Event::PlatformRemoved {
                platform,
                entities: removed.entities,
            }),
            None => out_events.push(Event::PlatformRemovalRejected { platform }),
        },
        Command::ClearAllPlatforms => {
            let entities = track.drain_entities();
            track.frontier = 0.0;
            out_events.push(Event::PlatformsCleared { entities });
        }
    }
}

/// Query functions that provide read-only access to the track state.
pub mod query {
    use super::{Platform, PlatformTemplate, Track};
    use runner_track_core::PlatformId;

    /// Looks up an active platform.
    #[must_use]
    pub fn platform(track: &Track, platform: PlatformId) -> Option<&Platform> {
        track.platforms.get(&platform)
    }

    /// Iterates active platforms in travel order.
    pub fn platforms(track: &Track) -> impl Iterator<Item = &Platform> {
        track.platforms.values()
    }

    /// Number of active platforms.
    #[must_use]
    pub fn platform_count(track: &Track) -> usize {
        track.platforms.len()
    }

    /// Number of platforms that may still be added before reaching capacity.
    #[must_use]
    pub fn room(track: &Track) -> usize {
        track.config.capacity.saturating_sub(track.platforms.len())
    }

    /// Z coordinate of the far edge of the last spawned platform.
    #[must_use]
    pub fn frontier(track: &Track) -> f64 {
        track.frontier
    }

    /// Platform templates available to batches.
    #[must_use]
    pub fn templates(track: &Track) -> &[PlatformTemplate] {
        &track.config.templates
    }
}
