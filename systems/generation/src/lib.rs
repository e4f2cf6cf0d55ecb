#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pattern generation system that plans batches and populates new platforms.
//!
//! The system never mutates the track directly. It plans
//! [`Command::SpawnPlatforms`] batches from the current history and answers
//! every generated [`Event::PlatformSpawned`] with a
//! [`Command::RecordPattern`] once the chosen pattern has been placed through
//! the entity pool.

pub mod history;
pub mod patterns;
pub mod selection;

use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use runner_track_core::{
    CellKind, Command, EntityPool, Event, GenerationError, PatternTable, PlatformId,
    PlatformRole, TemplateId, PATTERN_TABLE_COLUMNS, PATTERN_TABLE_ROWS,
};
use runner_track_world::{query, Track, DEFAULT_MAX_RETRIES, MAX_PLATFORMS_PER_BATCH};
use serde::Deserialize;

pub use history::{HistoryEntry, PatternHistory, HISTORY_CAPACITY};
pub use patterns::{run_pattern, PatternOutcome, PatternTuning};
pub use selection::{batch_gap, select_category, select_pattern, PatternChoice};

/// Gap left between platforms when no grinding pattern ran recently.
pub const DEFAULT_GAP: f64 = 4.0;

const E: CellKind = CellKind::Empty;
const H: CellKind = CellKind::Hazard;
const C: CellKind = CellKind::Coin;

const DEFAULT_TABLES: [[[CellKind; PATTERN_TABLE_COLUMNS]; PATTERN_TABLE_ROWS]; 3] = [
    [[H, E, C], [E, E, H], [C, C, C], [E, H, E]],
    [[C, H, C], [E, C, E], [H, E, H], [C, C, C]],
    [[E, E, H], [E, H, C], [H, C, E], [C, E, E]],
];

/// Tunables of the generation system.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Names of the hazard templates; hazards draw a variant index uniformly.
    pub hazard_templates: Vec<String>,
    /// Tables read by [`runner_track_core::PatternKind::TablePattern`].
    pub pattern_tables: Vec<PatternTable>,
    /// Gap left before platforms of a batch that follows no grinding pattern.
    pub default_gap: f64,
    /// Redraws attempted when a placement lands on a claimed slot.
    pub max_retries: u32,
    /// Pattern shaping offsets.
    pub pattern: PatternTuning,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            hazard_templates: vec!["barrier".to_owned(), "spikes".to_owned()],
            pattern_tables: DEFAULT_TABLES.into_iter().map(PatternTable::new).collect(),
            default_gap: DEFAULT_GAP,
            max_retries: DEFAULT_MAX_RETRIES,
            pattern: PatternTuning::default(),
        }
    }
}

/// Mutable generator state owned by the caller.
#[derive(Clone, Debug)]
pub struct GenerationContext {
    history: PatternHistory,
    rng: ChaCha8Rng,
}

impl GenerationContext {
    /// Creates a context with an empty history and a seeded generator.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            history: PatternHistory::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Patterns executed most recently.
    #[must_use]
    pub fn history(&self) -> &PatternHistory {
        &self.history
    }
}

/// Pure system that plans batches and populates generated platforms.
#[derive(Debug)]
pub struct Generation {
    config: GenerationConfig,
}

impl Generation {
    /// Creates the system using the provided configuration.
    #[must_use]
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    /// Plans the next batch of platforms, if the track has room for any.
    ///
    /// The gap is fixed here, before any pattern of the batch runs.
    pub fn plan_batch(&self, context: &mut GenerationContext, track: &Track) -> Option<Command> {
        let count = query::room(track).min(MAX_PLATFORMS_PER_BATCH);
        if count == 0 {
            return None;
        }

        let available = query::templates(track).len();
        if available == 0 {
            warn!("no platform templates configured; skipping batch");
            return None;
        }

        let gap = batch_gap(&context.history, self.config.default_gap);
        let templates: Vec<TemplateId> = (0..count)
            .map(|_| {
                let index = context.rng.gen_range(0..available);
                TemplateId::new(u32::try_from(index).unwrap_or(u32::MAX))
            })
            .collect();
        debug!("planned batch of {count} platforms with gap {gap:.2}");
        Some(Command::SpawnPlatforms { gap, templates })
    }

    /// Consumes track events and populates every generated platform.
    pub fn handle<P: EntityPool>(
        &self,
        context: &mut GenerationContext,
        events: &[Event],
        track: &Track,
        pool: &mut P,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let Event::PlatformSpawned {
                platform,
                role: PlatformRole::Generated,
                ..
            } = event
            else {
                continue;
            };

            match self.populate(context, track, *platform, pool) {
                Ok(command) => out.push(command),
                Err(reason) => warn!("platform {platform} left empty: {reason}"),
            }
        }
    }

    /// Runs one pattern on the platform and acquires its entities.
    ///
    /// On failure no entity is acquired and the history is left untouched.
    pub fn populate<P: EntityPool>(
        &self,
        context: &mut GenerationContext,
        track: &Track,
        platform: PlatformId,
        pool: &mut P,
    ) -> Result<Command, GenerationError> {
        if self.config.hazard_templates.is_empty() {
            return Err(GenerationError::EmptyHazardTemplates);
        }
        let target =
            query::platform(track, platform).ok_or(GenerationError::MissingPlatform { platform })?;

        let category = select_category(&context.history, &mut context.rng);
        let choice = select_pattern(category, self.config.pattern_tables.len(), &mut context.rng)?;
        let outcome = run_pattern(choice, target, &self.config, &mut context.rng)?;

        let entities = outcome
            .placements
            .iter()
            .map(|placement| {
                let handle = pool.acquire(placement.kind);
                pool.attach(handle, platform, placement);
                handle
            })
            .collect();

        context.history.push(choice.kind, outcome.category);
        debug!(
            "platform {platform}: {:?} ({:?} drawn, {:?} reported), {} placements",
            choice.kind,
            category,
            outcome.category,
            outcome.placements.len()
        );

        Ok(Command::RecordPattern {
            platform,
            pattern: choice.kind,
            category: outcome.category,
            entities,
        })
    }
}
