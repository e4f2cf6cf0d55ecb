#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Driver API that extends and trims the runner track.
//!
//! [`TrackDriver`] owns the authoritative track, the generation system with
//! its context, and the entity pool. Every entry point submits commands to the
//! track, lets the generation system react to the resulting events, and keeps
//! the pool in sync with whatever the track dropped.

pub mod pool;

use log::{debug, info};
use runner_track_core::{Command, EntityKind, EntityPool, Event, PlatformId, TemplateId};
use runner_track_system_generation::{Generation, GenerationConfig, GenerationContext};
use runner_track_world::{self as world, Track, TrackConfig, TrackConfigError};

pub use pool::{PooledEntity, RecordingPool};

/// Template used for the first platform of a fresh track.
pub const INITIAL_TEMPLATE: TemplateId = TemplateId::new(0);

/// Owns the track and keeps it populated.
#[derive(Debug)]
pub struct TrackDriver<P> {
    track: Track,
    generation: Generation,
    context: GenerationContext,
    pool: P,
}

impl<P: EntityPool> TrackDriver<P> {
    /// Creates a driver over an empty track.
    pub fn new(
        track: TrackConfig,
        generation: GenerationConfig,
        seed: u64,
        pool: P,
    ) -> Result<Self, TrackConfigError> {
        Ok(Self {
            track: Track::new(track)?,
            generation: Generation::new(generation),
            context: GenerationContext::from_seed(seed),
            pool,
        })
    }

    /// Read-only view of the track.
    #[must_use]
    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Entity pool owned by the driver.
    #[must_use]
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Generator state shared across batches.
    #[must_use]
    pub fn context(&self) -> &GenerationContext {
        &self.context
    }

    /// Places the unpopulated starting platform.
    pub fn spawn_initial_platform(&mut self) -> Option<PlatformId> {
        let events = self.submit(Command::SpawnInitialPlatform {
            template: INITIAL_TEMPLATE,
        });
        let spawned = spawned_platforms(&events);
        if let Some(platform) = spawned.first() {
            info!("initial platform {platform} placed");
        }
        spawned.first().copied()
    }

    /// Appends and populates up to three platforms while capacity allows.
    ///
    /// Returns the platforms that joined the track, in travel order.
    pub fn spawn_platforms(&mut self) -> Vec<PlatformId> {
        let Some(batch) = self.generation.plan_batch(&mut self.context, &self.track) else {
            debug!("track at capacity; no batch planned");
            return Vec::new();
        };

        let events = self.submit(batch);
        let spawned = spawned_platforms(&events);

        let mut commands = Vec::new();
        self.generation.handle(
            &mut self.context,
            &events,
            &self.track,
            &mut self.pool,
            &mut commands,
        );
        for command in commands {
            let _ = self.submit(command);
        }
        spawned
    }

    /// Removes a platform and returns its entities to the pool.
    ///
    /// Returns `false` when the platform is not on the track.
    pub fn remove_platform(&mut self, platform: PlatformId) -> bool {
        let events = self.submit(Command::RemovePlatform { platform });
        events
            .iter()
            .any(|event| matches!(event, Event::PlatformRemoved { .. }))
    }

    /// Removes every platform, empties the pool and resets the frontier.
    pub fn clear_all_platforms(&mut self) {
        let events = self.submit(Command::ClearAllPlatforms);
        for event in &events {
            if let Event::PlatformsCleared { entities } = event {
                info!("cleared track holding {} entities", entities.len());
            }
        }
    }

    fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.track, command, &mut events);
        for event in &events {
            match event {
                Event::PlatformRemoved { entities, .. }
                | Event::PatternDiscarded { entities, .. } => {
                    for handle in entities {
                        self.pool.release(*handle);
                    }
                }
                Event::PlatformsCleared { .. } => {
                    for kind in EntityKind::ALL {
                        self.pool.clear(kind);
                    }
                }
                _ => {}
            }
        }
        events
    }
}

fn spawned_platforms(events: &[Event]) -> Vec<PlatformId> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::PlatformSpawned { platform, .. } => Some(*platform),
            _ => None,
        })
        .collect()
}
