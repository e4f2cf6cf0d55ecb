//! In-memory entity pool that records every acquisition and release.

use std::collections::BTreeMap;

use log::warn;
use runner_track_core::{EntityHandle, EntityKind, EntityPool, Placement, PlatformId};

/// Entity currently handed out by a [`RecordingPool`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PooledEntity {
    /// Kind requested at acquisition.
    pub kind: EntityKind,
    /// Platform the entity is parented to, once attached.
    pub platform: Option<PlatformId>,
    /// Placement applied on attachment.
    pub placement: Option<Placement>,
}

/// Entity pool backed by an ordered map of live entities.
#[derive(Debug, Default)]
pub struct RecordingPool {
    next_handle: u64,
    active: BTreeMap<EntityHandle, PooledEntity>,
    acquired: usize,
    released: usize,
}

impl RecordingPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a live entity.
    #[must_use]
    pub fn get(&self, handle: EntityHandle) -> Option<&PooledEntity> {
        self.active.get(&handle)
    }

    /// Iterates live entities in acquisition order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityHandle, &PooledEntity)> {
        self.active.iter().map(|(handle, entity)| (*handle, entity))
    }

    /// Number of live entities.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of live entities of the provided kind.
    #[must_use]
    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.active
            .values()
            .filter(|entity| entity.kind == kind)
            .count()
    }

    /// Total acquisitions since creation.
    #[must_use]
    pub fn acquired(&self) -> usize {
        self.acquired
    }

    /// Total releases since creation.
    #[must_use]
    pub fn released(&self) -> usize {
        self.released
    }
}

impl EntityPool for RecordingPool {
    fn acquire(&mut self, kind: EntityKind) -> EntityHandle {
        let handle = EntityHandle::new(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.acquired += 1;
        let _ = self.active.insert(
            handle,
            PooledEntity {
                kind,
                platform: None,
                placement: None,
            },
        );
        handle
    }

    fn attach(&mut self, handle: EntityHandle, platform: PlatformId, placement: &Placement) {
        match self.active.get_mut(&handle) {
            Some(entity) => {
                entity.platform = Some(platform);
                entity.placement = Some(*placement);
            }
            None => warn!("cannot attach {handle:?} to platform {platform}: not acquired"),
        }
    }

    fn release(&mut self, handle: EntityHandle) {
        if self.active.remove(&handle).is_some() {
            self.released += 1;
        } else {
            warn!("ignoring release of {handle:?}: not acquired");
        }
    }

    fn clear(&mut self, kind: EntityKind) {
        let before = self.active.len();
        self.active.retain(|_, entity| entity.kind != kind);
        self.released += before - self.active.len();
    }
}
