//! Occupied-position ledger scoped to one platform's generation pass.

use std::collections::HashSet;

use glam::DVec3;
use log::warn;
use rand::Rng;
use runner_track_core::PlatformId;

use crate::Platform;

/// Number of random redraws attempted before a contended position is accepted.
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Positions closer than this along every axis are treated as identical.
const POSITION_QUANTUM: f64 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PositionKey([i64; 3]);

impl PositionKey {
    fn from_position(position: DVec3) -> Self {
        Self([
            quantize(position.x),
            quantize(position.y),
            quantize(position.z),
        ])
    }
}

fn quantize(value: f64) -> i64 {
    (value / POSITION_QUANTUM).round() as i64
}

/// Set of world positions already claimed on a single platform.
#[derive(Debug)]
pub struct OccupiedLedger {
    platform: PlatformId,
    positions: HashSet<PositionKey>,
}

impl OccupiedLedger {
    /// Creates an empty ledger for the provided platform.
    #[must_use]
    pub fn for_platform(platform: PlatformId) -> Self {
        Self {
            platform,
            positions: HashSet::new(),
        }
    }

    /// Reports whether the position was already claimed.
    #[must_use]
    pub fn contains(&self, position: DVec3) -> bool {
        self.positions.contains(&PositionKey::from_position(position))
    }

    /// Claims the position. Returns `false` when it was already claimed.
    pub fn add(&mut self, position: DVec3) -> bool {
        self.positions.insert(PositionKey::from_position(position))
    }

    /// Number of claimed positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Reports whether nothing has been claimed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Finds a free slot, starting from `initial`.
    ///
    /// A free `initial` is returned untouched without drawing from `rng`.
    /// Otherwise random slots of `platform` are drawn up to `max_retries`
    /// times; the first free draw wins. When every draw is taken the last one
    /// is returned anyway, so placement never blocks.
    pub fn find_free<R: Rng>(
        &self,
        initial: DVec3,
        platform: &Platform,
        max_retries: u32,
        rng: &mut R,
    ) -> DVec3 {
        if !self.contains(initial) {
            return initial;
        }

        let mut candidate = initial;
        for _ in 0..max_retries {
            candidate = platform.resolve_random(rng).position;
            if !self.contains(candidate) {
                return candidate;
            }
        }

        warn!(
            "platform {}: no free slot after {max_retries} retries, reusing ({:.2}, {:.2}, {:.2})",
            self.platform, candidate.x, candidate.y, candidate.z
        );
        candidate
    }

    /// Finds a free slot like [`Self::find_free`] and claims it.
    pub fn claim_free<R: Rng>(
        &mut self,
        initial: DVec3,
        platform: &Platform,
        max_retries: u32,
        rng: &mut R,
    ) -> DVec3 {
        let position = self.find_free(initial, platform, max_retries, rng);
        let _ = self.add(position);
        position
    }
}
