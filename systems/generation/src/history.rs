//! Bounded record of the most recently executed patterns.

use std::collections::VecDeque;

use runner_track_core::{PatternCategory, PatternKind};

/// Number of executed patterns remembered by the selection engine.
pub const HISTORY_CAPACITY: usize = 2;

/// A pattern that ran together with the category it reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Pattern that ran.
    pub pattern: PatternKind,
    /// Category the pattern reported.
    pub category: PatternCategory,
}

impl HistoryEntry {
    /// Reports whether the entry is the lone grind pole pattern.
    #[must_use]
    pub fn is_pole(&self) -> bool {
        self.pattern == PatternKind::GrindingPole
    }
}

/// FIFO of the last [`HISTORY_CAPACITY`] executed patterns, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternHistory {
    entries: VecDeque<HistoryEntry>,
}

impl PatternHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an executed pattern, evicting the oldest entry when full.
    pub fn push(&mut self, pattern: PatternKind, category: PatternCategory) {
        self.entries.push_front(HistoryEntry { pattern, category });
        self.entries.truncate(HISTORY_CAPACITY);
    }

    /// Most recent entry (`H0`).
    #[must_use]
    pub fn most_recent(&self) -> Option<HistoryEntry> {
        self.entries.front().copied()
    }

    /// Second most recent entry (`H1`).
    #[must_use]
    pub fn previous(&self) -> Option<HistoryEntry> {
        self.entries.get(1).copied()
    }

    /// Number of remembered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing has run yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}
