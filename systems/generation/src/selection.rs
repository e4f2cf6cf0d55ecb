//! History-aware category and pattern selection.
//!
//! Each invocation draws exactly one roll for the category and one for the
//! pattern within it. `TablePattern` draws one more roll for the table index.

use rand::Rng;
use runner_track_core::{GenerationError, PatternCategory, PatternKind};

use crate::history::PatternHistory;

/// Patterns drawn when the category is [`PatternCategory::Safe`].
pub const SAFE_PATTERNS: [PatternKind; 3] = [
    PatternKind::CoinPair,
    PatternKind::CoinLineAllRows,
    PatternKind::CoinLineSingleColumn,
];

/// Patterns drawn when the category is [`PatternCategory::Hazard`].
pub const HAZARD_PATTERNS: [PatternKind; 4] = [
    PatternKind::DangerousRandom,
    PatternKind::HazardLines,
    PatternKind::HazardLineRandomRow,
    PatternKind::TablePattern,
];

/// Patterns drawn when the category is [`PatternCategory::Grinding`].
pub const GRINDING_PATTERNS: [PatternKind; 3] = [
    PatternKind::GrindingPole,
    PatternKind::GrindingPoleCoinArc,
    PatternKind::ElevatedGrindRails,
];

/// Piecewise mapping from a unit roll to a category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CategoryOdds {
    /// Exclusive upper bounds checked in order.
    pub thresholds: &'static [(f64, PatternCategory)],
    /// Category used when no threshold matches.
    pub otherwise: PatternCategory,
}

impl CategoryOdds {
    /// Maps a roll in `[0, 1)` to a category.
    #[must_use]
    pub fn pick(&self, roll: f64) -> PatternCategory {
        self.thresholds
            .iter()
            .find(|(bound, _)| roll < *bound)
            .map_or(self.otherwise, |(_, category)| *category)
    }
}

/// Odds used before any pattern has run.
pub const OPENING_ODDS: CategoryOdds = CategoryOdds {
    thresholds: &[
        (0.40, PatternCategory::Safe),
        (0.60, PatternCategory::Hazard),
    ],
    otherwise: PatternCategory::Grinding,
};

/// Odds used when exactly one of the last two patterns was the lone pole.
pub const SINGLE_POLE_ODDS: CategoryOdds = CategoryOdds {
    thresholds: &[(0.95, PatternCategory::Grinding)],
    otherwise: PatternCategory::Hazard,
};

/// Odds used when the most recent pattern was the lone pole.
pub const RECENT_POLE_ODDS: CategoryOdds = CategoryOdds {
    thresholds: &[(0.72, PatternCategory::Grinding)],
    otherwise: PatternCategory::Hazard,
};

/// Odds used after two grinding patterns in a row.
pub const GRIND_STREAK_ODDS: CategoryOdds = CategoryOdds {
    thresholds: &[(0.45, PatternCategory::Grinding)],
    otherwise: PatternCategory::Safe,
};

/// Odds used in every other situation.
pub const DEFAULT_ODDS: CategoryOdds = CategoryOdds {
    thresholds: &[
        (0.40, PatternCategory::Safe),
        (0.78, PatternCategory::Hazard),
    ],
    otherwise: PatternCategory::Grinding,
};

/// Picks the odds that apply to the provided history.
#[must_use]
pub fn category_odds(history: &PatternHistory) -> CategoryOdds {
    let Some(recent) = history.most_recent() else {
        return OPENING_ODDS;
    };
    let previous = history.previous();

    let recent_pole = recent.is_pole();
    let previous_pole = previous.map_or(false, |entry| entry.is_pole());
    if recent_pole != previous_pole {
        return SINGLE_POLE_ODDS;
    }
    if recent_pole {
        return RECENT_POLE_ODDS;
    }

    let grind_streak = recent.category == PatternCategory::Grinding
        && previous.map_or(false, |entry| entry.category == PatternCategory::Grinding);
    if grind_streak {
        return GRIND_STREAK_ODDS;
    }

    DEFAULT_ODDS
}

/// Draws the category of the next pattern.
pub fn select_category<R: Rng>(history: &PatternHistory, rng: &mut R) -> PatternCategory {
    let roll: f64 = rng.gen();
    category_odds(history).pick(roll)
}

/// Patterns that may be drawn for a category.
#[must_use]
pub fn patterns_in(category: PatternCategory) -> &'static [PatternKind] {
    match category {
        PatternCategory::Safe => &SAFE_PATTERNS,
        PatternCategory::Hazard => &HAZARD_PATTERNS,
        PatternCategory::Grinding => &GRINDING_PATTERNS,
    }
}

/// Concrete pattern chosen for a platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternChoice {
    /// Pattern to run.
    pub kind: PatternKind,
    /// Pattern table to read, for [`PatternKind::TablePattern`].
    pub table: Option<usize>,
}

/// Draws a pattern uniformly from the category's list.
pub fn select_pattern<R: Rng>(
    category: PatternCategory,
    table_count: usize,
    rng: &mut R,
) -> Result<PatternChoice, GenerationError> {
    let candidates = patterns_in(category);
    let kind = candidates[rng.gen_range(0..candidates.len())];
    if kind != PatternKind::TablePattern {
        return Ok(PatternChoice { kind, table: None });
    }

    if table_count == 0 {
        return Err(GenerationError::EmptyPatternTables);
    }
    Ok(PatternChoice {
        kind,
        table: Some(rng.gen_range(0..table_count)),
    })
}

/// Gap left before every platform of the next batch.
///
/// Grinding patterns chain across platforms, so a grinding entry in the
/// history closes the gap entirely.
#[must_use]
pub fn batch_gap(history: &PatternHistory, default_gap: f64) -> f64 {
    if history
        .iter()
        .any(|entry| entry.category == PatternCategory::Grinding)
    {
        0.0
    } else {
        default_gap
    }
}
