#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the runner track generator.
//!
//! This crate defines the message surface that connects the driver, the
//! authoritative track, and pure systems. The driver submits [`Command`]
//! values describing desired mutations, the track executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams, query immutable track state, and
//! respond exclusively with new command batches.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of rows authored in every pattern table.
pub const PATTERN_TABLE_ROWS: usize = 4;

/// Number of columns authored in every pattern table.
pub const PATTERN_TABLE_COLUMNS: usize = 3;

/// Commands that express all permissible track mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Places the first platform of a fresh track. It never hosts a pattern.
    SpawnInitialPlatform {
        /// Template providing the platform geometry.
        template: TemplateId,
    },
    /// Appends a batch of platforms to the far end of the track.
    SpawnPlatforms {
        /// Distance left open before each platform of the batch.
        gap: f64,
        /// Templates of the platforms to spawn, in travel order.
        templates: Vec<TemplateId>,
    },
    /// Records the outcome of a successful pattern pass on a platform.
    RecordPattern {
        /// Platform that hosted the pattern.
        platform: PlatformId,
        /// Pattern that populated the platform.
        pattern: PatternKind,
        /// Category reported by the pattern.
        category: PatternCategory,
        /// Pool handles of every entity the pattern placed.
        entities: Vec<EntityHandle>,
    },
    /// Removes a single platform from the track.
    RemovePlatform {
        /// Identifier of the platform targeted for removal.
        platform: PlatformId,
    },
    /// Removes every platform and resets the track frontier.
    ClearAllPlatforms,
}

/// Events broadcast by the track after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a platform joined the active track.
    PlatformSpawned {
        /// Identifier assigned to the platform.
        platform: PlatformId,
        /// Template the platform was built from.
        template: TemplateId,
        /// Geometry of the spawned platform.
        geometry: PlatformGeometry,
        /// Whether the platform expects to be populated.
        role: PlatformRole,
    },
    /// Reports that a requested platform could not be spawned.
    PlatformRejected {
        /// Template named in the request.
        template: TemplateId,
        /// Specific reason the spawn failed.
        reason: GenerationError,
    },
    /// Confirms that a pattern populated a platform.
    PatternApplied {
        /// Platform that hosts the pattern.
        platform: PlatformId,
        /// Pattern that ran.
        pattern: PatternKind,
        /// Category reported by the pattern.
        category: PatternCategory,
        /// Number of entities the pattern placed.
        entity_count: usize,
    },
    /// Confirms that a platform left the track.
    PlatformRemoved {
        /// Identifier of the removed platform.
        platform: PlatformId,
        /// Entities that were attached to the platform and must be released.
        entities: Vec<EntityHandle>,
    },
    /// Reports that a pattern named a platform that already left the track.
    PatternDiscarded {
        /// Platform named by the pattern.
        platform: PlatformId,
        /// Entities the pattern placed, which must be released.
        entities: Vec<EntityHandle>,
    },
    /// Reports that a removal request named an unknown platform.
    PlatformRemovalRejected {
        /// Identifier named in the request.
        platform: PlatformId,
    },
    /// Confirms that every platform was removed.
    PlatformsCleared {
        /// Entities that were attached to any platform and must be released.
        entities: Vec<EntityHandle>,
    },
}

/// Role a platform plays on the track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformRole {
    /// Starting platform that stays empty so the run begins safely.
    Initial,
    /// Platform appended by a batch and populated by a pattern.
    Generated,
}

/// Unique identifier assigned to a platform. Identifiers grow in travel order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformId(u32);

impl PlatformId {
    /// Creates a new platform identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index into the configured list of platform templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(u32);

impl TemplateId {
    /// Creates a new template identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template {}", self.0)
    }
}

/// Opaque handle handed out by an [`EntityPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(u64);

impl EntityHandle {
    /// Creates a new handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Coarse classification that drives selection bias.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PatternCategory {
    /// Collectible-heavy patterns with little danger.
    Safe,
    /// Patterns built around hazards.
    Hazard,
    /// Patterns built around grind poles and rails.
    Grinding,
}

/// Concrete placement routines available to the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PatternKind {
    /// Two coins on consecutive rows followed by a hazard.
    CoinPair,
    /// Coins on every slot of the platform.
    CoinLineAllRows,
    /// Coins down one column, ending in a coin or a hazard.
    CoinLineSingleColumn,
    /// One column of mixed coins and hazards plus a stray hazard.
    DangerousRandom,
    /// Hazard columns around a single coin column.
    HazardLines,
    /// One row of hazards, some topped with coins.
    HazardLineRandomRow,
    /// Cells copied from a configured pattern table.
    TablePattern,
    /// A single grind pole with a power-up.
    GrindingPole,
    /// A grind pole followed by an arc of coins.
    GrindingPoleCoinArc,
    /// Two rails on the outer columns, one of them elevated.
    ElevatedGrindRails,
}

impl PatternKind {
    /// Every pattern kind in declaration order.
    pub const ALL: [PatternKind; 10] = [
        Self::CoinPair,
        Self::CoinLineAllRows,
        Self::CoinLineSingleColumn,
        Self::DangerousRandom,
        Self::HazardLines,
        Self::HazardLineRandomRow,
        Self::TablePattern,
        Self::GrindingPole,
        Self::GrindingPoleCoinArc,
        Self::ElevatedGrindRails,
    ];

    /// Category the pattern reports to the history once it has run.
    ///
    /// `HazardLineRandomRow` reports [`PatternCategory::Safe`] even though it
    /// places a full row of hazards and is drawn from the hazard list.
    #[must_use]
    pub const fn category(self) -> PatternCategory {
        match self {
            Self::CoinPair
            | Self::CoinLineAllRows
            | Self::CoinLineSingleColumn
            | Self::HazardLineRandomRow => PatternCategory::Safe,
            Self::DangerousRandom | Self::HazardLines | Self::TablePattern => {
                PatternCategory::Hazard
            }
            Self::GrindingPole | Self::GrindingPoleCoinArc | Self::ElevatedGrindRails => {
                PatternCategory::Grinding
            }
        }
    }
}

/// Kinds of entities requested from the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Collectible coin.
    Coin,
    /// Obstacle built from one of the configured hazard templates.
    Hazard,
    /// Grindable pole.
    GrindPole,
    /// Grindable rail.
    GrindRail,
    /// Power-up pickup.
    PowerUp,
}

impl EntityKind {
    /// Every entity kind in declaration order.
    pub const ALL: [EntityKind; 5] = [
        Self::Coin,
        Self::Hazard,
        Self::GrindPole,
        Self::GrindRail,
        Self::PowerUp,
    ];
}

/// Immutable physical extent of a platform.
///
/// The origin is the centre of the platform's top surface. Travel runs along
/// +Z, so the near bound is the smaller Z value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlatformGeometry {
    length: f64,
    width: f64,
    origin: DVec3,
}

impl PlatformGeometry {
    /// Creates a new geometry record.
    #[must_use]
    pub const fn new(length: f64, width: f64, origin: DVec3) -> Self {
        Self {
            length,
            width,
            origin,
        }
    }

    /// Extent along the travel axis.
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    /// Extent across the travel axis.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// World anchor of the platform.
    #[must_use]
    pub const fn origin(&self) -> DVec3 {
        self.origin
    }

    /// Z coordinate of the edge the runner reaches first.
    #[must_use]
    pub fn near_bound(&self) -> f64 {
        self.origin.z - self.length * 0.5
    }

    /// Z coordinate of the edge the runner leaves from.
    #[must_use]
    pub fn far_bound(&self) -> f64 {
        self.origin.z + self.length * 0.5
    }

    /// X coordinate of the platform's centre line.
    #[must_use]
    pub const fn lateral_center(&self) -> f64 {
        self.origin.x
    }
}

/// Single entity placement handed to the pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Kind of entity to acquire.
    pub kind: EntityKind,
    /// World position of the entity.
    pub position: DVec3,
    /// Euler rotation in degrees.
    pub rotation_degrees: DVec3,
    /// Hazard template index; zero for every other kind.
    pub variant: u32,
}

impl Placement {
    /// Creates an unrotated placement of the provided kind.
    #[must_use]
    pub const fn new(kind: EntityKind, position: DVec3) -> Self {
        Self {
            kind,
            position,
            rotation_degrees: DVec3::ZERO,
            variant: 0,
        }
    }

    /// Overrides the rotation applied to the entity.
    #[must_use]
    pub fn with_rotation(mut self, rotation_degrees: DVec3) -> Self {
        self.rotation_degrees = rotation_degrees;
        self
    }

    /// Overrides the template variant of the entity.
    #[must_use]
    pub fn with_variant(mut self, variant: u32) -> Self {
        self.variant = variant;
        self
    }
}

/// Content of a single pattern table cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Nothing is placed.
    Empty,
    /// A hazard is placed.
    Hazard,
    /// A coin is placed.
    Coin,
}

impl CellKind {
    /// Parses the authoring notation: `""`, `"h"` or `"c"`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "" => Some(Self::Empty),
            "h" | "H" => Some(Self::Hazard),
            "c" | "C" => Some(Self::Coin),
            _ => None,
        }
    }
}

/// Fixed 4x3 cell table authored in editor tooling.
///
/// Rows are stored in authoring order; the pattern that consumes the table
/// reads them back to front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<Vec<String>>")]
pub struct PatternTable {
    cells: [[CellKind; PATTERN_TABLE_COLUMNS]; PATTERN_TABLE_ROWS],
}

impl PatternTable {
    /// Creates a table from already parsed cells.
    #[must_use]
    pub const fn new(cells: [[CellKind; PATTERN_TABLE_COLUMNS]; PATTERN_TABLE_ROWS]) -> Self {
        Self { cells }
    }

    /// Parses a table written in the authoring notation.
    pub fn from_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<Self, PatternTableError> {
        if rows.len() != PATTERN_TABLE_ROWS {
            return Err(PatternTableError::RowCount { found: rows.len() });
        }

        let mut cells = [[CellKind::Empty; PATTERN_TABLE_COLUMNS]; PATTERN_TABLE_ROWS];
        for (row, values) in rows.iter().enumerate() {
            if values.len() != PATTERN_TABLE_COLUMNS {
                return Err(PatternTableError::ColumnCount {
                    row,
                    found: values.len(),
                });
            }
            for (column, value) in values.iter().enumerate() {
                let value = value.as_ref();
                cells[row][column] =
                    CellKind::parse(value).ok_or_else(|| PatternTableError::UnknownCell {
                        row,
                        column,
                        value: value.to_owned(),
                    })?;
            }
        }

        Ok(Self { cells })
    }

    /// Cell stored at the provided authoring row and column.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<CellKind> {
        self.cells.get(row).and_then(|cells| cells.get(column)).copied()
    }

    /// Rows in authoring order.
    #[must_use]
    pub fn rows(&self) -> &[[CellKind; PATTERN_TABLE_COLUMNS]; PATTERN_TABLE_ROWS] {
        &self.cells
    }
}

impl TryFrom<Vec<Vec<String>>> for PatternTable {
    type Error = PatternTableError;

    fn try_from(rows: Vec<Vec<String>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

/// Reasons an authored pattern table may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PatternTableError {
    /// The table did not contain exactly four rows.
    #[error("pattern table must have 4 rows, found {found}")]
    RowCount {
        /// Number of rows that were provided.
        found: usize,
    },
    /// A row did not contain exactly three cells.
    #[error("pattern table row {row} must have 3 cells, found {found}")]
    ColumnCount {
        /// Row that had the wrong width.
        row: usize,
        /// Number of cells that were provided.
        found: usize,
    },
    /// A cell used notation other than `""`, `"h"` or `"c"`.
    #[error("pattern table cell ({row}, {column}) has unknown value '{value}'")]
    UnknownCell {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        column: usize,
        /// Raw value found in the cell.
        value: String,
    },
}

/// Reasons platform generation may be skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum GenerationError {
    /// The platform is not part of the active track.
    #[error("platform {platform} is not active")]
    MissingPlatform {
        /// Platform named by the caller.
        platform: PlatformId,
    },
    /// The requested template is not configured.
    #[error("{template} is not configured")]
    UnknownTemplate {
        /// Template named by the caller.
        template: TemplateId,
    },
    /// The track already holds as many platforms as it may.
    #[error("track is at its capacity of {capacity} platforms")]
    CapacityReached {
        /// Maximum number of active platforms.
        capacity: usize,
    },
    /// No hazard templates are configured.
    #[error("no hazard templates are configured")]
    EmptyHazardTemplates,
    /// No pattern tables are configured.
    #[error("no pattern tables are configured")]
    EmptyPatternTables,
    /// A pattern table index fell outside the configured list.
    #[error("pattern table {index} requested but only {available} are configured")]
    UnknownPatternTable {
        /// Index that was requested.
        index: usize,
        /// Number of configured tables.
        available: usize,
    },
    /// A column index fell outside the slot grid.
    #[error("column {column} is outside a grid of {items_per_row} columns")]
    ColumnOutOfRange {
        /// Column that was requested.
        column: usize,
        /// Number of columns in the grid.
        items_per_row: usize,
    },
}

/// External pool that owns entity instances.
///
/// The generator never constructs entities itself; it acquires them here and
/// positions them on their platform.
pub trait EntityPool {
    /// Obtains an inactive entity of the provided kind.
    fn acquire(&mut self, kind: EntityKind) -> EntityHandle;

    /// Positions an acquired entity and parents it to a platform.
    fn attach(&mut self, handle: EntityHandle, platform: PlatformId, placement: &Placement);

    /// Returns an entity to the pool.
    fn release(&mut self, handle: EntityHandle);

    /// Returns every entity of the provided kind to the pool.
    fn clear(&mut self, kind: EntityKind);
}
