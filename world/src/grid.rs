//! Slot grid derived from platform geometry.
//!
//! Rows are stored as normalized positions along the travel axis so the same
//! grid can be resolved against any platform of matching length. Column
//! offsets are recomputed on demand and always centred on the platform.

use log::debug;
use runner_track_core::{GenerationError, PlatformGeometry};

/// Smallest item size accepted when deriving row spacing.
pub const MIN_ITEM_SIZE: f64 = 0.1;

/// Spacing tunables shared by every platform on the track.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct SlotTuning {
    /// Free distance kept between consecutive rows.
    pub row_spacing: f64,
    /// Footprint of a single item along both axes.
    pub item_size: f64,
    /// Number of columns laid out across the platform.
    pub items_per_row: usize,
    /// Free distance kept between neighbouring columns.
    pub item_spacing: f64,
}

impl Default for SlotTuning {
    fn default() -> Self {
        Self {
            row_spacing: 2.0,
            item_size: 1.0,
            items_per_row: 3,
            item_spacing: 1.0,
        }
    }
}

/// Derives evenly spaced normalized row positions for a platform length.
///
/// The row count is `floor(length / (row_spacing + item_size))`, never below
/// one. Multiple rows span `0.0..=1.0` exactly; a single row sits at `0.0`.
/// Non-positive lengths collapse to the single-row grid.
#[must_use]
pub fn build_rows(length: f64, item_size: f64, row_spacing: f64) -> Vec<f64> {
    let item_size = item_size.max(MIN_ITEM_SIZE);
    if !length.is_finite() || length <= 0.0 {
        return vec![0.0];
    }

    let effective_spacing = row_spacing + item_size;
    if effective_spacing <= 0.0 {
        return vec![0.0];
    }

    let count = (length / effective_spacing).floor();
    if !count.is_finite() || count < 2.0 {
        return vec![0.0];
    }

    let count = count as usize;
    let last = (count - 1) as f64;
    (0..count).map(|index| index as f64 / last).collect()
}

/// Discrete placement slots of a single platform.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotGrid {
    rows: Vec<f64>,
    items_per_row: usize,
    item_size: f64,
    item_spacing: f64,
}

impl SlotGrid {
    /// Builds the grid for the provided geometry.
    #[must_use]
    pub fn for_geometry(geometry: &PlatformGeometry, tuning: &SlotTuning) -> Self {
        let grid = Self {
            rows: build_rows(geometry.length(), tuning.item_size, tuning.row_spacing),
            items_per_row: tuning.items_per_row,
            item_size: tuning.item_size.max(MIN_ITEM_SIZE),
            item_spacing: tuning.item_spacing,
        };
        if !grid.spans_width(geometry) {
            debug!(
                "column span {:.2} exceeds platform width {:.2}",
                grid.column_span(),
                geometry.width()
            );
        }
        grid
    }

    /// Normalized row positions ordered from near to far.
    #[must_use]
    pub fn rows(&self) -> &[f64] {
        &self.rows
    }

    /// Number of rows in the grid. Always at least one.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Normalized position of the row at the provided index.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<f64> {
        self.rows.get(index).copied()
    }

    /// Number of columns in every row.
    #[must_use]
    pub const fn items_per_row(&self) -> usize {
        self.items_per_row
    }

    /// Total lateral extent covered by the columns.
    #[must_use]
    pub fn column_span(&self) -> f64 {
        if self.items_per_row == 0 {
            return 0.0;
        }
        let items = self.items_per_row as f64;
        items * self.item_size + (items - 1.0) * self.item_spacing
    }

    /// Lateral offset of a column from the platform centre line.
    pub fn column_offset(&self, column: usize) -> Result<f64, GenerationError> {
        if column >= self.items_per_row {
            return Err(GenerationError::ColumnOutOfRange {
                column,
                items_per_row: self.items_per_row,
            });
        }

        let first = -self.column_span() / 2.0 + self.item_size / 2.0;
        Ok(first + column as f64 * (self.item_size + self.item_spacing))
    }

    /// Lateral offsets of every column, left to right.
    pub fn column_offsets(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.items_per_row).filter_map(|column| self.column_offset(column).ok())
    }

    /// Reports whether the columns fit inside the platform width.
    #[must_use]
    pub fn spans_width(&self, geometry: &PlatformGeometry) -> bool {
        self.column_span() <= geometry.width()
    }
}
