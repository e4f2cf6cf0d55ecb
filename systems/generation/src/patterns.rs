//! Placement routines for every pattern in the library.
//!
//! A pattern runs against one platform and a fresh [`OccupiedLedger`]. It
//! only buffers [`Placement`] values; the caller decides whether they reach
//! the entity pool.

use std::f64::consts::PI;

use glam::DVec3;
use log::trace;
use rand::Rng;
use runner_track_core::{
    CellKind, EntityKind, GenerationError, PatternCategory, PatternKind, PatternTable, Placement,
    PATTERN_TABLE_COLUMNS, PATTERN_TABLE_ROWS,
};
use runner_track_world::{OccupiedLedger, Platform};
use serde::Deserialize;

use crate::{selection::PatternChoice, GenerationConfig};

/// Probability of a coin above each hazard of [`PatternKind::HazardLineRandomRow`].
pub const ROW_COIN_CHANCE: f64 = 0.35;

/// Probability of a coin above each hazard cell of [`PatternKind::TablePattern`].
pub const TABLE_COIN_CHANCE: f64 = 0.40;

/// Offsets and counts shaping the individual patterns.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PatternTuning {
    /// Height of a coin floating above a hazard.
    pub coin_lift: f64,
    /// Half the length of a grind pole.
    pub pole_half_length: f64,
    /// Height of a grind pole above its slot.
    pub pole_vertical_offset: f64,
    /// Rotation about X that lays a pole along the travel axis.
    pub pole_tilt_degrees: f64,
    /// Height of the power-up ahead of a pole.
    pub power_up_lift: f64,
    /// Number of coins in the arc behind a pole.
    pub arc_coin_count: usize,
    /// Height of the first and last arc coins.
    pub arc_min_height: f64,
    /// Height of the arc apex.
    pub arc_max_height: f64,
    /// Distance between consecutive arc coins.
    pub arc_depth_step: f64,
    /// Height of the elevated grind rail.
    pub rail_elevation: f64,
    /// Forward shift of the ground-level grind rail.
    pub rail_forward_offset: f64,
}

impl Default for PatternTuning {
    fn default() -> Self {
        Self {
            coin_lift: 1.0,
            pole_half_length: 2.5,
            pole_vertical_offset: 0.5,
            pole_tilt_degrees: 90.0,
            power_up_lift: 1.5,
            arc_coin_count: 10,
            arc_min_height: 1.0,
            arc_max_height: 4.0,
            arc_depth_step: 1.0,
            rail_elevation: 2.0,
            rail_forward_offset: 3.0,
        }
    }
}

/// Placements produced by one successful pattern run.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternOutcome {
    /// Category the pattern reports to the history.
    pub category: PatternCategory,
    /// Entities to acquire, in placement order.
    pub placements: Vec<Placement>,
}

/// Runs the chosen pattern on the platform.
pub fn run_pattern<R: Rng>(
    choice: PatternChoice,
    platform: &Platform,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<PatternOutcome, GenerationError> {
    let mut scope = PatternScope {
        platform,
        rng,
        tuning: &config.pattern,
        hazard_variants: config.hazard_templates.len(),
        max_retries: config.max_retries,
        ledger: OccupiedLedger::for_platform(platform.id()),
        placements: Vec::new(),
    };

    let category = match choice.kind {
        PatternKind::CoinPair => scope.coin_pair(),
        PatternKind::CoinLineAllRows => scope.coin_line_all_rows(),
        PatternKind::CoinLineSingleColumn => scope.coin_line_single_column(),
        PatternKind::DangerousRandom => scope.dangerous_random(),
        PatternKind::HazardLines => scope.hazard_lines(),
        PatternKind::HazardLineRandomRow => scope.hazard_line_random_row(),
        PatternKind::TablePattern => {
            let index = choice.table.unwrap_or_default();
            let table = config.pattern_tables.get(index).ok_or(
                GenerationError::UnknownPatternTable {
                    index,
                    available: config.pattern_tables.len(),
                },
            )?;
            scope.table_pattern(table)
        }
        PatternKind::GrindingPole => scope.grinding_pole(),
        PatternKind::GrindingPoleCoinArc => scope.grinding_pole_coin_arc(),
        PatternKind::ElevatedGrindRails => scope.elevated_grind_rails()?,
    };

    Ok(PatternOutcome {
        category,
        placements: scope.placements,
    })
}

struct PatternScope<'a, R> {
    platform: &'a Platform,
    rng: &'a mut R,
    tuning: &'a PatternTuning,
    hazard_variants: usize,
    max_retries: u32,
    ledger: OccupiedLedger,
    placements: Vec<Placement>,
}

impl<R: Rng> PatternScope<'_, R> {
    fn place(&mut self, placement: Placement) {
        trace!(
            "platform {}: {:?} at ({:.2}, {:.2}, {:.2})",
            self.platform.id(),
            placement.kind,
            placement.position.x,
            placement.position.y,
            placement.position.z
        );
        self.placements.push(placement);
    }

    fn coin(&mut self, position: DVec3) {
        self.place(Placement::new(EntityKind::Coin, position));
    }

    fn hazard(&mut self, position: DVec3) {
        let variant = if self.hazard_variants <= 1 {
            0
        } else {
            self.rng.gen_range(0..self.hazard_variants)
        };
        let variant = u32::try_from(variant).unwrap_or(u32::MAX);
        self.place(Placement::new(EntityKind::Hazard, position).with_variant(variant));
    }

    fn lifted_coin(&mut self, position: DVec3) {
        let lift = self.tuning.coin_lift;
        self.coin(position + DVec3::Y * lift);
    }

    /// Claims a slot without consulting the ledger.
    fn claim(&mut self, position: DVec3) -> DVec3 {
        let _ = self.ledger.add(position);
        position
    }

    /// Claims the first free slot starting at `initial`.
    fn claim_free(&mut self, initial: DVec3) -> DVec3 {
        self.ledger
            .claim_free(initial, self.platform, self.max_retries, self.rng)
    }

    fn random_column(&mut self) -> usize {
        self.rng.gen_range(0..self.platform.grid().items_per_row().max(1))
    }

    fn random_row(&mut self) -> usize {
        self.rng.gen_range(0..self.platform.grid().row_count())
    }

    fn row_count(&self) -> usize {
        self.platform.grid().row_count()
    }

    fn columns(&self) -> usize {
        self.platform.grid().items_per_row()
    }

    fn coin_pair(&mut self) -> PatternCategory {
        let slot = self.platform.resolve_random(self.rng);
        let first = self.claim(slot.position);
        self.coin(first);

        let second = self.platform.resolve_slot(slot.row + 1, slot.column);
        let second = self.claim(second);
        self.coin(second);

        let ahead = self.platform.resolve_slot(slot.row + 2, slot.column);
        let hazard = self.claim_free(ahead);
        self.hazard(hazard);
        PatternCategory::Safe
    }

    fn coin_line_all_rows(&mut self) -> PatternCategory {
        for row in 0..self.row_count() {
            for column in 0..self.columns() {
                let position = self.claim(self.platform.resolve_slot(row, column));
                self.coin(position);
            }
        }
        PatternCategory::Safe
    }

    fn coin_line_single_column(&mut self) -> PatternCategory {
        let column = self.random_column();
        let last = self.row_count() - 1;
        for row in 0..last {
            let position = self.claim(self.platform.resolve_slot(row, column));
            self.coin(position);
        }

        let position = self.claim_free(self.platform.resolve_slot(last, column));
        if self.rng.gen_bool(0.5) {
            self.coin(position);
        } else {
            self.hazard(position);
        }
        PatternCategory::Safe
    }

    fn dangerous_random(&mut self) -> PatternCategory {
        let column = self.random_column();
        for row in 0..self.row_count() - 1 {
            let position = self.claim(self.platform.resolve_slot(row, column));
            if self.rng.gen_bool(0.5) {
                self.coin(position);
            } else {
                self.hazard(position);
            }
        }

        let initial = self.platform.resolve_random(self.rng).position;
        let position = self.claim_free(initial);
        self.hazard(position);
        PatternCategory::Hazard
    }

    fn hazard_lines(&mut self) -> PatternCategory {
        let coin_column = self.random_column();
        for column in 0..self.columns() {
            for row in 0..self.row_count() {
                let position = self.claim(self.platform.resolve_slot(row, column));
                if column == coin_column {
                    self.coin(position);
                } else {
                    self.hazard(position);
                }
            }
        }
        PatternCategory::Hazard
    }

    // Drawn from the hazard list, reported as Safe.
    fn hazard_line_random_row(&mut self) -> PatternCategory {
        let row = self.random_row();
        for column in 0..self.columns() {
            let position = self.claim(self.platform.resolve_slot(row, column));
            self.hazard(position);
            if self.rng.gen_bool(ROW_COIN_CHANCE) {
                self.lifted_coin(position);
            }
        }
        PatternCategory::Safe
    }

    fn table_pattern(&mut self, table: &PatternTable) -> PatternCategory {
        for (table_row, cells) in table.rows().iter().enumerate() {
            let grid_row = PATTERN_TABLE_ROWS - 1 - table_row;
            let Some(row) = self.platform.grid().row(grid_row) else {
                continue;
            };
            for (column, cell) in cells.iter().enumerate().take(PATTERN_TABLE_COLUMNS) {
                if column >= self.columns() {
                    break;
                }
                match cell {
                    CellKind::Empty => {}
                    CellKind::Coin => {
                        let position = self.claim(self.platform.resolve(row, column));
                        self.coin(position);
                    }
                    CellKind::Hazard => {
                        let position = self.claim(self.platform.resolve(row, column));
                        self.hazard(position);
                        if self.rng.gen_bool(TABLE_COIN_CHANCE) {
                            self.lifted_coin(position);
                        }
                    }
                }
            }
        }
        PatternCategory::Hazard
    }

    /// Places a pole on the first row and returns the position of its far end.
    ///
    /// The power-up sits on the slot one row ahead of the pole, lifted.
    fn pole(&mut self) -> DVec3 {
        let column = self.random_column();
        let base = self.claim(self.platform.resolve_slot(0, column));
        let tuning = self.tuning;
        let position =
            base + DVec3::new(0.0, tuning.pole_vertical_offset, tuning.pole_half_length);
        let rotation = DVec3::new(tuning.pole_tilt_degrees, 0.0, 0.0);
        self.place(Placement::new(EntityKind::GrindPole, position).with_rotation(rotation));

        let power_up = self.claim_free(self.platform.resolve_slot(1, column));
        let lift = self.tuning.power_up_lift;
        self.place(Placement::new(EntityKind::PowerUp, power_up + DVec3::Y * lift));

        position + DVec3::Z * tuning.pole_half_length
    }

    fn grinding_pole(&mut self) -> PatternCategory {
        let _ = self.pole();
        PatternCategory::Grinding
    }

    fn grinding_pole_coin_arc(&mut self) -> PatternCategory {
        let far_end = self.pole();
        let tuning = self.tuning;
        let count = tuning.arc_coin_count;
        let steps = count.saturating_sub(1).max(1) as f64;
        let geometry = self.platform.geometry();
        let ground = geometry.origin().y;
        // Shifted back so the last coin lands on this platform.
        let span = tuning.arc_depth_step * count.saturating_sub(1) as f64;
        let start = far_end
            .z
            .min(geometry.far_bound() - span)
            .max(geometry.near_bound());

        for index in 0..count {
            let phase = (PI * index as f64 / steps).sin();
            let height =
                tuning.arc_min_height + (tuning.arc_max_height - tuning.arc_min_height) * phase;
            let position = DVec3::new(
                far_end.x,
                ground + height,
                start + tuning.arc_depth_step * index as f64,
            );
            let position = self.claim(position);
            self.coin(position);
        }
        PatternCategory::Grinding
    }

    fn elevated_grind_rails(&mut self) -> Result<PatternCategory, GenerationError> {
        const RAIL_COLUMNS: [usize; 2] = [0, 2];

        let columns = self.columns();
        if columns < 3 {
            return Err(GenerationError::ColumnOutOfRange {
                column: 2,
                items_per_row: columns,
            });
        }

        let elevated = RAIL_COLUMNS[usize::from(self.rng.gen_bool(0.5))];
        let tuning = self.tuning;
        for column in RAIL_COLUMNS {
            let base = self.claim(self.platform.try_resolve(0.5, column)?);
            let position = if column == elevated {
                base + DVec3::Y * tuning.rail_elevation
            } else {
                base + DVec3::Z * tuning.rail_forward_offset
            };
            self.place(Placement::new(EntityKind::GrindRail, position));
        }
        Ok(PatternCategory::Grinding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use runner_track_core::{PlatformGeometry, PlatformId, PlatformRole, TemplateId};
    use runner_track_world::SlotTuning;

    fn platform(length: f64, tuning: &SlotTuning) -> Platform {
        Platform::new(
            PlatformId::new(3),
            TemplateId::new(0),
            PlatformRole::Generated,
            PlatformGeometry::new(length, 9.0, DVec3::new(0.0, 0.0, 40.0 + length / 2.0)),
            tuning,
        )
    }

    fn run(kind: PatternKind, platform: &Platform, seed: u64) -> PatternOutcome {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        run_pattern(
            PatternChoice {
                kind,
                table: (kind == PatternKind::TablePattern).then_some(0),
            },
            platform,
            &GenerationConfig::default(),
            &mut rng,
        )
        .expect("pattern runs")
    }

    fn count(outcome: &PatternOutcome, kind: EntityKind) -> usize {
        outcome
            .placements
            .iter()
            .filter(|placement| placement.kind == kind)
            .count()
    }

    fn column_of(platform: &Platform, position: DVec3) -> usize {
        (0..platform.grid().items_per_row())
            .find(|column| platform.resolve_slot(0, *column).x == position.x)
            .expect("position on a column")
    }

    #[test]
    fn table_cells_map_to_reversed_rows() {
        let platform = platform(12.0, &SlotTuning::default());
        assert_eq!(platform.grid().row_count(), 4);

        let table = PatternTable::from_rows(&[
            vec!["h", "", "c"],
            vec!["", "", "h"],
            vec!["c", "c", "c"],
            vec!["", "h", ""],
        ])
        .expect("valid table");
        let config = GenerationConfig {
            pattern_tables: vec![table],
            ..GenerationConfig::default()
        };

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let outcome = run_pattern(
                PatternChoice {
                    kind: PatternKind::TablePattern,
                    table: Some(0),
                },
                &platform,
                &config,
                &mut rng,
            )
            .expect("table exists");
            assert_eq!(outcome.category, PatternCategory::Hazard);

            let hazards: Vec<DVec3> = outcome
                .placements
                .iter()
                .filter(|p| p.kind == EntityKind::Hazard)
                .map(|p| p.position)
                .collect();
            let expected_hazards = vec![
                platform.resolve_slot(3, 0),
                platform.resolve_slot(2, 2),
                platform.resolve_slot(0, 1),
            ];
            assert_eq!(hazards, expected_hazards);

            let ground_coins: Vec<DVec3> = outcome
                .placements
                .iter()
                .filter(|p| p.kind == EntityKind::Coin && p.position.y == 0.0)
                .map(|p| p.position)
                .collect();
            let expected_coins = vec![
                platform.resolve_slot(3, 2),
                platform.resolve_slot(1, 0),
                platform.resolve_slot(1, 1),
                platform.resolve_slot(1, 2),
            ];
            assert_eq!(ground_coins, expected_coins);

            let lifted = count(&outcome, EntityKind::Coin) - ground_coins.len();
            assert!(lifted <= hazards.len());
        }
    }

    #[test]
    fn table_rows_beyond_grid_are_skipped() {
        let platform = platform(6.0, &SlotTuning::default());
        assert_eq!(platform.grid().row_count(), 2);

        let table = PatternTable::from_rows(&[
            vec!["c", "c", "c"],
            vec!["c", "c", "c"],
            vec!["", "c", ""],
            vec!["c", "", ""],
        ])
        .expect("valid table");
        let config = GenerationConfig {
            pattern_tables: vec![table],
            ..GenerationConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = run_pattern(
            PatternChoice {
                kind: PatternKind::TablePattern,
                table: Some(0),
            },
            &platform,
            &config,
            &mut rng,
        )
        .expect("table exists");

        let positions: Vec<DVec3> = outcome.placements.iter().map(|p| p.position).collect();
        assert_eq!(
            positions,
            vec![platform.resolve_slot(1, 1), platform.resolve_slot(0, 0)]
        );
    }

    #[test]
    fn unknown_table_index_aborts() {
        let platform = platform(12.0, &SlotTuning::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = GenerationConfig::default();
        let result = run_pattern(
            PatternChoice {
                kind: PatternKind::TablePattern,
                table: Some(config.pattern_tables.len()),
            },
            &platform,
            &config,
            &mut rng,
        );
        assert_eq!(
            result,
            Err(GenerationError::UnknownPatternTable {
                index: config.pattern_tables.len(),
                available: config.pattern_tables.len(),
            })
        );
    }

    #[test]
    fn rails_skip_the_middle_column() {
        let platform = platform(30.0, &SlotTuning::default());
        let tuning = PatternTuning::default();
        let left = platform.resolve(0.5, 0).x;
        let right = platform.resolve(0.5, 2).x;

        for seed in 0..32 {
            let outcome = run(PatternKind::ElevatedGrindRails, &platform, seed);
            assert_eq!(outcome.category, PatternCategory::Grinding);
            assert_eq!(outcome.placements.len(), 2);

            let rails: Vec<&Placement> = outcome.placements.iter().collect();
            assert!(rails.iter().all(|rail| rail.kind == EntityKind::GrindRail));
            assert_eq!(rails[0].position.x, left);
            assert_eq!(rails[1].position.x, right);

            let elevated = rails
                .iter()
                .filter(|rail| rail.position.y == tuning.rail_elevation)
                .count();
            assert_eq!(elevated, 1);
        }
    }

    #[test]
    fn rails_need_three_columns() {
        let tuning = SlotTuning {
            items_per_row: 2,
            ..SlotTuning::default()
        };
        let platform = platform(30.0, &tuning);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let result = run_pattern(
            PatternChoice {
                kind: PatternKind::ElevatedGrindRails,
                table: None,
            },
            &platform,
            &GenerationConfig::default(),
            &mut rng,
        );
        assert_eq!(
            result,
            Err(GenerationError::ColumnOutOfRange {
                column: 2,
                items_per_row: 2,
            })
        );
    }

    #[test]
    fn all_rows_fill_every_slot_with_coins() {
        let platform = platform(30.0, &SlotTuning::default());
        let outcome = run(PatternKind::CoinLineAllRows, &platform, 9);
        assert_eq!(outcome.category, PatternCategory::Safe);
        assert_eq!(
            count(&outcome, EntityKind::Coin),
            platform.grid().row_count() * 3
        );
        assert_eq!(outcome.placements.len(), count(&outcome, EntityKind::Coin));
    }

    #[test]
    fn hazard_lines_leave_one_coin_column() {
        let platform = platform(30.0, &SlotTuning::default());
        let rows = platform.grid().row_count();
        let outcome = run(PatternKind::HazardLines, &platform, 12);
        assert_eq!(count(&outcome, EntityKind::Coin), rows);
        assert_eq!(count(&outcome, EntityKind::Hazard), rows * 2);

        let coin_x: Vec<f64> = outcome
            .placements
            .iter()
            .filter(|p| p.kind == EntityKind::Coin)
            .map(|p| p.position.x)
            .collect();
        assert!(coin_x.iter().all(|x| *x == coin_x[0]));
    }

    #[test]
    fn single_column_line_ends_on_its_last_row() {
        let platform = platform(30.0, &SlotTuning::default());
        let last = platform.grid().row_count() - 1;
        for seed in 0..16 {
            let outcome = run(PatternKind::CoinLineSingleColumn, &platform, seed);
            assert_eq!(outcome.category, PatternCategory::Safe);
            assert_eq!(outcome.placements.len(), last + 1);

            let column = column_of(&platform, outcome.placements[0].position);
            for (row, placement) in outcome.placements[..last].iter().enumerate() {
                assert_eq!(placement.kind, EntityKind::Coin);
                assert_eq!(placement.position, platform.resolve_slot(row, column));
            }
            let tail = outcome.placements[last];
            assert!(matches!(tail.kind, EntityKind::Coin | EntityKind::Hazard));
            assert_eq!(tail.position, platform.resolve_slot(last, column));
        }
    }

    #[test]
    fn single_column_line_on_one_row() {
        let platform = platform(4.0, &SlotTuning::default());
        assert_eq!(platform.grid().row_count(), 1);
        for seed in 0..8 {
            let outcome = run(PatternKind::CoinLineSingleColumn, &platform, seed);
            assert_eq!(outcome.placements.len(), 1);
            let position = outcome.placements[0].position;
            let column = column_of(&platform, position);
            assert_eq!(position, platform.resolve_slot(0, column));
        }
    }

    #[test]
    fn dangerous_random_adds_one_free_hazard() {
        let platform = platform(30.0, &SlotTuning::default());
        let last = platform.grid().row_count() - 1;
        for seed in 0..16 {
            let outcome = run(PatternKind::DangerousRandom, &platform, seed);
            assert_eq!(outcome.category, PatternCategory::Hazard);
            assert_eq!(outcome.placements.len(), last + 1);

            let column = column_of(&platform, outcome.placements[0].position);
            let line: Vec<DVec3> = outcome.placements[..last]
                .iter()
                .map(|placement| placement.position)
                .collect();
            for (row, position) in line.iter().enumerate() {
                assert_eq!(*position, platform.resolve_slot(row, column));
            }

            let extra = outcome.placements[last];
            assert_eq!(extra.kind, EntityKind::Hazard);
            assert!(line
                .iter()
                .all(|position| position.distance(extra.position) > 1e-6));
        }
    }

    #[test]
    fn dangerous_random_on_one_row() {
        let platform = platform(4.0, &SlotTuning::default());
        let outcome = run(PatternKind::DangerousRandom, &platform, 5);
        assert_eq!(outcome.placements.len(), 1);
        assert_eq!(outcome.placements[0].kind, EntityKind::Hazard);
        let z = outcome.placements[0].position.z;
        assert_eq!(z, platform.resolve_slot(0, 0).z);
    }

    #[test]
    fn random_row_reports_safe() {
        let platform = platform(30.0, &SlotTuning::default());
        let outcome = run(PatternKind::HazardLineRandomRow, &platform, 2);
        assert_eq!(outcome.category, PatternCategory::Safe);
        assert_eq!(count(&outcome, EntityKind::Hazard), 3);
        let z = outcome.placements[0].position.z;
        assert!(outcome.placements.iter().all(|p| p.position.z == z));
    }

    #[test]
    fn coin_arc_rises_then_falls() {
        let platform = platform(30.0, &SlotTuning::default());
        let tuning = PatternTuning::default();
        let outcome = run(PatternKind::GrindingPoleCoinArc, &platform, 6);
        assert_eq!(outcome.category, PatternCategory::Grinding);
        assert_eq!(count(&outcome, EntityKind::GrindPole), 1);
        assert_eq!(count(&outcome, EntityKind::PowerUp), 1);

        let arc: Vec<DVec3> = outcome
            .placements
            .iter()
            .filter(|p| p.kind == EntityKind::Coin)
            .map(|p| p.position)
            .collect();
        assert_eq!(arc.len(), tuning.arc_coin_count);
        assert!(arc.windows(2).all(|pair| pair[1].z > pair[0].z));
        assert!((arc[0].y - tuning.arc_min_height).abs() < 1e-9);
        assert!((arc[arc.len() - 1].y - tuning.arc_min_height).abs() < 1e-9);
        assert!(arc[..5].windows(2).all(|pair| pair[1].y > pair[0].y));
        assert!(arc[5..].windows(2).all(|pair| pair[1].y < pair[0].y));
    }

    #[test]
    fn coin_arc_ends_on_short_platform() {
        let platform = platform(12.0, &SlotTuning::default());
        let tuning = PatternTuning::default();
        let geometry = platform.geometry();
        for seed in 0..8 {
            let outcome = run(PatternKind::GrindingPoleCoinArc, &platform, seed);
            let arc: Vec<f64> = outcome
                .placements
                .iter()
                .filter(|p| p.kind == EntityKind::Coin)
                .map(|p| p.position.z)
                .collect();
            assert_eq!(arc.len(), tuning.arc_coin_count);
            assert!(arc.iter().all(|z| *z >= geometry.near_bound()));
            assert!(arc.iter().all(|z| *z <= geometry.far_bound() + 1e-9));
            assert!(arc
                .windows(2)
                .all(|pair| (pair[1] - pair[0] - tuning.arc_depth_step).abs() < 1e-9));
        }
    }

    #[test]
    fn pole_sits_on_first_row() {
        let platform = platform(30.0, &SlotTuning::default());
        let tuning = PatternTuning::default();
        let outcome = run(PatternKind::GrindingPole, &platform, 21);
        let pole = outcome
            .placements
            .iter()
            .find(|p| p.kind == EntityKind::GrindPole)
            .expect("pole placed");
        let near = platform.geometry().near_bound();
        assert_eq!(pole.position.z, near + tuning.pole_half_length);
        assert_eq!(pole.position.y, tuning.pole_vertical_offset);
        assert_eq!(pole.rotation_degrees, DVec3::new(90.0, 0.0, 0.0));

        let power_ups: Vec<&Placement> = outcome
            .placements
            .iter()
            .filter(|p| p.kind == EntityKind::PowerUp)
            .collect();
        assert_eq!(power_ups.len(), 1);
        let column = column_of(&platform, pole.position);
        let slot = platform.resolve_slot(1, column);
        assert_eq!(power_ups[0].position.x, pole.position.x);
        assert_eq!(power_ups[0].position.z, slot.z);
        assert_eq!(power_ups[0].position.y, slot.y + tuning.power_up_lift);
    }

    #[test]
    fn coin_pair_wraps_rows() {
        let platform = platform(6.0, &SlotTuning::default());
        assert_eq!(platform.grid().row_count(), 2);
        for seed in 0..16 {
            let outcome = run(PatternKind::CoinPair, &platform, seed);
            assert_eq!(count(&outcome, EntityKind::Coin), 2);
            assert_eq!(count(&outcome, EntityKind::Hazard), 1);
            let first = outcome.placements[0].position;
            let second = outcome.placements[1].position;
            assert_eq!(first.x, second.x);
            assert_ne!(first.z, second.z);
        }
    }

    #[test]
    fn hazard_variants_index_configured_templates() {
        let platform = platform(30.0, &SlotTuning::default());
        let outcome = run(PatternKind::HazardLines, &platform, 8);
        let config = GenerationConfig::default();
        assert!(outcome
            .placements
            .iter()
            .filter(|p| p.kind == EntityKind::Hazard)
            .all(|p| (p.variant as usize) < config.hazard_templates.len()));
    }
}
