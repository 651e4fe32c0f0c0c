//! Precomputed Super-8 and Super-12 schedules.
//!
//! Each entrant partners every other entrant exactly once and faces every
//! other entrant exactly twice. The tables are data; [`validate`] is the
//! oracle any replacement table has to pass.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::models::{IndexFixture, Round, Schedule};
use crate::errors::{StageError, StageResult};

/// Cohort sizes with a fixed table
pub const SUPPORTED_COHORTS: [usize; 2] = [8, 12];

const fn fx(a: [usize; 2], b: [usize; 2]) -> IndexFixture {
    IndexFixture::new(a, b)
}

/// Super-8: 7 rounds of 2 fixtures
const SUPER_8: [[IndexFixture; 2]; 7] = [
    [fx([0, 5], [1, 2]), fx([3, 4], [6, 7])],
    [fx([0, 7], [1, 3]), fx([2, 4], [5, 6])],
    [fx([0, 3], [2, 6]), fx([1, 7], [4, 5])],
    [fx([0, 2], [4, 7]), fx([1, 5], [3, 6])],
    [fx([0, 1], [4, 6]), fx([2, 5], [3, 7])],
    [fx([0, 6], [5, 7]), fx([1, 4], [2, 3])],
    [fx([0, 4], [3, 5]), fx([1, 6], [2, 7])],
];

/// Super-12: 11 rounds of 3 fixtures
const SUPER_12: [[IndexFixture; 3]; 11] = [
    [fx([0, 1], [7, 10]), fx([2, 4], [5, 9]), fx([3, 8], [6, 11])],
    [fx([1, 2], [8, 0]), fx([3, 5], [6, 10]), fx([4, 9], [7, 11])],
    [fx([2, 3], [9, 1]), fx([4, 6], [7, 0]), fx([5, 10], [8, 11])],
    [fx([3, 4], [10, 2]), fx([5, 7], [8, 1]), fx([6, 0], [9, 11])],
    [fx([4, 5], [0, 3]), fx([6, 8], [9, 2]), fx([7, 1], [10, 11])],
    [fx([5, 6], [1, 4]), fx([7, 9], [10, 3]), fx([8, 2], [0, 11])],
    [fx([6, 7], [2, 5]), fx([8, 10], [0, 4]), fx([9, 3], [1, 11])],
    [fx([7, 8], [3, 6]), fx([9, 0], [1, 5]), fx([10, 4], [2, 11])],
    [fx([8, 9], [4, 7]), fx([10, 1], [2, 6]), fx([0, 5], [3, 11])],
    [fx([9, 10], [5, 8]), fx([0, 2], [3, 7]), fx([1, 6], [4, 11])],
    [fx([10, 0], [6, 9]), fx([1, 3], [4, 8]), fx([2, 7], [5, 11])],
];

/// Result of checking a table against the schedule invariants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

fn rounds_of<const F: usize>(table: &[[IndexFixture; F]]) -> Vec<Round> {
    table
        .iter()
        .enumerate()
        .map(|(idx, fixtures)| Round {
            number: idx + 1,
            fixtures: fixtures.to_vec(),
        })
        .collect()
}

/// Look up the fixed schedule for `n` entrants
///
/// # Errors
///
/// * `StageError::UnsupportedCohortSize` - `n` is not 8 or 12
pub fn schedule(n: usize) -> StageResult<Schedule> {
    let rounds = match n {
        8 => rounds_of(&SUPER_8),
        12 => rounds_of(&SUPER_12),
        _ => return Err(StageError::UnsupportedCohortSize(n)),
    };

    Ok(Schedule {
        cohort_size: n,
        rounds,
    })
}

/// Validate the shipped table for `n`
pub fn validate(n: usize) -> StageResult<TableValidation> {
    Ok(validate_schedule(&schedule(n)?))
}

/// Check any schedule against the Super-X invariants:
/// `n - 1` rounds, every round covers `0..n` exactly once, every index in
/// range, and no two entrants partner more than once.
pub fn validate_schedule(schedule: &Schedule) -> TableValidation {
    let n = schedule.cohort_size;
    let mut errors = Vec::new();

    if schedule.rounds.len() + 1 != n {
        errors.push(format!(
            "expected {} rounds for {} entrants, found {}",
            n.saturating_sub(1),
            n,
            schedule.rounds.len()
        ));
    }

    let mut partners: HashSet<(usize, usize)> = HashSet::new();
    for round in &schedule.rounds {
        let mut seen = vec![0usize; n];
        for fixture in &round.fixtures {
            for idx in fixture.indices() {
                if idx >= n {
                    errors.push(format!(
                        "round {}: index {} outside 0..{}",
                        round.number, idx, n
                    ));
                } else {
                    seen[idx] += 1;
                }
            }

            for pair in [fixture.side_a, fixture.side_b] {
                let key = (pair[0].min(pair[1]), pair[0].max(pair[1]));
                if key.0 == key.1 {
                    errors.push(format!(
                        "round {}: index {} partnered with itself",
                        round.number, key.0
                    ));
                } else if !partners.insert(key) {
                    errors.push(format!(
                        "round {}: {} and {} already partnered",
                        round.number, key.0, key.1
                    ));
                }
            }
        }

        for (idx, count) in seen.iter().enumerate() {
            match count {
                1 => {}
                0 => errors.push(format!("round {}: index {} idle", round.number, idx)),
                _ => errors.push(format!(
                    "round {}: index {} appears {} times",
                    round.number, idx, count
                )),
            }
        }
    }

    TableValidation {
        valid: errors.is_empty(),
        errors,
    }
}
