//! Schedule and fixture data models.

use serde::{Deserialize, Serialize};

use crate::errors::{StageError, StageResult};

/// Opaque entrant identifier
pub type EntrantId = String;

/// Fixture identifier
pub type FixtureId = String;

/// Two partners on one side of a fixture
pub type Pair = [EntrantId; 2];

/// A confirmed entrant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrant {
    pub id: EntrantId,
    pub display_name: String,
    /// Skill tier tag (grouping constraints only)
    pub tier: Option<String>,
    /// Category tag (grouping constraints only)
    pub category: Option<String>,
}

impl Entrant {
    /// Create an untagged entrant
    pub fn new(id: impl Into<EntrantId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            tier: None,
            category: None,
        }
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Which side of a fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Fixture over entrant indices `0..n`; resolved to entrants at generation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexFixture {
    pub side_a: [usize; 2],
    pub side_b: [usize; 2],
}

impl IndexFixture {
    pub const fn new(side_a: [usize; 2], side_b: [usize; 2]) -> Self {
        Self { side_a, side_b }
    }

    /// All four indices, side A first
    pub fn indices(&self) -> [usize; 4] {
        [self.side_a[0], self.side_a[1], self.side_b[0], self.side_b[1]]
    }
}

/// One round of simultaneous fixtures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Round number (1-indexed)
    pub number: usize,
    pub fixtures: Vec<IndexFixture>,
}

/// A complete Super-X schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub cohort_size: usize,
    pub rounds: Vec<Round>,
}

impl Schedule {
    /// Total fixtures across all rounds
    pub fn fixture_count(&self) -> usize {
        self.rounds.iter().map(|r| r.fixtures.len()).sum()
    }

    /// Map indices onto concrete entrants.
    ///
    /// `entrants[i]` plays every fixture that references index `i`. Fixture
    /// ordinals run across the whole schedule so ids stay stable when the
    /// same table is resolved again.
    ///
    /// # Errors
    ///
    /// * `StageError::CohortMismatch` - entrant count differs from the table's cohort
    /// * `StageError::TableIndexOutOfRange` - a fixture points past the cohort
    pub fn resolve(&self, entrants: &[EntrantId]) -> StageResult<Vec<Fixture>> {
        if entrants.len() != self.cohort_size {
            return Err(StageError::CohortMismatch {
                expected: self.cohort_size,
                actual: entrants.len(),
            });
        }

        let mut fixtures = Vec::with_capacity(self.fixture_count());
        for round in &self.rounds {
            let pick = |i: usize| {
                entrants
                    .get(i)
                    .cloned()
                    .ok_or(StageError::TableIndexOutOfRange {
                        round: round.number,
                        index: i,
                        cohort_size: self.cohort_size,
                    })
            };
            for (idx, fixture) in round.fixtures.iter().enumerate() {
                let side_a = [pick(fixture.side_a[0])?, pick(fixture.side_a[1])?];
                let side_b = [pick(fixture.side_b[0])?, pick(fixture.side_b[1])?];
                fixtures.push(Fixture {
                    id: format!("R{}-F{}", round.number, idx + 1),
                    ordinal: fixtures.len() + 1,
                    round: Some(round.number),
                    group_id: None,
                    side_a,
                    side_b,
                });
            }
        }

        Ok(fixtures)
    }
}

/// A concrete match between two pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    /// Stable 1-indexed position within its schedule or group
    pub ordinal: usize,
    /// Super-X round number
    pub round: Option<usize>,
    /// Owning group for grouped stages
    pub group_id: Option<String>,
    pub side_a: Pair,
    pub side_b: Pair,
}

impl Fixture {
    pub fn side(&self, side: Side) -> &Pair {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    /// Whether `entrant` plays in this fixture
    pub fn involves(&self, entrant: &str) -> bool {
        self.side_a.iter().chain(self.side_b.iter()).any(|e| e == entrant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::tables::validate_schedule;

    fn two_round_schedule() -> Schedule {
        Schedule {
            cohort_size: 4,
            rounds: vec![
                Round {
                    number: 1,
                    fixtures: vec![IndexFixture::new([0, 1], [2, 3])],
                },
                Round {
                    number: 2,
                    fixtures: vec![IndexFixture::new([0, 2], [1, 3])],
                },
            ],
        }
    }

    #[test]
    fn test_resolve_maps_indices() {
        let ids: Vec<EntrantId> = ["ana", "bia", "caio", "duda"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let fixtures = two_round_schedule().resolve(&ids).unwrap();

        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].id, "R1-F1");
        assert_eq!(fixtures[1].ordinal, 2);
        assert_eq!(fixtures[1].side_a, ["ana".to_string(), "caio".to_string()]);
        assert!(fixtures[1].involves("duda"));
    }

    #[test]
    fn test_resolve_rejects_wrong_entrant_count() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let err = two_round_schedule().resolve(&ids).unwrap_err();
        assert_eq!(err, StageError::CohortMismatch { expected: 4, actual: 2 });
    }

    #[test]
    fn test_resolve_rejects_index_past_cohort() {
        let schedule = Schedule {
            cohort_size: 4,
            rounds: vec![Round {
                number: 1,
                fixtures: vec![IndexFixture::new([0, 1], [2, 9])],
            }],
        };
        assert!(!validate_schedule(&schedule).valid);

        let ids: Vec<EntrantId> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            schedule.resolve(&ids),
            Err(StageError::TableIndexOutOfRange {
                round: 1,
                index: 9,
                cohort_size: 4,
            })
        );
    }

    #[test]
    fn test_entrant_tags_are_optional() {
        let plain = Entrant::new("p1", "Ana");
        assert_eq!((plain.tier.as_deref(), plain.category.as_deref()), (None, None));

        let tagged = Entrant::new("p2", "Bia").with_tier("B").with_category("mixed");
        assert_eq!(tagged.tier.as_deref(), Some("B"));
        assert_eq!(tagged.category.as_deref(), Some("mixed"));
        assert_eq!(tagged.id, "p2");
    }

    #[test]
    fn test_fixture_side_lookup() {
        let fixtures = two_round_schedule()
            .resolve(&["a", "b", "c", "d"].map(String::from))
            .unwrap();
        assert_eq!(fixtures[1].side(Side::A), &["a".to_string(), "c".to_string()]);
        assert_eq!(fixtures[1].side(Side::B), &["b".to_string(), "d".to_string()]);
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::A.opponent(), Side::B);
        assert_eq!(Side::B.opponent(), Side::A);
    }
}
