//! Ledger data models: scopes, tallies, deltas and results.

use serde::{Deserialize, Serialize};

use crate::{
    errors::{StageError, StageResult},
    group::models::GroupId,
    schedule::models::{EntrantId, Fixture, FixtureId, Pair, Side},
};

/// Stage identifier
pub type StageId = String;

/// Where a result counts
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Whole stage (Super-X rounds, elimination bracket)
    Stage { stage_id: StageId },
    /// One group inside a stage
    Group { stage_id: StageId, group_id: GroupId },
}

impl Scope {
    pub fn stage(stage_id: impl Into<StageId>) -> Self {
        Scope::Stage {
            stage_id: stage_id.into(),
        }
    }

    pub fn group(stage_id: impl Into<StageId>, group_id: impl Into<GroupId>) -> Self {
        Scope::Group {
            stage_id: stage_id.into(),
            group_id: group_id.into(),
        }
    }

    pub fn stage_id(&self) -> &str {
        match self {
            Scope::Stage { stage_id } | Scope::Group { stage_id, .. } => stage_id,
        }
    }

    pub fn group_id(&self) -> Option<&str> {
        match self {
            Scope::Stage { .. } => None,
            Scope::Group { group_id, .. } => Some(group_id.as_str()),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Stage { stage_id } => write!(f, "stage {}", stage_id),
            Scope::Group { stage_id, group_id } => {
                write!(f, "stage {} group {}", stage_id, group_id)
            }
        }
    }
}

/// Points awarded per win
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Points per win in group play (default: 3)
    pub group_win_points: i64,
    /// Points per win in stage-wide play (default: 1)
    pub stage_win_points: i64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            group_win_points: 3,
            stage_win_points: 1,
        }
    }
}

impl ScoringRules {
    pub fn points_for_win(&self, scope: &Scope) -> i64 {
        match scope {
            Scope::Stage { .. } => self.stage_win_points,
            Scope::Group { .. } => self.group_win_points,
        }
    }
}

/// Cumulative counters; also used signed as a delta
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tally {
    pub matches_played: i64,
    pub wins: i64,
    pub losses: i64,
    pub points: i64,
    pub sets_won: i64,
    pub sets_lost: i64,
    pub games_won: i64,
    pub games_lost: i64,
}

impl Tally {
    pub fn set_balance(&self) -> i64 {
        self.sets_won - self.sets_lost
    }

    pub fn game_balance(&self) -> i64 {
        self.games_won - self.games_lost
    }

    pub fn add(&mut self, other: &Tally) {
        self.matches_played += other.matches_played;
        self.wins += other.wins;
        self.losses += other.losses;
        self.points += other.points;
        self.sets_won += other.sets_won;
        self.sets_lost += other.sets_lost;
        self.games_won += other.games_won;
        self.games_lost += other.games_lost;
    }

    pub fn negated(&self) -> Tally {
        Tally {
            matches_played: -self.matches_played,
            wins: -self.wins,
            losses: -self.losses,
            points: -self.points,
            sets_won: -self.sets_won,
            sets_lost: -self.sets_lost,
            games_won: -self.games_won,
            games_lost: -self.games_lost,
        }
    }
}

/// Change to one entrant's counters in one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDelta {
    pub entrant_id: EntrantId,
    pub scope: Scope,
    pub changes: Tally,
}

impl StatDelta {
    pub fn negated(&self) -> StatDelta {
        StatDelta {
            entrant_id: self.entrant_id.clone(),
            scope: self.scope.clone(),
            changes: self.changes.negated(),
        }
    }
}

/// Standing of one entrant in one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRecord {
    pub entrant_id: EntrantId,
    pub scope: Scope,
    pub tally: Tally,
    /// 1-indexed position, set by ranking
    pub rank_position: Option<u32>,
    pub qualified: bool,
}

impl StatRecord {
    /// Zeroed record for an admitted entrant
    pub fn new(entrant_id: impl Into<EntrantId>, scope: Scope) -> Self {
        Self {
            entrant_id: entrant_id.into(),
            scope,
            tally: Tally::default(),
            rank_position: None,
            qualified: false,
        }
    }
}

/// A single-set result for a doubles fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub fixture_id: FixtureId,
    pub side_a: Pair,
    pub side_b: Pair,
    pub games_a: u32,
    pub games_b: u32,
}

impl MatchResult {
    /// Score a fixture
    ///
    /// # Errors
    ///
    /// * `StageError::InvalidScore` - the set ended level
    pub fn new(fixture: &Fixture, games_a: u32, games_b: u32) -> StageResult<Self> {
        Self::from_pairs(
            fixture.id.clone(),
            fixture.side(Side::A).clone(),
            fixture.side(Side::B).clone(),
            games_a,
            games_b,
        )
    }

    pub fn from_pairs(
        fixture_id: FixtureId,
        side_a: Pair,
        side_b: Pair,
        games_a: u32,
        games_b: u32,
    ) -> StageResult<Self> {
        if games_a == games_b {
            return Err(StageError::InvalidScore {
                fixture: fixture_id,
                games_a,
                games_b,
            });
        }
        Ok(Self {
            fixture_id,
            side_a,
            side_b,
            games_a,
            games_b,
        })
    }

    pub fn winner(&self) -> Side {
        if self.games_a > self.games_b {
            Side::A
        } else {
            Side::B
        }
    }

    pub fn pair(&self, side: Side) -> &Pair {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    pub fn games(&self, side: Side) -> u32 {
        match side {
            Side::A => self.games_a,
            Side::B => self.games_b,
        }
    }

    /// The four deltas this result produces, side A first
    pub fn deltas(&self, scope: &Scope, rules: &ScoringRules) -> Vec<StatDelta> {
        let winner = self.winner();
        let mut deltas = Vec::with_capacity(4);

        for side in [Side::A, Side::B] {
            let won = side == winner;
            let changes = Tally {
                matches_played: 1,
                wins: i64::from(won),
                losses: i64::from(!won),
                points: if won { rules.points_for_win(scope) } else { 0 },
                sets_won: i64::from(won),
                sets_lost: i64::from(!won),
                games_won: i64::from(self.games(side)),
                games_lost: i64::from(self.games(side.opponent())),
            };
            for entrant in self.pair(side) {
                deltas.push(StatDelta {
                    entrant_id: entrant.clone(),
                    scope: scope.clone(),
                    changes,
                });
            }
        }

        deltas
    }
}
