//! Bracket data models.

use serde::{Deserialize, Serialize};

use crate::{
    errors::{StageError, StageResult},
    group::models::GroupId,
    ledger::models::MatchResult,
    schedule::models::{EntrantId, Pair, Side},
};

/// Pair or team reference entering the bracket
pub type QualifierId = String;

/// Where a qualifier finished in group play
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifierOrigin {
    pub group_id: GroupId,
    /// 1-indexed finishing position inside the group
    pub position: u32,
}

/// A bracket participant. Slices of qualifiers are ordered strongest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualifier {
    pub id: QualifierId,
    pub members: Vec<EntrantId>,
    pub origin: Option<QualifierOrigin>,
}

impl Qualifier {
    pub fn new(id: impl Into<QualifierId>, members: Vec<EntrantId>) -> Self {
        Self {
            id: id.into(),
            members,
            origin: None,
        }
    }

    /// Doubles team named after its two members
    pub fn pair(a: impl Into<EntrantId>, b: impl Into<EntrantId>) -> Self {
        let (a, b) = (a.into(), b.into());
        Self::new(format!("{a}+{b}"), vec![a, b])
    }

    pub fn with_origin(mut self, group_id: impl Into<GroupId>, position: u32) -> Self {
        self.origin = Some(QualifierOrigin {
            group_id: group_id.into(),
            position,
        });
        self
    }

    pub fn group_id(&self) -> Option<&str> {
        self.origin.as_ref().map(|o| o.group_id.as_str())
    }
}

/// One side of a confronto
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketEntry {
    pub id: QualifierId,
    pub members: Vec<EntrantId>,
    pub group_id: Option<GroupId>,
    /// "1st Group A", "Seed 3", "Winner R1-C2"
    pub origin_label: String,
}

impl BracketEntry {
    /// Entry for a seeded qualifier; `seed` is 1-indexed
    pub fn seeded(qualifier: &Qualifier, seed: usize) -> Self {
        let origin_label = match &qualifier.origin {
            Some(origin) => format!("{} Group {}", ordinal_suffix(origin.position), origin.group_id),
            None => format!("Seed {seed}"),
        };
        Self {
            id: qualifier.id.clone(),
            members: qualifier.members.clone(),
            group_id: qualifier.group_id().map(str::to_string),
            origin_label,
        }
    }

    fn as_pair(&self) -> StageResult<Pair> {
        match self.members.as_slice() {
            [a, b] => Ok([a.clone(), b.clone()]),
            _ => Err(StageError::NotAPair(self.id.clone())),
        }
    }
}

/// Lifecycle of a confronto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfrontoStatus {
    Scheduled,
    Bye,
    Finished,
}

/// One bracket slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confronto {
    /// 1-indexed position inside its round
    pub ordinal: usize,
    /// 1-indexed bracket round
    pub round: usize,
    pub side_a: BracketEntry,
    /// Absent for a bye
    pub side_b: Option<BracketEntry>,
    pub status: ConfrontoStatus,
    pub winner: Option<QualifierId>,
}

impl Confronto {
    pub fn scheduled(round: usize, ordinal: usize, side_a: BracketEntry, side_b: BracketEntry) -> Self {
        Self {
            ordinal,
            round,
            side_a,
            side_b: Some(side_b),
            status: ConfrontoStatus::Scheduled,
            winner: None,
        }
    }

    /// A bye advances `entry` without a match
    pub fn bye(round: usize, ordinal: usize, entry: BracketEntry) -> Self {
        let winner = Some(entry.id.clone());
        Self {
            ordinal,
            round,
            side_a: entry,
            side_b: None,
            status: ConfrontoStatus::Bye,
            winner,
        }
    }

    /// Fixture id used when the confronto is fed to the ledger
    pub fn fixture_id(&self) -> String {
        format!("R{}-C{}", self.round, self.ordinal)
    }

    pub fn is_resolved(&self) -> bool {
        self.winner.is_some()
    }

    pub fn entry(&self, side: Side) -> Option<&BracketEntry> {
        match side {
            Side::A => Some(&self.side_a),
            Side::B => self.side_b.as_ref(),
        }
    }

    pub fn winning_entry(&self) -> Option<&BracketEntry> {
        let winner = self.winner.as_ref()?;
        [Some(&self.side_a), self.side_b.as_ref()]
            .into_iter()
            .flatten()
            .find(|entry| &entry.id == winner)
    }

    /// Score a doubles confronto for the ledger
    ///
    /// # Errors
    ///
    /// * `StageError::ConfrontoNotPlayable` - the confronto is a bye
    /// * `StageError::NotAPair` - a side does not have exactly two members
    /// * `StageError::InvalidScore` - the set ended level
    pub fn match_result(&self, games_a: u32, games_b: u32) -> StageResult<MatchResult> {
        let side_b = self
            .side_b
            .as_ref()
            .ok_or(StageError::ConfrontoNotPlayable {
                round: self.round,
                ordinal: self.ordinal,
            })?;
        MatchResult::from_pairs(
            self.fixture_id(),
            self.side_a.as_pair()?,
            side_b.as_pair()?,
            games_a,
            games_b,
        )
    }
}

/// Bracket dimensions for a qualifier count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketPlan {
    pub qualifiers: usize,
    /// Next power of two at or above the qualifier count
    pub bracket_size: usize,
    pub byes: usize,
    pub real_matches: usize,
    /// First-round confrontos, byes included
    pub total_confrontos: usize,
    pub rounds: usize,
}

impl BracketPlan {
    /// # Errors
    ///
    /// * `StageError::InsufficientQualifiers` - fewer than two qualifiers
    pub fn for_qualifiers(qualifiers: usize) -> StageResult<Self> {
        if qualifiers < 2 {
            return Err(StageError::InsufficientQualifiers(qualifiers));
        }
        let bracket_size = qualifiers.next_power_of_two();
        let byes = bracket_size - qualifiers;
        Ok(Self {
            qualifiers,
            bracket_size,
            byes,
            real_matches: (qualifiers - byes) / 2,
            total_confrontos: bracket_size / 2,
            rounds: bracket_size.trailing_zeros() as usize,
        })
    }
}

/// "1st", "2nd", "3rd", "4th", ... "11th", "21st"
pub fn ordinal_suffix(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
