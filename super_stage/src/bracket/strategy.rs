//! Seeding strategies.
//!
//! The set of strategies is closed; dispatch goes through `enum_dispatch` so
//! a configured [`SeedingStrategy`] seeds without boxing.

use std::{fmt, str::FromStr};

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{
    bracket::{
        models::{Confronto, Qualifier},
        seeder::{self, SlotDraw},
    },
    errors::StageResult,
    shuffle::Shuffler,
};

/// Turn ranked qualifiers into the first bracket round
#[enum_dispatch]
pub trait Seeding {
    /// # Errors
    ///
    /// * `StageError::InsufficientQualifiers` - fewer than two qualifiers
    /// * `StageError::DuplicateEntrant` - a qualifier id occurs twice
    fn seed(&self, qualifiers: &[Qualifier], shuffler: &mut dyn Shuffler) -> StageResult<Vec<Confronto>>;
}

/// Protected placement on the given rank order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrongestPaired;

impl Seeding for StrongestPaired {
    fn seed(&self, qualifiers: &[Qualifier], _shuffler: &mut dyn Shuffler) -> StageResult<Vec<Confronto>> {
        seeder::seed(qualifiers)
    }
}

/// Group winners ahead of runners-up; first-round rematches from the same
/// group are swapped away, inside the same half when possible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrossRanked;

impl CrossRanked {
    fn reorder(qualifiers: &[Qualifier]) -> Vec<Qualifier> {
        let mut ordered = qualifiers.to_vec();
        ordered.sort_by_key(|q| q.origin.as_ref().map_or(u32::MAX, |o| o.position));
        ordered
    }

    fn same_group(qualifiers: &[Qualifier], a: usize, b: usize) -> bool {
        match (qualifiers[a].group_id(), qualifiers[b].group_id()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    fn clashes(qualifiers: &[Qualifier], slot: &SlotDraw) -> bool {
        slot.side_b
            .is_some_and(|b| Self::same_group(qualifiers, slot.side_a, b))
    }

    fn swap_clears(qualifiers: &[Qualifier], slots: &[SlotDraw], idx: usize, other: usize) -> bool {
        if other == idx {
            return false;
        }
        let (Some(mine), Some(theirs)) = (slots[idx].side_b, slots[other].side_b) else {
            return false;
        };
        !Self::same_group(qualifiers, slots[idx].side_a, theirs)
            && !Self::same_group(qualifiers, slots[other].side_a, mine)
    }

    /// Swap the weaker side of each clashing match with another real match,
    /// preferring the same half of the bracket
    fn repair(qualifiers: &[Qualifier], slots: &mut [SlotDraw]) {
        let half = slots.len().div_ceil(2);
        for idx in 0..slots.len() {
            if !Self::clashes(qualifiers, &slots[idx]) {
                continue;
            }
            let (same_half, other_half) = if idx < half {
                (0..half, half..slots.len())
            } else {
                (half..slots.len(), 0..half)
            };
            let partner = same_half
                .chain(other_half)
                .find(|&other| Self::swap_clears(qualifiers, slots, idx, other));

            match partner {
                Some(other) => {
                    let mine = slots[idx].side_b;
                    slots[idx].side_b = slots[other].side_b;
                    slots[other].side_b = mine;
                }
                None => log::warn!("No swap clears the group rematch in slot {}", idx + 1),
            }
        }
    }
}

impl Seeding for CrossRanked {
    fn seed(&self, qualifiers: &[Qualifier], _shuffler: &mut dyn Shuffler) -> StageResult<Vec<Confronto>> {
        let plan = seeder::plan(qualifiers)?;
        let ordered = Self::reorder(qualifiers);
        let mut slots = seeder::protected_slots(&plan);
        Self::repair(&ordered, &mut slots);
        Ok(seeder::build_round(&ordered, &slots))
    }
}

/// Byes to the top seeds, everyone else drawn at random
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomDraw;

impl Seeding for RandomDraw {
    fn seed(&self, qualifiers: &[Qualifier], shuffler: &mut dyn Shuffler) -> StageResult<Vec<Confronto>> {
        let plan = seeder::plan(qualifiers)?;
        let mut slots = seeder::protected_slots(&plan);

        let pool: Vec<usize> = (plan.byes..plan.qualifiers).collect();
        let mut drawn = shuffler.permutation(pool.len()).into_iter().map(|i| pool[i]);
        for slot in slots.iter_mut().filter(|s| s.side_b.is_some()) {
            if let (Some(a), Some(b)) = (drawn.next(), drawn.next()) {
                slot.side_a = a;
                slot.side_b = Some(b);
            }
        }

        Ok(seeder::build_round(qualifiers, &slots))
    }
}

/// Configured seeding strategy
#[enum_dispatch(Seeding)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedingStrategy {
    StrongestPaired,
    CrossRanked,
    RandomDraw,
}

impl Default for SeedingStrategy {
    fn default() -> Self {
        StrongestPaired.into()
    }
}

impl fmt::Display for SeedingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::StrongestPaired(_) => "strongest-paired",
            Self::CrossRanked(_) => "cross-ranked",
            Self::RandomDraw(_) => "random-draw",
        };
        write!(f, "{repr}")
    }
}

impl FromStr for SeedingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "strongest-paired" => Ok(StrongestPaired.into()),
            "cross-ranked" => Ok(CrossRanked.into()),
            "random-draw" => Ok(RandomDraw.into()),
            other => Err(format!(
                "unknown seeding strategy '{other}' (expected strongest-paired, cross-ranked or random-draw)"
            )),
        }
    }
}

impl Serialize for SeedingStrategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SeedingStrategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
