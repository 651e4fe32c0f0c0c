//! Bracket sizing and protected placement.
//!
//! Slots follow the classic seed-position order: seed `s` shares its
//! first-round slot with seed `P + 1 - s`. When that partner seed does not
//! exist the slot is a bye. Top seeds therefore take the byes, the best
//! remaining seed meets the weakest remaining one, and seeds 1 and 2 sit in
//! opposite halves so they can only meet in the final.

use std::collections::HashSet;

use crate::{
    bracket::models::{BracketEntry, BracketPlan, Confronto, Qualifier},
    errors::{StageError, StageResult},
};

/// A first-round slot as 0-indexed positions in the qualifier slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDraw {
    pub side_a: usize,
    /// `None` marks a bye
    pub side_b: Option<usize>,
}

/// Seed numbers (1-indexed) in bracket-position order for a power of two
///
/// `[1, 2]` doubles to `[1, 4, 2, 3]`, then `[1, 8, 4, 5, 2, 7, 3, 6]`, ...
pub fn standard_seed_order(bracket_size: usize) -> Vec<usize> {
    let mut order = vec![1];
    let mut size = 1;
    while size < bracket_size {
        size *= 2;
        order = order
            .into_iter()
            .flat_map(|seed| [seed, size + 1 - seed])
            .collect();
    }
    order
}

/// Size the bracket and reject unusable qualifier lists
///
/// # Errors
///
/// * `StageError::InsufficientQualifiers` - fewer than two qualifiers
/// * `StageError::DuplicateEntrant` - a qualifier id occurs twice
pub fn plan(qualifiers: &[Qualifier]) -> StageResult<BracketPlan> {
    let plan = BracketPlan::for_qualifiers(qualifiers.len())?;
    let mut seen = HashSet::with_capacity(qualifiers.len());
    for qualifier in qualifiers {
        if !seen.insert(qualifier.id.as_str()) {
            return Err(StageError::DuplicateEntrant(qualifier.id.clone()));
        }
    }
    Ok(plan)
}

/// First-round slots for `plan`, in ordinal order
pub fn protected_slots(plan: &BracketPlan) -> Vec<SlotDraw> {
    standard_seed_order(plan.bracket_size)
        .chunks_exact(2)
        .map(|chunk| {
            let (top, bottom) = (chunk[0].min(chunk[1]), chunk[0].max(chunk[1]));
            SlotDraw {
                side_a: top - 1,
                side_b: (bottom <= plan.qualifiers).then(|| bottom - 1),
            }
        })
        .collect()
}

/// Build round-one confrontos from slot draws over `qualifiers`
pub fn build_round(qualifiers: &[Qualifier], slots: &[SlotDraw]) -> Vec<Confronto> {
    slots
        .iter()
        .enumerate()
        .map(|(idx, slot)| {
            let ordinal = idx + 1;
            let side_a = BracketEntry::seeded(&qualifiers[slot.side_a], slot.side_a + 1);
            match slot.side_b {
                Some(b) => Confronto::scheduled(1, ordinal, side_a, BracketEntry::seeded(&qualifiers[b], b + 1)),
                None => Confronto::bye(1, ordinal, side_a),
            }
        })
        .collect()
}

/// Seed `qualifiers` (strongest first) into the first bracket round
///
/// # Errors
///
/// * `StageError::InsufficientQualifiers` - fewer than two qualifiers
/// * `StageError::DuplicateEntrant` - a qualifier id occurs twice
pub fn seed(qualifiers: &[Qualifier]) -> StageResult<Vec<Confronto>> {
    let plan = plan(qualifiers)?;
    let confrontos = build_round(qualifiers, &protected_slots(&plan));

    log::debug!(
        "Seeded {} qualifiers into a bracket of {} ({} byes, {} matches)",
        plan.qualifiers,
        plan.bracket_size,
        plan.byes,
        plan.real_matches
    );

    Ok(confrontos)
}
