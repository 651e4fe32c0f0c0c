//! Engine error types.

use thiserror::Error;

use crate::{
    bracket::models::QualifierId,
    group::models::GroupId,
    ledger::models::Scope,
    schedule::models::{EntrantId, FixtureId},
};

/// Validation failures raised by the stage engine.
///
/// Every variant is recoverable by the calling workflow and names the
/// group, fixture, entrant or scope at fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// Super-X tables exist only for 8 and 12 entrants
    #[error("Unsupported cohort size {0}: Super-X tables exist for 8 or 12 entrants")]
    UnsupportedCohortSize(usize),

    /// A round-robin group must have exactly four members
    #[error("Invalid group size for {group}: expected {expected}, got {actual}")]
    InvalidGroupSize {
        group: String,
        expected: usize,
        actual: usize,
    },

    /// At most one seed per group
    #[error("Too many seeds: {seeds} seeded entrants for {groups} groups")]
    TooManySeeds { seeds: usize, groups: usize },

    /// Entrants cannot be split into full groups
    #[error("Imbalanced cohort: {entrants} entrants cannot fill groups of {group_size}")]
    ImbalancedCohort { entrants: usize, group_size: usize },

    /// Confirmed entrants differ from the configured cohort
    #[error("Cohort mismatch: configured for {expected} entrants, got {actual}")]
    CohortMismatch { expected: usize, actual: usize },

    /// A schedule references an index past the cohort
    #[error("Schedule round {round} references entrant index {index} outside 0..{cohort_size}")]
    TableIndexOutOfRange {
        round: usize,
        index: usize,
        cohort_size: usize,
    },

    /// A bracket needs at least two qualifiers
    #[error("Insufficient qualifiers: need at least 2, have {0}")]
    InsufficientQualifiers(usize),

    /// The scope or bracket round has moved past the point of no return
    #[error("Edit window closed for {0}")]
    EditWindowClosed(String),

    /// Reversal of a fixture that was never applied in this scope
    #[error("Cannot revert fixture {fixture} in {scope}: no applied result")]
    RevertWithoutApply { fixture: FixtureId, scope: Scope },

    /// The same fixture was applied twice in one scope
    #[error("Fixture {fixture} already applied in {scope}")]
    AlreadyApplied { fixture: FixtureId, scope: Scope },

    /// An entrant id occurs more than once
    #[error("Duplicate entrant: {0}")]
    DuplicateEntrant(EntrantId),

    /// A seeded id is not part of the entrant list
    #[error("Seeded entrant {0} is not a confirmed entrant")]
    UnknownSeed(EntrantId),

    /// Single-set matches cannot end level
    #[error("Invalid score for fixture {fixture}: {games_a}-{games_b}")]
    InvalidScore {
        fixture: FixtureId,
        games_a: u32,
        games_b: u32,
    },

    /// The entrant has no stat record in the scope
    #[error("Entrant {entrant} is not admitted to {scope}")]
    NotAdmitted { entrant: EntrantId, scope: Scope },

    /// No confronto at the given round/ordinal
    #[error("Unknown confronto {ordinal} in round {round}")]
    UnknownConfronto { round: usize, ordinal: usize },

    /// Byes cannot receive results
    #[error("Confronto {ordinal} in round {round} is a bye")]
    ConfrontoNotPlayable { round: usize, ordinal: usize },

    /// The next bracket round needs every confronto resolved
    #[error("Round {round} still has {pending} unresolved confrontos")]
    RoundIncomplete { round: usize, pending: usize },

    /// Doubles fixtures need two members per side
    #[error("Qualifier {0} is not a doubles pair")]
    NotAPair(QualifierId),

    /// A fixture reference does not resolve
    #[error("Unknown fixture {0}")]
    UnknownFixture(FixtureId),

    /// Group not present in the stage
    #[error("Unknown group {0}")]
    UnknownGroup(GroupId),
}

/// Result type for engine operations
pub type StageResult<T> = Result<T, StageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_fault() {
        let err = StageError::InvalidGroupSize {
            group: "B".to_string(),
            expected: 4,
            actual: 3,
        };
        assert!(err.to_string().contains('B'));

        let err = StageError::RevertWithoutApply {
            fixture: "A-2".to_string(),
            scope: Scope::group("spring", "A"),
        };
        let msg = err.to_string();
        assert!(msg.contains("A-2"));
        assert!(msg.contains("spring"));
    }
}
