//! Statistics ledger.
//!
//! This module implements:
//! - Per-entrant counters kept per stage and per group
//! - Apply / revert / edit of single-set results as four deltas
//! - Rejection of double applies and of reverts without an apply
//! - Edit windows that close once a phase is final
//!
//! ## Example
//!
//! ```
//! use super_stage::ledger::{MatchResult, Scope, ScoringRules, StatsLedger};
//!
//! let ledger = StatsLedger::new(ScoringRules::default());
//! let scope = Scope::group("summer", "A");
//! for id in ["ana", "bia", "caio", "duda"] {
//!     ledger.admit(id, &scope);
//! }
//!
//! let result = MatchResult::from_pairs(
//!     "A-1".to_string(),
//!     ["ana".to_string(), "bia".to_string()],
//!     ["caio".to_string(), "duda".to_string()],
//!     6,
//!     3,
//! )
//! .unwrap();
//!
//! ledger.apply(&result, &scope).unwrap();
//! assert_eq!(ledger.record("ana", &scope).unwrap().tally.points, 3);
//!
//! ledger.revert("A-1", &scope).unwrap();
//! assert_eq!(ledger.record("ana", &scope).unwrap().tally.points, 0);
//! ```

pub mod manager;
pub mod models;

pub use manager::{BatchOutcome, EditOutcome, StatsLedger};
pub use models::{MatchResult, ScoringRules, Scope, StageId, StatDelta, StatRecord, Tally};
