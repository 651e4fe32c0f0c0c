//! # Super Stage
//!
//! A tournament engine for amateur doubles racquet sports, built around
//! stages where players rotate partners inside small round-robin cohorts.
//!
//! The engine consumes plain data (confirmed entrants, match scores) and
//! emits plain data (schedules, groups, bracket pairings, stat deltas).
//! Persistence and transport belong to the caller.
//!
//! ## Formats
//!
//! - **Super-8 / Super-12**: fixed tables where every player partners every
//!   other player exactly once
//! - **Grouped**: seeded groups of four playing the three partner rotations,
//!   followed by a single-elimination bracket
//!
//! ## Core Modules
//!
//! - [`schedule`]: Super-X tables and group rotations
//! - [`group`]: Seeded group formation
//! - [`bracket`]: Bracket sizing, seeding strategies and progression
//! - [`ledger`]: Reversible statistics ledger with atomic counters
//! - [`ranking`]: Tie-break chain, standings and qualifier selection
//! - [`stage`]: Wiring a configuration to fixtures and scopes
//!
//! ## Example
//!
//! ```
//! use super_stage::{StageConfig, StatsLedger, plan_stage};
//! use super_stage::schedule::Entrant;
//! use super_stage::shuffle::NoShuffle;
//!
//! let entrants: Vec<Entrant> = (1..=8)
//!     .map(|i| Entrant::new(format!("p{i}"), format!("Player {i}")))
//!     .collect();
//!
//! let config = StageConfig::default();
//! let plan = plan_stage(&config, &entrants, &mut NoShuffle).unwrap();
//! assert_eq!(plan.fixtures.len(), 14);
//!
//! let ledger = StatsLedger::new(config.scoring);
//! plan.admit_all(&ledger);
//! let (result, scope) = plan.result_for("R1-F1", 6, 4).unwrap();
//! ledger.apply(&result, &scope).unwrap();
//! ```

/// Elimination brackets: sizing, strategies, progression.
pub mod bracket;
pub use bracket::{Bracket, Confronto, ConfrontoStatus, Qualifier, Seeding, SeedingStrategy};

/// Stage configuration loaded from the environment.
pub mod config;
pub use config::{ConfigError, StageConfig, StageFormat};

pub mod errors;
pub use errors::{StageError, StageResult};

pub mod group;
pub use group::{Group, GroupFormer};

/// Reversible statistics ledger.
pub mod ledger;
pub use ledger::{MatchResult, ScoringRules, Scope, StatRecord, StatsLedger, Tally};

pub mod ranking;

/// Fixed tables and round-robin rotations.
pub mod schedule;
pub use schedule::{Entrant, Fixture, Schedule};

pub mod shuffle;

pub mod stage;
pub use stage::{StagePlan, plan_stage, team_up};
