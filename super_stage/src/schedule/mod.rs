//! Round-robin scheduling.
//!
//! - Fixed Super-8 / Super-12 tables where every entrant partners every
//!   other entrant once
//! - The three partner rotations of a four-member group
//!
//! ## Example
//!
//! ```
//! use super_stage::schedule::tables;
//!
//! let schedule = tables::schedule(8).unwrap();
//! assert_eq!(schedule.rounds.len(), 7);
//! assert!(tables::validate(8).unwrap().valid);
//! ```

pub mod models;
pub mod round_robin;
pub mod tables;

pub use models::{Entrant, EntrantId, Fixture, FixtureId, IndexFixture, Pair, Round, Schedule, Side};
pub use round_robin::{GROUP_SIZE, generate, generate_for_group};
pub use tables::{SUPPORTED_COHORTS, TableValidation, validate, validate_schedule};
