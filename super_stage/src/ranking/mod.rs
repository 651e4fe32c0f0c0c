//! Standings and qualification.
//!
//! Records are ordered by points, wins, game balance, games won and set
//! balance, in that order. Full ties keep their input order.

pub mod engine;

pub use engine::{
    AggregateStanding, StageStandings, aggregate_across_stages, compare_tallies, rank_global,
    rank_group, select_qualifiers,
};
