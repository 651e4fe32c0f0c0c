//! Single-elimination brackets.
//!
//! This module implements:
//! - Bracket sizing to the next power of two with byes for the top seeds
//! - Protected placement keeping the two strongest seeds apart until the final
//! - Three seeding strategies behind one `Seeding` trait
//! - Round-by-round progression up to a champion
//!
//! ## Example
//!
//! ```
//! use super_stage::bracket::{Bracket, ConfrontoStatus, Qualifier, SeedingStrategy};
//! use super_stage::shuffle::NoShuffle;
//!
//! let qualifiers: Vec<Qualifier> = (1..=5)
//!     .map(|i| Qualifier::pair(format!("p{i}"), format!("r{i}")))
//!     .collect();
//!
//! let bracket = Bracket::seed(&SeedingStrategy::default(), &qualifiers, &mut NoShuffle).unwrap();
//! let first = bracket.round(1).unwrap();
//! assert_eq!(first.len(), 4);
//! assert_eq!(first.iter().filter(|c| c.status == ConfrontoStatus::Bye).count(), 3);
//! ```

pub mod models;
pub mod progression;
pub mod seeder;
pub mod strategy;

pub use models::{
    BracketEntry, BracketPlan, Confronto, ConfrontoStatus, Qualifier, QualifierId, QualifierOrigin,
};
pub use progression::Bracket;
pub use seeder::standard_seed_order;
pub use strategy::{CrossRanked, RandomDraw, Seeding, SeedingStrategy, StrongestPaired};
