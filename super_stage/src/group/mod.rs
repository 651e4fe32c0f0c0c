//! Group formation for grouped stages.
//!
//! Entrants are split into groups of four. At most one seeded entrant lands
//! in each group; everyone else is shuffled and dealt round-robin. Each group
//! carries its three partner-rotation fixtures from the start.
//!
//! ## Example
//!
//! ```
//! use super_stage::group::GroupFormer;
//! use super_stage::schedule::Entrant;
//! use super_stage::shuffle::RngShuffler;
//!
//! let entrants: Vec<Entrant> = (1..=8)
//!     .map(|i| Entrant::new(format!("p{i}"), format!("Player {i}")))
//!     .collect();
//!
//! let mut former = GroupFormer::new(RngShuffler::seeded(3));
//! let groups = former.form(&entrants, &["p1".to_string()], 4).unwrap();
//! assert_eq!(groups.len(), 2);
//! ```

pub mod former;
pub mod models;

pub use former::GroupFormer;
pub use models::{Group, GroupId, group_label};
