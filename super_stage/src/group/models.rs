//! Group data models.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::schedule::models::{EntrantId, Fixture, FixtureId};

/// Group identifier (letter label)
pub type GroupId = String;

/// A four-member round-robin group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    /// Members in placement order (seed first when seeded)
    pub members: Vec<EntrantId>,
    /// The three partner rotations
    pub fixtures: Vec<Fixture>,
    /// True once every fixture is finalized
    pub complete: bool,
}

impl Group {
    /// Recompute `complete` from the set of finalized fixture ids
    pub fn refresh_complete(&mut self, finished: &HashSet<FixtureId>) -> bool {
        self.complete = self.fixtures.iter().all(|f| finished.contains(&f.id));
        self.complete
    }

    pub fn contains(&self, entrant: &str) -> bool {
        self.members.iter().any(|m| m == entrant)
    }
}

/// Spreadsheet-style label for the group at `index`: A..Z, AA, AB, ...
pub fn group_label(index: usize) -> GroupId {
    let mut n = index + 1;
    let mut label = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        label.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}
