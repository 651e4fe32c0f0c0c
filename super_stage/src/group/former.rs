//! Seeded, randomized group formation.

use std::collections::HashSet;

use super::models::{Group, group_label};
use crate::{
    errors::{StageError, StageResult},
    schedule::{
        models::{Entrant, EntrantId},
        round_robin::{GROUP_SIZE, generate_for_group},
    },
    shuffle::{RngShuffler, Shuffler, shuffled},
};

/// Partitions confirmed entrants into groups of four
pub struct GroupFormer<S> {
    shuffler: S,
}

impl<S: Shuffler> GroupFormer<S> {
    /// Create a group former drawing permutations from `shuffler`
    pub fn new(shuffler: S) -> Self {
        Self { shuffler }
    }

    /// Form groups
    ///
    /// Seeds are spread one per group; everyone else is dealt round-robin
    /// over the groups after both pools are shuffled independently.
    ///
    /// # Arguments
    ///
    /// * `entrants` - Confirmed entrants
    /// * `seeded_ids` - Entrants that must land in different groups
    /// * `group_size` - Members per group (must be 4)
    ///
    /// # Returns
    ///
    /// * `StageResult<Vec<Group>>` - Full groups with their fixtures, or error
    ///
    /// # Errors
    ///
    /// * `StageError::InvalidGroupSize` - `group_size` is not 4
    /// * `StageError::ImbalancedCohort` - entrants do not fill whole groups
    /// * `StageError::DuplicateEntrant` - an entrant id repeats
    /// * `StageError::UnknownSeed` - a seeded id is not an entrant
    /// * `StageError::TooManySeeds` - more seeds than groups
    pub fn form(
        &mut self,
        entrants: &[Entrant],
        seeded_ids: &[EntrantId],
        group_size: usize,
    ) -> StageResult<Vec<Group>> {
        if group_size != GROUP_SIZE {
            return Err(StageError::InvalidGroupSize {
                group: "formation".to_string(),
                expected: GROUP_SIZE,
                actual: group_size,
            });
        }

        if entrants.is_empty() || entrants.len() % group_size != 0 {
            return Err(StageError::ImbalancedCohort {
                entrants: entrants.len(),
                group_size,
            });
        }

        let mut ids: HashSet<&str> = HashSet::with_capacity(entrants.len());
        for entrant in entrants {
            if !ids.insert(entrant.id.as_str()) {
                return Err(StageError::DuplicateEntrant(entrant.id.clone()));
            }
        }

        let mut seeds: HashSet<&str> = HashSet::with_capacity(seeded_ids.len());
        for id in seeded_ids {
            if !ids.contains(id.as_str()) {
                return Err(StageError::UnknownSeed(id.clone()));
            }
            seeds.insert(id.as_str());
        }

        let group_count = entrants.len() / group_size;
        if seeds.len() > group_count {
            return Err(StageError::TooManySeeds {
                seeds: seeds.len(),
                groups: group_count,
            });
        }

        let (seeded, unseeded): (Vec<EntrantId>, Vec<EntrantId>) = entrants
            .iter()
            .map(|e| e.id.clone())
            .partition(|id| seeds.contains(id.as_str()));

        let seeded = shuffled(&seeded, &mut self.shuffler);
        let unseeded = shuffled(&unseeded, &mut self.shuffler);

        let mut members: Vec<Vec<EntrantId>> = vec![Vec::with_capacity(group_size); group_count];
        for (slot, seed) in seeded.into_iter().enumerate() {
            members[slot].push(seed);
        }

        let mut cursor = 0;
        for entrant in unseeded {
            while members[cursor].len() >= group_size {
                cursor = (cursor + 1) % group_count;
            }
            members[cursor].push(entrant);
            cursor = (cursor + 1) % group_count;
        }

        let mut groups = Vec::with_capacity(group_count);
        for (idx, group_members) in members.into_iter().enumerate() {
            let id = group_label(idx);
            // Fails closed on a short group rather than dropping it
            let fixtures = generate_for_group(&id, &group_members)?;
            groups.push(Group {
                id,
                members: group_members,
                fixtures,
                complete: false,
            });
        }

        log::debug!(
            "Formed {} groups from {} entrants ({} seeded)",
            groups.len(),
            entrants.len(),
            seeds.len()
        );

        Ok(groups)
    }
}

impl Default for GroupFormer<RngShuffler<rand::rngs::ThreadRng>> {
    fn default() -> Self {
        Self::new(RngShuffler::thread())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shuffle::NoShuffle;

    fn entrants(n: usize) -> Vec<Entrant> {
        (1..=n)
            .map(|i| Entrant::new(format!("p{i}"), format!("Player {i}")))
            .collect()
    }

    fn ids(list: &[&str]) -> Vec<EntrantId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_deterministic_fill_order() {
        let mut former = GroupFormer::new(NoShuffle);
        let groups = former.form(&entrants(8), &ids(&["p5", "p2"]), 4).unwrap();

        assert_eq!(groups.len(), 2);
        // Seeds in input order, then unseeded dealt alternately
        assert_eq!(groups[0].members, ids(&["p2", "p1", "p4", "p7"]));
        assert_eq!(groups[1].members, ids(&["p5", "p3", "p6", "p8"]));
        assert_eq!(groups[1].id, "B");
        assert!(groups.iter().all(|g| g.fixtures.len() == 3 && !g.complete));
    }

    #[test]
    fn test_one_seed_per_group() {
        let seeds = ids(&["p1", "p2", "p3"]);
        for seed in 0..20 {
            let mut former = GroupFormer::new(RngShuffler::seeded(seed));
            let groups = former.form(&entrants(12), &seeds, 4).unwrap();
            for group in &groups {
                let count = group.members.iter().filter(|m| seeds.contains(m)).count();
                assert_eq!(count, 1);
            }
        }
    }

    #[test]
    fn test_imbalanced_cohort() {
        let mut former = GroupFormer::new(NoShuffle);
        assert_eq!(
            former.form(&entrants(10), &[], 4),
            Err(StageError::ImbalancedCohort {
                entrants: 10,
                group_size: 4
            })
        );
        assert!(matches!(
            former.form(&[], &[], 4),
            Err(StageError::ImbalancedCohort { entrants: 0, .. })
        ));
    }

    #[test]
    fn test_too_many_seeds() {
        let mut former = GroupFormer::new(NoShuffle);
        let err = former
            .form(&entrants(8), &ids(&["p1", "p2", "p3"]), 4)
            .unwrap_err();
        assert_eq!(err, StageError::TooManySeeds { seeds: 3, groups: 2 });
    }

    #[test]
    fn test_unknown_seed_and_duplicates() {
        let mut former = GroupFormer::new(NoShuffle);
        assert_eq!(
            former.form(&entrants(8), &ids(&["ghost"]), 4),
            Err(StageError::UnknownSeed("ghost".to_string()))
        );

        let mut list = entrants(7);
        list.push(Entrant::new("p3", "Copy"));
        assert_eq!(
            former.form(&list, &[], 4),
            Err(StageError::DuplicateEntrant("p3".to_string()))
        );
    }

    #[test]
    fn test_group_size_must_be_four() {
        let mut former = GroupFormer::new(NoShuffle);
        assert!(matches!(
            former.form(&entrants(9), &[], 3),
            Err(StageError::InvalidGroupSize { actual: 3, .. })
        ));
    }
}
