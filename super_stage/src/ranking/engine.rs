//! Standings: tie-break chain, group and global ranking, cross-stage totals.

use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    ledger::models::{StageId, StatRecord, Tally},
    schedule::models::EntrantId,
};

/// Tie-break chain, best first: points, wins, game balance, games won, set
/// balance. Equal tallies compare equal; callers sort stably so the input
/// order settles full ties.
pub fn compare_tallies(a: &Tally, b: &Tally) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| b.game_balance().cmp(&a.game_balance()))
        .then_with(|| b.games_won.cmp(&a.games_won))
        .then_with(|| b.set_balance().cmp(&a.set_balance()))
}

/// Records of one stage, as fed to cross-stage aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStandings {
    pub stage_id: StageId,
    /// `None` for stages created before the flag existed; those count
    pub counts_toward_ranking: Option<bool>,
    pub records: Vec<StatRecord>,
}

impl StageStandings {
    pub fn counts(&self) -> bool {
        self.counts_toward_ranking.unwrap_or(true)
    }
}

/// Summed standing of one entrant over several stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStanding {
    pub entrant_id: EntrantId,
    pub stages_counted: usize,
    pub tally: Tally,
    pub rank_position: Option<u32>,
}

/// Order a group, number positions from 1 and flag the top `qualify_count`
pub fn rank_group(mut stats: Vec<StatRecord>, qualify_count: usize) -> Vec<StatRecord> {
    stats.sort_by(|a, b| compare_tallies(&a.tally, &b.tally));
    for (idx, record) in stats.iter_mut().enumerate() {
        record.rank_position = Some(idx as u32 + 1);
        record.qualified = idx < qualify_count;
    }
    stats
}

/// Order stage-wide records; positions and flags are left as they are
pub fn rank_global(mut stats: Vec<StatRecord>) -> Vec<StatRecord> {
    stats.sort_by(|a, b| compare_tallies(&a.tally, &b.tally));
    stats
}

/// Sum each entrant's counters over every stage that counts toward the
/// ranking, then order the totals with the same tie-break chain.
pub fn aggregate_across_stages(stages: &[StageStandings]) -> Vec<AggregateStanding> {
    let mut totals: Vec<AggregateStanding> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let counting: Vec<&StageStandings> = stages.iter().filter(|s| s.counts()).collect();

    for stage in &counting {
        let mut seen_in_stage: Vec<&str> = Vec::new();
        for record in &stage.records {
            let slot = *index.entry(record.entrant_id.as_str()).or_insert_with(|| {
                totals.push(AggregateStanding {
                    entrant_id: record.entrant_id.clone(),
                    stages_counted: 0,
                    tally: Tally::default(),
                    rank_position: None,
                });
                totals.len() - 1
            });

            totals[slot].tally.add(&record.tally);
            if !seen_in_stage.contains(&record.entrant_id.as_str()) {
                seen_in_stage.push(record.entrant_id.as_str());
                totals[slot].stages_counted += 1;
            }
        }
    }

    totals.sort_by(|a, b| compare_tallies(&a.tally, &b.tally));
    for (idx, standing) in totals.iter_mut().enumerate() {
        standing.rank_position = Some(idx as u32 + 1);
    }

    log::debug!(
        "Aggregated {} entrants over {} counting stages",
        totals.len(),
        counting.len()
    );

    totals
}

/// Flatten ranked groups into bracket order.
///
/// All group winners come first, ordered among themselves by the tie-break
/// chain (group order settles full ties), then all runners-up, and so on.
/// Only records flagged `qualified` are taken.
pub fn select_qualifiers(ranked_groups: &[Vec<StatRecord>]) -> Vec<StatRecord> {
    let deepest = ranked_groups
        .iter()
        .flatten()
        .filter(|r| r.qualified)
        .filter_map(|r| r.rank_position)
        .max()
        .unwrap_or(0);

    let mut qualifiers = Vec::new();
    for position in 1..=deepest {
        let mut tier: Vec<StatRecord> = ranked_groups
            .iter()
            .flatten()
            .filter(|r| r.qualified && r.rank_position == Some(position))
            .cloned()
            .collect();
        tier.sort_by(|a, b| compare_tallies(&a.tally, &b.tally));
        qualifiers.extend(tier);
    }
    qualifiers
}
