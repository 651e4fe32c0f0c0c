//! Stage planning: from a configuration and confirmed entrants to fixtures,
//! ledger scopes and bracket qualifiers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    bracket::models::Qualifier,
    config::{StageConfig, StageFormat},
    errors::{StageError, StageResult},
    group::{former::GroupFormer, models::Group},
    ledger::{
        manager::StatsLedger,
        models::{MatchResult, Scope, StageId, StatRecord},
    },
    ranking::engine::{rank_global, rank_group, select_qualifiers},
    schedule::{
        models::{Entrant, EntrantId, Fixture, FixtureId},
        tables,
    },
    shuffle::{Shuffler, shuffled},
};

/// Everything generated for one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePlan {
    pub stage_id: StageId,
    pub format: StageFormat,
    /// Entrants in table-index order (Super-X) or input order (grouped)
    pub entrants: Vec<EntrantId>,
    /// Empty for Super-X stages
    pub groups: Vec<Group>,
    /// Every fixture of the stage, in play order
    pub fixtures: Vec<Fixture>,
}

/// Generate the fixtures of a stage
///
/// Super-X stages draw the entrants onto table indices through `shuffler`;
/// grouped stages form seeded groups with the same shuffler.
///
/// # Errors
///
/// * `StageError::UnsupportedCohortSize` - a Super-X stage without 8 or 12 entrants
/// * `StageError::CohortMismatch` - entrants do not match the configured cohort size
/// * `StageError::DuplicateEntrant` - an entrant id repeats
/// * any group formation error for grouped stages
pub fn plan_stage(
    config: &StageConfig,
    entrants: &[Entrant],
    shuffler: &mut dyn Shuffler,
) -> StageResult<StagePlan> {
    if let Some(required) = config.format.fixed_cohort() {
        if entrants.len() != required {
            return Err(StageError::UnsupportedCohortSize(entrants.len()));
        }
    }

    if entrants.len() != config.cohort_size {
        return Err(StageError::CohortMismatch {
            expected: config.cohort_size,
            actual: entrants.len(),
        });
    }

    let mut seen = HashSet::with_capacity(entrants.len());
    for entrant in entrants {
        if !seen.insert(entrant.id.as_str()) {
            return Err(StageError::DuplicateEntrant(entrant.id.clone()));
        }
    }

    let plan = match config.format {
        StageFormat::SuperEight | StageFormat::SuperTwelve => {
            let schedule = tables::schedule(entrants.len())?;
            let ids: Vec<EntrantId> = entrants.iter().map(|e| e.id.clone()).collect();
            let drawn = shuffled(&ids, shuffler);
            let fixtures = schedule.resolve(&drawn)?;
            StagePlan {
                stage_id: config.stage_id.clone(),
                format: config.format,
                entrants: drawn,
                groups: Vec::new(),
                fixtures,
            }
        }
        StageFormat::Grouped => {
            let mut former = GroupFormer::new(shuffler);
            let groups = former.form(entrants, &config.seeded_ids, config.group_size)?;
            let fixtures = groups.iter().flat_map(|g| g.fixtures.iter().cloned()).collect();
            StagePlan {
                stage_id: config.stage_id.clone(),
                format: config.format,
                entrants: entrants.iter().map(|e| e.id.clone()).collect(),
                groups,
                fixtures,
            }
        }
    };

    log::info!(
        "Planned {} stage {} with {} entrants and {} fixtures",
        plan.format,
        plan.stage_id,
        plan.entrants.len(),
        plan.fixtures.len()
    );

    Ok(plan)
}

impl StagePlan {
    pub fn stage_scope(&self) -> Scope {
        Scope::stage(self.stage_id.clone())
    }

    pub fn group_scope(&self, group_id: &str) -> StageResult<Scope> {
        let group = self.group(group_id)?;
        Ok(Scope::group(self.stage_id.clone(), group.id.clone()))
    }

    pub fn fixture(&self, fixture_id: &str) -> StageResult<&Fixture> {
        self.fixtures
            .iter()
            .find(|f| f.id == fixture_id)
            .ok_or_else(|| StageError::UnknownFixture(fixture_id.to_string()))
    }

    pub fn group(&self, group_id: &str) -> StageResult<&Group> {
        self.groups
            .iter()
            .find(|g| g.id == group_id)
            .ok_or_else(|| StageError::UnknownGroup(group_id.to_string()))
    }

    /// Ledger scope a fixture's result counts in
    pub fn scope_of(&self, fixture: &Fixture) -> Scope {
        match &fixture.group_id {
            Some(group_id) => Scope::group(self.stage_id.clone(), group_id.clone()),
            None => self.stage_scope(),
        }
    }

    /// Create zeroed records for every entrant in every scope it plays in
    ///
    /// Grouped stages admit members to their group and everyone to the
    /// stage scope, where bracket results are booked.
    pub fn admit_all(&self, ledger: &StatsLedger) {
        ledger.admit_all(&self.entrants, &self.stage_scope());
        for group in &self.groups {
            let scope = Scope::group(self.stage_id.clone(), group.id.clone());
            ledger.admit_all(&group.members, &scope);
        }
    }

    /// Score a fixture and pick its scope
    ///
    /// # Errors
    ///
    /// * `StageError::UnknownFixture` - no fixture with that id
    /// * `StageError::InvalidScore` - the set ended level
    pub fn result_for(&self, fixture_id: &str, games_a: u32, games_b: u32) -> StageResult<(MatchResult, Scope)> {
        let fixture = self.fixture(fixture_id)?;
        let result = MatchResult::new(fixture, games_a, games_b)?;
        Ok((result, self.scope_of(fixture)))
    }

    /// Recompute group completion; true once every group is complete
    pub fn refresh_groups(&mut self, finished: &HashSet<FixtureId>) -> bool {
        self.groups
            .iter_mut()
            .fold(true, |all, group| group.refresh_complete(finished) && all)
    }

    /// Ranked records of every group, in group order
    pub fn group_standings(&self, ledger: &StatsLedger, qualify_count: usize) -> Vec<Vec<StatRecord>> {
        self.groups
            .iter()
            .map(|group| {
                let scope = Scope::group(self.stage_id.clone(), group.id.clone());
                rank_group(ledger.snapshot(&scope), qualify_count)
            })
            .collect()
    }

    /// Ranked records of the stage scope
    pub fn stage_standings(&self, ledger: &StatsLedger) -> Vec<StatRecord> {
        rank_global(ledger.snapshot(&self.stage_scope()))
    }

    /// Close group play and list the qualified entrants, strongest first
    ///
    /// Group scopes are closed in the ledger so group results can no longer
    /// be edited once the bracket is built from them.
    ///
    /// # Errors
    ///
    /// * `StageError::InsufficientQualifiers` - fewer than two entrants qualify
    pub fn close_groups(&self, ledger: &StatsLedger, qualify_count: usize) -> StageResult<Vec<Qualifier>> {
        let standings = self.group_standings(ledger, qualify_count);
        let selected = select_qualifiers(&standings);
        if selected.len() < 2 {
            return Err(StageError::InsufficientQualifiers(selected.len()));
        }

        for group in &self.groups {
            ledger.close_scope(&Scope::group(self.stage_id.clone(), group.id.clone()));
        }

        Ok(selected
            .into_iter()
            .map(|record| {
                let qualifier = Qualifier::new(record.entrant_id.clone(), vec![record.entrant_id.clone()]);
                match (record.scope.group_id(), record.rank_position) {
                    (Some(group_id), Some(position)) => qualifier.with_origin(group_id, position),
                    _ => qualifier,
                }
            })
            .collect())
    }
}

/// Combine ranked individual qualifiers into doubles teams
///
/// The strongest remaining qualifier partners the weakest remaining one, so
/// team strength stays level. A team keeps the stronger member's origin.
///
/// # Errors
///
/// * `StageError::NotAPair` - an odd qualifier count leaves the middle one alone
/// * `StageError::InsufficientQualifiers` - fewer than four qualifiers
pub fn team_up(individuals: &[Qualifier]) -> StageResult<Vec<Qualifier>> {
    if individuals.len() < 4 {
        return Err(StageError::InsufficientQualifiers(individuals.len() / 2));
    }
    if individuals.len() % 2 == 1 {
        let middle = &individuals[individuals.len() / 2];
        return Err(StageError::NotAPair(middle.id.clone()));
    }

    let half = individuals.len() / 2;
    let teams = (0..half)
        .map(|idx| {
            let strong = &individuals[idx];
            let weak = &individuals[individuals.len() - 1 - idx];
            let members: Vec<EntrantId> = strong.members.iter().chain(&weak.members).cloned().collect();
            Qualifier {
                id: format!("{}+{}", strong.id, weak.id),
                members,
                origin: strong.origin.clone(),
            }
        })
        .collect();

    Ok(teams)
}
