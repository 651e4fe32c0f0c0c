//! Stats ledger with per-entrant atomic counters.
//!
//! Results are folded in as commutative increments, so batches touching
//! different fixtures can be dispatched from many tasks at once without
//! losing updates. The ledger remembers what it applied per fixture and
//! scope; a revert replays the exact negation of that delta.

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    sync::{
        Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicI64, Ordering},
    },
};

use super::models::{MatchResult, ScoringRules, Scope, StatDelta, StatRecord, Tally};
use crate::{
    errors::{StageError, StageResult},
    schedule::models::{EntrantId, FixtureId},
};

/// Atomic counters for one entrant in one scope
#[derive(Debug, Default)]
struct Counters {
    matches_played: AtomicI64,
    wins: AtomicI64,
    losses: AtomicI64,
    points: AtomicI64,
    sets_won: AtomicI64,
    sets_lost: AtomicI64,
    games_won: AtomicI64,
    games_lost: AtomicI64,
}

impl Counters {
    fn add(&self, delta: &Tally) {
        self.matches_played
            .fetch_add(delta.matches_played, Ordering::Relaxed);
        self.wins.fetch_add(delta.wins, Ordering::Relaxed);
        self.losses.fetch_add(delta.losses, Ordering::Relaxed);
        self.points.fetch_add(delta.points, Ordering::Relaxed);
        self.sets_won.fetch_add(delta.sets_won, Ordering::Relaxed);
        self.sets_lost.fetch_add(delta.sets_lost, Ordering::Relaxed);
        self.games_won.fetch_add(delta.games_won, Ordering::Relaxed);
        self.games_lost.fetch_add(delta.games_lost, Ordering::Relaxed);
    }

    fn load(&self) -> Tally {
        Tally {
            matches_played: self.matches_played.load(Ordering::Relaxed),
            wins: self.wins.load(Ordering::Relaxed),
            losses: self.losses.load(Ordering::Relaxed),
            points: self.points.load(Ordering::Relaxed),
            sets_won: self.sets_won.load(Ordering::Relaxed),
            sets_lost: self.sets_lost.load(Ordering::Relaxed),
            games_won: self.games_won.load(Ordering::Relaxed),
            games_lost: self.games_lost.load(Ordering::Relaxed),
        }
    }
}

/// Records of one scope, in admission order
#[derive(Debug, Default)]
struct ScopeRecords {
    counters: HashMap<EntrantId, Arc<Counters>>,
    order: Vec<EntrantId>,
}

/// Outcome of a batch apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Every delta applied, in batch order
    pub deltas: Vec<StatDelta>,
    /// Scopes whose standings need one recompute
    pub affected_scopes: BTreeSet<Scope>,
}

/// Outcome of re-scoring a fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub reverted: Vec<StatDelta>,
    pub applied: Vec<StatDelta>,
}

/// Reversible statistics ledger
#[derive(Debug, Default)]
pub struct StatsLedger {
    rules: ScoringRules,
    records: RwLock<HashMap<Scope, ScopeRecords>>,
    applied: Mutex<HashMap<(Scope, FixtureId), Vec<StatDelta>>>,
    closed: RwLock<HashSet<Scope>>,
    closed_fixtures: RwLock<HashSet<(Scope, FixtureId)>>,
}

impl StatsLedger {
    /// Create a ledger with the given scoring rules
    pub fn new(rules: ScoringRules) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Admit an entrant to a scope with zeroed counters
    ///
    /// # Returns
    ///
    /// * `bool` - false if the entrant was already admitted
    pub fn admit(&self, entrant: &str, scope: &Scope) -> bool {
        let mut records = self.records_mut();
        let scope_records = records.entry(scope.clone()).or_default();
        if scope_records.counters.contains_key(entrant) {
            return false;
        }
        scope_records
            .counters
            .insert(entrant.to_string(), Arc::new(Counters::default()));
        scope_records.order.push(entrant.to_string());
        true
    }

    /// Admit every entrant in order
    pub fn admit_all<'a>(&self, entrants: impl IntoIterator<Item = &'a EntrantId>, scope: &Scope) {
        for entrant in entrants {
            self.admit(entrant, scope);
        }
    }

    /// Apply a result
    ///
    /// # Returns
    ///
    /// * `StageResult<Vec<StatDelta>>` - The four deltas applied
    ///
    /// # Errors
    ///
    /// * `StageError::EditWindowClosed` - scope or fixture is closed
    /// * `StageError::NotAdmitted` - a player has no record in the scope
    /// * `StageError::DuplicateEntrant` - a player appears twice in the fixture
    /// * `StageError::AlreadyApplied` - the fixture already counts in the scope
    pub fn apply(&self, result: &MatchResult, scope: &Scope) -> StageResult<Vec<StatDelta>> {
        self.ensure_open(&result.fixture_id, scope)?;
        let deltas = result.deltas(scope, &self.rules);
        let counters = self.resolve(&deltas, scope)?;

        {
            let mut applied = self.applied();
            let key = (scope.clone(), result.fixture_id.clone());
            if applied.contains_key(&key) {
                return Err(StageError::AlreadyApplied {
                    fixture: result.fixture_id.clone(),
                    scope: scope.clone(),
                });
            }
            applied.insert(key, deltas.clone());
        }

        for (counter, delta) in counters.iter().zip(&deltas) {
            counter.add(&delta.changes);
        }

        log::debug!(
            "Applied {} {}-{} in {}",
            result.fixture_id,
            result.games_a,
            result.games_b,
            scope
        );

        Ok(deltas)
    }

    /// Revert a previously applied fixture
    ///
    /// # Returns
    ///
    /// * `StageResult<Vec<StatDelta>>` - The negated deltas
    ///
    /// # Errors
    ///
    /// * `StageError::EditWindowClosed` - scope or fixture is closed
    /// * `StageError::RevertWithoutApply` - nothing applied for this fixture
    pub fn revert(&self, fixture_id: &str, scope: &Scope) -> StageResult<Vec<StatDelta>> {
        self.ensure_open(fixture_id, scope)?;

        let (counters, reversal) = {
            let mut applied = self.applied();
            let key = (scope.clone(), fixture_id.to_string());
            let Some(previous) = applied.get(&key) else {
                return Err(StageError::RevertWithoutApply {
                    fixture: fixture_id.to_string(),
                    scope: scope.clone(),
                });
            };
            let reversal: Vec<StatDelta> = previous.iter().map(StatDelta::negated).collect();
            let counters = self.resolve(&reversal, scope)?;
            applied.remove(&key);
            (counters, reversal)
        };

        for (counter, delta) in counters.iter().zip(&reversal) {
            counter.add(&delta.changes);
        }

        log::debug!("Reverted {} in {}", fixture_id, scope);

        Ok(reversal)
    }

    /// Re-score a finished fixture: revert the stored delta, apply the new one
    ///
    /// Everything is validated before the revert so a rejected edit leaves
    /// the old result in place.
    pub fn edit(&self, result: &MatchResult, scope: &Scope) -> StageResult<EditOutcome> {
        self.ensure_open(&result.fixture_id, scope)?;
        if !self.is_applied(&result.fixture_id, scope) {
            return Err(StageError::RevertWithoutApply {
                fixture: result.fixture_id.clone(),
                scope: scope.clone(),
            });
        }
        self.resolve(&result.deltas(scope, &self.rules), scope)?;

        let reverted = self.revert(&result.fixture_id, scope)?;
        let applied = self.apply(result, scope)?;
        Ok(EditOutcome { reverted, applied })
    }

    /// Apply several results, validating the whole batch first
    ///
    /// Standings should be recomputed once per scope in
    /// `affected_scopes`, after the batch returns.
    pub fn apply_batch(&self, batch: &[(MatchResult, Scope)]) -> StageResult<BatchOutcome> {
        let mut seen: HashSet<(&Scope, &str)> = HashSet::with_capacity(batch.len());
        for (result, scope) in batch {
            self.ensure_open(&result.fixture_id, scope)?;
            self.resolve(&result.deltas(scope, &self.rules), scope)?;
            if !seen.insert((scope, result.fixture_id.as_str()))
                || self.is_applied(&result.fixture_id, scope)
            {
                return Err(StageError::AlreadyApplied {
                    fixture: result.fixture_id.clone(),
                    scope: scope.clone(),
                });
            }
        }

        let mut outcome = BatchOutcome {
            deltas: Vec::with_capacity(batch.len() * 4),
            affected_scopes: BTreeSet::new(),
        };
        for (result, scope) in batch {
            outcome.deltas.extend(self.apply(result, scope)?);
            outcome.affected_scopes.insert(scope.clone());
        }

        Ok(outcome)
    }

    /// Whether a fixture currently counts in a scope
    pub fn is_applied(&self, fixture_id: &str, scope: &Scope) -> bool {
        self.applied()
            .contains_key(&(scope.clone(), fixture_id.to_string()))
    }

    /// Freeze a scope; later apply/revert/edit calls fail with `EditWindowClosed`
    pub fn close_scope(&self, scope: &Scope) {
        if self.closed_mut().insert(scope.clone()) {
            log::info!("Closed edit window for {}", scope);
        }
    }

    pub fn is_closed(&self, scope: &Scope) -> bool {
        self.closed_ref().contains(scope)
    }

    /// Freeze single fixtures of an otherwise open scope
    ///
    /// Bracket rounds use this: once the next round is drawn, results of
    /// the finished one can no longer change.
    pub fn close_fixtures<'a>(&self, fixture_ids: impl IntoIterator<Item = &'a str>, scope: &Scope) {
        let mut closed = self.closed_fixtures_mut();
        for fixture_id in fixture_ids {
            closed.insert((scope.clone(), fixture_id.to_string()));
        }
    }

    pub fn is_fixture_closed(&self, fixture_id: &str, scope: &Scope) -> bool {
        self.is_closed(scope)
            || self
                .closed_fixtures_ref()
                .contains(&(scope.clone(), fixture_id.to_string()))
    }

    /// Current records of a scope, in admission order
    ///
    /// Counters are loaded one by one, so a snapshot taken while applies are
    /// in flight may show a result half-counted. Take standings after the
    /// apply or batch call has returned.
    pub fn snapshot(&self, scope: &Scope) -> Vec<StatRecord> {
        let records = self.records_ref();
        let Some(scope_records) = records.get(scope) else {
            return Vec::new();
        };

        scope_records
            .order
            .iter()
            .filter_map(|entrant| {
                scope_records.counters.get(entrant).map(|c| StatRecord {
                    entrant_id: entrant.clone(),
                    scope: scope.clone(),
                    tally: c.load(),
                    rank_position: None,
                    qualified: false,
                })
            })
            .collect()
    }

    /// Current record of one entrant
    pub fn record(&self, entrant: &str, scope: &Scope) -> Option<StatRecord> {
        let records = self.records_ref();
        let counters = records.get(scope)?.counters.get(entrant)?;
        Some(StatRecord {
            entrant_id: entrant.to_string(),
            scope: scope.clone(),
            tally: counters.load(),
            rank_position: None,
            qualified: false,
        })
    }

    /// Every scope belonging to a stage
    pub fn scopes_of_stage(&self, stage_id: &str) -> Vec<Scope> {
        let mut scopes: Vec<Scope> = self
            .records_ref()
            .keys()
            .filter(|scope| scope.stage_id() == stage_id)
            .cloned()
            .collect();
        scopes.sort();
        scopes
    }

    fn ensure_open(&self, fixture_id: &str, scope: &Scope) -> StageResult<()> {
        if self.is_closed(scope) {
            log::warn!("Rejected ledger change in closed {}", scope);
            return Err(StageError::EditWindowClosed(scope.to_string()));
        }
        if self
            .closed_fixtures_ref()
            .contains(&(scope.clone(), fixture_id.to_string()))
        {
            log::warn!("Rejected change to closed fixture {} in {}", fixture_id, scope);
            return Err(StageError::EditWindowClosed(format!("fixture {fixture_id} in {scope}")));
        }
        Ok(())
    }

    fn resolve(&self, deltas: &[StatDelta], scope: &Scope) -> StageResult<Vec<Arc<Counters>>> {
        let records = self.records_ref();
        let scope_records = records.get(scope);

        let mut counters = Vec::with_capacity(deltas.len());
        let mut seen: HashSet<&str> = HashSet::with_capacity(deltas.len());
        for delta in deltas {
            if !seen.insert(delta.entrant_id.as_str()) {
                return Err(StageError::DuplicateEntrant(delta.entrant_id.clone()));
            }
            let counter = scope_records
                .and_then(|r| r.counters.get(&delta.entrant_id))
                .ok_or_else(|| StageError::NotAdmitted {
                    entrant: delta.entrant_id.clone(),
                    scope: scope.clone(),
                })?;
            counters.push(Arc::clone(counter));
        }
        Ok(counters)
    }

    // Counters are plain increments, so a poisoned lock never guards a
    // half-written invariant.
    fn records_ref(&self) -> RwLockReadGuard<'_, HashMap<Scope, ScopeRecords>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn records_mut(&self) -> RwLockWriteGuard<'_, HashMap<Scope, ScopeRecords>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }

    fn applied(&self) -> MutexGuard<'_, HashMap<(Scope, FixtureId), Vec<StatDelta>>> {
        self.applied.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn closed_ref(&self) -> RwLockReadGuard<'_, HashSet<Scope>> {
        self.closed.read().unwrap_or_else(|e| e.into_inner())
    }

    fn closed_mut(&self) -> RwLockWriteGuard<'_, HashSet<Scope>> {
        self.closed.write().unwrap_or_else(|e| e.into_inner())
    }

    fn closed_fixtures_ref(&self) -> RwLockReadGuard<'_, HashSet<(Scope, FixtureId)>> {
        self.closed_fixtures.read().unwrap_or_else(|e| e.into_inner())
    }

    fn closed_fixtures_mut(&self) -> RwLockWriteGuard<'_, HashSet<(Scope, FixtureId)>> {
        self.closed_fixtures.write().unwrap_or_else(|e| e.into_inner())
    }
}
