//! Running a seeded bracket round by round.

use serde::{Deserialize, Serialize};

use crate::{
    bracket::{
        models::{BracketEntry, BracketPlan, Confronto, ConfrontoStatus, Qualifier},
        strategy::{Seeding, SeedingStrategy},
    },
    errors::{StageError, StageResult},
    ledger::{manager::StatsLedger, models::Scope},
    schedule::models::Side,
    shuffle::Shuffler,
};

/// A single-elimination bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    plan: BracketPlan,
    rounds: Vec<Vec<Confronto>>,
}

impl Bracket {
    /// Seed `qualifiers` with `strategy` and open round one
    ///
    /// # Errors
    ///
    /// * `StageError::InsufficientQualifiers` - fewer than two qualifiers
    /// * `StageError::DuplicateEntrant` - a qualifier id occurs twice
    pub fn seed(
        strategy: &SeedingStrategy,
        qualifiers: &[Qualifier],
        shuffler: &mut dyn Shuffler,
    ) -> StageResult<Self> {
        let plan = BracketPlan::for_qualifiers(qualifiers.len())?;
        let first_round = strategy.seed(qualifiers, shuffler)?;

        log::info!(
            "Created {} bracket for {} qualifiers ({} rounds, {} byes)",
            strategy,
            plan.qualifiers,
            plan.rounds,
            plan.byes
        );

        Ok(Self {
            plan,
            rounds: vec![first_round],
        })
    }

    pub fn plan(&self) -> &BracketPlan {
        &self.plan
    }

    pub fn rounds(&self) -> &[Vec<Confronto>] {
        &self.rounds
    }

    /// 1-indexed round currently open for results
    pub fn current_round(&self) -> usize {
        self.rounds.len()
    }

    pub fn round(&self, round: usize) -> Option<&[Confronto]> {
        self.rounds.get(round.checked_sub(1)?).map(Vec::as_slice)
    }

    pub fn confronto(&self, round: usize, ordinal: usize) -> Option<&Confronto> {
        self.round(round)?.get(ordinal.checked_sub(1)?)
    }

    /// Scheduled confrontos of the open round
    pub fn pending(&self) -> impl Iterator<Item = &Confronto> {
        self.rounds
            .last()
            .into_iter()
            .flatten()
            .filter(|c| !c.is_resolved())
    }

    /// Finish a confronto with `side` as winner
    ///
    /// Re-recording inside the open round replaces the earlier winner.
    ///
    /// # Errors
    ///
    /// * `StageError::UnknownConfronto` - no such round or ordinal
    /// * `StageError::EditWindowClosed` - a later round already exists
    /// * `StageError::ConfrontoNotPlayable` - the confronto is a bye
    pub fn record_winner(&mut self, round: usize, ordinal: usize, side: Side) -> StageResult<&Confronto> {
        if self.confronto(round, ordinal).is_none() {
            return Err(StageError::UnknownConfronto { round, ordinal });
        }
        if round < self.current_round() {
            log::warn!("Rejected result for R{round}-C{ordinal}: round {} is open", self.current_round());
            return Err(StageError::EditWindowClosed(format!("bracket round {round}")));
        }

        let confronto = &mut self.rounds[round - 1][ordinal - 1];
        if confronto.status == ConfrontoStatus::Bye {
            return Err(StageError::ConfrontoNotPlayable { round, ordinal });
        }
        let winner = confronto
            .entry(side)
            .map(|entry| entry.id.clone())
            .ok_or(StageError::ConfrontoNotPlayable { round, ordinal })?;

        confronto.winner = Some(winner);
        confronto.status = ConfrontoStatus::Finished;
        Ok(&*confronto)
    }

    /// Build the next round from the winners of the open one
    ///
    /// Winners of slots `2k - 1` and `2k` meet in slot `k`. Returns `None`
    /// once the final is decided.
    ///
    /// # Errors
    ///
    /// * `StageError::RoundIncomplete` - the open round has unresolved confrontos
    pub fn advance(&mut self) -> StageResult<Option<&[Confronto]>> {
        let round = self.current_round();
        let pending = self.pending().count();
        if pending > 0 {
            return Err(StageError::RoundIncomplete { round, pending });
        }

        let Some(open) = self.rounds.last() else {
            return Ok(None);
        };
        if open.len() < 2 {
            return Ok(None);
        }

        let winners: Vec<BracketEntry> = open
            .iter()
            .filter_map(|c| {
                let mut entry = c.winning_entry()?.clone();
                entry.origin_label = format!("Winner {}", c.fixture_id());
                Some(entry)
            })
            .collect();

        let next: Vec<Confronto> = winners
            .chunks_exact(2)
            .enumerate()
            .map(|(idx, pair)| Confronto::scheduled(round + 1, idx + 1, pair[0].clone(), pair[1].clone()))
            .collect();

        log::info!("Bracket round {} opened with {} confrontos", round + 1, next.len());
        self.rounds.push(next);
        Ok(self.rounds.last().map(Vec::as_slice))
    }

    /// Advance and freeze the finished round's results in the ledger
    ///
    /// Every confronto of the round that was open is closed in `scope`, so
    /// its score can no longer be edited once the winners have moved on.
    /// The final is closed the same way when called after it is decided.
    ///
    /// # Errors
    ///
    /// * `StageError::RoundIncomplete` - the open round has unresolved confrontos;
    ///   nothing is closed
    pub fn advance_and_close(
        &mut self,
        ledger: &StatsLedger,
        scope: &Scope,
    ) -> StageResult<Option<&[Confronto]>> {
        let finished: Vec<String> = self
            .rounds
            .last()
            .into_iter()
            .flatten()
            .map(Confronto::fixture_id)
            .collect();

        let opened = self.advance()?.is_some();
        ledger.close_fixtures(finished.iter().map(String::as_str), scope);
        log::info!("Closed {} bracket results in {}", finished.len(), scope);

        if opened {
            Ok(self.rounds.last().map(Vec::as_slice))
        } else {
            Ok(None)
        }
    }

    /// Winner of the final, once decided
    pub fn champion(&self) -> Option<&BracketEntry> {
        let last = self.rounds.last()?;
        match last.as_slice() {
            [final_match] if self.rounds.len() == self.plan.rounds => final_match.winning_entry(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bracket::strategy::StrongestPaired, ledger::models::ScoringRules, shuffle::NoShuffle};

    fn bracket(n: usize) -> Bracket {
        let qualifiers: Vec<Qualifier> = (1..=n)
            .map(|i| Qualifier::pair(format!("q{i}a"), format!("q{i}b")))
            .collect();
        Bracket::seed(&StrongestPaired.into(), &qualifiers, &mut NoShuffle).unwrap()
    }

    /// Side carrying the lower seed number in its id
    fn favourite(confronto: &Confronto) -> Side {
        let seed = |entry: &BracketEntry| -> usize {
            entry.id[1..entry.id.find('a').unwrap_or(entry.id.len())]
                .parse()
                .unwrap()
        };
        match &confronto.side_b {
            Some(b) if seed(b) < seed(&confronto.side_a) => Side::B,
            _ => Side::A,
        }
    }

    fn play_round(bracket: &mut Bracket) {
        let open: Vec<(usize, usize, Side)> = bracket
            .pending()
            .map(|c| (c.round, c.ordinal, favourite(c)))
            .collect();
        for (round, ordinal, side) in open {
            bracket.record_winner(round, ordinal, side).unwrap();
        }
    }

    #[test]
    fn test_five_qualifiers_to_champion() {
        let mut bracket = bracket(5);
        assert_eq!(bracket.plan().rounds, 3);
        assert_eq!(bracket.pending().count(), 1);

        play_round(&mut bracket);
        let second = bracket.advance().unwrap().unwrap().to_vec();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].side_a.origin_label, "Winner R1-C1");
        assert_eq!(second[0].side_b.as_ref().unwrap().origin_label, "Winner R1-C2");

        play_round(&mut bracket);
        let final_round = bracket.advance().unwrap().unwrap().to_vec();
        assert_eq!(final_round.len(), 1);
        assert!(bracket.champion().is_none());

        let ids = [
            final_round[0].side_a.id.as_str(),
            final_round[0].side_b.as_ref().unwrap().id.as_str(),
        ];
        assert_eq!(ids, ["q1a+q1b", "q2a+q2b"]);

        play_round(&mut bracket);
        assert_eq!(bracket.champion().map(|e| e.id.as_str()), Some("q1a+q1b"));
        assert_eq!(bracket.advance().unwrap(), None);
    }

    #[test]
    fn test_two_qualifiers_play_the_final() {
        let mut bracket = bracket(2);
        assert_eq!(bracket.plan().rounds, 1);
        bracket.record_winner(1, 1, Side::B).unwrap();
        assert_eq!(bracket.champion().map(|e| e.id.as_str()), Some("q2a+q2b"));
    }

    #[test]
    fn test_advance_requires_complete_round() {
        let mut bracket = bracket(8);
        bracket.record_winner(1, 1, Side::A).unwrap();
        assert_eq!(
            bracket.advance(),
            Err(StageError::RoundIncomplete { round: 1, pending: 3 })
        );
    }

    #[test]
    fn test_record_winner_errors() {
        let mut bracket = bracket(5);
        assert_eq!(
            bracket.record_winner(1, 9, Side::A).unwrap_err(),
            StageError::UnknownConfronto { round: 1, ordinal: 9 }
        );
        assert_eq!(
            bracket.record_winner(0, 1, Side::A).unwrap_err(),
            StageError::UnknownConfronto { round: 0, ordinal: 1 }
        );
        assert_eq!(
            bracket.record_winner(1, 1, Side::A).unwrap_err(),
            StageError::ConfrontoNotPlayable { round: 1, ordinal: 1 }
        );
    }

    #[test]
    fn test_correction_allowed_until_next_round() {
        let mut bracket = bracket(4);
        bracket.record_winner(1, 1, Side::B).unwrap();
        let corrected = bracket.record_winner(1, 1, Side::A).unwrap();
        assert_eq!(corrected.winner.as_deref(), Some("q1a+q1b"));

        bracket.record_winner(1, 2, Side::A).unwrap();
        bracket.advance().unwrap();
        assert!(matches!(
            bracket.record_winner(1, 1, Side::B),
            Err(StageError::EditWindowClosed(_))
        ));
    }

    #[test]
    fn test_advanced_round_scores_are_frozen() {
        let mut bracket = bracket(4);
        let ledger = StatsLedger::new(ScoringRules::default());
        let scope = Scope::stage("autumn");
        for i in 1..=4 {
            ledger.admit_all(&[format!("q{i}a"), format!("q{i}b")], &scope);
        }

        let open: Vec<Confronto> = bracket.pending().cloned().collect();
        for confronto in &open {
            ledger.apply(&confronto.match_result(6, 2).unwrap(), &scope).unwrap();
            bracket.record_winner(confronto.round, confronto.ordinal, Side::A).unwrap();
        }

        // nothing is frozen while the round is still open
        assert!(!ledger.is_fixture_closed("R1-C1", &scope));

        let final_round = bracket.advance_and_close(&ledger, &scope).unwrap().unwrap().to_vec();
        assert_eq!(final_round.len(), 1);

        let rescored = open[0].match_result(1, 6).unwrap();
        assert!(matches!(
            ledger.edit(&rescored, &scope),
            Err(StageError::EditWindowClosed(_))
        ));
        assert_eq!(bracket.confronto(1, 1).unwrap().winner.as_deref(), Some("q1a+q1b"));
        assert_eq!(ledger.record("q1a", &scope).unwrap().tally.wins, 1);

        // the final takes results until it is closed in turn
        let final_result = final_round[0].match_result(6, 4).unwrap();
        ledger.apply(&final_result, &scope).unwrap();
        ledger.edit(&final_round[0].match_result(6, 3).unwrap(), &scope).unwrap();
        bracket.record_winner(2, 1, Side::A).unwrap();
        assert_eq!(bracket.advance_and_close(&ledger, &scope).unwrap(), None);
        assert!(ledger.is_fixture_closed("R2-C1", &scope));
    }

    #[test]
    fn test_advance_and_close_keeps_open_round_editable_on_error() {
        let mut bracket = bracket(4);
        let ledger = StatsLedger::new(ScoringRules::default());
        let scope = Scope::stage("autumn");
        bracket.record_winner(1, 1, Side::A).unwrap();

        assert_eq!(
            bracket.advance_and_close(&ledger, &scope),
            Err(StageError::RoundIncomplete { round: 1, pending: 1 })
        );
        assert!(!ledger.is_fixture_closed("R1-C1", &scope));
    }
}
