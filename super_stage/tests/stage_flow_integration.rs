//! End-to-end stage flows.
//!
//! Drives the engine the way a tournament workflow does: plan the stage,
//! feed results into the ledger, rank, build the bracket and play it out.

use std::collections::HashSet;

use super_stage::{
    Bracket, ConfrontoStatus, Entrant, MatchResult, Scope, ScoringRules, SeedingStrategy,
    StageConfig, StageError, StageFormat, StatsLedger,
    bracket::{BracketPlan, CrossRanked, Qualifier, Seeding},
    plan_stage,
    ranking::{StageStandings, aggregate_across_stages},
    schedule::Side,
    shuffle::{NoShuffle, RngShuffler},
    team_up,
};

fn entrants(n: usize) -> Vec<Entrant> {
    (1..=n)
        .map(|i| Entrant::new(format!("p{i}"), format!("Player {i}")))
        .collect()
}

#[test]
fn test_super_eight_scenario() {
    let plan = plan_stage(&StageConfig::default(), &entrants(8), &mut RngShuffler::seeded(3)).unwrap();

    assert_eq!(plan.fixtures.len(), 14);
    let rounds: HashSet<usize> = plan.fixtures.iter().filter_map(|f| f.round).collect();
    assert_eq!(rounds.len(), 7);

    for entrant in &plan.entrants {
        let appearances = plan.fixtures.iter().filter(|f| f.involves(entrant)).count();
        assert_eq!(appearances, 7, "{entrant} should play 7 fixtures");
    }

    // Super-X results count stage-wide at one point per win
    let ledger = StatsLedger::new(ScoringRules::default());
    plan.admit_all(&ledger);
    for fixture in &plan.fixtures {
        let (result, scope) = plan.result_for(&fixture.id, 6, 4).unwrap();
        assert_eq!(scope, plan.stage_scope());
        ledger.apply(&result, &scope).unwrap();
    }

    let standings = plan.stage_standings(&ledger);
    assert_eq!(standings.len(), 8);
    let total_points: i64 = standings.iter().map(|r| r.tally.points).sum();
    assert_eq!(total_points, 14 * 2);
    assert!(standings.iter().all(|r| r.tally.matches_played == 7));
}

#[test]
fn test_group_of_four_scenario() {
    let ledger = StatsLedger::new(ScoringRules::default());
    let scope = Scope::group("spring", "A");
    for id in ["a", "b", "c", "d"] {
        ledger.admit(id, &scope);
    }

    // A+B beat C+D twice and lose once
    for (fixture, games_a, games_b) in [("A-1", 6, 3), ("A-2", 6, 4), ("A-3", 2, 6)] {
        let result = MatchResult::from_pairs(
            fixture.to_string(),
            ["a".to_string(), "b".to_string()],
            ["c".to_string(), "d".to_string()],
            games_a,
            games_b,
        )
        .unwrap();
        ledger.apply(&result, &scope).unwrap();
    }

    for id in ["a", "b"] {
        let tally = ledger.record(id, &scope).unwrap().tally;
        assert_eq!(tally.wins, 2);
        assert_eq!(tally.points, 6);
        assert_eq!(tally.game_balance(), 14 - 13);
    }
    for id in ["c", "d"] {
        let tally = ledger.record(id, &scope).unwrap().tally;
        assert_eq!(tally.wins, 1);
        assert_eq!(tally.points, 3);
        assert_eq!(tally.game_balance(), 13 - 14);
    }
}

#[test]
fn test_five_qualifier_scenario() {
    // Three groups of two classified slots, one slot vacated
    let qualifiers = vec![
        Qualifier::pair("a1", "a2").with_origin("A", 1),
        Qualifier::pair("b1", "b2").with_origin("B", 1),
        Qualifier::pair("c1", "c2").with_origin("C", 1),
        Qualifier::pair("a3", "a4").with_origin("A", 2),
        Qualifier::pair("b3", "b4").with_origin("B", 2),
    ];

    let plan = BracketPlan::for_qualifiers(qualifiers.len()).unwrap();
    assert_eq!(plan.bracket_size, 8);
    assert_eq!(plan.byes, 3);
    assert_eq!(plan.real_matches, 1);
    assert_eq!(plan.total_confrontos, 4);

    for strategy in [SeedingStrategy::default(), CrossRanked.into()] {
        let round = strategy.seed(&qualifiers, &mut NoShuffle).unwrap();
        assert_eq!(round.len(), 4);
        let byes: Vec<_> = round.iter().filter(|c| c.status == ConfrontoStatus::Bye).collect();
        assert_eq!(byes.len(), 3);
        assert!(byes.iter().all(|c| c.winner.as_ref() == Some(&c.side_a.id)));

        let scheduled: Vec<_> = round
            .iter()
            .filter(|c| c.status == ConfrontoStatus::Scheduled)
            .collect();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].side_a.origin_label, "2nd Group A");
        assert_eq!(scheduled[0].side_b.as_ref().unwrap().origin_label, "2nd Group B");
    }
}

#[test]
fn test_grouped_stage_to_champion() {
    let config = StageConfig {
        stage_id: "autumn".to_string(),
        format: StageFormat::Grouped,
        cohort_size: 16,
        seeded_ids: vec!["p1".into(), "p2".into(), "p3".into(), "p4".into()],
        seeding_strategy: CrossRanked.into(),
        ..StageConfig::default()
    };
    config.validate().unwrap();

    let mut plan = plan_stage(&config, &entrants(16), &mut RngShuffler::seeded(21)).unwrap();
    assert_eq!(plan.groups.len(), 4);
    for seed in &config.seeded_ids {
        let holding: Vec<_> = plan.groups.iter().filter(|g| g.contains(seed)).collect();
        assert_eq!(holding.len(), 1);
    }
    let seeded_groups: HashSet<&str> = config
        .seeded_ids
        .iter()
        .filter_map(|s| plan.groups.iter().find(|g| g.contains(s)).map(|g| g.id.as_str()))
        .collect();
    assert_eq!(seeded_groups.len(), 4);

    let ledger = StatsLedger::new(config.scoring);
    plan.admit_all(&ledger);

    // Group play as one batch; side A wins with a varying margin
    let batch: Vec<(MatchResult, Scope)> = plan
        .fixtures
        .iter()
        .map(|f| plan.result_for(&f.id, 6, (f.ordinal % 5) as u32).unwrap())
        .collect();
    let outcome = ledger.apply_batch(&batch).unwrap();
    assert_eq!(outcome.deltas.len(), 12 * 4);
    assert_eq!(outcome.affected_scopes.len(), 4);

    let finished = plan.fixtures.iter().map(|f| f.id.clone()).collect();
    assert!(plan.refresh_groups(&finished));

    let individuals = plan.close_groups(&ledger, config.qualifiers_per_group).unwrap();
    assert_eq!(individuals.len(), 8);
    assert!(individuals[..4].iter().all(|q| q.origin.as_ref().unwrap().position == 1));

    // Group results are frozen once the bracket is derived from them
    let (late, late_scope) = plan.result_for("A-1", 0, 6).unwrap();
    assert!(matches!(
        ledger.edit(&late, &late_scope),
        Err(StageError::EditWindowClosed(_))
    ));

    let teams = team_up(&individuals).unwrap();
    assert_eq!(teams.len(), 4);

    let mut bracket = Bracket::seed(&config.seeding_strategy, &teams, &mut NoShuffle).unwrap();
    let stage_scope = plan.stage_scope();
    loop {
        let open: Vec<_> = bracket.pending().cloned().collect();
        for confronto in open {
            let result = confronto.match_result(6, 2).unwrap();
            ledger.apply(&result, &stage_scope).unwrap();
            bracket.record_winner(confronto.round, confronto.ordinal, Side::A).unwrap();
        }
        if bracket.advance_and_close(&ledger, &stage_scope).unwrap().is_none() {
            break;
        }
    }

    // Bracket scores are frozen once their winners have moved on
    let opener = bracket.confronto(1, 1).cloned().unwrap();
    assert!(matches!(
        ledger.edit(&opener.match_result(1, 6).unwrap(), &stage_scope),
        Err(StageError::EditWindowClosed(_))
    ));

    let champion = bracket.champion().cloned().unwrap();
    assert_eq!(champion.members.len(), 2);
    for member in &champion.members {
        let tally = ledger.record(member, &stage_scope).unwrap().tally;
        assert_eq!(tally.wins, 2);
        assert_eq!(tally.points, 2);
    }

    // Stage-wide totals fold group and bracket scopes together
    let mut records = Vec::new();
    for scope in ledger.scopes_of_stage("autumn") {
        records.extend(ledger.snapshot(&scope));
    }
    let totals = aggregate_across_stages(&[StageStandings {
        stage_id: "autumn".to_string(),
        counts_toward_ranking: config.counts_toward_ranking,
        records,
    }]);
    assert_eq!(totals.len(), 16);
    assert!(totals.iter().all(|t| t.stages_counted == 1));
    let bracket_and_group: i64 = totals.iter().map(|t| t.tally.matches_played).sum();
    assert_eq!(bracket_and_group, 12 * 4 + 3 * 4);
}

#[test]
fn test_replayed_result_is_rejected_without_change() {
    let plan = plan_stage(&StageConfig::default(), &entrants(8), &mut NoShuffle).unwrap();
    let ledger = StatsLedger::new(ScoringRules::default());
    plan.admit_all(&ledger);

    let (result, scope) = plan.result_for("R1-F1", 6, 1).unwrap();
    ledger.apply(&result, &scope).unwrap();
    let before = ledger.snapshot(&scope);

    assert!(matches!(
        ledger.apply(&result, &scope),
        Err(StageError::AlreadyApplied { .. })
    ));
    assert_eq!(ledger.snapshot(&scope), before);
}
