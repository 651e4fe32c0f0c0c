use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use super_stage::{
    MatchResult, Scope, ScoringRules, StageConfig, StageFormat, StatRecord, StatsLedger, Tally,
    bracket::{CrossRanked, Qualifier, RandomDraw, Seeding, SeedingStrategy, StrongestPaired},
    plan_stage,
    ranking::{StageStandings, aggregate_across_stages, rank_group},
    schedule::Entrant,
    shuffle::RngShuffler,
};

/// Helper to create `n` ranked doubles qualifiers spread over four groups
fn ranked_qualifiers(n: usize) -> Vec<Qualifier> {
    let groups = ["A", "B", "C", "D"];
    (0..n)
        .map(|i| {
            Qualifier::pair(format!("x{i}"), format!("y{i}"))
                .with_origin(groups[i % groups.len()], (i / groups.len()) as u32 + 1)
        })
        .collect()
}

fn entrants(n: usize) -> Vec<Entrant> {
    (1..=n)
        .map(|i| Entrant::new(format!("p{i}"), format!("Player {i}")))
        .collect()
}

/// Records with deterministic but varied counters
fn sample_records(n: usize, scope: &Scope) -> Vec<StatRecord> {
    (0..n)
        .map(|i| {
            let mut record = StatRecord::new(format!("p{i}"), scope.clone());
            let i = i as i64;
            record.tally = Tally {
                matches_played: 3,
                wins: i % 4,
                losses: 3 - i % 4,
                points: 3 * (i % 4),
                sets_won: i % 4,
                sets_lost: 3 - i % 4,
                games_won: 10 + i % 7,
                games_lost: 10 + i % 5,
            };
            record
        })
        .collect()
}

/// Benchmark first-round seeding for every strategy
fn bench_seeding(c: &mut Criterion) {
    let mut group = c.benchmark_group("seeding");

    let strategies: [SeedingStrategy; 3] =
        [StrongestPaired.into(), CrossRanked.into(), RandomDraw.into()];
    for n_qualifiers in [5, 33, 64] {
        let qualifiers = ranked_qualifiers(n_qualifiers);
        for strategy in strategies {
            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), n_qualifiers),
                &qualifiers,
                |b, qualifiers| {
                    let mut shuffler = RngShuffler::seeded(7);
                    b.iter(|| strategy.seed(qualifiers, &mut shuffler).unwrap())
                },
            );
        }
    }

    group.finish();
}

/// Benchmark group ranking with the full tie-break chain
fn bench_rank_group(c: &mut Criterion) {
    let scope = Scope::group("bench", "A");
    let records = sample_records(4, &scope);

    c.bench_function("rank_group_of_4", |b| {
        b.iter_batched(
            || records.clone(),
            |records| rank_group(records, 2),
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark aggregation over a season of stages
fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_across_stages");

    for n_stages in [4, 16, 52] {
        let stages: Vec<StageStandings> = (0..n_stages)
            .map(|s| {
                let scope = Scope::stage(format!("stage-{s}"));
                StageStandings {
                    stage_id: format!("stage-{s}"),
                    counts_toward_ranking: Some(s % 5 != 0),
                    records: sample_records(64, &scope),
                }
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_stages", n_stages)),
            &stages,
            |b, stages| b.iter(|| aggregate_across_stages(stages)),
        );
    }

    group.finish();
}

/// Benchmark planning a grouped stage (group formation and rotations)
fn bench_plan_grouped(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_grouped_stage");

    for cohort_size in [16, 48] {
        let config = StageConfig {
            format: StageFormat::Grouped,
            cohort_size,
            ..StageConfig::default()
        };
        let field = entrants(cohort_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_entrants", cohort_size)),
            &field,
            |b, field| {
                let mut shuffler = RngShuffler::seeded(11);
                b.iter(|| plan_stage(&config, field, &mut shuffler).unwrap())
            },
        );
    }

    group.finish();
}

/// Benchmark applying a Super-8 worth of results (common operation)
fn bench_ledger_apply(c: &mut Criterion) {
    let config = StageConfig::default();
    let plan = plan_stage(&config, &entrants(8), &mut RngShuffler::seeded(5)).unwrap();
    let results: Vec<(MatchResult, Scope)> = plan
        .fixtures
        .iter()
        .map(|f| plan.result_for(&f.id, 6, 3).unwrap())
        .collect();

    c.bench_function("ledger_apply_super_8", |b| {
        b.iter_batched(
            || {
                let ledger = StatsLedger::new(ScoringRules::default());
                plan.admit_all(&ledger);
                ledger
            },
            |ledger| {
                for (result, scope) in &results {
                    ledger.apply(result, scope).unwrap();
                }
                ledger
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(bracket_operations, bench_seeding,);

criterion_group!(
    stage_operations,
    bench_rank_group,
    bench_aggregate,
    bench_plan_grouped,
    bench_ledger_apply,
);

criterion_main!(bracket_operations, stage_operations);
