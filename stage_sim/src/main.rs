//! Simulates one stage end-to-end with random scores.
//!
//! Plans the fixtures, feeds every result through the stats ledger, ranks
//! the field and, for grouped stages, plays the elimination bracket out to
//! a champion.

use anyhow::{Context, Error};
use log::info;
use pico_args::Arguments;
use rand::{Rng, SeedableRng, rngs::StdRng};
use super_stage::{
    Bracket, Entrant, MatchResult, Qualifier, Scope, SeedingStrategy, StageConfig, StageFormat, StagePlan,
    StatsLedger, plan_stage, schedule::Side, shuffle::RngShuffler, team_up,
};

const HELP: &str = "\
Simulate a Super-X or grouped stage with random scores

USAGE:
  stage_sim [OPTIONS]

OPTIONS:
  --format     FORMAT      super-8, super-12 or grouped  [default: env STAGE_FORMAT or super-8]
  --cohort     N           Number of entrants            [default: env STAGE_COHORT_SIZE]
  --strategy   NAME        strongest-paired, cross-ranked or random-draw
                                                         [default: env STAGE_SEEDING_STRATEGY]
  --stage-id   ID          Stage identifier              [default: env STAGE_ID or stage-1]
  --seed       N           Random seed for draws and scores  [default: 42]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  STAGE_QUALIFIERS_PER_GROUP  Entrants per group reaching the bracket
  STAGE_SEEDED_IDS            Comma-separated seeded entrant ids (p1, p2, ...)
  GROUP_WIN_POINTS            Points per win inside groups
  STAGE_WIN_POINTS            Points per win in Super-X and bracket play
";

struct Args {
    format: Option<StageFormat>,
    cohort: Option<usize>,
    strategy: Option<SeedingStrategy>,
    stage_id: Option<String>,
    seed: u64,
}

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        format: pargs
            .opt_value_from_fn("--format", str::parse::<StageFormat>)
            .map_err(|e| anyhow::anyhow!("--format: {e}"))?,
        cohort: pargs.opt_value_from_str("--cohort")?,
        strategy: pargs
            .opt_value_from_fn("--strategy", str::parse::<SeedingStrategy>)
            .map_err(|e| anyhow::anyhow!("--strategy: {e}"))?,
        stage_id: pargs.opt_value_from_str("--stage-id")?,
        seed: pargs.opt_value_from_str("--seed")?.unwrap_or(42),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let config = resolve_config(args.format, args.cohort, args.strategy, args.stage_id)?;
    info!(
        "Simulating {} stage '{}' with {} entrants (seed {})",
        config.format, config.stage_id, config.cohort_size, args.seed
    );

    let entrants: Vec<Entrant> = (1..=config.cohort_size)
        .map(|i| Entrant::new(format!("p{i}"), format!("Player {i}")))
        .collect();

    let mut shuffler = RngShuffler::seeded(args.seed);
    let mut scores = StdRng::seed_from_u64(args.seed.wrapping_add(1));

    let mut plan = plan_stage(&config, &entrants, &mut shuffler)?;
    let ledger = StatsLedger::new(config.scoring);
    plan.admit_all(&ledger);

    play_fixtures(&plan, &ledger, &mut scores)?;

    match config.format {
        StageFormat::SuperEight | StageFormat::SuperTwelve => {
            print_standings("Final standings", &plan, &ledger, None);
        }
        StageFormat::Grouped => {
            let finished = plan.fixtures.iter().map(|f| f.id.clone()).collect();
            plan.refresh_groups(&finished);
            print_standings("Group standings", &plan, &ledger, Some(config.qualifiers_per_group));

            let individuals = plan.close_groups(&ledger, config.qualifiers_per_group)?;
            let teams = team_up(&individuals).context("Cannot form bracket teams from group qualifiers")?;
            play_bracket(&config, &teams, &plan.stage_scope(), &ledger, &mut shuffler, &mut scores)?;
        }
    }

    Ok(())
}

/// Environment first, then command-line overrides
fn resolve_config(
    format: Option<StageFormat>,
    cohort: Option<usize>,
    strategy: Option<SeedingStrategy>,
    stage_id: Option<String>,
) -> Result<StageConfig, Error> {
    let mut config = StageConfig::from_env()?;

    if let Some(format) = format {
        config.format = format;
        if let Some(required) = format.fixed_cohort() {
            config.cohort_size = required;
        }
    }
    if let Some(cohort) = cohort {
        config.cohort_size = cohort;
    }
    if let Some(strategy) = strategy {
        config.seeding_strategy = strategy;
    }
    if let Some(stage_id) = stage_id {
        config.stage_id = stage_id;
    }

    config.validate()?;
    Ok(config)
}

/// Random set score: the winner takes six, the loser up to four
fn random_score(rng: &mut StdRng) -> (u32, u32) {
    let losing = rng.random_range(0..=4);
    if rng.random_bool(0.5) { (6, losing) } else { (losing, 6) }
}

fn play_fixtures(plan: &StagePlan, ledger: &StatsLedger, rng: &mut StdRng) -> Result<(), Error> {
    let batch = plan
        .fixtures
        .iter()
        .map(|fixture| {
            let (games_a, games_b) = random_score(rng);
            plan.result_for(&fixture.id, games_a, games_b)
        })
        .collect::<Result<Vec<(MatchResult, Scope)>, _>>()?;

    let outcome = ledger.apply_batch(&batch)?;
    info!(
        "Applied {} results ({} deltas across {} scopes)",
        batch.len(),
        outcome.deltas.len(),
        outcome.affected_scopes.len()
    );
    Ok(())
}

fn print_standings(title: &str, plan: &StagePlan, ledger: &StatsLedger, qualify_count: Option<usize>) {
    println!("\n{title}");
    match qualify_count {
        Some(count) => {
            for (group, records) in plan.groups.iter().zip(plan.group_standings(ledger, count)) {
                println!("  Group {}", group.id);
                for record in records {
                    let marker = if record.qualified { "*" } else { " " };
                    println!(
                        "   {marker}{:>2}. {:<6} pts {:>2}  W-L {}-{}  games {:+}",
                        record.rank_position.unwrap_or_default(),
                        record.entrant_id,
                        record.tally.points,
                        record.tally.wins,
                        record.tally.losses,
                        record.tally.game_balance()
                    );
                }
            }
        }
        None => {
            for (position, record) in plan.stage_standings(ledger).iter().enumerate() {
                println!(
                    "  {:>2}. {:<6} pts {:>2}  W-L {}-{}  games {:+}",
                    position + 1,
                    record.entrant_id,
                    record.tally.points,
                    record.tally.wins,
                    record.tally.losses,
                    record.tally.game_balance()
                );
            }
        }
    }
}

fn play_bracket(
    config: &StageConfig,
    teams: &[Qualifier],
    stage_scope: &Scope,
    ledger: &StatsLedger,
    shuffler: &mut RngShuffler<StdRng>,
    rng: &mut StdRng,
) -> Result<(), Error> {
    let mut bracket = Bracket::seed(&config.seeding_strategy, teams, shuffler)?;
    println!("\nBracket ({})", config.seeding_strategy);

    loop {
        let open: Vec<_> = bracket.pending().cloned().collect();
        for confronto in open {
            let (games_a, games_b) = random_score(rng);
            let result = confronto.match_result(games_a, games_b)?;
            ledger.apply(&result, stage_scope)?;

            let side = if games_a > games_b { Side::A } else { Side::B };
            bracket.record_winner(confronto.round, confronto.ordinal, side)?;

            let loser = confronto.entry(side.opponent()).map(|e| e.origin_label.as_str()).unwrap_or("bye");
            println!(
                "  {} {} def. {} {}-{}",
                confronto.fixture_id(),
                confronto.entry(side).map(|e| e.origin_label.as_str()).unwrap_or("?"),
                loser,
                games_a.max(games_b),
                games_a.min(games_b)
            );
        }
        if bracket.advance_and_close(ledger, stage_scope)?.is_none() {
            break;
        }
    }

    if let Some(champion) = bracket.champion() {
        println!("\nChampion: {} ({})", champion.members.join(" + "), champion.origin_label);
    }
    Ok(())
}
