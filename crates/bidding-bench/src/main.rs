use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::Level;

use bidding_bench::config::{ResolvedOutputs, SweepConfig};
use bidding_bench::logging::{init_console_logging, init_logging};
use bidding_bench::report::{self, EvaluationReport, LineReport, ReportFormat};
use bidding_bench::sweep::SweepRunner;
use bidding_core::model::StateSnapshot;
use bidding_core::{BidLevel, CardSequence, Evaluator, GameState};

/// Exhaustive minimax solver for the card bidding game.
#[derive(Debug, Parser)]
#[command(
    name = "bidding-bench",
    author,
    version,
    about = "Minimax values, optimal lines and ordering sweeps for the bidding game"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the value of a position and score every legal move.
    Evaluate(PositionArgs),
    /// Print one optimal line of play from a position to the last card.
    Line(PositionArgs),
    /// Evaluate card orderings and report openings that fall short of a fair split.
    Sweep(SweepArgs),
}

#[derive(Debug, Args)]
struct PositionArgs {
    /// Money held by the player to move.
    #[arg(short, long, value_name = "MONEY", default_value_t = 8)]
    money: u32,

    /// Money held by the other player (defaults to --money).
    #[arg(long, value_name = "MONEY")]
    opponent_money: Option<u32>,

    /// Card values in play order, e.g. 5,4,3,2,1.
    #[arg(short, long, value_name = "CARDS", default_value = "5,4,3,2,1")]
    cards: CardSequence,

    /// Standing bid: "open" (or -1) for a fresh round, otherwise the amount.
    #[arg(short, long, value_name = "BID", default_value = "open", allow_hyphen_values = true)]
    bid: BidLevel,

    /// Read the position from a JSON snapshot instead of the flags above.
    #[arg(long, value_name = "FILE")]
    state: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Log evaluator events to stderr.
    #[arg(short, long)]
    verbose: bool,
}

impl PositionArgs {
    fn state(&self) -> anyhow::Result<GameState> {
        if let Some(path) = self.state.as_ref() {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading state snapshot {}", path.display()))?;
            return StateSnapshot::from_json(&json)
                .with_context(|| format!("decoding state snapshot {}", path.display()));
        }
        Ok(GameState::new(
            self.money,
            self.opponent_money.unwrap_or(self.money),
            self.cards.clone(),
            self.bid,
        ))
    }
}

#[derive(Debug, Args)]
struct SweepArgs {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/sweep.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the money each player starts with.
    #[arg(long, value_name = "MONEY")]
    money: Option<u32>,

    /// Evaluate this many random orderings instead of enumerating all.
    #[arg(long, value_name = "COUNT")]
    sample: Option<usize>,

    /// Override the RNG seed used for sampling.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of worker threads.
    #[arg(long, value_name = "THREADS")]
    threads: Option<usize>,

    /// Exit after validating the configuration (no orderings are evaluated).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Evaluate(args) => evaluate(&args),
        Command::Line(args) => line(&args),
        Command::Sweep(args) => sweep(args),
    }
}

fn evaluate(args: &PositionArgs) -> anyhow::Result<()> {
    if args.verbose {
        init_console_logging(Level::DEBUG);
    }
    let state = args.state()?;
    let mut evaluator = Evaluator::new();
    let report = EvaluationReport::build(&mut evaluator, &state)?;
    match args.format {
        ReportFormat::Text => print!("{}", report.render_text(&state)),
        ReportFormat::Json => println!("{}", report::to_json(&report)?),
    }
    Ok(())
}

fn line(args: &PositionArgs) -> anyhow::Result<()> {
    if args.verbose {
        init_console_logging(Level::TRACE);
    }
    let state = args.state()?;
    let mut evaluator = Evaluator::new();
    let report = LineReport::build(&mut evaluator, &state)?;
    match args.format {
        ReportFormat::Text => print!("{}", report.render_text()),
        ReportFormat::Json => println!("{}", report::to_json(&report)?),
    }
    Ok(())
}

fn sweep(args: SweepArgs) -> anyhow::Result<()> {
    let mut config = SweepConfig::from_path(&args.config)?;

    if let Some(run_id) = args.run_id {
        config.run_id = run_id;
    }

    if let Some(money) = args.money {
        config.search.money = Some(money);
    }

    if let Some(sample) = args.sample {
        config.search.sample = Some(sample);
    }

    if let Some(seed) = args.seed {
        config.search.seed = Some(seed);
    }

    if let Some(threads) = args.threads {
        config.search.threads = Some(threads);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let highest = config.search.highest_card;
    let money = config.search.money_per_player();

    println!(
        "Loaded configuration '{run_id}': cards 1..={highest}, {money} money per player, winning share {}",
        config.search.target()
    );

    let logging = config.logging.clone();
    let telemetry_outputs = outputs.clone();
    let runner = SweepRunner::new(config, outputs)?;

    if args.validate_only {
        println!(
            "Validation-only mode: {} orderings prepared, none evaluated.",
            runner.orderings().len()
        );
        return Ok(());
    }

    let _logging_guard = init_logging(&logging, &telemetry_outputs, &run_id)?;

    let summary = runner.run()?;
    println!(
        "Sweep complete for '{run_id}': {} orderings, {} shortfalls, {} distinct states → {}",
        summary.orderings,
        summary.shortfalls,
        summary.distinct_states,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Opening value plot: {}", plot_path.display());
    }
    if let (Some(min), Some(max)) = (summary.analytics.min_value, summary.analytics.max_value) {
        println!(
            "  Opening values {min}..={max}, mean {:.3}",
            summary.analytics.mean_value
        );
    }

    Ok(())
}
