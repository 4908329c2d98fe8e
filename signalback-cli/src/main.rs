//! Signalback CLI — generate, simulate, run, and status commands.
//!
//! Commands:
//! - `generate` — walk the analysis calendar, query the oracle, persist signals
//! - `simulate` — replay persisted signals against market data and export results
//! - `run` — generate then simulate (the full backtest)
//! - `status` — show the resume cursor and signal count
//!
//! Re-invoking `generate` or `run` with identical arguments after a pause
//! resumes from the persisted cursor instead of restarting.

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use signalback_core::data::YahooProvider;
use signalback_core::oracle::ChatOracle;
use signalback_runner::{
    render_summary, run_simulation, save_artifacts, AutoContinue, CheckpointHandler,
    CheckpointInfo, Control, DateOutcome, RunConfig, RunState, SignalGenerationWorkflow,
    SignalStore,
};

const ORACLE_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variables that must be set before any work begins.
const REQUIRED_ENV_VARS: &[&str] = &["OPENAI_API_KEY", "FINNHUB_API_KEY"];

#[derive(Parser)]
#[command(
    name = "signalback",
    about = "Signalback CLI — backtest periodic trading recommendations against buy-and-hold"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Shared period/output arguments.
#[derive(Args)]
struct PeriodArgs {
    /// Ticker to analyze and benchmark against.
    #[arg(long, default_value = "QQQ")]
    ticker: String,

    /// Start date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_iso_date)]
    start: NaiveDate,

    /// End date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_iso_date)]
    end: NaiveDate,

    /// Directory for persisted signals, progress, and results.
    #[arg(long, default_value = "backtest_results")]
    output_dir: PathBuf,

    /// Optional TOML config file; period arguments override its values.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and persist signals for the analysis calendar.
    Generate {
        #[command(flatten)]
        period: PeriodArgs,

        /// Skip cost-confirmation checkpoints and run unattended.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// Simulate persisted signals and export results.
    Simulate {
        #[command(flatten)]
        period: PeriodArgs,
    },
    /// Generate signals, then simulate: the full backtest.
    Run {
        #[command(flatten)]
        period: PeriodArgs,

        /// Skip cost-confirmation checkpoints and run unattended.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// Show persisted progress for an output directory.
    Status {
        /// Directory holding persisted signals and progress.
        #[arg(long, default_value = "backtest_results")]
        output_dir: PathBuf,
    },
}

fn parse_iso_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{s}': use YYYY-MM-DD"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { period, yes } => run_generate(&period, yes).map(|_| ()),
        Commands::Simulate { period } => run_simulate(&period),
        Commands::Run { period, yes } => {
            let completed = run_generate(&period, yes)?;
            if !completed {
                println!("Signal generation paused; re-run the same command to resume.");
                return Ok(());
            }
            run_simulate(&period)
        }
        Commands::Status { output_dir } => run_status(&output_dir),
    }
}

/// Build the run config from the optional TOML file plus CLI arguments.
fn build_config(period: &PeriodArgs) -> Result<RunConfig> {
    let mut config = match &period.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RunConfig::new(period.ticker.clone(), period.start, period.end),
    };
    config.ticker = period.ticker.clone();
    config.start_date = period.start;
    config.end_date = period.end;
    config.validate()?;
    Ok(config)
}

/// Fail fast when credentials are missing: no state is touched and the
/// process exits non-zero.
fn require_credentials() -> Result<String> {
    let missing: Vec<&str> = REQUIRED_ENV_VARS
        .iter()
        .copied()
        .filter(|var| std::env::var(var).map_or(true, |v| v.is_empty()))
        .collect();
    if !missing.is_empty() {
        bail!(
            "missing required environment variables: {}",
            missing.join(", ")
        );
    }
    Ok(std::env::var("OPENAI_API_KEY")?)
}

/// Interactive checkpoint: one prompt per processed date, 'q' stops.
struct PromptHandler;

impl CheckpointHandler for PromptHandler {
    fn on_checkpoint(&mut self, info: &CheckpointInfo) -> Control {
        match &info.outcome {
            DateOutcome::Generated { resolved } => {
                println!("Signal saved for {resolved}.");
            }
            DateOutcome::OracleFailed { reason } => {
                println!("Analysis failed for {}: {reason}", info.scheduled_date);
            }
            DateOutcome::AlreadyProcessed => {}
        }
        print!(
            "Processed {}/{} — press Enter to continue, 'q' to quit: ",
            info.index + 1,
            info.total
        );
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return Control::Stop;
        }
        if line.trim().eq_ignore_ascii_case("q") {
            Control::Stop
        } else {
            Control::Continue
        }
    }
}

/// Returns true when generation completed (vs. paused).
fn run_generate(period: &PeriodArgs, yes: bool) -> Result<bool> {
    let api_key = require_credentials()?;
    let config = build_config(period)?;

    let mut store = SignalStore::open(&period.output_dir)?;
    let provider = YahooProvider::new();
    let oracle = ChatOracle::new(ORACLE_BASE_URL, api_key).with_config(config.oracle.clone());

    let mut workflow = SignalGenerationWorkflow::new(&config, &oracle, &provider, &mut store);
    let outcome = if yes {
        workflow.run(&mut AutoContinue)?
    } else {
        workflow.run(&mut PromptHandler)?
    };

    println!(
        "Signal generation {}: {} generated, {} already present, {} failed ({} scheduled).",
        match outcome.state {
            RunState::Completed => "completed",
            RunState::Paused => "paused",
            _ => "finished",
        },
        outcome.generated,
        outcome.already_processed,
        outcome.failed,
        outcome.total_scheduled,
    );
    Ok(outcome.state == RunState::Completed)
}

fn run_simulate(period: &PeriodArgs) -> Result<()> {
    require_credentials()?;
    let config = build_config(period)?;

    let store = SignalStore::open(&period.output_dir)?;
    let provider = YahooProvider::new();
    let results = run_simulation(&config, &store, &provider)?;

    let written = save_artifacts(&results, &period.output_dir)?;
    for path in &written {
        println!("Wrote {}", path.display());
    }
    println!("\n{}", render_summary(&results));
    Ok(())
}

fn run_status(output_dir: &PathBuf) -> Result<()> {
    let store = SignalStore::open(output_dir)?;
    let progress = store.progress();
    match progress.last_processed_date {
        Some(cursor) => println!(
            "{} signals persisted, cursor at {cursor}.",
            store.signal_count()
        ),
        None => println!("No progress persisted yet in {}.", output_dir.display()),
    }
    Ok(())
}
