//! Headless skirmish runner.
//!
//! # Usage
//!
//! ```bash
//! # Run a single match, optionally recording a replay
//! cargo run -p skirmish_headless -- run --seed 7 --record match.replay
//!
//! # Run batch balance test
//! cargo run -p skirmish_headless -- batch --count 1000 --output results/
//!
//! # Verify determinism for one seed
//! cargo run -p skirmish_headless -- verify --seed 12345 --runs 5
//!
//! # Write a rules file to edit
//! cargo run -p skirmish_headless -- rules-template > rules.ron
//!
//! # Verify a replay file
//! cargo run -p skirmish_headless -- replay --file match.replay --verify
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skirmish_core::replay::{Replay, ReplayPlayer};
use skirmish_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    config::{rules_template, MatchConfig},
    runner::MatchRunner,
};

#[derive(Parser)]
#[command(name = "skirmish_headless")]
#[command(about = "Headless skirmish runner for AI testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Rule and roster overrides shared by every match-playing command.
#[derive(Args)]
struct ConfigArgs {
    /// RON rules file
    #[arg(long)]
    rules: Option<PathBuf>,

    /// RON roster file
    #[arg(long)]
    roster: Option<PathBuf>,
}

impl ConfigArgs {
    fn load(&self) -> Result<MatchConfig, String> {
        MatchConfig::load(self.rules.as_deref(), self.roster.as_deref()).map_err(|e| e.to_string())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single AI-vs-AI match
    Run {
        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Print the event log to stderr
        #[arg(long)]
        log_events: bool,

        /// Write a replay file
        #[arg(long)]
        record: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Run batch of matches for balance testing
    Batch {
        /// Number of matches to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the default rules as RON
    RulesTemplate,

    /// Replay a recorded match
    Replay {
        /// Replay file path
        #[arg(short, long)]
        file: PathBuf,

        /// Verify replay produces identical hash
        #[arg(long)]
        verify: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries JSON results
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let result = match cli.command {
        Commands::Run {
            seed,
            log_events,
            record,
            config,
        } => cmd_run(seed, log_events, record, &config),
        Commands::Batch {
            count,
            parallel,
            output,
            seed,
            config,
        } => cmd_batch(count, parallel, output, seed, &config),
        Commands::Verify { seed, runs, config } => cmd_verify(seed, runs, &config),
        Commands::RulesTemplate => rules_template()
            .map(|text| println!("{text}"))
            .map_err(|e| e.to_string()),
        Commands::Replay { file, verify } => cmd_replay(file, verify),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn cmd_run(seed: u64, log_events: bool, record: Option<PathBuf>, config: &ConfigArgs) -> Result<(), String> {
    let runner = MatchRunner::new(config.load()?, seed)
        .recording(record.is_some())
        .printing_log(log_events);
    let (summary, replay) = runner.run().map_err(|e| e.to_string())?;

    if let (Some(path), Some(replay)) = (record, replay) {
        replay.save(&path).map_err(|e| e.to_string())?;
        tracing::info!("Replay written to {}", path.display());
    }
    print_json(&summary)
}

fn cmd_batch(count: u32, parallel: u32, output: PathBuf, seed: u64, config: &ConfigArgs) -> Result<(), String> {
    let match_config = config.load()?;
    let batch = BatchConfig {
        parallel_matches: parallel,
        ..BatchConfig::new(count).with_output(output.clone()).with_seed(seed)
    };

    let results = run_batch(batch, &match_config);
    let path = output.join("batch.json");
    results.save(&path).map_err(|e| e.to_string())?;
    tracing::info!("Results written to {}", path.display());

    print_json(&results.summary)?;
    if results.errors.is_empty() {
        Ok(())
    } else {
        Err(format!("{} matches failed", results.errors.len()))
    }
}

fn cmd_verify(seed: u64, runs: u32, config: &ConfigArgs) -> Result<(), String> {
    let match_config = config.load()?;
    tracing::info!("Verifying determinism: seed {seed}, {runs} runs");
    if verify_determinism(&match_config, seed, runs) {
        tracing::info!("Determinism verified");
        Ok(())
    } else {
        Err("Determinism check FAILED".into())
    }
}

fn cmd_replay(file: PathBuf, verify: bool) -> Result<(), String> {
    let replay = Replay::load(&file).map_err(|e| e.to_string())?;
    tracing::info!(
        "Loaded replay '{}': seed {}, {} inputs",
        replay.label,
        replay.seed,
        replay.input_count()
    );

    let mut player = ReplayPlayer::new(replay).map_err(|e| e.to_string())?;
    if verify {
        if !player.verify().map_err(|e| e.to_string())? {
            return Err("Replay verification FAILED: final hash differs".into());
        }
        tracing::info!("Replay verified");
    } else {
        player.run_to_end().map_err(|e| e.to_string())?;
    }

    let state = player.state();
    print_json(&serde_json::json!({
        "outcome": state.outcome().map(|o| o.to_string()),
        "cycles": state.cycle(),
        "scores": state.scores(),
        "final_hash": state.state_hash(),
    }))
}
