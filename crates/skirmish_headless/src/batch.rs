//! Batch match runner for balance testing.
//!
//! Runs many seeded matches in parallel using rayon and aggregates the
//! outcomes into a JSON-serializable report.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use skirmish_core::side::Side;
use skirmish_core::state::MatchOutcome;

use crate::config::MatchConfig;
use crate::runner::{MatchRunner, MatchSummary, DEFAULT_MAX_STEPS};

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of matches to run
    pub match_count: u32,
    /// Maximum parallel matches (0 = use rayon default)
    pub parallel_matches: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
    /// Starting seed; match `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Engine step cap per match
    pub max_steps: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            match_count: 100,
            parallel_matches: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl BatchConfig {
    /// Create config for `match_count` matches
    pub fn new(match_count: u32) -> Self {
        Self {
            match_count,
            ..Default::default()
        }
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }
}

/// Aggregate outcome statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches that finished.
    pub total_matches: u32,
    /// Blue victories.
    pub blue_wins: u32,
    /// Red victories.
    pub red_wins: u32,
    /// Draws at the cycle cap.
    pub draws: u32,
    /// Mean number of cycles.
    pub average_cycles: f64,
    /// Mean final scores, Blue then Red.
    pub average_scores: [f64; 2],
}

impl BatchSummary {
    /// Aggregate finished matches.
    pub fn from_matches(matches: &[MatchSummary]) -> Self {
        let mut summary = Self {
            total_matches: matches.len() as u32,
            ..Self::default()
        };
        if matches.is_empty() {
            return summary;
        }

        let mut cycles = 0u64;
        let mut scores = [0u64; 2];
        for result in matches {
            match result.outcome {
                MatchOutcome::Winner(Side::Blue) => summary.blue_wins += 1,
                MatchOutcome::Winner(Side::Red) => summary.red_wins += 1,
                MatchOutcome::Draw => summary.draws += 1,
            }
            cycles += result.cycles;
            scores[0] += u64::from(result.scores[0]);
            scores[1] += u64::from(result.scores[1]);
        }

        let count = matches.len() as f64;
        summary.average_cycles = cycles as f64 / count;
        summary.average_scores = [scores[0] as f64 / count, scores[1] as f64 / count];
        summary
    }

    /// Share of finished matches won by `side`.
    pub fn win_rate(&self, side: Side) -> f64 {
        let wins = match side {
            Side::Blue => self.blue_wins,
            Side::Red => self.red_wins,
        };
        f64::from(wins) / f64::from(self.total_matches.max(1))
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual match summaries, in seed order
    pub matches: Vec<MatchSummary>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Match index
    pub match_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Run a batch of matches
pub fn run_batch(config: BatchConfig, match_config: &MatchConfig) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!("Starting batch run: {} matches", config.match_count);

    if config.parallel_matches > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_matches as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<MatchSummary, BatchError>> = (0..config.match_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            let runner = MatchRunner::new(match_config.clone(), seed).with_max_steps(config.max_steps);

            match runner.run() {
                Ok((summary, _)) => {
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % 10 == 0 {
                        debug!("Progress: {}/{}", done, config.match_count);
                    }
                    Ok(summary)
                }
                Err(e) => {
                    warn!("Match {} failed: {}", i, e);
                    Err(BatchError {
                        match_index: i,
                        seed,
                        message: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let (matches, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let matches: Vec<MatchSummary> = matches.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_matches(&matches);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} matches in {:.1}s ({:.1} matches/sec)",
        matches.len(),
        duration_seconds,
        matches.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    BatchResults {
        config,
        matches,
        summary,
        duration_seconds,
        errors,
    }
}

/// Run the same seed `runs` times and check every final hash agrees.
pub fn verify_determinism(match_config: &MatchConfig, seed: u64, runs: u32) -> bool {
    let hashes: Vec<Option<u64>> = (0..runs)
        .map(|_| {
            MatchRunner::new(match_config.clone(), seed)
                .run()
                .ok()
                .map(|(summary, _)| summary.final_hash)
        })
        .collect();

    hashes.first().is_some_and(Option::is_some) && hashes.windows(2).all(|w| w[0] == w[1])
}
