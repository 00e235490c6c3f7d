//! Headless match runner for AI testing and CI verification.
//!
//! This crate plays AI-vs-AI matches without any front end. This enables:
//!
//! - **Balance testing**: batches of seeded matches with aggregate win rates
//! - **CI verification**: automated checks that the engine is deterministic
//! - **Replay verification**: check that replays reproduce the final hash
//!
//! Results go to stdout as JSON; logs go to stderr.
//!
//! # Example
//!
//! ```bash
//! # Run one match and print its summary
//! cargo run -p skirmish_headless -- run --seed 7
//!
//! # Run a batch with custom rules
//! cargo run -p skirmish_headless -- batch --count 500 --rules rules.ron
//!
//! # Verify a recorded replay
//! cargo run -p skirmish_headless -- replay --file match.replay --verify
//! ```

pub mod batch;
pub mod config;
pub mod runner;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults, BatchSummary};
pub use config::{ConfigError, MatchConfig};
pub use runner::{MatchRunner, MatchSummary};
