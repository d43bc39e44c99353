//! Tournament runner
//!
//! This crate wires `ranking_core` to the filesystem:
//! - Loading runner configuration from `tournament.toml`
//! - A JSON rating book that stores Glicko-2 ratings idempotently
//! - Text reports for standings, rating updates and the leaderboard
//!
//! # Usage
//!
//! ```bash
//! # Generate a seeded bracket
//! cargo run -p tournament -- bracket players.json
//!
//! # Pair round 3 of a Swiss event
//! cargo run -p tournament -- swiss players.json rounds.json --round 3
//!
//! # Rate a finished competition and show the leaderboard
//! cargo run -p tournament -- rate ranks.json --competition spring-open
//! cargo run -p tournament -- leaderboard
//! ```

mod config;
mod rating_book;
mod report;

pub use config::*;
pub use rating_book::*;
pub use report::*;
