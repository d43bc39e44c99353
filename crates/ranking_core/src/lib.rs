//! Competition ranking and matchmaking core
//!
//! This crate provides:
//! - Single-elimination brackets with seeding, byes and a linked node DAG
//! - Round-robin schedules (circle method)
//! - Swiss-system pairings, one round at a time
//! - Round-robin and Swiss standings recomputed from completed matches
//! - Glicko-2 rating updates from a competition's final ranking
//!
//! Every function is pure and synchronous: no I/O, no shared state. Storage
//! is left to a [`RatingStore`] supplied by the caller.
//!
//! # Usage
//!
//! ```
//! use ranking_core::{generate_round_robin_schedule, Competitor};
//!
//! let competitors: Vec<Competitor> = ["ann", "bob", "cy", "dee"]
//!     .iter()
//!     .map(|id| Competitor::new(id, id))
//!     .collect();
//! let rounds = generate_round_robin_schedule(&competitors).unwrap();
//! assert_eq!(rounds.len(), 3);
//! ```

pub mod bracket;
pub mod error;
pub mod events;
pub mod glicko2;
pub mod persistence;
pub mod round_robin;
pub mod standings;
pub mod swiss;
pub mod types;

pub use bracket::{advance_bracket, generate_bracket, seeds_from_competitors};
pub use error::{
    ConvergenceWarning, NumericError, RatingError, SolverStage, StoreError, ValidationError,
};
pub use events::{record_match_result, CompetitionEvent};
pub use glicko2::{
    calculate_glicko2, calculate_multi_player_glicko2, Glicko2, Glicko2Config, Glicko2Rating,
    Glicko2Update, Opponent, RatingChange,
};
pub use persistence::{
    persist_rating_changes, InMemoryRatingStore, PersistOutcome, PersistReport, RatingStore,
    UpdateKey,
};
pub use round_robin::generate_round_robin_schedule;
pub use standings::{calculate_round_robin_standings, calculate_swiss_final_standings};
pub use swiss::generate_swiss_pairings;
pub use types::*;
