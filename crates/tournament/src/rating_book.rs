//! Glicko-2 rating book persisted as JSON

use anyhow::{Context, Result};
use log::debug;
use ranking_core::{
    Glicko2, PersistOutcome, Rating, RatingChange, RatingStore, Standing, StoreError, UpdateKey,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Ratings of every competitor seen so far, plus the log of applied updates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBook {
    /// Current rating by competitor id
    pub ratings: BTreeMap<String, Rating>,
    /// Applied updates, in order
    pub history: Vec<RatingRecord>,
    /// Last standings stored per competition
    #[serde(default)]
    pub standings: BTreeMap<String, Vec<Standing>>,
}

/// Record of a single applied rating change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    pub key: UpdateKey,
    pub rank: u32,
    pub rating_delta: f64,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
}

impl RatingBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the book from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse rating book {}", path.display()))
    }

    /// Like [`RatingBook::load`], but a missing file is an empty book
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no rating book at {}, starting fresh", path.display());
            return Ok(Self::new());
        }
        Self::load(path)
    }

    /// Save the book to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize rating book")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Stored rating, or the engine's initial rating for a newcomer
    pub fn get_or_default(&self, competitor_id: &str, engine: &Glicko2) -> Rating {
        self.ratings
            .get(competitor_id)
            .cloned()
            .unwrap_or_else(|| engine.initial_rating(competitor_id))
    }

    pub fn is_applied(&self, key: &UpdateKey) -> bool {
        self.history.iter().any(|record| &record.key == key)
    }

    /// Ratings sorted best first; equal ratings by id
    pub fn leaderboard(&self) -> Vec<&Rating> {
        let mut entries: Vec<&Rating> = self.ratings.values().collect();
        entries.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then_with(|| a.competitor_id.cmp(&b.competitor_id))
        });
        entries
    }
}

impl RatingStore for RatingBook {
    fn persist_rating_change(
        &mut self,
        key: &UpdateKey,
        change: &RatingChange,
    ) -> Result<PersistOutcome, StoreError> {
        if self.is_applied(key) {
            return Ok(PersistOutcome::Replayed);
        }
        self.ratings
            .insert(key.competitor_id.clone(), change.after.clone());
        self.history.push(RatingRecord {
            key: key.clone(),
            rank: change.rank,
            rating_delta: change.rating_delta,
            timestamp: unix_now(),
        });
        Ok(PersistOutcome::Stored)
    }

    fn persist_standings(
        &mut self,
        competition_id: &str,
        standings: &[Standing],
    ) -> Result<(), StoreError> {
        self.standings
            .insert(competition_id.to_string(), standings.to_vec());
        Ok(())
    }
}

fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
#[path = "rating_book_tests.rs"]
mod tests;
