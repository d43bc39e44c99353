//! Persistence collaborator seam
//!
//! The core computes rating changes and standings but never stores them.
//! A [`RatingStore`] records them keyed by (competitor, competition) so that
//! replaying an update is a no-op.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::StoreError;
use crate::glicko2::RatingChange;
use crate::types::{Rating, Standing};

/// Idempotency key of a rating update
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateKey {
    pub competitor_id: String,
    pub competition_id: String,
}

impl UpdateKey {
    pub fn new(competitor_id: &str, competition_id: &str) -> Self {
        Self {
            competitor_id: competitor_id.to_string(),
            competition_id: competition_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Stored,
    /// The key was already recorded; nothing changed
    Replayed,
}

/// Storage backend for rating changes and standings
pub trait RatingStore {
    /// Record one competitor's change. Implementations must treat a key they
    /// have already stored as a no-op and report [`PersistOutcome::Replayed`].
    fn persist_rating_change(
        &mut self,
        key: &UpdateKey,
        change: &RatingChange,
    ) -> Result<PersistOutcome, StoreError>;

    fn persist_standings(
        &mut self,
        competition_id: &str,
        standings: &[Standing],
    ) -> Result<(), StoreError>;
}

/// What happened to each competitor of a batch
#[derive(Debug, Default)]
pub struct PersistReport {
    pub persisted: Vec<String>,
    pub replayed: Vec<String>,
    pub failed: Vec<(String, StoreError)>,
}

impl PersistReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Persist every change of one competition, one competitor at a time.
/// A failure for one competitor does not stop the others.
pub fn persist_rating_changes<S: RatingStore + ?Sized>(
    store: &mut S,
    competition_id: &str,
    changes: &BTreeMap<String, RatingChange>,
) -> PersistReport {
    let mut report = PersistReport::default();

    for (competitor_id, change) in changes {
        let key = UpdateKey::new(competitor_id, competition_id);
        match store.persist_rating_change(&key, change) {
            Ok(PersistOutcome::Stored) => report.persisted.push(competitor_id.clone()),
            Ok(PersistOutcome::Replayed) => {
                debug!("{}/{} already recorded", competition_id, competitor_id);
                report.replayed.push(competitor_id.clone());
            }
            Err(e) => {
                warn!(
                    "failed to persist rating for {} in {}: {}",
                    competitor_id, competition_id, e
                );
                report.failed.push((competitor_id.clone(), e));
            }
        }
    }

    report
}

/// Reference store kept entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryRatingStore {
    changes: HashMap<UpdateKey, RatingChange>,
    ratings: HashMap<String, Rating>,
    standings: HashMap<String, Vec<Standing>>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current rating of a competitor, if any update was stored
    pub fn rating(&self, competitor_id: &str) -> Option<&Rating> {
        self.ratings.get(competitor_id)
    }

    pub fn change(&self, key: &UpdateKey) -> Option<&RatingChange> {
        self.changes.get(key)
    }

    pub fn standings(&self, competition_id: &str) -> Option<&[Standing]> {
        self.standings.get(competition_id).map(Vec::as_slice)
    }
}

impl RatingStore for InMemoryRatingStore {
    fn persist_rating_change(
        &mut self,
        key: &UpdateKey,
        change: &RatingChange,
    ) -> Result<PersistOutcome, StoreError> {
        if self.changes.contains_key(key) {
            return Ok(PersistOutcome::Replayed);
        }
        self.changes.insert(key.clone(), change.clone());
        self.ratings
            .insert(key.competitor_id.clone(), change.after.clone());
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

#[cfg(test)]
#[path = "persistence_tests.rs"]
mod tests;
