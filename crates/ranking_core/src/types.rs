//! Data model exchanged with the orchestrator

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ValidationError;

/// A participant in a competition. Immutable once a tournament starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub id: String,
    pub name: String,
    /// Optional seed metadata supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

impl Competitor {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            seed: None,
        }
    }

    pub fn seeded(id: &str, name: &str, seed: u32) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new(id, name)
        }
    }
}

/// Pre-assigned strength rank. Seed number 1 is the strongest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    pub competitor_id: String,
    pub seed_number: u32,
}

impl Seed {
    pub fn new(competitor_id: &str, seed_number: u32) -> Self {
        Self {
            competitor_id: competitor_id.to_string(),
            seed_number,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Bye,
    Completed,
}

/// One competitor's reported outcome within a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub competitor_id: String,
    pub score: f64,
    /// Sub-unit wins (games, maps, sets) inside the match
    #[serde(default)]
    pub games_won: u32,
    #[serde(default)]
    pub games_played: u32,
}

impl MatchResult {
    pub fn new(competitor_id: &str, score: f64) -> Self {
        Self {
            competitor_id: competitor_id.to_string(),
            score,
            games_won: 0,
            games_played: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub round_id: String,
    pub match_number: u32,
    /// Zero (not yet populated), one (bye) or two entries
    pub competitor_ids: Vec<String>,
    #[serde(default)]
    pub results: Vec<MatchResult>,
    pub status: MatchStatus,
    pub is_bye: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<String>,
}

impl Match {
    /// A match awaiting play. `competitor_ids` may be empty for bracket slots
    /// that are filled as earlier rounds complete.
    pub fn pending(round_number: u32, match_number: u32, competitor_ids: Vec<String>) -> Self {
        Self {
            id: match_id(round_number, match_number),
            round_id: round_id(round_number),
            match_number,
            competitor_ids,
            results: Vec::new(),
            status: MatchStatus::Pending,
            is_bye: false,
            winner_id: None,
        }
    }

    /// An automatic advance for a competitor without an opponent
    pub fn bye(round_number: u32, match_number: u32, competitor_id: &str) -> Self {
        Self {
            competitor_ids: vec![competitor_id.to_string()],
            status: MatchStatus::Bye,
            is_bye: true,
            winner_id: Some(competitor_id.to_string()),
            ..Self::pending(round_number, match_number, Vec::new())
        }
    }

    pub fn involves(&self, competitor_id: &str) -> bool {
        self.competitor_ids.iter().any(|id| id == competitor_id)
    }

    /// Score reported for a competitor, 0 when nothing was reported
    pub fn score_of(&self, competitor_id: &str) -> f64 {
        self.results
            .iter()
            .filter(|r| r.competitor_id == competitor_id)
            .map(|r| r.score)
            .sum()
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// The opponent of `competitor_id` in a two-competitor match
    pub fn opponent_of(&self, competitor_id: &str) -> Option<&str> {
        if self.competitor_ids.len() != 2 || !self.involves(competitor_id) {
            return None;
        }
        self.competitor_ids
            .iter()
            .find(|id| *id != competitor_id)
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: String,
    /// 1-based, sequential
    pub round_number: u32,
    pub name: String,
    pub status: RoundStatus,
    pub matches: Vec<Match>,
    #[serde(default)]
    pub advancing_competitor_ids: Vec<String>,
    #[serde(default)]
    pub eliminated_competitor_ids: Vec<String>,
}

impl Round {
    pub fn new(round_number: u32, name: String) -> Self {
        Self {
            id: round_id(round_number),
            round_number,
            name,
            status: RoundStatus::Pending,
            matches: Vec::new(),
            advancing_competitor_ids: Vec::new(),
            eliminated_competitor_ids: Vec::new(),
        }
    }
}

/// A vertex of the bracket DAG. One node per elimination match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketNode {
    pub id: String,
    pub match_id: String,
    pub round_number: u32,
    /// The two round k-1 nodes feeding this one, empty in round 1
    pub parent_nodes: Vec<String>,
    /// The round k+1 node this one feeds, absent for the final
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_node: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub rounds: Vec<Round>,
    pub bracket_nodes: Vec<BracketNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub competitor_id: String,
    /// Dense, 1..=N, never shared
    pub rank: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub total_score: f64,
    /// Buchholz score, Swiss only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiebreaker: Option<f64>,
}

/// Cross-competition skill estimate of a competitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub competitor_id: String,
    pub rating: f64,
    pub rating_deviation: f64,
    pub volatility: f64,
    #[serde(default)]
    pub matches_played: u32,
}

pub fn round_id(round_number: u32) -> String {
    format!("round-{}", round_number)
}

pub fn match_id(round_number: u32, match_number: u32) -> String {
    format!("match-{}-{}", round_number, match_number)
}

/// Requires at least two competitors with distinct ids
pub(crate) fn validate_competitors(competitors: &[Competitor]) -> Result<(), ValidationError> {
    if competitors.len() < 2 {
        return Err(ValidationError::TooFewCompetitors(competitors.len()));
    }
    let mut seen = HashSet::new();
    for competitor in competitors {
        if !seen.insert(competitor.id.as_str()) {
            return Err(ValidationError::DuplicateCompetitor(competitor.id.clone()));
        }
    }
    Ok(())
}
