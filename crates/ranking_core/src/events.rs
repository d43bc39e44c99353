//! Typed events consumed at the orchestrator boundary

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bracket::advance_bracket;
use crate::error::ValidationError;
use crate::types::{MatchResult, MatchStatus, Round};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CompetitionEvent {
    MatchCompleted {
        competition_id: String,
        match_id: String,
        #[serde(default)]
        winner_id: Option<String>,
        results: Vec<MatchResult>,
    },
    RoundCompleted {
        competition_id: String,
        round_number: u32,
    },
    CompetitionFinished {
        competition_id: String,
        final_ranks: BTreeMap<String, u32>,
    },
}

impl CompetitionEvent {
    pub fn competition_id(&self) -> &str {
        match self {
            CompetitionEvent::MatchCompleted { competition_id, .. }
            | CompetitionEvent::RoundCompleted { competition_id, .. }
            | CompetitionEvent::CompetitionFinished { competition_id, .. } => competition_id,
        }
    }

    /// Structural checks that need no tournament state
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.competition_id().is_empty() {
            return Err(malformed("empty competition id"));
        }
        match self {
            CompetitionEvent::MatchCompleted {
                match_id,
                winner_id,
                results,
                ..
            } => {
                if match_id.is_empty() {
                    return Err(malformed("empty match id"));
                }
                if winner_id.as_deref() == Some("") {
                    return Err(malformed("empty winner id"));
                }
                for result in results {
                    if result.competitor_id.is_empty() {
                        return Err(malformed("result without competitor id"));
                    }
                    if !result.score.is_finite() {
                        return Err(ValidationError::NonFinite {
                            field: "score",
                            value: result.score,
                        });
                    }
                }
                Ok(())
            }
            CompetitionEvent::RoundCompleted { round_number, .. } => {
                if *round_number == 0 {
                    return Err(ValidationError::InvalidRoundNumber(0));
                }
                Ok(())
            }
            CompetitionEvent::CompetitionFinished { final_ranks, .. } => {
                if final_ranks.is_empty() {
                    return Err(malformed("no final ranks"));
                }
                if final_ranks.values().any(|&rank| rank == 0) {
                    return Err(malformed("ranks start at 1"));
                }
                Ok(())
            }
        }
    }

    /// Apply the event to an elimination bracket's rounds.
    ///
    /// `CompetitionFinished` feeds the rating step and leaves rounds alone.
    pub fn apply(&self, rounds: &mut [Round]) -> Result<(), ValidationError> {
        self.validate()?;
        match self {
            CompetitionEvent::MatchCompleted {
                match_id,
                winner_id,
                results,
                ..
            } => record_match_result(rounds, match_id, winner_id.as_deref(), results.clone()),
            CompetitionEvent::RoundCompleted { round_number, .. } => {
                advance_bracket(rounds, *round_number)
            }
            CompetitionEvent::CompetitionFinished { .. } => Ok(()),
        }
    }
}

/// Mark a pending two-competitor match completed.
///
/// `winner_id` of `None` records a draw. Every result must belong to one of
/// the match's competitors.
pub fn record_match_result(
    rounds: &mut [Round],
    match_id: &str,
    winner_id: Option<&str>,
    results: Vec<MatchResult>,
) -> Result<(), ValidationError> {
    let (round_number, m) = rounds
        .iter_mut()
        .flat_map(|r| {
            let number = r.round_number;
            r.matches.iter_mut().map(move |m| (number, m))
        })
        .find(|(_, m)| m.id == match_id)
        .ok_or_else(|| ValidationError::UnknownMatch(match_id.to_string()))?;

    if m.status != MatchStatus::Pending || m.competitor_ids.len() != 2 {
        return Err(ValidationError::RoundNotReady {
            round: round_number,
            reason: format!("match {} cannot take a result", match_id),
        });
    }
    if let Some(winner) = winner_id {
        if !m.involves(winner) {
            return Err(malformed(&format!(
                "winner {} did not play in {}",
                winner, match_id
            )));
        }
    }
    if let Some(bad) = results.iter().find(|r| !r.score.is_finite()) {
        return Err(ValidationError::NonFinite {
            field: "score",
            value: bad.score,
        });
    }
    if let Some(stranger) = results.iter().find(|r| !m.involves(&r.competitor_id)) {
        return Err(malformed(&format!(
            "result for {} who did not play in {}",
            stranger.competitor_id, match_id
        )));
    }

    m.status = MatchStatus::Completed;
    m.winner_id = winner_id.map(str::to_string);
    m.results = results;
    Ok(())
}

fn malformed(reason: &str) -> ValidationError {
    ValidationError::MalformedEvent(reason.to_string())
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
