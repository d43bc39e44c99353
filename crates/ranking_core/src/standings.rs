//! Standings derived from completed matches
//!
//! Standings are always recomputed from the full match history. Ranks are
//! dense and never shared; exact ties keep the order of the competitor list.

use log::warn;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::swiss::match_points;
use crate::types::{Competitor, MatchStatus, Round, Standing};

#[derive(Debug, Clone, Default)]
struct Tally {
    wins: u32,
    losses: u32,
    ties: u32,
    total_score: f64,
    points: f64,
    opponents: Vec<usize>,
}

/// Rank a round-robin by wins, then total reported score.
///
/// Only completed matches count. A completed match without a winner is a tie
/// for everyone in it.
pub fn calculate_round_robin_standings(
    rounds: &[Round],
    competitors: &[Competitor],
) -> Vec<Standing> {
    let index = index_of(competitors);
    let mut tallies = vec![Tally::default(); competitors.len()];

    for m in rounds.iter().flat_map(|r| &r.matches) {
        if m.status != MatchStatus::Completed {
            continue;
        }
        for id in &m.competitor_ids {
            let Some(&i) = index.get(id.as_str()) else {
                warn!("match {} names unknown competitor {}", m.id, id);
                continue;
            };
            let tally = &mut tallies[i];
            match &m.winner_id {
                Some(winner) if winner == id => tally.wins += 1,
                Some(_) => tally.losses += 1,
                None => tally.ties += 1,
            }
            tally.total_score += m.score_of(id);
        }
    }

    rank(competitors, &tallies, None, |a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| desc(a.total_score, b.total_score))
    })
}

/// Final Swiss standings with the Buchholz tiebreaker.
///
/// Points: win 1, draw 0.5, loss 0, bye 1. The tiebreaker sums the final
/// points of every opponent actually played; byes contribute nothing.
/// Ordered by points, then tiebreaker, then total reported score.
pub fn calculate_swiss_final_standings(
    competitors: &[Competitor],
    rounds: &[Round],
) -> Vec<Standing> {
    let index = index_of(competitors);
    let mut tallies = vec![Tally::default(); competitors.len()];

    for m in rounds.iter().flat_map(|r| &r.matches) {
        for (id, earned) in match_points(m) {
            match index.get(id) {
                Some(&i) => tallies[i].points += earned,
                None => warn!("match {} names unknown competitor {}", m.id, id),
            }
        }

        match m.status {
            MatchStatus::Pending => {}
            MatchStatus::Bye => {
                for id in &m.competitor_ids {
                    if let Some(&i) = index.get(id.as_str()) {
                        tallies[i].wins += 1;
                    }
                }
            }
            MatchStatus::Completed => {
                for id in &m.competitor_ids {
                    let Some(&i) = index.get(id.as_str()) else {
                        continue;
                    };
                    let opponent = m.opponent_of(id).and_then(|o| index.get(o)).copied();
                    let tally = &mut tallies[i];
                    match &m.winner_id {
                        Some(winner) if winner == id => tally.wins += 1,
                        Some(_) => tally.losses += 1,
                        None => tally.ties += 1,
                    }
                    tally.total_score += m.score_of(id);
                    tally.opponents.extend(opponent);
                }
            }
        }
    }

    let buchholz: Vec<f64> = tallies
        .iter()
        .map(|t| t.opponents.iter().map(|&o| tallies[o].points).sum())
        .collect();

    rank(competitors, &tallies, Some(buchholz.as_slice()), |a, b| {
        desc(a.points, b.points)
            .then_with(|| desc(a.tiebreaker, b.tiebreaker))
            .then_with(|| desc(a.total_score, b.total_score))
    })
}

/// A tally paired with its tiebreaker, as seen by the sort
struct Entry<'a> {
    index: usize,
    tally: &'a Tally,
    tiebreaker: f64,
}

impl std::ops::Deref for Entry<'_> {
    type Target = Tally;

    fn deref(&self) -> &Tally {
        self.tally
    }
}

fn rank<F>(
    competitors: &[Competitor],
    tallies: &[Tally],
    tiebreakers: Option<&[f64]>,
    compare: F,
) -> Vec<Standing>
where
    F: Fn(&Entry, &Entry) -> Ordering,
{
    let mut entries: Vec<Entry> = tallies
        .iter()
        .enumerate()
        .map(|(index, tally)| Entry {
            index,
            tally,
            tiebreaker: tiebreakers.map_or(0.0, |t| t[index]),
        })
        .collect();

    // Stable: full ties stay in competitor order
    entries.sort_by(|a, b| compare(a, b));

    entries
        .iter()
        .enumerate()
        .map(|(position, entry)| Standing {
            competitor_id: competitors[entry.index].id.clone(),
            rank: position as u32 + 1,
            wins: entry.wins,
            losses: entry.losses,
            ties: entry.ties,
            total_score: entry.total_score,
            tiebreaker: tiebreakers.map(|_| entry.tiebreaker),
        })
        .collect()
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn index_of(competitors: &[Competitor]) -> HashMap<&str, usize> {
    competitors
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect()
}

#[cfg(test)]
#[path = "standings_tests.rs"]
mod tests;
