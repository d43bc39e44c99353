//! Swiss-system pairing, one round at a time
//!
//! Competitors are ordered by running score and paired from the top with the
//! next competitor below they have not met yet. The search backtracks when a
//! greedy choice would strand a later competitor with only past opponents;
//! with an odd field the bye moves up from the bottom when the preferred
//! choice leaves no rematch-free pairing. If none exists at all, the plain
//! greedy pairing is used and a competitor with no fresh opponent meets the
//! nearest unpaired one.

use log::{debug, warn};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::error::ValidationError;
use crate::types::{validate_competitors, Competitor, Match, MatchStatus, Round};

pub const WIN_POINTS: f64 = 1.0;
pub const DRAW_POINTS: f64 = 0.5;
pub const BYE_POINTS: f64 = 1.0;

/// Steps the backtracking search may take before settling for greedy
const SEARCH_BUDGET: u32 = 10_000;

/// Swiss points each participant earned from one match.
///
/// Byes are worth a win, a completed match without a winner is a draw, and
/// pending matches are worth nothing yet.
pub fn match_points(m: &Match) -> Vec<(&str, f64)> {
    match m.status {
        MatchStatus::Pending => Vec::new(),
        MatchStatus::Bye => m
            .competitor_ids
            .iter()
            .map(|id| (id.as_str(), BYE_POINTS))
            .collect(),
        MatchStatus::Completed => match &m.winner_id {
            Some(winner) => m
                .competitor_ids
                .iter()
                .map(|id| (id.as_str(), if id == winner { WIN_POINTS } else { 0.0 }))
                .collect(),
            None => m
                .competitor_ids
                .iter()
                .map(|id| (id.as_str(), DRAW_POINTS))
                .collect(),
        },
    }
}

/// Pair one Swiss round from the history of earlier rounds.
pub fn generate_swiss_pairings(
    competitors: &[Competitor],
    prior_rounds: &[Round],
    round_number: u32,
) -> Result<Round, ValidationError> {
    validate_competitors(competitors)?;
    if round_number == 0 {
        return Err(ValidationError::InvalidRoundNumber(round_number));
    }

    let index: HashMap<&str, usize> = competitors
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect();

    let mut points = vec![0.0; competitors.len()];
    let mut played: HashSet<(usize, usize)> = HashSet::new();
    let mut had_bye = vec![false; competitors.len()];

    for m in prior_rounds.iter().flat_map(|r| &r.matches) {
        for (id, earned) in match_points(m) {
            if let Some(&i) = index.get(id) {
                points[i] += earned;
            }
        }
        let members: Vec<usize> = m
            .competitor_ids
            .iter()
            .filter_map(|id| index.get(id.as_str()).copied())
            .collect();
        match members.as_slice() {
            [a, b] if !m.is_bye => {
                played.insert(pair_key(*a, *b));
            }
            [only] if m.is_bye => had_bye[*only] = true,
            _ => {}
        }
    }

    // Stable: equal scores keep the caller's (seed) order
    let mut order: Vec<usize> = (0..competitors.len()).collect();
    order.sort_by(|&a, &b| points[b].partial_cmp(&points[a]).unwrap_or(Ordering::Equal));

    // With an odd field, try bye candidates from the bottom: those who have
    // not had a bye yet first, then everyone else
    let bye_choices: Vec<Option<usize>> = if order.len() % 2 == 1 {
        let fresh = (0..order.len()).rev().filter(|&p| !had_bye[order[p]]);
        let repeat = (0..order.len()).rev().filter(|&p| had_bye[order[p]]);
        fresh.chain(repeat).map(Some).collect()
    } else {
        vec![None]
    };

    let has_played = |a: usize, b: usize| played.contains(&pair_key(a, b));

    let mut found = None;
    for (attempt, &choice) in bye_choices.iter().enumerate() {
        let pool = without(&order, choice);
        let mut paired = vec![false; pool.len()];
        let mut pairs = Vec::with_capacity(pool.len() / 2);
        let mut budget = SEARCH_BUDGET;
        if search(&pool, &mut paired, &mut pairs, &has_played, &mut budget) {
            if attempt > 0 {
                debug!(
                    "round {}: bye moved to candidate {} to avoid a rematch",
                    round_number,
                    attempt + 1
                );
            }
            found = Some((choice.map(|p| order[p]), pairs));
            break;
        }
    }

    let (bye, pairs) = match found {
        Some(found) => found,
        None => {
            warn!(
                "round {}: no rematch-free pairing found, falling back to greedy",
                round_number
            );
            let choice = bye_choices.first().copied().flatten();
            let pool = without(&order, choice);
            (choice.map(|p| order[p]), greedy(&pool, &has_played))
        }
    };

    let mut round = Round::new(round_number, format!("Round {}", round_number));
    for (a, b) in pairs {
        let match_number = round.matches.len() as u32 + 1;
        round.matches.push(Match::pending(
            round_number,
            match_number,
            vec![competitors[a].id.clone(), competitors[b].id.clone()],
        ));
    }
    if let Some(i) = bye {
        let match_number = round.matches.len() as u32 + 1;
        round
            .matches
            .push(Match::bye(round_number, match_number, &competitors[i].id));
    }

    debug!(
        "paired swiss round {}: {} matches{}",
        round_number,
        round.matches.len(),
        if bye.is_some() { " including a bye" } else { "" }
    );

    Ok(round)
}

/// `order` with the competitor at `position` taken out
fn without(order: &[usize], position: Option<usize>) -> Vec<usize> {
    order
        .iter()
        .enumerate()
        .filter(|&(p, _)| Some(p) != position)
        .map(|(_, &i)| i)
        .collect()
}

fn pair_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Depth-first pairing in greedy order, never repeating a past pairing.
/// Returns false when no such pairing exists or the budget runs out.
fn search(
    pool: &[usize],
    paired: &mut [bool],
    pairs: &mut Vec<(usize, usize)>,
    has_played: &dyn Fn(usize, usize) -> bool,
    budget: &mut u32,
) -> bool {
    let Some(first) = paired.iter().position(|p| !p) else {
        return true;
    };
    paired[first] = true;

    for second in first + 1..pool.len() {
        if paired[second] || has_played(pool[first], pool[second]) {
            continue;
        }
        if *budget == 0 {
            break;
        }
        *budget -= 1;

        paired[second] = true;
        pairs.push((pool[first], pool[second]));
        if search(pool, paired, pairs, has_played, budget) {
            return true;
        }
        pairs.pop();
        paired[second] = false;
    }

    paired[first] = false;
    false
}

/// Top-down greedy pairing that accepts a rematch when nothing else is left
fn greedy(pool: &[usize], has_played: &dyn Fn(usize, usize) -> bool) -> Vec<(usize, usize)> {
    let mut paired = vec![false; pool.len()];
    let mut pairs = Vec::with_capacity(pool.len() / 2);

    for first in 0..pool.len() {
        if paired[first] {
            continue;
        }
        paired[first] = true;

        let open: Vec<usize> = (first + 1..pool.len()).filter(|&j| !paired[j]).collect();
        let second = open
            .iter()
            .copied()
            .find(|&j| !has_played(pool[first], pool[j]))
            .or_else(|| open.first().copied());

        if let Some(second) = second {
            paired[second] = true;
            pairs.push((pool[first], pool[second]));
        }
    }

    pairs
}

#[cfg(test)]
#[path = "swiss_tests.rs"]
mod tests;
