//! Single-elimination bracket generation and advancement
//!
//! Competitors are placed by the classic mirrored seeding rule: seeds 1 and 2
//! sit in opposite halves, 1-4 in different quarters, and so on, so the
//! strongest seeds meet as late as possible. Empty positions turn first-round
//! matches into byes, which always go to the top seeds.

use log::debug;
use std::collections::{HashMap, HashSet};

use crate::error::ValidationError;
use crate::types::{
    validate_competitors, Bracket, BracketNode, Competitor, Match, MatchStatus, Round,
    RoundStatus, Seed,
};

/// Seed number occupying each bracket position, for a power-of-two size.
///
/// Built by repeated doubling: every seed `s` of the previous order is
/// followed by its mirror `2 * len + 1 - s`.
pub fn seed_positions(bracket_size: usize) -> Vec<u32> {
    let mut order = vec![1u32];
    while order.len() < bracket_size {
        let mirror = (order.len() * 2 + 1) as u32;
        order = order.iter().flat_map(|&seed| [seed, mirror - seed]).collect();
    }
    order
}

/// Name of a round counted back from the final
pub fn round_name(round_number: u32, total_rounds: u32) -> String {
    match total_rounds.checked_sub(round_number) {
        Some(0) => "Finals".to_string(),
        Some(1) => "Semifinals".to_string(),
        Some(2) => "Quarterfinals".to_string(),
        _ => format!("Round {}", round_number),
    }
}

/// Build seeds from the optional `seed` field of each competitor
pub fn seeds_from_competitors(competitors: &[Competitor]) -> Result<Vec<Seed>, ValidationError> {
    competitors
        .iter()
        .map(|c| match c.seed {
            Some(seed) => Ok(Seed::new(&c.id, seed)),
            None => Err(ValidationError::UnseededCompetitor(c.id.clone())),
        })
        .collect()
}

/// Generate a full single-elimination bracket.
///
/// Round 1 is populated from the seeds; later rounds hold empty pending
/// matches that [`advance_bracket`] fills as results come in.
pub fn generate_bracket(
    competitors: &[Competitor],
    seeds: &[Seed],
) -> Result<Bracket, ValidationError> {
    let by_seed = validate_seeds(competitors, seeds)?;

    let bracket_size = competitors.len().next_power_of_two();
    let total_rounds = bracket_size.trailing_zeros();
    let positions = seed_positions(bracket_size);

    let mut rounds = Vec::with_capacity(total_rounds as usize);

    let mut first = Round::new(1, round_name(1, total_rounds));
    for (index, pair) in positions.chunks(2).enumerate() {
        let match_number = index as u32 + 1;
        let occupants: Vec<String> = pair
            .iter()
            .filter_map(|seed| by_seed.get(seed))
            .map(|id| id.to_string())
            .collect();

        if let [only] = occupants.as_slice() {
            first.advancing_competitor_ids.push(only.clone());
            first.matches.push(Match::bye(1, match_number, only));
        } else {
            first.matches.push(Match::pending(1, match_number, occupants));
        }
    }
    rounds.push(first);

    for round_number in 2..=total_rounds {
        let mut round = Round::new(round_number, round_name(round_number, total_rounds));
        let match_count = (bracket_size >> round_number) as u32;
        round.matches = (1..=match_count)
            .map(|n| Match::pending(round_number, n, Vec::new()))
            .collect();
        rounds.push(round);
    }

    let bracket_nodes = link_nodes(&rounds);

    debug!(
        "generated bracket: {} competitors, size {}, {} rounds, {} byes",
        competitors.len(),
        bracket_size,
        total_rounds,
        bracket_size - competitors.len()
    );

    Ok(Bracket {
        rounds,
        bracket_nodes,
    })
}

/// Close a finished round and move its winners into the next one.
///
/// Every match of the round must be a bye or completed with a winner. The
/// winners of matches `2j-1` and `2j` meet in match `j` of the next round.
/// Nothing is modified when validation fails.
pub fn advance_bracket(rounds: &mut [Round], round_number: u32) -> Result<(), ValidationError> {
    let index = rounds
        .iter()
        .position(|r| r.round_number == round_number)
        .ok_or(ValidationError::InvalidRoundNumber(round_number))?;

    let not_ready = |reason: String| ValidationError::RoundNotReady {
        round: round_number,
        reason,
    };

    let mut winners = Vec::new();
    let mut losers = Vec::new();
    for m in &rounds[index].matches {
        if m.status == MatchStatus::Pending {
            return Err(not_ready(format!("match {} is still pending", m.id)));
        }
        let winner = m
            .winner_id
            .as_ref()
            .filter(|w| m.involves(w))
            .ok_or_else(|| not_ready(format!("match {} has no winner", m.id)))?;
        winners.push(winner.clone());
        losers.extend(m.competitor_ids.iter().filter(|id| *id != winner).cloned());
    }

    if let Some(next) = rounds.get(index + 1) {
        if next.matches.len() * 2 != winners.len() {
            return Err(not_ready(format!(
                "{} winners cannot fill {} matches",
                winners.len(),
                next.matches.len()
            )));
        }
    }

    let round = &mut rounds[index];
    round.status = RoundStatus::Completed;
    round.advancing_competitor_ids = winners.clone();
    round.eliminated_competitor_ids = losers;

    if let Some(next) = rounds.get_mut(index + 1) {
        for (m, pair) in next.matches.iter_mut().zip(winners.chunks(2)) {
            m.competitor_ids = pair.to_vec();
        }
    }

    debug!("advanced bracket past round {}", round_number);
    Ok(())
}

fn node_id(round_number: u32, match_number: u32) -> String {
    format!("node-{}-{}", round_number, match_number)
}

/// One node per match; match `j` of round `k` feeds match `ceil(j / 2)` of
/// round `k + 1`.
fn link_nodes(rounds: &[Round]) -> Vec<BracketNode> {
    let total_rounds = rounds.len() as u32;
    rounds
        .iter()
        .flat_map(|round| {
            let k = round.round_number;
            round.matches.iter().map(move |m| {
                let j = m.match_number;
                BracketNode {
                    id: node_id(k, j),
                    match_id: m.id.clone(),
                    round_number: k,
                    parent_nodes: if k == 1 {
                        Vec::new()
                    } else {
                        vec![node_id(k - 1, 2 * j - 1), node_id(k - 1, 2 * j)]
                    },
                    child_node: (k < total_rounds).then(|| node_id(k + 1, j.div_ceil(2))),
                }
            })
        })
        .collect()
}

/// Check that seeds map 1:1 onto competitors with numbers 1..=N, and index
/// competitor ids by seed number.
fn validate_seeds<'a>(
    competitors: &'a [Competitor],
    seeds: &'a [Seed],
) -> Result<HashMap<u32, &'a str>, ValidationError> {
    validate_competitors(competitors)?;

    if seeds.len() != competitors.len() {
        return Err(ValidationError::SeedCountMismatch {
            expected: competitors.len(),
            actual: seeds.len(),
        });
    }

    let known: HashSet<&str> = competitors.iter().map(|c| c.id.as_str()).collect();
    let mut seeded = HashSet::new();
    let mut by_seed = HashMap::with_capacity(seeds.len());

    for seed in seeds {
        if seed.seed_number == 0 || seed.seed_number as usize > competitors.len() {
            return Err(ValidationError::SeedOutOfRange {
                seed: seed.seed_number,
                max: competitors.len(),
            });
        }
        if !known.contains(seed.competitor_id.as_str()) {
            return Err(ValidationError::UnknownSeededCompetitor(
                seed.competitor_id.clone(),
            ));
        }
        if !seeded.insert(seed.competitor_id.as_str()) {
            return Err(ValidationError::DuplicateSeededCompetitor(
                seed.competitor_id.clone(),
            ));
        }
        if by_seed
            .insert(seed.seed_number, seed.competitor_id.as_str())
            .is_some()
        {
            return Err(ValidationError::DuplicateSeedNumber(seed.seed_number));
        }
    }

    Ok(by_seed)
}

#[cfg(test)]
#[path = "bracket_tests.rs"]
mod tests;
