//! Round-robin scheduling by the circle method
//!
//! Position 0 stays fixed while the remaining positions rotate one step per
//! round; position `i` meets position `n - 1 - i`. With an odd field a
//! sentinel slot is added and whoever draws it sits the round out. No match
//! is created for the sit-out.

use log::debug;

use crate::error::ValidationError;
use crate::types::{validate_competitors, Competitor, Match, Round};

/// Generate every round of a single round-robin.
///
/// Each unordered pair of competitors meets exactly once, for C(N, 2)
/// matches in total.
pub fn generate_round_robin_schedule(
    competitors: &[Competitor],
) -> Result<Vec<Round>, ValidationError> {
    validate_competitors(competitors)?;

    // None is the sentinel
    let mut slots: Vec<Option<&str>> = competitors.iter().map(|c| Some(c.id.as_str())).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let working = slots.len();

    let mut rounds = Vec::with_capacity(working - 1);
    for index in 0..working - 1 {
        let round_number = index as u32 + 1;
        let mut round = Round::new(round_number, format!("Round {}", round_number));

        for i in 0..working / 2 {
            if let (Some(a), Some(b)) = (slots[i], slots[working - 1 - i]) {
                let match_number = round.matches.len() as u32 + 1;
                round.matches.push(Match::pending(
                    round_number,
                    match_number,
                    vec![a.to_string(), b.to_string()],
                ));
            }
        }
        rounds.push(round);

        slots[1..].rotate_right(1);
    }

    debug!(
        "generated round-robin: {} competitors, {} rounds, {} matches",
        competitors.len(),
        rounds.len(),
        rounds.iter().map(|r| r.matches.len()).sum::<usize>()
    );

    Ok(rounds)
}

#[cfg(test)]
#[path = "round_robin_tests.rs"]
mod tests;
