//! Text reports for standings, rating changes and the leaderboard

use ranking_core::{Competitor, Rating, RatingChange, Standing};
use std::collections::{BTreeMap, HashMap};

/// Render a standings table. Names are looked up in `competitors`; ids
/// without a name are shown as-is.
pub fn standings_report(title: &str, standings: &[Standing], competitors: &[Competitor]) -> String {
    let names: HashMap<&str, &str> = competitors
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();
    let with_tiebreaker = standings.iter().any(|s| s.tiebreaker.is_some());

    let mut report = String::new();
    report.push_str(&format!("=== {} ===\n", title));
    report.push_str(&format!(
        "{:>4}  {:<24} {:>4} {:>4} {:>4} {:>8}",
        "Rank", "Competitor", "W", "L", "T", "Score"
    ));
    if with_tiebreaker {
        report.push_str(&format!(" {:>9}", "Buchholz"));
    }
    report.push('\n');
    report.push_str(&"-".repeat(if with_tiebreaker { 64 } else { 54 }));
    report.push('\n');

    for s in standings {
        let name = names
            .get(s.competitor_id.as_str())
            .copied()
            .unwrap_or(&s.competitor_id);
        report.push_str(&format!(
            "{:>4}  {:<24} {:>4} {:>4} {:>4} {:>8.1}",
            s.rank, name, s.wins, s.losses, s.ties, s.total_score
        ));
        if let Some(tiebreaker) = s.tiebreaker {
            report.push_str(&format!(" {:>9.1}", tiebreaker));
        }
        report.push('\n');
    }

    report
}

/// Render the outcome of one rating update, best rank first
pub fn rating_changes_report(
    competition_id: &str,
    changes: &BTreeMap<String, RatingChange>,
) -> String {
    let mut rows: Vec<&RatingChange> = changes.values().collect();
    rows.sort_by(|a, b| {
        a.rank
            .cmp(&b.rank)
            .then_with(|| a.competitor_id.cmp(&b.competitor_id))
    });

    let mut report = String::new();
    report.push_str(&format!("=== Rating update: {} ===\n", competition_id));
    report.push_str(&format!(
        "{:>4}  {:<24} {:>8} {:>8} {:>8} {:>8}\n",
        "Rank", "Competitor", "Before", "After", "Delta", "RD"
    ));
    report.push_str(&"-".repeat(66));
    report.push('\n');

    for change in rows {
        report.push_str(&format!(
            "{:>4}  {:<24} {:>8.0} {:>8.0} {:>+8.0} {:>8.1}",
            change.rank,
            change.competitor_id,
            change.before.rating,
            change.after.rating,
            change.rating_delta,
            change.after.rating_deviation
        ));
        if change.convergence_warning.is_some() {
            report.push_str("  (not converged)");
        }
        report.push('\n');
    }

    report
}

/// Render the leaderboard as produced by [`crate::RatingBook::leaderboard`]
pub fn leaderboard_report(entries: &[&Rating]) -> String {
    let mut report = String::new();
    report.push_str("=== Leaderboard ===\n");
    report.push_str(&format!(
        "{:<30} {:>8} {:>8} {:>8}\n",
        "Competitor", "Rating", "RD", "Played"
    ));
    report.push_str(&"-".repeat(57));
    report.push('\n');

    for rating in entries {
        report.push_str(&format!(
            "{:<30} {:>8.0} {:>8.1} {:>8}\n",
            rating.competitor_id, rating.rating, rating.rating_deviation, rating.matches_played
        ));
    }

    report
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
