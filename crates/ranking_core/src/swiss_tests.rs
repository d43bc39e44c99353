use super::*;
use crate::types::MatchResult;

fn field(names: &[&str]) -> Vec<Competitor> {
    names.iter().map(|n| Competitor::new(n, n)).collect()
}

fn decided(round: u32, number: u32, winner: &str, loser: &str) -> Match {
    let mut m = Match::pending(round, number, vec![winner.to_string(), loser.to_string()]);
    m.status = MatchStatus::Completed;
    m.winner_id = Some(winner.to_string());
    m.results = vec![MatchResult::new(winner, 1.0), MatchResult::new(loser, 0.0)];
    m
}

fn drawn(round: u32, number: u32, a: &str, b: &str) -> Match {
    let mut m = Match::pending(round, number, vec![a.to_string(), b.to_string()]);
    m.status = MatchStatus::Completed;
    m.results = vec![MatchResult::new(a, 0.5), MatchResult::new(b, 0.5)];
    m
}

fn round_of(number: u32, matches: Vec<Match>) -> Round {
    let mut round = Round::new(number, format!("Round {}", number));
    round.matches = matches;
    round
}

fn pairings(round: &Round) -> Vec<Vec<&str>> {
    round
        .matches
        .iter()
        .map(|m| m.competitor_ids.iter().map(String::as_str).collect())
        .collect()
}

#[test]
fn test_first_round_pairs_from_the_top() {
    let competitors = field(&["a", "b", "c", "d"]);
    let round = generate_swiss_pairings(&competitors, &[], 1).unwrap();

    assert_eq!(round.id, "round-1");
    assert_eq!(round.name, "Round 1");
    assert_eq!(pairings(&round), vec![vec!["a", "b"], vec!["c", "d"]]);
    assert_eq!(round.matches[1].id, "match-1-2");
    assert!(round.matches.iter().all(|m| m.round_id == "round-1"));
}

#[test]
fn test_second_round_follows_scores() {
    let competitors = field(&["a", "b", "c", "d"]);
    let first = round_of(1, vec![decided(1, 1, "a", "b"), decided(1, 2, "d", "c")]);

    let round = generate_swiss_pairings(&competitors, &[first], 2).unwrap();
    assert_eq!(pairings(&round), vec![vec!["a", "d"], vec!["b", "c"]]);
}

#[test]
fn test_backtracks_instead_of_rematching() {
    let competitors = field(&["a", "b", "c", "d", "e", "f"]);
    let first = round_of(
        1,
        vec![drawn(1, 1, "a", "c"), drawn(1, 2, "b", "d"), drawn(1, 3, "e", "f")],
    );

    // Greedy would leave e and f for each other again
    let round = generate_swiss_pairings(&competitors, &[first], 2).unwrap();
    assert_eq!(
        pairings(&round),
        vec![vec!["a", "b"], vec!["c", "e"], vec!["d", "f"]]
    );
}

#[test]
fn test_allows_rematch_when_unavoidable() {
    let competitors = field(&["a", "b"]);
    let first = round_of(1, vec![decided(1, 1, "a", "b")]);

    let round = generate_swiss_pairings(&competitors, &[first], 2).unwrap();
    assert_eq!(pairings(&round), vec![vec!["a", "b"]]);
}

#[test]
fn test_bye_goes_to_lowest_score() {
    let competitors = field(&["a", "b", "c", "d", "e"]);
    let first = generate_swiss_pairings(&competitors, &[], 1).unwrap();

    let bye = first.matches.last().unwrap();
    assert!(bye.is_bye);
    assert_eq!(bye.status, MatchStatus::Bye);
    assert_eq!(bye.competitor_ids, vec!["e"]);
    assert_eq!(bye.winner_id.as_deref(), Some("e"));
    assert_eq!(bye.match_number, 3);

    // e now has a point; the bye moves to the lowest scorer without one
    let first = round_of(
        1,
        vec![decided(1, 1, "a", "b"), decided(1, 2, "c", "d"), bye.clone()],
    );
    let second = generate_swiss_pairings(&competitors, &[first], 2).unwrap();
    let bye = second.matches.iter().find(|m| m.is_bye).unwrap();
    assert_eq!(bye.competitor_ids, vec!["d"]);
}

#[test]
fn test_bye_moves_up_to_avoid_a_rematch() {
    let competitors = field(&["a", "b", "c", "d", "e"]);
    let history = vec![
        round_of(
            1,
            vec![drawn(1, 1, "a", "b"), drawn(1, 2, "c", "d"), Match::bye(1, 3, "e")],
        ),
        round_of(
            2,
            vec![decided(2, 1, "e", "a"), decided(2, 2, "c", "b"), Match::bye(2, 3, "d")],
        ),
        round_of(
            3,
            vec![drawn(3, 1, "e", "c"), drawn(3, 2, "d", "a"), Match::bye(3, 3, "b")],
        ),
    ];

    // Scores e 2.5, c 2, d 2, b 1.5, a 1. A bye for a or c strands c or a
    // with past opponents only, so b takes a second bye instead.
    let round = generate_swiss_pairings(&competitors, &history, 4).unwrap();
    assert_eq!(
        pairings(&round),
        vec![vec!["e", "d"], vec!["c", "a"], vec!["b"]]
    );

    let mut seen = HashSet::new();
    for m in history.iter().flat_map(|r| &r.matches).filter(|m| !m.is_bye) {
        let mut pair = m.competitor_ids.clone();
        pair.sort();
        seen.insert(pair);
    }
    for m in round.matches.iter().filter(|m| !m.is_bye) {
        let mut pair = m.competitor_ids.clone();
        pair.sort();
        assert!(!seen.contains(&pair), "rematch {:?}", pair);
    }
}

#[test]
fn test_match_points() {
    let win = decided(1, 1, "a", "b");
    assert_eq!(match_points(&win), vec![("a", 1.0), ("b", 0.0)]);

    let draw = drawn(1, 1, "a", "b");
    assert_eq!(match_points(&draw), vec![("a", 0.5), ("b", 0.5)]);

    let bye = Match::bye(1, 1, "c");
    assert_eq!(match_points(&bye), vec![("c", 1.0)]);

    let open = Match::pending(1, 1, vec!["a".to_string(), "b".to_string()]);
    assert!(match_points(&open).is_empty());
}

#[test]
fn test_rejects_round_zero() {
    let competitors = field(&["a", "b"]);
    assert_eq!(
        generate_swiss_pairings(&competitors, &[], 0),
        Err(ValidationError::InvalidRoundNumber(0))
    );
}
