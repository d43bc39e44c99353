use super::*;
use crate::types::{Match, MatchResult};

fn field(names: &[&str]) -> Vec<Competitor> {
    names.iter().map(|n| Competitor::new(n, n)).collect()
}

fn played(number: u32, a: (&str, f64), b: (&str, f64), winner: Option<&str>) -> Match {
    let mut m = Match::pending(1, number, vec![a.0.to_string(), b.0.to_string()]);
    m.status = MatchStatus::Completed;
    m.winner_id = winner.map(str::to_string);
    m.results = vec![MatchResult::new(a.0, a.1), MatchResult::new(b.0, b.1)];
    m
}

fn round_of(number: u32, matches: Vec<Match>) -> Round {
    let mut round = Round::new(number, format!("Round {}", number));
    round.matches = matches;
    round
}

fn order(standings: &[Standing]) -> Vec<&str> {
    standings.iter().map(|s| s.competitor_id.as_str()).collect()
}

#[test]
fn test_round_robin_orders_by_wins_then_score() {
    let competitors = field(&["a", "b", "c"]);
    let rounds = vec![
        round_of(1, vec![played(1, ("a", 3.0), ("b", 1.0), Some("a"))]),
        round_of(2, vec![played(1, ("b", 2.0), ("c", 0.0), Some("b"))]),
        round_of(3, vec![played(1, ("c", 5.0), ("a", 4.0), Some("c"))]),
    ];

    let standings = calculate_round_robin_standings(&rounds, &competitors);
    // Everyone has one win; total score decides
    assert_eq!(order(&standings), vec!["a", "c", "b"]);
    assert_eq!(
        standings.iter().map(|s| s.rank).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    let a = &standings[0];
    assert_eq!((a.wins, a.losses, a.ties), (1, 1, 0));
    assert_eq!(a.total_score, 7.0);
    assert!(a.tiebreaker.is_none());
}

#[test]
fn test_round_robin_ignores_unfinished_and_counts_ties() {
    let competitors = field(&["a", "b", "c"]);
    let open = Match::pending(1, 2, vec!["a".to_string(), "c".to_string()]);
    let rounds = vec![round_of(
        1,
        vec![played(1, ("a", 1.0), ("b", 1.0), None), open],
    )];

    let standings = calculate_round_robin_standings(&rounds, &competitors);
    assert_eq!(order(&standings), vec!["a", "b", "c"]);
    assert_eq!(standings[0].ties, 1);
    assert_eq!(standings[1].ties, 1);
    assert_eq!(standings[2].ties + standings[2].wins + standings[2].losses, 0);
}

#[test]
fn test_round_robin_full_tie_keeps_input_order() {
    let competitors = field(&["z", "y", "x"]);
    let standings = calculate_round_robin_standings(&[], &competitors);
    assert_eq!(order(&standings), vec!["z", "y", "x"]);
    assert_eq!(standings[2].rank, 3);
}

#[test]
fn test_swiss_buchholz_breaks_ties() {
    let competitors = field(&["a", "b", "c", "d"]);
    let rounds = vec![
        round_of(
            1,
            vec![
                played(1, ("a", 1.0), ("b", 0.0), Some("a")),
                played(2, ("c", 1.0), ("d", 0.0), Some("c")),
            ],
        ),
        round_of(
            2,
            vec![
                played(1, ("a", 1.0), ("c", 0.0), Some("a")),
                played(2, ("d", 1.0), ("b", 0.0), Some("d")),
            ],
        ),
    ];

    let standings = calculate_swiss_final_standings(&competitors, &rounds);
    // a: 2 pts, c and d: 1 pt, b: 0 pts
    // Buchholz: c met a(2) + d(1) = 3, d met c(1) + b(0) = 1
    assert_eq!(order(&standings), vec!["a", "c", "d", "b"]);
    assert_eq!(standings[1].tiebreaker, Some(3.0));
    assert_eq!(standings[2].tiebreaker, Some(1.0));
    assert_eq!(standings[0].tiebreaker, Some(1.0));
}

#[test]
fn test_swiss_bye_and_draw_points() {
    let competitors = field(&["a", "b", "c"]);
    let rounds = vec![round_of(
        1,
        vec![played(1, ("a", 0.5), ("b", 0.5), None), Match::bye(1, 2, "c")],
    )];

    let standings = calculate_swiss_final_standings(&competitors, &rounds);
    assert_eq!(order(&standings), vec!["c", "a", "b"]);
    assert_eq!(standings[0].wins, 1);
    // Byes have no opponent
    assert_eq!(standings[0].tiebreaker, Some(0.0));
    assert_eq!(standings[1].ties, 1);
    assert_eq!(standings[1].tiebreaker, Some(0.5));
}

#[test]
fn test_standings_serialize_without_internal_fields() {
    let competitors = field(&["a", "b"]);
    let rounds = vec![round_of(1, vec![played(1, ("a", 1.0), ("b", 0.0), Some("a"))])];
    let standings = calculate_swiss_final_standings(&competitors, &rounds);

    let json = serde_json::to_value(&standings[0]).unwrap();
    let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
    assert_eq!(
        keys,
        vec!["competitorId", "losses", "rank", "tiebreaker", "ties", "totalScore", "wins"]
    );
}
