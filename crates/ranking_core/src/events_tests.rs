use super::*;
use crate::bracket::generate_bracket;
use crate::types::{Competitor, RoundStatus, Seed};

fn four_player_rounds() -> Vec<Round> {
    let competitors: Vec<Competitor> = ["a", "b", "c", "d"]
        .iter()
        .map(|id| Competitor::new(id, id))
        .collect();
    let seeds: Vec<Seed> = competitors
        .iter()
        .enumerate()
        .map(|(i, c)| Seed::new(&c.id, i as u32 + 1))
        .collect();
    generate_bracket(&competitors, &seeds).unwrap().rounds
}

fn completed(match_id: &str, winner: &str, loser: &str) -> CompetitionEvent {
    CompetitionEvent::MatchCompleted {
        competition_id: "cup".to_string(),
        match_id: match_id.to_string(),
        winner_id: Some(winner.to_string()),
        results: vec![MatchResult::new(winner, 2.0), MatchResult::new(loser, 1.0)],
    }
}

#[test]
fn test_events_parse_from_tagged_json() {
    let json = r#"[
        {"type": "matchCompleted", "competitionId": "cup", "matchId": "match-1-1",
         "winnerId": "a", "results": [{"competitorId": "a", "score": 1.0}]},
        {"type": "roundCompleted", "competitionId": "cup", "roundNumber": 1},
        {"type": "competitionFinished", "competitionId": "cup", "finalRanks": {"a": 1, "d": 2}}
    ]"#;
    let events: Vec<CompetitionEvent> = serde_json::from_str(json).unwrap();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.competition_id() == "cup"));
    assert!(events.iter().all(|e| e.validate().is_ok()));
    assert!(matches!(
        &events[1],
        CompetitionEvent::RoundCompleted { round_number: 1, .. }
    ));
}

#[test]
fn test_unknown_event_type_is_rejected() {
    let json = r#"{"type": "walletCredited", "competitionId": "cup"}"#;
    assert!(serde_json::from_str::<CompetitionEvent>(json).is_err());
}

#[test]
fn test_validate_rejects_malformed() {
    let empty_id = CompetitionEvent::RoundCompleted {
        competition_id: String::new(),
        round_number: 1,
    };
    assert!(matches!(
        empty_id.validate(),
        Err(ValidationError::MalformedEvent(_))
    ));

    let nan = CompetitionEvent::MatchCompleted {
        competition_id: "cup".to_string(),
        match_id: "match-1-1".to_string(),
        winner_id: None,
        results: vec![MatchResult::new("a", f64::NAN)],
    };
    assert!(matches!(
        nan.validate(),
        Err(ValidationError::NonFinite { .. })
    ));

    let no_ranks = CompetitionEvent::CompetitionFinished {
        competition_id: "cup".to_string(),
        final_ranks: BTreeMap::new(),
    };
    assert!(no_ranks.validate().is_err());
}

#[test]
fn test_events_drive_a_bracket() {
    let mut rounds = four_player_rounds();

    // Seeds 1v4 and 2v3
    completed("match-1-1", "a", "d").apply(&mut rounds).unwrap();
    completed("match-1-2", "c", "b").apply(&mut rounds).unwrap();
    CompetitionEvent::RoundCompleted {
        competition_id: "cup".to_string(),
        round_number: 1,
    }
    .apply(&mut rounds)
    .unwrap();

    assert_eq!(rounds[0].status, RoundStatus::Completed);
    assert_eq!(rounds[1].matches[0].competitor_ids, vec!["a", "c"]);

    completed("match-2-1", "c", "a").apply(&mut rounds).unwrap();
    assert_eq!(rounds[1].matches[0].winner_id.as_deref(), Some("c"));
    assert_eq!(rounds[1].matches[0].score_of("c"), 2.0);
}

#[test]
fn test_record_rejects_bad_results() {
    let mut rounds = four_player_rounds();

    assert_eq!(
        record_match_result(&mut rounds, "match-9-9", None, Vec::new()),
        Err(ValidationError::UnknownMatch("match-9-9".to_string()))
    );
    assert!(matches!(
        record_match_result(&mut rounds, "match-1-1", Some("b"), Vec::new()),
        Err(ValidationError::MalformedEvent(_))
    ));
    assert!(matches!(
        record_match_result(
            &mut rounds,
            "match-1-1",
            Some("a"),
            vec![MatchResult::new("c", 1.0)]
        ),
        Err(ValidationError::MalformedEvent(_))
    ));
    // Final has no competitors yet
    assert!(matches!(
        record_match_result(&mut rounds, "match-2-1", None, Vec::new()),
        Err(ValidationError::RoundNotReady { round: 2, .. })
    ));

    record_match_result(&mut rounds, "match-1-1", None, Vec::new()).unwrap();
    assert!(record_match_result(&mut rounds, "match-1-1", Some("a"), Vec::new()).is_err());
}
