use super::*;

#[test]
fn test_empty_config_uses_defaults() {
    let config = ArenaConfig::from_toml_str("").unwrap();
    assert_eq!(config, ArenaConfig::default());
    assert_eq!(config.rating.tau, 0.5);
    assert_eq!(config.rating_book, PathBuf::from(DEFAULT_RATING_BOOK));
}

#[test]
fn test_partial_rating_section() {
    let config = ArenaConfig::from_toml_str(
        r#"
rating_book = "league/ratings.json"

[rating]
tau = 0.3
rating_floor = 0.0
"#,
    )
    .unwrap();

    assert_eq!(config.rating.tau, 0.3);
    assert_eq!(config.rating.rating_floor, 0.0);
    // Untouched fields keep their defaults
    assert_eq!(config.rating.default_rating, 1500.0);
    assert_eq!(config.rating.max_iterations, 100);
    assert_eq!(config.rating_book, PathBuf::from("league/ratings.json"));
    assert!(config.engine().is_ok());
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(ArenaConfig::from_toml_str("[rating]\ntau = \"high\"").is_err());

    let config = ArenaConfig::from_toml_str("[rating]\ntau = -1.0").unwrap();
    assert!(matches!(
        config.engine(),
        Err(ValidationError::InvalidConfig(_))
    ));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let path = std::env::temp_dir().join("tournament_config_missing_4f1c.toml");
    let _ = std::fs::remove_file(&path);
    assert_eq!(ArenaConfig::load(&path).unwrap(), ArenaConfig::default());
}

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join("tournament_config_load_9a2e.toml");
    std::fs::write(&path, "[rating]\ndefault_rating = 1200.0\n").unwrap();

    let config = ArenaConfig::load(&path).unwrap();
    assert_eq!(config.rating.default_rating, 1200.0);
    assert_eq!(config.engine().unwrap().initial_rating("x").rating, 1200.0);

    std::fs::remove_file(&path).unwrap();
}
