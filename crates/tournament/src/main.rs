//! Tournament CLI
//!
//! Generate brackets and pairings, compute standings, and keep a Glicko-2
//! rating book.

use anyhow::{bail, Context, Result};
use log::{info, warn};
use ranking_core::{
    calculate_round_robin_standings, calculate_swiss_final_standings, generate_bracket,
    generate_round_robin_schedule, generate_swiss_pairings, persist_rating_changes,
    seeds_from_competitors, Competitor, Rating, RatingStore, Round,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tournament::{
    leaderboard_report, rating_changes_report, standings_report, ArenaConfig, RatingBook,
    DEFAULT_CONFIG_PATH,
};

fn print_usage() {
    println!("Tournament Runner");
    println!();
    println!("Usage:");
    println!("  tournament bracket <competitors.json>");
    println!("  tournament round-robin <competitors.json>");
    println!("  tournament swiss <competitors.json> <rounds.json> [--round N]");
    println!("  tournament standings round-robin|swiss <competitors.json> <rounds.json> [--competition ID]");
    println!("  tournament rate <ranks.json> --competition ID");
    println!("  tournament leaderboard");
    println!();
    println!("Options:");
    println!("  --config <path>   Configuration file (default: {})", DEFAULT_CONFIG_PATH);
    println!();
    println!("Files:");
    println!("  competitors.json  [{{\"id\": \"a\", \"name\": \"Alice\", \"seed\": 1}}, ...]");
    println!("  rounds.json       rounds as printed by this tool, with results filled in");
    println!("  ranks.json        {{\"a\": 1, \"b\": 2, ...}}");
}

/// Positional arguments and `--flag value` pairs
struct Args {
    positional: Vec<String>,
    flags: HashMap<String, String>,
}

impl Args {
    fn parse(args: &[String]) -> Result<Self> {
        let mut positional = Vec::new();
        let mut flags = HashMap::new();

        let mut i = 0;
        while i < args.len() {
            match args[i].strip_prefix("--") {
                Some(flag) => {
                    let value = args
                        .get(i + 1)
                        .with_context(|| format!("--{} requires a value", flag))?;
                    flags.insert(flag.to_string(), value.clone());
                    i += 1;
                }
                None => positional.push(args[i].clone()),
            }
            i += 1;
        }

        Ok(Self { positional, flags })
    }

    fn path(&self, index: usize, what: &str) -> Result<&Path> {
        match self.positional.get(index) {
            Some(p) => Ok(Path::new(p)),
            None => bail!("missing {} argument", what),
        }
    }

    fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(args: &Args) -> Result<ArenaConfig> {
    let path = PathBuf::from(args.flag("config").unwrap_or(DEFAULT_CONFIG_PATH));
    ArenaConfig::load(&path)
}

fn run_bracket(args: &Args) -> Result<()> {
    let competitors: Vec<Competitor> = read_json(args.path(0, "competitors")?)?;
    let seeds = seeds_from_competitors(&competitors)?;
    let bracket = generate_bracket(&competitors, &seeds)?;

    info!(
        "bracket for {} competitors: {} rounds",
        competitors.len(),
        bracket.rounds.len()
    );
    print_json(&bracket)
}

fn run_round_robin(args: &Args) -> Result<()> {
    let competitors: Vec<Competitor> = read_json(args.path(0, "competitors")?)?;
    let rounds = generate_round_robin_schedule(&competitors)?;

    info!(
        "round robin for {} competitors: {} rounds",
        competitors.len(),
        rounds.len()
    );
    print_json(&rounds)
}

fn run_swiss(args: &Args) -> Result<()> {
    let competitors: Vec<Competitor> = read_json(args.path(0, "competitors")?)?;
    let prior: Vec<Round> = read_json(args.path(1, "rounds")?)?;
    let round_number = match args.flag("round") {
        Some(n) => n
            .parse::<u32>()
            .with_context(|| format!("invalid round number: {}", n))?,
        None => prior.len() as u32 + 1,
    };

    let round = generate_swiss_pairings(&competitors, &prior, round_number)?;
    info!("swiss round {}: {} matches", round_number, round.matches.len());
    print_json(&round)
}

fn run_standings(args: &Args) -> Result<()> {
    let format = args
        .positional
        .first()
        .context("missing standings format (round-robin or swiss)")?;
    let competitors: Vec<Competitor> = read_json(args.path(1, "competitors")?)?;
    let rounds: Vec<Round> = read_json(args.path(2, "rounds")?)?;

    let (title, standings) = match format.as_str() {
        "round-robin" => (
            "Round robin standings",
            calculate_round_robin_standings(&rounds, &competitors),
        ),
        "swiss" => (
            "Swiss standings",
            calculate_swiss_final_standings(&competitors, &rounds),
        ),
        other => bail!("unknown standings format: {}", other),
    };
    print!("{}", standings_report(title, &standings, &competitors));

    if let Some(competition_id) = args.flag("competition") {
        let config = load_config(args)?;
        let mut book = RatingBook::load_or_default(&config.rating_book)?;
        book.persist_standings(competition_id, &standings)?;
        book.save(&config.rating_book)?;
        info!("stored standings for {}", competition_id);
    }
    Ok(())
}

fn run_rate(args: &Args) -> Result<()> {
    let ranks: HashMap<String, u32> = read_json(args.path(0, "ranks")?)?;
    let competition_id = args
        .flag("competition")
        .context("rate requires --competition ID")?;

    let config = load_config(args)?;
    let engine = config.engine()?;
    let mut book = RatingBook::load_or_default(&config.rating_book)?;

    let mut ids: Vec<&String> = ranks.keys().collect();
    ids.sort();
    let ratings: Vec<Rating> = ids
        .iter()
        .map(|id| book.get_or_default(id, &engine))
        .collect();

    let changes = engine.calculate_multi_player(&ratings, &ranks)?;
    let report = persist_rating_changes(&mut book, competition_id, &changes);

    print!("{}", rating_changes_report(competition_id, &changes));
    if !report.replayed.is_empty() {
        warn!(
            "{} already rated in {}; left unchanged",
            report.replayed.join(", "),
            competition_id
        );
    }
    for (competitor_id, e) in &report.failed {
        warn!("rating for {} not stored: {}", competitor_id, e);
    }

    book.save(&config.rating_book)?;
    info!(
        "{} ratings stored in {}",
        report.persisted.len(),
        config.rating_book.display()
    );
    Ok(())
}

fn show_leaderboard(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    if !config.rating_book.exists() {
        println!("No ratings found. Rate a competition first!");
        return Ok(());
    }
    let book = RatingBook::load(&config.rating_book)?;
    print!("{}", leaderboard_report(&book.leaderboard()));
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let rest = Args::parse(&args[2..])?;
    match args[1].as_str() {
        "bracket" => run_bracket(&rest),
        "round-robin" => run_round_robin(&rest),
        "swiss" => run_swiss(&rest),
        "standings" => run_standings(&rest),
        "rate" => run_rate(&rest),
        "leaderboard" => show_leaderboard(&rest),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage();
            Ok(())
        }
    }
}
