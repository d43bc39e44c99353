//! Glicko-2 rating engine
//!
//! Ratings live on the public scale (rating ~1500, deviation up to 350) and
//! are converted to the internal Glicko-2 scale (mu, phi) for the update.
//! New volatility is solved with the Illinois variant of regula falsi, with
//! both the bracketing search and the refinement loop capped.
//!
//! Reference: Mark Glickman, "Example of the Glicko-2 system".

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::f64::consts::PI;

use crate::error::{
    ConvergenceWarning, NumericError, RatingError, SolverStage, ValidationError,
};
use crate::types::Rating;

/// Conversion factor between the public and the internal scale
pub const GLICKO2_SCALE: f64 = 173.7178;

/// Public rating that maps to mu = 0
pub const BASE_RATING: f64 = 1500.0;

/// Tunables of the rating engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glicko2Config {
    pub default_rating: f64,
    pub default_deviation: f64,
    pub default_volatility: f64,
    /// Deviation never grows beyond this
    pub max_deviation: f64,
    /// Ratings never drop below this
    pub rating_floor: f64,
    /// System constant constraining volatility change
    pub tau: f64,
    /// Convergence tolerance of the volatility solver
    pub tolerance: f64,
    /// Iteration cap for each phase of the volatility solver
    pub max_iterations: u32,
}

impl Default for Glicko2Config {
    fn default() -> Self {
        Self {
            default_rating: 1500.0,
            default_deviation: 350.0,
            default_volatility: 0.06,
            max_deviation: 350.0,
            rating_floor: 100.0,
            tau: 0.5,
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Public-scale rating triple fed into a single-period update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glicko2Rating {
    pub rating: f64,
    pub deviation: f64,
    pub volatility: f64,
}

impl From<&Rating> for Glicko2Rating {
    fn from(rating: &Rating) -> Self {
        Self {
            rating: rating.rating,
            deviation: rating.rating_deviation,
            volatility: rating.volatility,
        }
    }
}

/// An opponent as seen by the update: only rating and deviation matter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Opponent {
    pub rating: f64,
    pub deviation: f64,
}

impl From<&Rating> for Opponent {
    fn from(rating: &Rating) -> Self {
        Self {
            rating: rating.rating,
            deviation: rating.rating_deviation,
        }
    }
}

/// Result of a single-period update, already rounded for storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glicko2Update {
    pub rating: f64,
    pub deviation: f64,
    pub volatility: f64,
    pub warning: Option<ConvergenceWarning>,
}

/// Per-competitor outcome of a multi-player update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    pub competitor_id: String,
    pub rank: u32,
    pub before: Rating,
    pub after: Rating,
    pub rating_delta: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convergence_warning: Option<ConvergenceWarning>,
}

/// Public (rating, deviation) to internal (mu, phi)
pub fn to_glicko2_scale(rating: f64, deviation: f64) -> (f64, f64) {
    (
        (rating - BASE_RATING) / GLICKO2_SCALE,
        deviation / GLICKO2_SCALE,
    )
}

/// Internal (mu, phi) to public (rating, deviation)
pub fn from_glicko2_scale(mu: f64, phi: f64) -> (f64, f64) {
    (GLICKO2_SCALE * mu + BASE_RATING, GLICKO2_SCALE * phi)
}

/// Weight that discounts an opponent whose own rating is uncertain
pub fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi * phi / (PI * PI)).sqrt()
}

/// Expected score against opponent j
pub fn expected_score(mu: f64, mu_j: f64, phi_j: f64) -> f64 {
    1.0 / (1.0 + (-g(phi_j) * (mu - mu_j)).exp())
}

/// Score awarded to a competitor ranked `mine` against one ranked `theirs`.
/// Lower rank numbers are better.
pub fn rank_score(mine: u32, theirs: u32) -> f64 {
    match mine.cmp(&theirs) {
        std::cmp::Ordering::Less => 1.0,
        std::cmp::Ordering::Equal => 0.5,
        std::cmp::Ordering::Greater => 0.0,
    }
}

/// Stateless Glicko-2 calculator. Holds only its configuration, so one
/// instance can serve any number of competitions concurrently.
#[derive(Debug, Clone, Default)]
pub struct Glicko2 {
    config: Glicko2Config,
}

impl Glicko2 {
    pub fn new(config: Glicko2Config) -> Result<Self, ValidationError> {
        let finite = [
            config.default_rating,
            config.default_deviation,
            config.default_volatility,
            config.max_deviation,
            config.rating_floor,
            config.tau,
            config.tolerance,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ValidationError::InvalidConfig("values must be finite"));
        }
        if config.tau <= 0.0 {
            return Err(ValidationError::InvalidConfig("tau must be positive"));
        }
        if config.tolerance <= 0.0 {
            return Err(ValidationError::InvalidConfig("tolerance must be positive"));
        }
        if config.max_iterations == 0 {
            return Err(ValidationError::InvalidConfig("max_iterations must be non-zero"));
        }
        if config.default_deviation <= 0.0 || config.max_deviation < config.default_deviation {
            return Err(ValidationError::InvalidConfig(
                "deviations must satisfy 0 < default_deviation <= max_deviation",
            ));
        }
        if config.default_volatility <= 0.0 {
            return Err(ValidationError::InvalidConfig("default_volatility must be positive"));
        }
        if config.default_rating < config.rating_floor {
            return Err(ValidationError::InvalidConfig(
                "default_rating must not be below rating_floor",
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &Glicko2Config {
        &self.config
    }

    /// Rating given to a competitor on first appearance
    pub fn initial_rating(&self, competitor_id: &str) -> Rating {
        Rating {
            competitor_id: competitor_id.to_string(),
            rating: self.config.default_rating,
            rating_deviation: self.config.default_deviation,
            volatility: self.config.default_volatility,
            matches_played: 0,
        }
    }

    /// Probability that `a` beats `b`, discounting both deviations
    pub fn win_probability(&self, a: &Rating, b: &Rating) -> f64 {
        let (mu_a, phi_a) = to_glicko2_scale(a.rating, a.rating_deviation);
        let (mu_b, phi_b) = to_glicko2_scale(b.rating, b.rating_deviation);
        expected_score(mu_a, mu_b, (phi_a * phi_a + phi_b * phi_b).sqrt())
    }

    /// Single rating-period update of one player.
    ///
    /// `scores[j]` is the player's result against `opponents[j]`
    /// (1 win, 0.5 draw, 0 loss). With no opponents only the deviation
    /// grows.
    pub fn calculate(
        &self,
        player: &Glicko2Rating,
        opponents: &[Opponent],
        scores: &[f64],
    ) -> Result<Glicko2Update, RatingError> {
        validate_player(player)?;
        if opponents.len() != scores.len() {
            return Err(ValidationError::OpponentScoreMismatch {
                opponents: opponents.len(),
                scores: scores.len(),
            }
            .into());
        }
        for opponent in opponents {
            require_finite("opponent rating", opponent.rating)?;
            require_finite("opponent deviation", opponent.deviation)?;
            if opponent.deviation < 0.0 {
                return Err(ValidationError::OutOfRange {
                    field: "opponent deviation",
                    value: opponent.deviation,
                }
                .into());
            }
        }
        for &score in scores {
            if !(0.0..=1.0).contains(&score) {
                return Err(ValidationError::ScoreOutOfRange(score).into());
            }
        }

        let (mu, phi) = to_glicko2_scale(player.rating, player.deviation);
        let sigma = player.volatility;

        if opponents.is_empty() {
            let phi_star = (phi * phi + sigma * sigma).sqrt();
            let deviation = (GLICKO2_SCALE * phi_star).min(self.config.max_deviation);
            return Ok(Glicko2Update {
                rating: player.rating,
                deviation: round_to(checked("deviation", deviation)?, 2),
                volatility: sigma,
                warning: None,
            });
        }

        let mut variance_inv = 0.0;
        let mut improvement = 0.0;
        for (opponent, &score) in opponents.iter().zip(scores) {
            let (mu_j, phi_j) = to_glicko2_scale(opponent.rating, opponent.deviation);
            let g_j = g(phi_j);
            let e_j = expected_score(mu, mu_j, phi_j);
            variance_inv += g_j * g_j * e_j * (1.0 - e_j);
            improvement += g_j * (score - e_j);
        }
        let v = checked("variance", 1.0 / variance_inv)?;
        let delta = v * improvement;

        let (new_sigma, warning) = self.solve_volatility(phi, sigma, v, delta);
        let new_sigma = checked("volatility", new_sigma)?;

        let phi_star = (phi * phi + new_sigma * new_sigma).sqrt();
        let new_phi = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();
        let new_mu = mu + new_phi * new_phi * improvement;

        let (rating, deviation) = from_glicko2_scale(new_mu, new_phi);
        let rating = checked("rating", rating)?.max(self.config.rating_floor);
        let deviation = checked("deviation", deviation)?.min(self.config.max_deviation);

        Ok(Glicko2Update {
            rating: rating.round(),
            deviation: round_to(deviation, 2),
            volatility: round_to(new_sigma, 6),
            warning,
        })
    }

    /// Update every ranked competitor of one finished competition.
    ///
    /// Each competitor is scored against every other ranked competitor by
    /// final rank, using everyone's pre-update rating. Competitors missing
    /// from `ranks` are left out of the result.
    pub fn calculate_multi_player(
        &self,
        competitors: &[Rating],
        ranks: &HashMap<String, u32>,
    ) -> Result<BTreeMap<String, RatingChange>, RatingError> {
        let mut seen = HashSet::new();
        for competitor in competitors {
            if !seen.insert(competitor.competitor_id.as_str()) {
                return Err(ValidationError::DuplicateCompetitor(
                    competitor.competitor_id.clone(),
                )
                .into());
            }
        }
        let mut unknown: Vec<&String> = ranks
            .keys()
            .filter(|id| !seen.contains(id.as_str()))
            .collect();
        unknown.sort();
        if let Some(id) = unknown.first() {
            return Err(ValidationError::UnknownRankedCompetitor(id.to_string()).into());
        }

        let ranked: Vec<(&Rating, u32)> = competitors
            .iter()
            .filter_map(|c| match ranks.get(&c.competitor_id) {
                Some(&rank) => Some((c, rank)),
                None => {
                    debug!("{} has no final rank, rating unchanged", c.competitor_id);
                    None
                }
            })
            .collect();

        let mut changes = BTreeMap::new();
        for &(me, my_rank) in &ranked {
            let (opponents, scores): (Vec<Opponent>, Vec<f64>) = ranked
                .iter()
                .filter(|(other, _)| other.competitor_id != me.competitor_id)
                .map(|&(other, rank)| (Opponent::from(other), rank_score(my_rank, rank)))
                .unzip();

            let update = self.calculate(&Glicko2Rating::from(me), &opponents, &scores)?;
            let after = Rating {
                competitor_id: me.competitor_id.clone(),
                rating: update.rating,
                rating_deviation: update.deviation,
                volatility: update.volatility,
                matches_played: me.matches_played.saturating_add(1),
            };
            changes.insert(
                me.competitor_id.clone(),
                RatingChange {
                    competitor_id: me.competitor_id.clone(),
                    rank: my_rank,
                    rating_delta: after.rating - me.rating,
                    before: me.clone(),
                    after,
                    convergence_warning: update.warning,
                },
            );
        }

        debug!("rated {} competitors", changes.len());
        Ok(changes)
    }

    /// Root of the Glicko-2 volatility function by the Illinois method.
    /// Returns the new volatility and a warning if a cap was hit.
    fn solve_volatility(
        &self,
        phi: f64,
        sigma: f64,
        v: f64,
        delta: f64,
    ) -> (f64, Option<ConvergenceWarning>) {
        let tau = self.config.tau;
        let cap = self.config.max_iterations;
        let phi2 = phi * phi;
        let a = (sigma * sigma).ln();

        let f = |x: f64| {
            let ex = x.exp();
            ex * (delta * delta - phi2 - v - ex) / (2.0 * (phi2 + v + ex).powi(2))
                - (x - a) / (tau * tau)
        };

        let mut warning = None;

        let mut lower = a;
        let mut upper = if delta * delta > phi2 + v {
            (delta * delta - phi2 - v).ln()
        } else {
            let mut k = 1;
            while f(a - k as f64 * tau) < 0.0 {
                if k >= cap {
                    warning = Some(ConvergenceWarning {
                        stage: SolverStage::Bracketing,
                        iterations: k,
                    });
                    break;
                }
                k += 1;
            }
            a - k as f64 * tau
        };

        let mut f_lower = f(lower);
        let mut f_upper = f(upper);
        let mut iterations = 0;
        while (upper - lower).abs() > self.config.tolerance {
            if iterations >= cap {
                warning = warning.or(Some(ConvergenceWarning {
                    stage: SolverStage::Refinement,
                    iterations,
                }));
                break;
            }
            iterations += 1;

            let c = lower + (lower - upper) * f_lower / (f_upper - f_lower);
            let f_c = f(c);
            if f_c == 0.0 {
                lower = c;
                break;
            }
            if f_c * f_upper < 0.0 {
                lower = upper;
                f_lower = f_upper;
            } else {
                f_lower /= 2.0;
            }
            upper = c;
            f_upper = f_c;
        }

        if let Some(warning) = &warning {
            warn!("{}", warning);
        }

        ((lower / 2.0).exp(), warning)
    }
}

/// Single-period update with the default configuration
pub fn calculate_glicko2(
    player: &Glicko2Rating,
    opponents: &[Opponent],
    scores: &[f64],
) -> Result<Glicko2Update, RatingError> {
    Glicko2::default().calculate(player, opponents, scores)
}

/// Multi-player update with the default configuration
pub fn calculate_multi_player_glicko2(
    competitors: &[Rating],
    ranks: &HashMap<String, u32>,
) -> Result<BTreeMap<String, RatingChange>, RatingError> {
    Glicko2::default().calculate_multi_player(competitors, ranks)
}

fn validate_player(player: &Glicko2Rating) -> Result<(), ValidationError> {
    require_finite("rating", player.rating)?;
    require_finite("deviation", player.deviation)?;
    require_finite("volatility", player.volatility)?;
    if player.deviation < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "deviation",
            value: player.deviation,
        });
    }
    if player.volatility <= 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "volatility",
            value: player.volatility,
        });
    }
    Ok(())
}

fn require_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite { field, value })
    }
}

fn checked(quantity: &'static str, value: f64) -> Result<f64, NumericError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NumericError { quantity })
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
#[path = "glicko2_tests.rs"]
mod tests;
