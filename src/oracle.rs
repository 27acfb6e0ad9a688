//! The deterministic baseline predictor. Reduces each side's league standing to a bounded
//! "power" score, maps the power differential through a fixed curve to an expected-goal
//! pair, and reports a confidence percentage that grows with the margin between the sides
//! and the depth of head-to-head history. Never guesses: without standings for both sides
//! it signals insufficient data instead of fabricating a scoreline.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::context::SimulationContext;
use crate::domain::{HeadToHead, Outcome, Score, Standing, TeamRates};
use crate::mastermind::MastermindSignal;
use crate::tesseract::TesseractResult;

/// League-average goal expectancy for the home side at power parity.
const BASE_HOME_GOALS: f64 = 1.35;

/// League-average goal expectancy for the away side at power parity.
const BASE_AWAY_GOALS: f64 = 1.10;

/// Goals added to the stronger side's expectancy per unit of power differential.
const ATTACK_SLOPE: f64 = 1.8;

/// Goals removed from the weaker side's expectancy per unit of power differential.
const SUPPRESS_SLOPE: f64 = 0.8;

const XG_BOUNDS: std::ops::RangeInclusive<f64> = 0.2..=4.0;
const MAX_POINTS_PER_GAME: f64 = 3.0;
const MAX_GOAL_DIFF_PER_GAME: f64 = 3.0;
const H2H_CONFIDENCE_PER_MATCH: f64 = 2.0;
const H2H_CONFIDENCE_CAP: f64 = 10.0;
const CONFIDENCE_CAP: f64 = 95.0;
const DRAW_CONFIDENCE_FLOOR: f64 = 40.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("standings unavailable for {0}")]
    InsufficientData(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Weight of league position in the power blend.
    pub rank_weight: f64,
    /// Weight of points-per-game in the power blend.
    pub points_weight: f64,
    /// Weight of goal-difference-per-game in the power blend.
    pub goal_diff_weight: f64,
    /// Teams in the league, for normalising rank.
    pub league_size: u16,
    /// Power differentials inside this margin are treated as exact parity.
    pub parity_margin: f64,
}
impl OracleConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for &weight in &[self.rank_weight, self.points_weight, self.goal_diff_weight] {
            if !(0.0..=1.0).contains(&weight) {
                bail!("power weights must lie in [0, 1]");
            }
        }
        let sum = self.rank_weight + self.points_weight + self.goal_diff_weight;
        if f64::abs(sum - 1.0) > 1e-9 {
            bail!("power weights must sum to 1, got {sum}");
        }
        if self.league_size < 2 {
            bail!("league must contain at least two teams");
        }
        if !(0.0..0.5).contains(&self.parity_margin) {
            bail!("parity margin must lie in [0, 0.5)");
        }
        Ok(())
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            rank_weight: 0.35,
            points_weight: 0.40,
            goal_diff_weight: 0.25,
            league_size: 20,
            parity_margin: 0.01,
        }
    }
}

/// The baseline analysis, later enriched in place by the orchestrator with the simulation
/// and fused-signal results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OracleAnalysis {
    pub predicted_score: Score,
    /// Percentage in `[0, 100]`.
    pub confidence: u8,
    pub reasoning: String,
    /// The power-derived expected-goal pair handed to the simulator.
    pub expected_goals: TeamRates,
    pub tesseract: Option<TesseractResult>,
    pub simulation_context: Option<SimulationContext>,
    pub mastermind: Option<MastermindSignal>,
}
impl OracleAnalysis {
    pub fn implied_outcome(&self) -> Outcome {
        self.predicted_score.outcome()
    }
}

#[derive(Debug)]
pub struct Oracle {
    config: OracleConfig,
}
impl Oracle {
    pub fn analyse(
        &self,
        home: Option<&Standing>,
        away: Option<&Standing>,
        h2h: &HeadToHead,
    ) -> Result<OracleAnalysis, OracleError> {
        let home = home.ok_or_else(|| OracleError::InsufficientData("home side".into()))?;
        let away = away.ok_or_else(|| OracleError::InsufficientData("away side".into()))?;

        let home_power = self.power(home);
        let away_power = self.power(away);
        let differential = home_power - away_power;
        let expected_goals = expected_goals(differential);
        debug!(
            "power {home_power:.3} vs {away_power:.3}, differential {differential:+.3}, \
             expected goals {:.2}/{:.2}",
            expected_goals.home, expected_goals.away
        );

        let h2h_bonus = f64::min(
            h2h.total() as f64 * H2H_CONFIDENCE_PER_MATCH,
            H2H_CONFIDENCE_CAP,
        );
        let parity = f64::abs(differential) <= self.config.parity_margin;
        let (predicted_score, confidence) = if parity {
            // a parity call is still informative, but its confidence bottoms out at the floor
            let confidence = DRAW_CONFIDENCE_FLOOR + h2h_bonus;
            (Score::new(1, 1), confidence)
        } else {
            let predicted_score = Score::new(
                expected_goals.home.round() as u8,
                expected_goals.away.round() as u8,
            );
            let confidence = 50.0 + f64::abs(differential) * 80.0 + h2h_bonus;
            (predicted_score, confidence)
        };
        let confidence = confidence.clamp(0.0, CONFIDENCE_CAP).round() as u8;

        let reasoning = format!(
            "power {home_power:.2} vs {away_power:.2} (differential {differential:+.2}); \
             {} head-to-head meetings on record",
            h2h.total()
        );

        Ok(OracleAnalysis {
            predicted_score,
            confidence,
            reasoning,
            expected_goals,
            tesseract: None,
            simulation_context: None,
            mastermind: None,
        })
    }

    /// Weighted blend of rank position, points-per-game and goal-difference-per-game, each
    /// normalised to `[0, 1]`.
    fn power(&self, standing: &Standing) -> f64 {
        let league_size = self.config.league_size as f64;
        let rank = f64::min(standing.rank as f64, league_size);
        let rank_component = (league_size - rank) / (league_size - 1.0);
        let points_component = (standing.points_per_game() / MAX_POINTS_PER_GAME).clamp(0.0, 1.0);
        let goal_diff_component =
            (standing.goal_difference_per_game() / MAX_GOAL_DIFF_PER_GAME / 2.0 + 0.5)
                .clamp(0.0, 1.0);
        self.config.rank_weight * rank_component
            + self.config.points_weight * points_component
            + self.config.goal_diff_weight * goal_diff_component
    }
}

impl TryFrom<OracleConfig> for Oracle {
    type Error = anyhow::Error;

    fn try_from(config: OracleConfig) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self { config })
    }
}

fn expected_goals(differential: f64) -> TeamRates {
    let home = BASE_HOME_GOALS + ATTACK_SLOPE * differential;
    let away = BASE_AWAY_GOALS - SUPPRESS_SLOPE * differential;
    TeamRates::new(
        home.clamp(*XG_BOUNDS.start(), *XG_BOUNDS.end()),
        away.clamp(*XG_BOUNDS.start(), *XG_BOUNDS.end()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle() -> Oracle {
        Oracle::try_from(OracleConfig::default()).unwrap()
    }

    fn standing(rank: u16, played: u16, points: u16, goal_difference: i32) -> Standing {
        Standing {
            rank,
            played,
            points,
            goal_difference,
        }
    }

    #[test]
    fn missing_standings_are_insufficient_data() {
        let oracle = oracle();
        let known = standing(1, 10, 25, 15);
        assert_eq!(
            Err(OracleError::InsufficientData("home side".into())),
            oracle.analyse(None, None, &HeadToHead::default())
        );
        assert_eq!(
            Err(OracleError::InsufficientData("away side".into())),
            oracle.analyse(Some(&known), None, &HeadToHead::default())
        );
        assert_eq!(
            Err(OracleError::InsufficientData("home side".into())),
            oracle.analyse(None, Some(&known), &HeadToHead::default())
        );
    }

    #[test]
    fn clear_favourite_predicted_to_win() {
        let oracle = oracle();
        let analysis = oracle
            .analyse(
                Some(&standing(1, 10, 26, 18)),
                Some(&standing(18, 10, 6, -14)),
                &HeadToHead::default(),
            )
            .unwrap();
        assert_eq!(Outcome::HomeWin, analysis.implied_outcome());
        assert!(analysis.expected_goals.home > analysis.expected_goals.away);
        assert!(analysis.confidence >= 60);
        assert!(analysis.confidence <= 95);
    }

    #[test]
    fn parity_maps_to_draw_with_floored_confidence() {
        let oracle = oracle();
        let side = standing(8, 10, 15, 0);
        let analysis = oracle
            .analyse(Some(&side), Some(&side), &HeadToHead::default())
            .unwrap();
        assert_eq!(Score::new(1, 1), analysis.predicted_score);
        assert_eq!(Outcome::Draw, analysis.implied_outcome());
        assert_eq!(40, analysis.confidence);
    }

    #[test]
    fn head_to_head_depth_raises_confidence() {
        let oracle = oracle();
        let home = standing(2, 10, 22, 10);
        let away = standing(12, 10, 12, -4);
        let shallow = oracle
            .analyse(Some(&home), Some(&away), &HeadToHead::default())
            .unwrap();
        let deep = oracle
            .analyse(
                Some(&home),
                Some(&away),
                &HeadToHead {
                    home_wins: 5,
                    draws: 3,
                    away_wins: 2,
                },
            )
            .unwrap();
        assert!(deep.confidence > shallow.confidence);
        assert!(deep.confidence as i16 - shallow.confidence as i16 <= 10);
    }

    #[test]
    fn analysis_is_deterministic() {
        let oracle = oracle();
        let home = standing(3, 12, 24, 8);
        let away = standing(9, 12, 16, -1);
        let h2h = HeadToHead {
            home_wins: 2,
            draws: 1,
            away_wins: 1,
        };
        let first = oracle.analyse(Some(&home), Some(&away), &h2h).unwrap();
        let second = oracle.analyse(Some(&home), Some(&away), &h2h).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn config_rejects_mismatched_weights() {
        let config = OracleConfig {
            rank_weight: 0.5,
            points_weight: 0.5,
            goal_diff_weight: 0.5,
            ..OracleConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(Oracle::try_from(config).is_err());
    }

    #[test]
    fn config_rejects_degenerate_league() {
        let config = OracleConfig {
            league_size: 1,
            ..OracleConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
