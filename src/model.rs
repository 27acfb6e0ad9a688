//! Top-level orchestration of the prediction pipeline: context building, the deterministic
//! baseline, the Monte Carlo simulation, signal fusion and stake sizing, in that order.
//! Each invocation is a pure function of its inputs and the supplied seed.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::context::{SimulationContext, TeamSignals};
use crate::domain::{Fixture, FixtureOdds, HeadToHead, Standing};
use crate::kelly::{KellyCalculator, KellyConfig, KellyResult};
use crate::mastermind::{LlmGradeEnhancement, Mastermind, Thresholds};
use crate::oracle::{Oracle, OracleAnalysis, OracleConfig, OracleError};
use crate::tesseract::{self, Cancellation, SimulationError, Tesseract};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub oracle: OracleConfig,
    pub tesseract: tesseract::Config,
    pub thresholds: Thresholds,
    pub kelly: KellyConfig,
}
impl Config {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.oracle.validate()?;
        self.tesseract.validate()?;
        self.thresholds.validate()?;
        self.kelly.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oracle: OracleConfig::default(),
            tesseract: tesseract::Config::default(),
            thresholds: Thresholds::default(),
            kelly: KellyConfig::default(),
        }
    }
}

/// Everything known about a fixture at analysis time, as resolved by external collaborators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixtureInput {
    pub fixture: Fixture,
    #[serde(default)]
    pub home_standing: Option<Standing>,
    #[serde(default)]
    pub away_standing: Option<Standing>,
    #[serde(default)]
    pub head_to_head: HeadToHead,
    #[serde(default)]
    pub home_signals: Option<TeamSignals>,
    #[serde(default)]
    pub away_signals: Option<TeamSignals>,
    #[serde(default)]
    pub odds: FixtureOdds,
    #[serde(default)]
    pub enhancement: Option<LlmGradeEnhancement>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("{0}")]
    Oracle(#[from] OracleError),

    #[error("{0}")]
    Simulation(#[from] SimulationError),
}

/// The complete structured output for one fixture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixtureAnalysis {
    pub fixture: Fixture,
    pub oracle: OracleAnalysis,
    pub kelly: KellyResult,
}

#[derive(Debug)]
pub struct Analyst {
    oracle: Oracle,
    tesseract: Tesseract,
    mastermind: Mastermind,
    kelly: KellyCalculator,
}
impl Analyst {
    /// Runs the full pipeline for one fixture. The same inputs and seed reproduce the same
    /// analysis; a missing baseline propagates as an error, while missing odds or context
    /// degrade to conservative results downstream.
    pub fn analyse(
        &self,
        input: &FixtureInput,
        seed: u64,
        cancellation: Option<&Cancellation>,
    ) -> Result<FixtureAnalysis, AnalysisError> {
        let context = SimulationContext::from_signals(
            input.home_signals.as_ref(),
            input.away_signals.as_ref(),
        );
        let mut oracle = self.oracle.analyse(
            input.home_standing.as_ref(),
            input.away_standing.as_ref(),
            &input.head_to_head,
        )?;

        let rates = context.adjusted_rates(oracle.expected_goals);
        let tesseract = self.tesseract.simulate(&rates, seed, cancellation)?;
        let signal = self
            .mastermind
            .fuse(&oracle, Some(&tesseract), input.enhancement.as_ref());
        debug!(
            "{} vs {}: {} (confidence {})",
            input.fixture.home_team, input.fixture.away_team, signal.title, signal.confidence
        );

        let probabilities = [
            tesseract.home_win_probability,
            tesseract.draw_probability,
            tesseract.away_win_probability,
        ];
        let kelly = self
            .kelly
            .analyse(&input.fixture, &probabilities, &input.odds, signal.confidence);

        oracle.tesseract = Some(tesseract);
        oracle.simulation_context = Some(context);
        oracle.mastermind = Some(signal);

        Ok(FixtureAnalysis {
            fixture: input.fixture.clone(),
            oracle,
            kelly,
        })
    }
}

impl TryFrom<Config> for Analyst {
    type Error = anyhow::Error;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self {
            oracle: Oracle::try_from(config.oracle)?,
            tesseract: Tesseract::try_from(config.tesseract)?,
            mastermind: Mastermind::try_from(config.thresholds)?,
            kelly: KellyCalculator::try_from(config.kelly)?,
        })
    }
}
