//! The Monte Carlo match simulator. Runs N independent trials of a fixture, each drawing a
//! scoreline from the two sides' adjusted expected-goal rates, and aggregates the trials
//! into outcome probabilities, a score-frequency distribution and derived goal markets.
//!
//! Trials are partitioned into batches: each batch owns an RNG seeded from the run seed and
//! the batch index, and batches reduce by summing integer tallies. A fixed seed therefore
//! reproduces a bit-identical result regardless of how the batches are scheduled across
//! threads. Probabilities are integer trial counts divided by N, so the win/draw/lose triple
//! partitions exactly to 1.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::bail;
use ordinalizer::Ordinal;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tinyrand::{Seeded, StdRand};
use tracing::debug;

use crate::domain::{Outcome, Score, TeamRates};
use crate::mc;

pub const DEFAULT_TRIALS: u64 = 10_000;
pub const DEFAULT_TOP_SCORES: usize = 3;
pub const DEFAULT_BATCH_SIZE: u64 = 1_000;

/// Spreads consecutive batch indexes into well-separated RNG seeds.
const SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of independent trials per simulation.
    pub trials: u64,
    /// Number of scorelines exposed in the reported distribution.
    pub top_scores: usize,
    /// Trials per batch; cancellation is checked between batches.
    pub batch_size: u64,
}
impl Config {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.trials == 0 {
            bail!("at least one trial is required");
        }
        if self.top_scores == 0 {
            bail!("at least one scoreline must be reported");
        }
        if self.batch_size == 0 {
            bail!("batch size cannot be zero");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            top_scores: DEFAULT_TOP_SCORES,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Shared flag for aborting an in-flight simulation. A cancelled run yields
/// [`SimulationError::Cancelled`], never a partial (and therefore biased) result.
#[derive(Clone, Debug, Default)]
pub struct Cancellation(Arc<AtomicBool>);
impl Cancellation {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("simulation cancelled before completion")]
    Cancelled,

    #[error("non-positive or non-finite expected-goal rates")]
    InvalidRates,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreFrequency {
    pub score: Score,
    pub frequency: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TesseractResult {
    pub home_win_probability: f64,
    pub draw_probability: f64,
    pub away_win_probability: f64,
    pub most_likely_score: Score,
    pub simulation_count: u64,
    /// Fraction of trials in which both sides scored.
    pub btts_probability: f64,
    /// Fraction of trials with three or more total goals.
    pub over_2_5_probability: f64,
    /// The most frequent scorelines, ordered by descending frequency (ties broken by
    /// ascending scoreline so seeded runs render identically).
    pub top_score_distribution: Vec<ScoreFrequency>,
}
impl TesseractResult {
    pub fn outcome_probability(&self, outcome: &Outcome) -> f64 {
        match outcome {
            Outcome::HomeWin => self.home_win_probability,
            Outcome::Draw => self.draw_probability,
            Outcome::AwayWin => self.away_win_probability,
        }
    }

    /// The simulator's verdict: the highest-probability outcome (preferring the earlier of
    /// home/draw/away on an exact tie) and its probability.
    pub fn most_probable_outcome(&self) -> (Outcome, f64) {
        let mut best = Outcome::HomeWin;
        let mut best_prob = self.home_win_probability;
        for outcome in [Outcome::Draw, Outcome::AwayWin] {
            let prob = self.outcome_probability(&outcome);
            if prob > best_prob {
                best = outcome;
                best_prob = prob;
            }
        }
        (best, best_prob)
    }

    pub fn btts_no_probability(&self) -> f64 {
        1.0 - self.btts_probability
    }

    pub fn under_2_5_probability(&self) -> f64 {
        1.0 - self.over_2_5_probability
    }
}

#[derive(Debug, Default)]
struct Tally {
    outcomes: [u64; Outcome::COUNT],
    btts: u64,
    over_2_5: u64,
    scores: FxHashMap<Score, u64>,
}
impl Tally {
    #[inline]
    fn record(&mut self, score: Score) {
        self.outcomes[score.outcome().ordinal()] += 1;
        if score.home >= 1 && score.away >= 1 {
            self.btts += 1;
        }
        if score.total() > 2 {
            self.over_2_5 += 1;
        }
        *self.scores.entry(score).or_insert(0) += 1;
    }

    fn merge(mut self, other: Tally) -> Tally {
        for (ordinal, count) in other.outcomes.into_iter().enumerate() {
            self.outcomes[ordinal] += count;
        }
        self.btts += other.btts;
        self.over_2_5 += other.over_2_5;
        for (score, count) in other.scores {
            *self.scores.entry(score).or_insert(0) += count;
        }
        self
    }
}

#[derive(Debug)]
pub struct Tesseract {
    config: Config,
}
impl Tesseract {
    /// Runs the full set of trials for the given adjusted rates. The same `seed` with the
    /// same inputs reproduces a bit-identical result; production callers should supply a
    /// fresh seed per invocation.
    pub fn simulate(
        &self,
        rates: &TeamRates,
        seed: u64,
        cancellation: Option<&Cancellation>,
    ) -> Result<TesseractResult, SimulationError> {
        if !rates.is_valid() {
            return Err(SimulationError::InvalidRates);
        }

        let start = Instant::now();
        let trials = self.config.trials;
        let batch_size = self.config.batch_size;
        let batches = trials.div_ceil(batch_size);
        let aborted = AtomicBool::new(false);

        let tally = (0..batches)
            .into_par_iter()
            .map(|batch| {
                if cancellation.is_some_and(Cancellation::is_cancelled) {
                    aborted.store(true, Ordering::Relaxed);
                    return Tally::default();
                }
                let remaining = trials - batch * batch_size;
                let len = u64::min(batch_size, remaining);
                let mut rand = StdRand::seed(seed ^ (batch + 1).wrapping_mul(SEED_STRIDE));
                let mut tally = Tally::default();
                for _ in 0..len {
                    tally.record(mc::run_once(rates, &mut rand));
                }
                tally
            })
            .reduce(Tally::default, Tally::merge);

        if aborted.load(Ordering::Relaxed) {
            return Err(SimulationError::Cancelled);
        }

        let elapsed = start.elapsed();
        debug!("{trials} trials in {batches} batches took {elapsed:?}");
        debug_assert_eq!(trials, tally.outcomes.iter().sum::<u64>());

        Ok(self.aggregate(tally, trials))
    }

    fn aggregate(&self, tally: Tally, trials: u64) -> TesseractResult {
        let mut frequencies: Vec<_> = tally.scores.into_iter().collect();
        frequencies
            .sort_unstable_by(|(score_a, freq_a), (score_b, freq_b)| {
                freq_b.cmp(freq_a).then_with(|| score_a.cmp(score_b))
            });
        let most_likely_score = frequencies[0].0.clone();
        let top_score_distribution = frequencies
            .into_iter()
            .take(self.config.top_scores)
            .map(|(score, frequency)| ScoreFrequency { score, frequency })
            .collect();

        let probability = |count: u64| count as f64 / trials as f64;
        TesseractResult {
            home_win_probability: probability(tally.outcomes[Outcome::HomeWin.ordinal()]),
            draw_probability: probability(tally.outcomes[Outcome::Draw.ordinal()]),
            away_win_probability: probability(tally.outcomes[Outcome::AwayWin.ordinal()]),
            most_likely_score,
            simulation_count: trials,
            btts_probability: probability(tally.btts),
            over_2_5_probability: probability(tally.over_2_5),
            top_score_distribution,
        }
    }
}

impl TryFrom<Config> for Tesseract {
    type Error = anyhow::Error;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self { config })
    }
}
