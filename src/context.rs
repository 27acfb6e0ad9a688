//! Per-fixture simulation context: folds external team signals (injuries, news sentiment,
//! fixture congestion) into bounded fitness/distraction modifiers, and applies those
//! modifiers to expected-goal rates. Missing signals degrade to a neutral context; nothing
//! in this module fails.

use serde::{Deserialize, Serialize};

use crate::domain::TeamRates;

/// Fitness a side is assumed to carry when nothing is known about it.
pub const NEUTRAL_FITNESS: u8 = 82;

/// Distraction a side is assumed to carry when nothing is known about it.
pub const NEUTRAL_DISTRACTION: u8 = 28;

const FITNESS_INJURY_PENALTY: f64 = 6.0;
const FITNESS_CONGESTION_PENALTY: f64 = 4.0;
const DISTRACTION_SENTIMENT_SCALE: f64 = 30.0;

/// Adjusted rates are floored/capped to keep the goal model in a sane regime.
const RATE_BOUNDS: std::ops::RangeInclusive<f64> = 0.1..=6.0;

/// Raw, optional signals for one team, as supplied by external collaborators.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSignals {
    /// Count of first-team players unavailable.
    pub injuries: Option<u8>,
    /// News sentiment in `[-1, 1]`; negative is bad press.
    pub sentiment: Option<f64>,
    /// Matches played in the preceding fortnight beyond the usual cadence.
    pub congestion: Option<u8>,
}

/// Immutable per-fixture modifier set; every field in `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationContext {
    pub home_fitness: u8,
    pub away_fitness: u8,
    pub home_distraction: u8,
    pub away_distraction: u8,
}
impl SimulationContext {
    /// The canonical fallback when no signal source is available.
    pub const NEUTRAL: SimulationContext = SimulationContext {
        home_fitness: NEUTRAL_FITNESS,
        away_fitness: NEUTRAL_FITNESS,
        home_distraction: NEUTRAL_DISTRACTION,
        away_distraction: NEUTRAL_DISTRACTION,
    };

    pub fn from_signals(home: Option<&TeamSignals>, away: Option<&TeamSignals>) -> Self {
        Self {
            home_fitness: fitness(home),
            away_fitness: fitness(away),
            home_distraction: distraction(home),
            away_distraction: distraction(away),
        }
    }

    /// Applies the context to a pair of base expected-goal rates. Each side's rate is scaled
    /// by its own attack factor and by the opposition's defensive-lapse factor; both factors
    /// are exactly unity at [`SimulationContext::NEUTRAL`]. Raising a side's fitness never
    /// lowers its adjusted rate and never raises its opponent's; distraction works the
    /// opposite way.
    pub fn adjusted_rates(&self, base: TeamRates) -> TeamRates {
        let home = base.home
            * attack_factor(self.home_fitness, self.home_distraction)
            * lapse_factor(self.away_fitness, self.away_distraction);
        let away = base.away
            * attack_factor(self.away_fitness, self.away_distraction)
            * lapse_factor(self.home_fitness, self.home_distraction);
        TeamRates::new(clamp_rate(home), clamp_rate(away))
    }
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

fn fitness(signals: Option<&TeamSignals>) -> u8 {
    let mut fitness = NEUTRAL_FITNESS as f64;
    if let Some(signals) = signals {
        if let Some(injuries) = signals.injuries {
            fitness -= injuries as f64 * FITNESS_INJURY_PENALTY;
        }
        if let Some(congestion) = signals.congestion {
            fitness -= congestion as f64 * FITNESS_CONGESTION_PENALTY;
        }
    }
    clamp_percent(fitness)
}

fn distraction(signals: Option<&TeamSignals>) -> u8 {
    let mut distraction = NEUTRAL_DISTRACTION as f64;
    if let Some(signals) = signals {
        if let Some(sentiment) = signals.sentiment {
            distraction -= sentiment.clamp(-1.0, 1.0) * DISTRACTION_SENTIMENT_SCALE;
        }
    }
    clamp_percent(distraction)
}

fn clamp_percent(value: f64) -> u8 {
    value.clamp(0.0, 100.0).round() as u8
}

fn attack_factor(fitness: u8, distraction: u8) -> f64 {
    let factor = 1.0 + 0.004 * (fitness as f64 - NEUTRAL_FITNESS as f64)
        - 0.003 * (distraction as f64 - NEUTRAL_DISTRACTION as f64);
    f64::max(factor, 0.1)
}

fn lapse_factor(fitness: u8, distraction: u8) -> f64 {
    1.0 + 0.002 * (NEUTRAL_FITNESS as f64 - fitness as f64)
        + 0.002 * (distraction as f64 - NEUTRAL_DISTRACTION as f64)
}

fn clamp_rate(rate: f64) -> f64 {
    rate.clamp(*RATE_BOUNDS.start(), *RATE_BOUNDS.end())
}
