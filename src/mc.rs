//! A single Monte Carlo trial: one simulated match.

use tinyrand::Rand;

use crate::domain::{Score, TeamRates};
use crate::poisson;

/// Simulates one match by drawing an independent Poisson goal count for each side from its
/// adjusted expected-goal rate.
#[inline]
pub fn run_once(rates: &TeamRates, rand: &mut impl Rand) -> Score {
    debug_assert!(rates.is_valid(), "invalid rates {rates:?}");
    let home = poisson::sample(rates.home, rand);
    let away = poisson::sample(rates.away, rand);
    Score::new(home, away)
}
