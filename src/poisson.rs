//! Poisson goal model. Goals are modelled as rare, independent events over match time, making
//! the Poisson distribution the natural choice for a team's final goal count.

use tinyrand::Rand;

/// Hard cap on a sampled goal count. The tail mass beyond this point is negligible for any
/// plausible expected-goal rate.
pub const MAX_GOALS: u8 = 12;

/// Probability of exactly `k` goals under rate `lambda`, computed by the multiplicative
/// recurrence rather than factorials, so it stays stable for larger `k`.
#[inline]
pub fn univariate(k: u8, lambda: f64) -> f64 {
    let mut prob = f64::exp(-lambda);
    for i in 1..=k {
        prob *= lambda / i as f64;
    }
    prob
}

/// Draws a goal count from a Poisson distribution by walking the cumulative pmf against a
/// single uniform variate from the supplied source.
#[inline]
pub fn sample(lambda: f64, rand: &mut impl Rand) -> u8 {
    debug_assert!(lambda > 0.0, "invalid rate {lambda}");
    let uniform = random_f64(rand);
    let mut k = 0;
    let mut prob = f64::exp(-lambda);
    let mut cumulative = prob;
    while uniform > cumulative && k < MAX_GOALS {
        k += 1;
        prob *= lambda / k as f64;
        cumulative += prob;
    }
    k
}

#[inline]
pub fn random_f64(rand: &mut impl Rand) -> f64 {
    rand.next_u64() as f64 / u64::MAX as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;
    use tinyrand::{Seeded, StdRand};

    #[test]
    fn test_univariate() {
        assert_float_relative_eq!(0.36787944117144233, univariate(0, 1.0));
        assert_float_relative_eq!(0.36787944117144233, univariate(1, 1.0));
        assert_float_relative_eq!(0.18393972058572117, univariate(2, 1.0));
        assert_float_relative_eq!(0.0820849986238988, univariate(0, 2.5));
        assert_float_relative_eq!(0.205212496559747, univariate(1, 2.5));
        assert_float_relative_eq!(0.25651562069968376, univariate(2, 2.5));
    }

    #[test]
    fn univariate_sums_to_one_within_cap() {
        let total: f64 = (0..=MAX_GOALS).map(|k| univariate(k, 1.8)).sum();
        assert_float_absolute_eq!(1.0, total, 1e-6);
    }

    #[test]
    fn sample_is_deterministic_for_seed() {
        let mut rand_1 = StdRand::seed(42);
        let mut rand_2 = StdRand::seed(42);
        for _ in 0..100 {
            assert_eq!(sample(1.8, &mut rand_1), sample(1.8, &mut rand_2));
        }
    }

    #[test]
    fn sample_mean_approximates_rate() {
        let mut rand = StdRand::seed(7);
        const DRAWS: u32 = 10_000;
        let total: u32 = (0..DRAWS).map(|_| sample(1.8, &mut rand) as u32).sum();
        let mean = total as f64 / DRAWS as f64;
        assert!(mean > 1.7 && mean < 1.9, "mean {mean} drifted from rate");
    }

    #[test]
    fn sample_respects_cap() {
        let mut rand = StdRand::seed(11);
        for _ in 0..1_000 {
            assert!(sample(6.0, &mut rand) <= MAX_GOALS);
        }
    }
}
