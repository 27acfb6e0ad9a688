//! Fitting of bookmaker markets: recovers fair (de-vigged) probabilities from quoted
//! decimal prices by backing out the overround.

use anyhow::bail;

use crate::probs::SliceExt;

#[derive(Debug, Clone, PartialEq)]
pub struct Overround {
    pub method: OverroundMethod,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverroundMethod {
    Multiplicative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    pub probs: Vec<f64>,
    pub prices: Vec<f64>,
    pub overround: Overround,
}
impl Market {
    pub fn fit(method: OverroundMethod, prices: Vec<f64>, fair_sum: f64) -> Self {
        match method {
            OverroundMethod::Multiplicative => Self::fit_multiplicative(prices, fair_sum),
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.probs.len() != self.prices.len() {
            bail!("the number of probabilities must match the number of prices");
        }
        if self.probs.is_empty() {
            bail!("the market must contain at least one outcome");
        }
        for &price in &self.prices {
            if price <= 1.0 || !price.is_finite() {
                bail!("invalid price {price}");
            }
        }
        Ok(())
    }

    fn fit_multiplicative(prices: Vec<f64>, fair_sum: f64) -> Self {
        let mut probs = prices.invert();
        let overround = probs.normalise(fair_sum) / fair_sum;
        Self {
            probs,
            prices,
            overround: Overround {
                method: OverroundMethod::Multiplicative,
                value: overround,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_slice_f64_relative;
    use assert_float_eq::*;

    #[test]
    fn fit_multiplicative() {
        {
            let prices = vec![10.0, 5.0, 3.333, 2.5];
            let market = Market::fit(OverroundMethod::Multiplicative, prices, 1.0);
            assert_slice_f64_relative(&[0.1, 0.2, 0.3, 0.4], &market.probs, 0.001);
            assert_float_absolute_eq!(1.0, market.overround.value, 0.001);
        }
        {
            let prices = vec![9.0909, 4.5454, 3.0303, 2.273];
            let market = Market::fit(OverroundMethod::Multiplicative, prices, 1.0);
            assert_slice_f64_relative(&[0.1, 0.2, 0.3, 0.4], &market.probs, 0.001);
            assert_float_absolute_eq!(1.1, market.overround.value, 0.001);
        }
    }

    #[test]
    fn validate_rejects_subunit_price() {
        let market = Market::fit(OverroundMethod::Multiplicative, vec![2.0, 0.9], 1.0);
        assert!(market.validate().is_err());
    }

    #[test]
    fn validate_accepts_sane_market() {
        let market = Market::fit(OverroundMethod::Multiplicative, vec![1.85, 3.6, 4.4], 1.0);
        assert!(market.validate().is_ok());
    }
}
