//! Fractional-Kelly stake sizing over the 1X2 markets. Computes the raw Kelly fraction per
//! market from a model probability and a decimal price, clamps away negative edges, applies
//! a fractional-Kelly safety multiplier to bound drawdown, and maps the result onto a
//! bounded value score and a risk tier. No positive edge means no recommendation, never a
//! forced one.

use anyhow::bail;
use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};

use crate::domain::{Fixture, FixtureOdds, Outcome};
use crate::market::{Market, OverroundMethod};

pub const DEFAULT_KELLY_MULTIPLIER: f64 = 0.25;

/// Raw Kelly fractions at or beyond this saturate the 0-10 value scale.
const VALUE_SCORE_SATURATION: f64 = 0.20;

/// Kelly fraction of bankroll for backing an outcome at decimal `price` with estimated win
/// probability `probability`. Clamped to zero: a non-positive edge never stakes. Degenerate
/// inputs (`price <= 1`, `probability <= 0`) short-circuit to zero.
pub fn kelly_fraction(probability: f64, price: f64) -> f64 {
    if price <= 1.0 || probability <= 0.0 || !price.is_finite() {
        return 0.0;
    }
    let net_odds = price - 1.0;
    let fraction = (net_odds * probability - (1.0 - probability)) / net_odds;
    f64::max(fraction, 0.0)
}

/// Difference between the model probability and the bookmaker's implied probability.
pub fn edge(probability: f64, price: f64) -> f64 {
    if price <= 1.0 || !price.is_finite() {
        return 0.0;
    }
    probability - 1.0 / price
}

/// Maps a raw Kelly fraction onto the bounded 0-10 value scale.
pub fn value_score(fraction: f64) -> f64 {
    (fraction / VALUE_SCORE_SATURATION * 10.0).clamp(0.0, 10.0)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Tiers a recommended stake percentage of bankroll.
pub fn risk_level(stake_percentage: f64) -> RiskLevel {
    if stake_percentage < 2.0 {
        RiskLevel::Low
    } else if stake_percentage < 5.0 {
        RiskLevel::Medium
    } else if stake_percentage < 10.0 {
        RiskLevel::High
    } else {
        RiskLevel::VeryHigh
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KellyConfig {
    /// Fractional-Kelly safety multiplier applied to the raw fraction.
    pub multiplier: f64,
}
impl KellyConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(0.0..=1.0).contains(&self.multiplier) || self.multiplier == 0.0 {
            bail!("the Kelly multiplier must lie in (0, 1]");
        }
        Ok(())
    }
}

impl Default for KellyConfig {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_KELLY_MULTIPLIER,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BestValueBet {
    pub market: Outcome,
    pub description: String,
    pub value_score: f64,
}

/// Edge diagnostic for one market, separate from the Kelly fraction itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketEdge {
    pub market: Outcome,
    /// Model probability minus the raw implied probability `1/price`.
    pub edge: f64,
    /// Model probability minus the de-vigged implied probability; requires a complete
    /// three-way market.
    pub devigged_edge: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KellyResult {
    pub fixture_id: u64,
    pub home_team: String,
    pub away_team: String,
    pub home_win_kelly: Option<f64>,
    pub draw_kelly: Option<f64>,
    pub away_win_kelly: Option<f64>,
    pub home_win_value_score: f64,
    pub draw_value_score: f64,
    pub away_win_value_score: f64,
    pub best_value_bet: Option<BestValueBet>,
    pub risk_level: RiskLevel,
    pub recommended_stake_percentage: f64,
    pub analysis: String,
    pub confidence: u8,
}
impl KellyResult {
    /// The canonical no-stake result for the no-odds / no-edge case.
    pub fn empty(fixture: &Fixture) -> Self {
        Self {
            fixture_id: fixture.id,
            home_team: fixture.home_team.clone(),
            away_team: fixture.away_team.clone(),
            home_win_kelly: None,
            draw_kelly: None,
            away_win_kelly: None,
            home_win_value_score: 0.0,
            draw_value_score: 0.0,
            away_win_value_score: 0.0,
            best_value_bet: None,
            risk_level: RiskLevel::Low,
            recommended_stake_percentage: 0.0,
            analysis: String::new(),
            confidence: 0,
        }
    }
}

#[derive(Debug)]
pub struct KellyCalculator {
    config: KellyConfig,
}
impl KellyCalculator {
    /// Sizes stakes across the three 1X2 markets given model probabilities (indexed by
    /// [`Outcome`] ordinal) and quoted odds.
    pub fn analyse(
        &self,
        fixture: &Fixture,
        probabilities: &[f64; Outcome::COUNT],
        odds: &FixtureOdds,
        confidence: u8,
    ) -> KellyResult {
        if odds.is_empty() {
            let mut result = KellyResult::empty(fixture);
            result.analysis = "no market odds available".into();
            return result;
        }

        let fractions: Vec<Option<f64>> = (0..Outcome::COUNT)
            .map(|ordinal| {
                let outcome = Outcome::from(ordinal);
                odds.price(&outcome)
                    .map(|price| kelly_fraction(probabilities[ordinal], price))
            })
            .collect();

        let best = fractions
            .iter()
            .enumerate()
            .filter_map(|(ordinal, &fraction)| {
                fraction
                    .filter(|&fraction| fraction > 0.0)
                    .map(|fraction| (ordinal, fraction))
            })
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let Some((best_ordinal, best_fraction)) = best else {
            let mut result = KellyResult::empty(fixture);
            result.analysis = "no positive-edge market at the quoted prices".into();
            return result;
        };

        let best_outcome = Outcome::from(best_ordinal);
        let best_price = odds
            .price(&best_outcome)
            .expect("best market carries a price");
        let stake_percentage = best_fraction * self.config.multiplier * 100.0;
        let best_score = value_score(best_fraction);
        let analysis = format!(
            "best value on the {best_outcome}: model p {:.2} against price {:.2} \
             (edge {:+.1}%); fractional-Kelly stake {:.1}% of bankroll",
            probabilities[best_ordinal],
            best_price,
            edge(probabilities[best_ordinal], best_price) * 100.0,
            stake_percentage
        );

        let score = |ordinal: usize| fractions[ordinal].map(value_score).unwrap_or(0.0);
        KellyResult {
            fixture_id: fixture.id,
            home_team: fixture.home_team.clone(),
            away_team: fixture.away_team.clone(),
            home_win_kelly: fractions[Outcome::HomeWin.ordinal()],
            draw_kelly: fractions[Outcome::Draw.ordinal()],
            away_win_kelly: fractions[Outcome::AwayWin.ordinal()],
            home_win_value_score: score(Outcome::HomeWin.ordinal()),
            draw_value_score: score(Outcome::Draw.ordinal()),
            away_win_value_score: score(Outcome::AwayWin.ordinal()),
            best_value_bet: Some(BestValueBet {
                description: format!("{best_outcome} at {best_price:.2}"),
                market: best_outcome,
                value_score: best_score,
            }),
            risk_level: risk_level(stake_percentage),
            recommended_stake_percentage: stake_percentage,
            analysis,
            confidence,
        }
    }

    /// Edge diagnostics per quoted market. De-vigged edges are only derivable when all
    /// three prices are present and pass market validation; a degenerate price anywhere in
    /// the triple suppresses them rather than propagating NaN.
    pub fn market_edges(
        &self,
        probabilities: &[f64; Outcome::COUNT],
        odds: &FixtureOdds,
    ) -> Vec<MarketEdge> {
        let complete: Option<Vec<f64>> = (0..Outcome::COUNT)
            .map(|ordinal| odds.price(&Outcome::from(ordinal)))
            .collect();
        let devigged = complete.and_then(|prices| {
            let market = Market::fit(OverroundMethod::Multiplicative, prices, 1.0);
            market.validate().is_ok().then_some(market.probs)
        });

        (0..Outcome::COUNT)
            .filter_map(|ordinal| {
                let outcome = Outcome::from(ordinal);
                odds.price(&outcome).map(|price| MarketEdge {
                    edge: edge(probabilities[ordinal], price),
                    devigged_edge: devigged
                        .as_ref()
                        .map(|fair| probabilities[ordinal] - fair[ordinal]),
                    market: outcome,
                })
            })
            .collect()
    }
}

impl TryFrom<KellyConfig> for KellyCalculator {
    type Error = anyhow::Error;

    fn try_from(config: KellyConfig) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self { config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    fn calculator() -> KellyCalculator {
        KellyCalculator::try_from(KellyConfig::default()).unwrap()
    }

    fn fixture() -> Fixture {
        Fixture {
            id: 66,
            home_team: "Arsenal".into(),
            away_team: "Spurs".into(),
            kickoff: None,
        }
    }

    #[test]
    fn fraction_for_positive_edge() {
        // b = 0.85, f = (0.85*0.60 - 0.40)/0.85
        assert_float_relative_eq!(0.12941, kelly_fraction(0.60, 1.85), 0.001);
    }

    #[test]
    fn fraction_clamps_negative_edge_to_zero() {
        assert_eq!(0.0, kelly_fraction(0.10, 5.0));
        assert_eq!(0.0, kelly_fraction(0.50, 1.9));
    }

    #[test]
    fn fraction_short_circuits_degenerate_inputs() {
        assert_eq!(0.0, kelly_fraction(0.60, 1.0));
        assert_eq!(0.0, kelly_fraction(0.60, 0.8));
        assert_eq!(0.0, kelly_fraction(0.0, 2.5));
        assert_eq!(0.0, kelly_fraction(-0.2, 2.5));
        assert_eq!(0.0, kelly_fraction(0.60, f64::NAN));
    }

    #[test]
    fn value_score_scale() {
        assert_eq!(0.0, value_score(0.0));
        assert_float_absolute_eq!(5.0, value_score(0.10), 1e-9);
        assert_eq!(10.0, value_score(0.20));
        assert_eq!(10.0, value_score(0.50));
    }

    #[test]
    fn risk_tiers() {
        assert_eq!(RiskLevel::Low, risk_level(0.0));
        assert_eq!(RiskLevel::Low, risk_level(1.99));
        assert_eq!(RiskLevel::Medium, risk_level(3.2));
        assert_eq!(RiskLevel::High, risk_level(7.0));
        assert_eq!(RiskLevel::VeryHigh, risk_level(12.0));
    }

    #[test]
    fn stake_is_monotone_in_fraction() {
        let calculator = calculator();
        let mut previous = 0.0;
        for step in 0..20 {
            let probability = 0.40 + step as f64 * 0.03;
            let result = calculator.analyse(
                &fixture(),
                &[probability, 0.2, 0.2],
                &FixtureOdds {
                    home: Some(2.2),
                    draw: None,
                    away: None,
                },
                50,
            );
            assert!(result.recommended_stake_percentage >= previous);
            previous = result.recommended_stake_percentage;
        }
    }

    #[test]
    fn quarter_kelly_stake_for_the_reference_fixture() {
        let calculator = calculator();
        let result = calculator.analyse(
            &fixture(),
            &[0.60, 0.22, 0.18],
            &FixtureOdds {
                home: Some(1.85),
                draw: Some(3.9),
                away: Some(5.2),
            },
            64,
        );
        let best = result.best_value_bet.as_ref().unwrap();
        assert_eq!(Outcome::HomeWin, best.market);
        assert!(
            result.recommended_stake_percentage > 3.0
                && result.recommended_stake_percentage < 3.5,
            "stake {}",
            result.recommended_stake_percentage
        );
        assert_eq!(RiskLevel::Medium, result.risk_level);
        assert_eq!(64, result.confidence);
        assert!(result.home_win_kelly.unwrap() > 0.0);
    }

    #[test]
    fn absent_market_yields_no_fraction() {
        let calculator = calculator();
        let result = calculator.analyse(
            &fixture(),
            &[0.60, 0.22, 0.18],
            &FixtureOdds {
                home: Some(1.85),
                draw: None,
                away: None,
            },
            50,
        );
        assert!(result.home_win_kelly.is_some());
        assert_eq!(None, result.draw_kelly);
        assert_eq!(None, result.away_win_kelly);
        assert_eq!(0.0, result.draw_value_score);
    }

    #[test]
    fn no_odds_yields_the_empty_result() {
        let calculator = calculator();
        let result = calculator.analyse(
            &fixture(),
            &[0.60, 0.22, 0.18],
            &FixtureOdds::default(),
            70,
        );
        assert_eq!(None, result.best_value_bet);
        assert_eq!(0.0, result.recommended_stake_percentage);
        assert_eq!(None, result.home_win_kelly);
        assert_eq!(RiskLevel::Low, result.risk_level);
    }

    #[test]
    fn no_positive_edge_yields_the_empty_result() {
        let calculator = calculator();
        // prices imply far more than the model believes in every market
        let result = calculator.analyse(
            &fixture(),
            &[0.30, 0.20, 0.20],
            &FixtureOdds {
                home: Some(1.5),
                draw: Some(2.0),
                away: Some(2.0),
            },
            55,
        );
        assert_eq!(None, result.best_value_bet);
        assert_eq!(0.0, result.recommended_stake_percentage);
        assert!(result.analysis.contains("no positive-edge"));
    }

    #[test]
    fn edges_raw_and_devigged() {
        let calculator = calculator();
        let probabilities = [0.60, 0.22, 0.18];
        let odds = FixtureOdds {
            home: Some(1.85),
            draw: Some(3.6),
            away: Some(4.4),
        };
        let edges = calculator.market_edges(&probabilities, &odds);
        assert_eq!(3, edges.len());
        let home = &edges[0];
        assert_eq!(Outcome::HomeWin, home.market);
        assert_float_relative_eq!(0.60 - 1.0 / 1.85, home.edge, 0.001);
        // de-vigging strips the overround, so the fair implied probability is lower and
        // the edge correspondingly higher
        assert!(home.devigged_edge.unwrap() > home.edge);

        let partial = FixtureOdds {
            home: Some(1.85),
            draw: None,
            away: Some(4.4),
        };
        let edges = calculator.market_edges(&probabilities, &partial);
        assert_eq!(2, edges.len());
        assert!(edges.iter().all(|edge| edge.devigged_edge.is_none()));
    }

    #[test]
    fn degenerate_price_suppresses_devigged_edges() {
        let calculator = calculator();
        let probabilities = [0.60, 0.22, 0.18];
        for home in [0.0, 1.0, 0.8, f64::NAN, f64::INFINITY] {
            let odds = FixtureOdds {
                home: Some(home),
                draw: Some(3.6),
                away: Some(4.4),
            };
            let edges = calculator.market_edges(&probabilities, &odds);
            assert_eq!(3, edges.len());
            for edge in &edges {
                assert_eq!(None, edge.devigged_edge, "{:?} at home price {home}", edge.market);
                assert!(edge.edge.is_finite());
            }
        }
    }

    #[test]
    fn config_rejects_degenerate_multiplier() {
        for multiplier in [0.0, -0.25, 1.5] {
            let config = KellyConfig { multiplier };
            assert!(config.validate().is_err());
        }
        assert!(KellyConfig::default().validate().is_ok());
    }
}
