//! The signal-fusion engine. Reconciles the deterministic baseline with the simulated
//! distribution, folds in qualitative context (news factors, outlier scenarios), and emits a
//! single verdict with a confidence score, a recommended market and the reasoning trail that
//! produced it. Qualitative risk can veto a purely statistical banker call.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Outcome;
use crate::oracle::OracleAnalysis;
use crate::tesseract::TesseractResult;

/// Context-factor scores at or above this mark as high impact.
pub const HIGH_IMPACT_SCORE: u8 = 7;

/// Confidence deducted per unit of outlier probability when an outlier scenario fires.
const OUTLIER_CONFIDENCE_SCALE: f64 = 30.0;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum ScenarioType {
    Banker,
    Value,
    Risky,
    Avoid,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum SignalColor {
    Green,
    Yellow,
    Red,
}

#[derive(
    Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display, strum_macros::EnumString,
)]
pub enum FactorType {
    Injuries,
    News,
    Form,
    Fatigue,
    Motivation,
    Other,
}

/// One qualitative consideration supplied by the external context-analysis step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextFactor {
    pub factor_type: FactorType,
    /// Impact score in `[0, 10]`.
    pub score: u8,
    pub description: String,
    /// Relative weight in `[0, 1]`.
    pub weight: f64,
}
impl ContextFactor {
    pub fn is_high_impact(&self) -> bool {
        self.score >= HIGH_IMPACT_SCORE
    }
}

/// A low-probability scenario that would upset the statistical consensus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutlierScenario {
    pub description: String,
    pub probability: f64,
    pub supporting_factors: Vec<String>,
    pub historical_precedents: Vec<String>,
    /// Severity in `[0, 10]` should the scenario eventuate.
    pub impact_score: u8,
}

/// Qualitative enhancement produced by an external LLM-grade analysis step.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmGradeEnhancement {
    pub context_factors: Vec<ContextFactor>,
    pub outlier_scenarios: Vec<OutlierScenario>,
    pub enhanced_reasoning: String,
    /// Signed adjustment applied to the blended confidence.
    pub confidence_adjustment: i16,
}
impl LlmGradeEnhancement {
    pub fn most_impactful_factor(&self) -> Option<&ContextFactor> {
        self.context_factors.iter().max_by_key(|factor| factor.score)
    }

    pub fn highest_probability_outlier(&self) -> Option<&OutlierScenario> {
        self.outlier_scenarios.iter().max_by(|a, b| {
            a.probability
                .partial_cmp(&b.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    pub fn has_high_probability_outliers(&self, threshold: f64) -> bool {
        self.outlier_scenarios
            .iter()
            .any(|outlier| outlier.probability >= threshold)
    }
}

/// The fused verdict handed to the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MastermindSignal {
    pub title: String,
    pub description: String,
    pub color: SignalColor,
    /// Percentage in `[0, 100]`.
    pub confidence: u8,
    pub recommendation: String,
    pub scenario_type: ScenarioType,
    pub is_banker: bool,
    pub reasoning: Vec<String>,
    /// The signed qualitative adjustment that was applied.
    pub confidence_adjustment: i16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Simulated probability at which an agreed outcome becomes a banker.
    pub banker_probability: f64,
    /// Confidence required for the banker flag.
    pub banker_confidence: u8,
    /// Simulated probability at which a disagreeing simulation makes a value case.
    pub value_probability: f64,
    /// Outlier probability at which qualitative risk vetoes a banker.
    pub outlier_probability: f64,
    /// Confidence below which the verdict degrades to no-bet.
    pub avoid_confidence: u8,
    /// Weight of the baseline confidence in the blend.
    pub oracle_weight: f64,
    /// Weight of the simulated probability in the blend.
    pub tesseract_weight: f64,
}
impl Thresholds {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for &probability in &[
            self.banker_probability,
            self.value_probability,
            self.outlier_probability,
        ] {
            if !(0.0..=1.0).contains(&probability) {
                bail!("probability thresholds must lie in [0, 1]");
            }
        }
        let weight_sum = self.oracle_weight + self.tesseract_weight;
        if f64::abs(weight_sum - 1.0) > 1e-9 {
            bail!("blend weights must sum to 1, got {weight_sum}");
        }
        if self.avoid_confidence >= self.banker_confidence {
            bail!("the avoid cutoff must sit below the banker cutoff");
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            banker_probability: 0.65,
            banker_confidence: 80,
            value_probability: 0.45,
            outlier_probability: 0.20,
            avoid_confidence: 35,
            oracle_weight: 0.4,
            tesseract_weight: 0.6,
        }
    }
}

#[derive(Debug)]
pub struct Mastermind {
    thresholds: Thresholds,
}
impl Mastermind {
    pub fn fuse(
        &self,
        oracle: &OracleAnalysis,
        tesseract: Option<&TesseractResult>,
        enhancement: Option<&LlmGradeEnhancement>,
    ) -> MastermindSignal {
        let thresholds = &self.thresholds;
        let mut reasoning = vec![oracle.reasoning.clone()];

        let (mut scenario, confidence, recommended) = match tesseract {
            None => {
                // without simulation backing a verdict can never be a banker
                reasoning.push("no simulation available; baseline-only verdict".into());
                (
                    ScenarioType::Risky,
                    oracle.confidence as f64,
                    oracle.implied_outcome(),
                )
            }
            Some(sim) => self.consensus(oracle, sim, &mut reasoning),
        };

        let adjustment = enhancement
            .map(|enhancement| enhancement.confidence_adjustment)
            .unwrap_or(0);
        let mut confidence = confidence + adjustment as f64;
        if adjustment != 0 {
            reasoning.push(format!("context adjustment of {adjustment:+} applied"));
        }

        if let Some(enhancement) = enhancement {
            if !enhancement.enhanced_reasoning.is_empty() {
                reasoning.push(enhancement.enhanced_reasoning.clone());
            }
            if enhancement.has_high_probability_outliers(thresholds.outlier_probability) {
                // qualitative risk vetoes a statistical banker
                let outlier = enhancement
                    .highest_probability_outlier()
                    .expect("an outlier crossed the threshold");
                confidence -= outlier.probability * OUTLIER_CONFIDENCE_SCALE;
                if scenario == ScenarioType::Banker {
                    scenario = ScenarioType::Risky;
                    reasoning.push(format!(
                        "banker vetoed by outlier scenario ({:.0}% likely): {}",
                        outlier.probability * 100.0,
                        outlier.description
                    ));
                } else {
                    reasoning.push(format!(
                        "outlier scenario ({:.0}% likely): {}",
                        outlier.probability * 100.0,
                        outlier.description
                    ));
                }
            }
        }

        let confidence = confidence.clamp(0.0, 100.0).round() as u8;
        if confidence < thresholds.avoid_confidence {
            scenario = ScenarioType::Avoid;
            reasoning.push(format!(
                "confidence {confidence} below the {} cutoff; standing aside",
                thresholds.avoid_confidence
            ));
        }

        let is_banker =
            scenario == ScenarioType::Banker && confidence >= thresholds.banker_confidence;
        let recommendation = match scenario {
            ScenarioType::Avoid => "No bet".into(),
            _ => format!("Back the {recommended}"),
        };
        let title = match scenario {
            ScenarioType::Avoid => format!("{scenario}: stand aside"),
            _ => format!("{scenario}: {recommended}"),
        };
        let description = reasoning.join("; ");
        debug!("fused signal: {title} (confidence {confidence})");

        MastermindSignal {
            title,
            description,
            color: color(&scenario),
            confidence,
            recommendation,
            scenario_type: scenario,
            is_banker,
            reasoning,
            confidence_adjustment: adjustment,
        }
    }

    fn consensus(
        &self,
        oracle: &OracleAnalysis,
        sim: &TesseractResult,
        reasoning: &mut Vec<String>,
    ) -> (ScenarioType, f64, Outcome) {
        let thresholds = &self.thresholds;
        let (sim_outcome, sim_prob) = sim.most_probable_outcome();
        let oracle_outcome = oracle.implied_outcome();
        let blended = thresholds.oracle_weight * oracle.confidence as f64
            + thresholds.tesseract_weight * sim_prob * 100.0;

        if sim_outcome == oracle_outcome {
            reasoning.push(format!(
                "baseline and simulation agree on the {sim_outcome} (simulated p {sim_prob:.2})"
            ));
            if sim_prob >= thresholds.banker_probability {
                (ScenarioType::Banker, blended, sim_outcome)
            } else {
                reasoning.push(format!(
                    "simulated probability below the {:.2} banker cutoff",
                    thresholds.banker_probability
                ));
                (ScenarioType::Value, blended, sim_outcome)
            }
        } else {
            let oracle_prob = sim.outcome_probability(&oracle_outcome);
            let disagreement = sim_prob - oracle_prob;
            let confidence = blended * (1.0 - disagreement);
            reasoning.push(format!(
                "baseline backs the {oracle_outcome} (p {oracle_prob:.2}) but the simulation \
                 favours the {sim_outcome} (p {sim_prob:.2})"
            ));
            if sim_prob >= thresholds.value_probability {
                reasoning.push("simulation makes a strong case for the longer-priced outcome".into());
                (ScenarioType::Value, confidence, sim_outcome)
            } else {
                reasoning.push("split verdict with no strong simulated case".into());
                (ScenarioType::Risky, confidence, sim_outcome)
            }
        }
    }
}

impl TryFrom<Thresholds> for Mastermind {
    type Error = anyhow::Error;

    fn try_from(thresholds: Thresholds) -> Result<Self, Self::Error> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }
}

fn color(scenario: &ScenarioType) -> SignalColor {
    match scenario {
        ScenarioType::Banker => SignalColor::Green,
        ScenarioType::Value | ScenarioType::Risky => SignalColor::Yellow,
        ScenarioType::Avoid => SignalColor::Red,
    }
}
