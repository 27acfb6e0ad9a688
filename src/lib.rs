//! A football match-outcome prediction and staking library. Combines a deterministic,
//! standings-based baseline predictor with a seedable Monte Carlo goal simulator, fuses the
//! two (plus qualitative context signals) into a single betting signal, and sizes stakes with
//! a fractional Kelly criterion.

#![allow(clippy::too_many_arguments)]

pub mod context;
pub mod domain;
pub mod kelly;
pub mod market;
pub mod mastermind;
pub mod mc;
pub mod model;
pub mod oracle;
pub mod poisson;
pub mod print;
pub mod probs;
pub mod tesseract;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
