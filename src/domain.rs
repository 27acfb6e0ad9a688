//! Value types shared across the prediction pipeline. Everything here is an immutable
//! snapshot, serialisable for downstream presentation layers.

use chrono::{DateTime, Utc};
use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Score {
    pub home: u8,
    pub away: u8,
}
impl Score {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }

    pub fn nil_all() -> Self {
        Self { home: 0, away: 0 }
    }

    pub fn total(&self) -> u16 {
        self.home as u16 + self.away as u16
    }

    pub fn outcome(&self) -> Outcome {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Outcome::HomeWin,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::AwayWin,
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

/// Full-time result of a match: the three mutually exclusive 1X2 outcomes.
#[derive(
    Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Ordinal, Serialize, Deserialize, strum_macros::Display,
)]
pub enum Outcome {
    #[strum(serialize = "home win")]
    HomeWin,
    #[strum(serialize = "draw")]
    Draw,
    #[strum(serialize = "away win")]
    AwayWin,
}
impl Outcome {
    pub const COUNT: usize = 3;

    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::HomeWin => Some(Side::Home),
            Outcome::Draw => None,
            Outcome::AwayWin => Some(Side::Away),
        }
    }
}

impl From<usize> for Outcome {
    #[inline]
    fn from(value: usize) -> Self {
        match value {
            0 => Outcome::HomeWin,
            1 => Outcome::Draw,
            2 => Outcome::AwayWin,
            _ => unreachable!(),
        }
    }
}

/// A team's league standing at the time of analysis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based league position.
    pub rank: u16,
    pub played: u16,
    pub points: u16,
    pub goal_difference: i32,
}
impl Standing {
    pub fn points_per_game(&self) -> f64 {
        if self.played == 0 {
            0.0
        } else {
            self.points as f64 / self.played as f64
        }
    }

    pub fn goal_difference_per_game(&self) -> f64 {
        if self.played == 0 {
            0.0
        } else {
            self.goal_difference as f64 / self.played as f64
        }
    }
}

/// Head-to-head record between the two sides, from the home team's perspective.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub home_wins: u16,
    pub draws: u16,
    pub away_wins: u16,
}
impl HeadToHead {
    pub fn total(&self) -> u16 {
        self.home_wins + self.draws + self.away_wins
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u64,
    pub home_team: String,
    pub away_team: String,
    pub kickoff: Option<DateTime<Utc>>,
}

/// Decimal (payout-inclusive) 1X2 prices. Absent markets are `None`, never zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureOdds {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
}
impl FixtureOdds {
    pub fn price(&self, outcome: &Outcome) -> Option<f64> {
        match outcome {
            Outcome::HomeWin => self.home,
            Outcome::Draw => self.draw,
            Outcome::AwayWin => self.away,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.home.is_none() && self.draw.is_none() && self.away.is_none()
    }
}

/// Expected-goal rates for the two sides; the handoff from the deterministic predictor to
/// the simulator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamRates {
    pub home: f64,
    pub away: f64,
}
impl TeamRates {
    pub fn new(home: f64, away: f64) -> Self {
        Self { home, away }
    }

    pub fn is_valid(&self) -> bool {
        self.home.is_finite() && self.away.is_finite() && self.home > 0.0 && self.away > 0.0
    }
}
