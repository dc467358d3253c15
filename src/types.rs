//! Core records shared across the pipeline

use crate::error::{PredictError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// League label used when the provider does not tag a fixture
pub const UNKNOWN_LEAGUE: &str = "Unknown";

/// A team as identified by the fixture provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team {
    /// Provider-specific identifier (used for history lookups)
    pub id: String,
    /// Display name
    pub name: String,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A scheduled match on a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub date: NaiveDate,
    pub home_team: Team,
    pub away_team: Team,
    pub league: Option<String>,
}

/// One completed match from a team's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentMatch {
    /// Goals scored by the team the history was requested for
    pub goals_scored: u32,
    pub completed_at: DateTime<Utc>,
}

/// Expected goals for a team's next match
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct GoalRate(f64);

impl GoalRate {
    pub const ZERO: GoalRate = GoalRate(0.0);

    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(PredictError::InvalidRate(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for GoalRate {
    type Error = PredictError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<GoalRate> for f64 {
    fn from(rate: GoalRate) -> f64 {
        rate.0
    }
}

impl fmt::Display for GoalRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// An exact scoreline and its probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreLine {
    /// "H-A", e.g. "2-1"
    pub score: String,
    pub p: f64,
}

/// Per-fixture prediction as served to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub date: NaiveDate,
    pub p_home: f64,
    pub p_draw: f64,
    pub p_away: f64,
    pub p_btts_yes: f64,
    pub p_over_1_5: f64,
    pub p_over_2_5: f64,
    pub p_over_3_5: f64,
    pub avg_goals_home_last3: GoalRate,
    pub avg_goals_away_last3: GoalRate,
    pub top_scores: Vec<ScoreLine>,
}

impl Prediction {
    /// Display order within a day: league, then home team, then away team
    pub fn display_order(&self, other: &Self) -> Ordering {
        self.league
            .cmp(&other.league)
            .then_with(|| self.home_team.cmp(&other.home_team))
            .then_with(|| self.away_team.cmp(&other.away_team))
    }

    /// Every probability carried by the record
    pub fn probabilities(&self) -> impl Iterator<Item = f64> + '_ {
        [
            self.p_home,
            self.p_draw,
            self.p_away,
            self.p_btts_yes,
            self.p_over_1_5,
            self.p_over_2_5,
            self.p_over_3_5,
        ]
        .into_iter()
        .chain(self.top_scores.iter().map(|s| s.p))
    }
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| PredictError::InvalidDate(raw.to_string()))
}
