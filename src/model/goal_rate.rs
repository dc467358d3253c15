//! Goal-rate estimation from recent form

use crate::config::ModelConfig;
use crate::types::{GoalRate, RecentMatch};
use chrono::NaiveDate;

/// Averages a team's goals over its last few completed matches
#[derive(Debug, Clone, Copy)]
pub struct GoalRateEstimator {
    window: usize,
    default_rate: GoalRate,
}

impl GoalRateEstimator {
    /// `Config::validate` rejects an invalid `default_rate` at load time.
    pub fn new(window: usize, default_rate: f64) -> Self {
        Self {
            window: window.max(1),
            default_rate: GoalRate::new(default_rate).unwrap_or(GoalRate::ZERO),
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.form_window, config.default_goal_rate)
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Neutral rate used whenever history is too short
    pub fn default_rate(&self) -> GoalRate {
        self.default_rate
    }

    /// Mean goals over the most recent `window` matches completed before
    /// `as_of`, rounded to one decimal.
    pub fn estimate(&self, history: &[RecentMatch], as_of: NaiveDate) -> GoalRate {
        let mut prior: Vec<&RecentMatch> = history
            .iter()
            .filter(|m| m.completed_at.date_naive() < as_of)
            .collect();

        if prior.len() < self.window {
            return self.default_rate();
        }

        prior.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        let goals: u32 = prior.iter().take(self.window).map(|m| m.goals_scored).sum();
        let mean = goals as f64 / self.window as f64;

        GoalRate::new((mean * 10.0).round() / 10.0).unwrap_or(self.default_rate)
    }
}

impl Default for GoalRateEstimator {
    fn default() -> Self {
        Self::from_config(&ModelConfig::default())
    }
}
