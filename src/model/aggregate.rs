//! Turns a fixture and two goal rates into a served prediction

use super::poisson::ScoreDistribution;
use super::round_to;
use crate::config::ModelConfig;
use crate::error::Result;
use crate::types::{Fixture, GoalRate, Prediction, ScoreLine, UNKNOWN_LEAGUE};

/// Decimal places kept on every published probability
pub const PROBABILITY_DECIMALS: i32 = 2;

/// Goal lines reported as over/under probabilities
pub const OVER_LINES: [f64; 3] = [1.5, 2.5, 3.5];

/// Builds `Prediction` records with the configured model tuning
#[derive(Debug, Clone)]
pub struct PredictionAggregator {
    goal_cap: usize,
    top_scores: usize,
    home_advantage: f64,
    min_goal_rate: f64,
}

impl PredictionAggregator {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            goal_cap: config.goal_cap.max(1),
            top_scores: config.top_scores,
            home_advantage: config.home_advantage,
            min_goal_rate: config.min_goal_rate.max(0.0),
        }
    }

    /// Expected goals actually fed to the score model: home side gets the
    /// home-advantage bump, both sides are floored.
    pub fn adjusted_rates(&self, home: GoalRate, away: GoalRate) -> (f64, f64) {
        (
            (home.value() + self.home_advantage).max(self.min_goal_rate),
            away.value().max(self.min_goal_rate),
        )
    }

    pub fn aggregate(&self, fixture: &Fixture, home: GoalRate, away: GoalRate) -> Result<Prediction> {
        let (lambda_home, lambda_away) = self.adjusted_rates(home, away);
        let dist = ScoreDistribution::build(lambda_home, lambda_away, self.goal_cap)?;

        let outcome = dist.outcome_probs();
        let p_home = round_prob(outcome.home);
        let p_away = round_prob(outcome.away);
        // Rounding residue goes to the draw so the split still sums to 1.
        let p_draw = round_prob((1.0 - p_home - p_away).max(0.0));

        let [over_1_5, over_2_5, over_3_5] = OVER_LINES.map(|line| round_prob(dist.over(line)));

        let top_scores = dist
            .top_scores(self.top_scores)
            .into_iter()
            .map(|s| ScoreLine {
                p: round_prob(s.p),
                ..s
            })
            .collect();

        Ok(Prediction {
            home_team: fixture.home_team.name.clone(),
            away_team: fixture.away_team.name.clone(),
            league: fixture
                .league
                .clone()
                .unwrap_or_else(|| UNKNOWN_LEAGUE.to_string()),
            date: fixture.date,
            p_home,
            p_draw,
            p_away,
            p_btts_yes: round_prob(dist.btts()),
            p_over_1_5: over_1_5,
            p_over_2_5: over_2_5,
            p_over_3_5: over_3_5,
            avg_goals_home_last3: home,
            avg_goals_away_last3: away,
            top_scores,
        })
    }
}

impl Default for PredictionAggregator {
    fn default() -> Self {
        Self::new(&ModelConfig::default())
    }
}

fn round_prob(p: f64) -> f64 {
    round_to(p.clamp(0.0, 1.0), PROBABILITY_DECIMALS)
}
