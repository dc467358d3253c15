//! Per-date prediction pipeline
//!
//! fixtures → goal rates → score surface → predictions, with every upstream
//! call bounded by a timeout and each fixture isolated from its siblings.

use crate::client::FixtureSource;
use crate::config::ModelConfig;
use crate::error::{PredictError, Result};
use crate::model::{GoalRateEstimator, PredictionAggregator};
use crate::types::{Fixture, GoalRate, Prediction, Team};
use chrono::NaiveDate;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

pub struct PredictionEngine {
    source: Arc<dyn FixtureSource>,
    estimator: GoalRateEstimator,
    aggregator: PredictionAggregator,
    call_timeout: Duration,
}

impl PredictionEngine {
    pub fn new(source: Arc<dyn FixtureSource>, model: &ModelConfig, call_timeout: Duration) -> Self {
        Self {
            source,
            estimator: GoalRateEstimator::from_config(model),
            aggregator: PredictionAggregator::new(model),
            call_timeout,
        }
    }

    /// All predictions for `date`, in display order.
    ///
    /// Never fails: an unreachable fixture source yields an empty day and a
    /// failing fixture is dropped.
    pub async fn predict_date(&self, date: NaiveDate) -> Vec<Prediction> {
        let fixtures = match timeout(self.call_timeout, self.source.list_fixtures(date)).await {
            Ok(Ok(fixtures)) => fixtures,
            Ok(Err(e)) => {
                warn!("Fixture listing for {} failed: {}", date, e);
                return Vec::new();
            }
            Err(_) => {
                warn!("Fixture listing for {} timed out after {:?}", date, self.call_timeout);
                return Vec::new();
            }
        };

        let results = join_all(fixtures.iter().map(|f| self.predict_fixture(f))).await;

        let mut predictions: Vec<Prediction> = results
            .into_iter()
            .zip(&fixtures)
            .filter_map(|(result, fixture)| match result {
                Ok(prediction) => Some(prediction),
                Err(e) => {
                    warn!(
                        "Skipping {} vs {} on {}: {}",
                        fixture.home_team.name, fixture.away_team.name, date, e
                    );
                    None
                }
            })
            .collect();

        predictions.sort_by(|a, b| a.display_order(b));
        debug!(
            "Predicted {}/{} fixtures for {}",
            predictions.len(),
            fixtures.len(),
            date
        );
        predictions
    }

    pub async fn predict_fixture(&self, fixture: &Fixture) -> Result<Prediction> {
        let (home, away) = tokio::try_join!(
            self.goal_rate(&fixture.home_team, fixture.date),
            self.goal_rate(&fixture.away_team, fixture.date),
        )?;
        self.aggregator.aggregate(fixture, home, away)
    }

    /// Goal rate from the team's recent form. Short history falls back to the
    /// neutral default; a failed or timed-out lookup is an error.
    pub async fn goal_rate(&self, team: &Team, as_of: NaiveDate) -> Result<GoalRate> {
        let history = timeout(
            self.call_timeout,
            self.source.recent_matches(team, self.estimator.window(), as_of),
        )
        .await
        .map_err(|_| PredictError::Timeout(self.call_timeout))??;

        Ok(self.estimator.estimate(&history, as_of))
    }
}
