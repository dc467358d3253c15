//! Public prediction service: cached lookups plus warm/refresh driving

use crate::cache::{DateCache, DayPredictions};
use crate::engine::PredictionEngine;
use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a warm or refresh pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WarmSummary {
    /// Dates visited
    pub days: u32,
    /// Predictions held for those dates afterwards
    pub predictions: usize,
}

pub struct PredictionService {
    engine: PredictionEngine,
    cache: Arc<DateCache>,
}

impl PredictionService {
    pub fn new(engine: PredictionEngine, cache: Arc<DateCache>) -> Self {
        Self { engine, cache }
    }

    pub fn cache(&self) -> &Arc<DateCache> {
        &self.cache
    }

    /// Predictions for `date`, computed at most once per date
    pub async fn get_predictions(&self, date: NaiveDate) -> DayPredictions {
        if let Some(hit) = self.cache.get(date) {
            debug!("Cache hit for {}", date);
            return hit;
        }
        debug!("Cache miss for {}", date);
        self.cache
            .get_or_compute(date, || self.engine.predict_date(date))
            .await
    }

    /// Recompute `date` and replace its cached entry
    pub async fn refresh(&self, date: NaiveDate) -> DayPredictions {
        let predictions = self.engine.predict_date(date).await;
        self.cache.insert(date, predictions)
    }

    /// Populate `[start, start + day_count]` inclusive; cached dates are kept
    pub async fn warm(&self, start: NaiveDate, day_count: u32) -> WarmSummary {
        let mut summary = WarmSummary {
            days: 0,
            predictions: 0,
        };
        for date in date_range(start, day_count) {
            summary.predictions += self.get_predictions(date).await.len();
            summary.days += 1;
        }
        info!(
            "Warmed {} days from {} ({} predictions)",
            summary.days, start, summary.predictions
        );
        summary
    }

    /// Recompute every date in `[start, start + day_count]` inclusive
    pub async fn refresh_range(&self, start: NaiveDate, day_count: u32) -> WarmSummary {
        let mut summary = WarmSummary {
            days: 0,
            predictions: 0,
        };
        for date in date_range(start, day_count) {
            summary.predictions += self.refresh(date).await.len();
            summary.days += 1;
        }
        info!(
            "Refreshed {} days from {} ({} predictions)",
            summary.days, start, summary.predictions
        );
        summary
    }
}

/// Today's calendar date in the service time zone (UTC)
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// `start` and the `day_count` days after it
pub fn date_range(start: NaiveDate, day_count: u32) -> impl Iterator<Item = NaiveDate> {
    (0..=day_count).map_while(move |offset| start.checked_add_days(Days::new(offset as u64)))
}
