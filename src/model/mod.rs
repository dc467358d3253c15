//! Prediction model
//!
//! Goal-rate estimation from recent form, the independent-Poisson score
//! surface, and aggregation into per-fixture `Prediction` records.

pub mod aggregate;
pub mod goal_rate;
pub mod poisson;


pub use aggregate::{PredictionAggregator, OVER_LINES, PROBABILITY_DECIMALS};
pub use goal_rate::GoalRateEstimator;
pub use poisson::{poisson_cdf, poisson_pmf, OutcomeProbs, ScoreDistribution};

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
