//! Error types for the prediction service

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid goal rate: {0}")]
    InvalidRate(f64),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Upstream call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Missing team data: {0}")]
    MissingTeamData(String),

    #[error("Unauthorized")]
    Unauthorized,
}

pub type Result<T> = std::result::Result<T, PredictError>;
