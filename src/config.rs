//! Configuration management
//!
//! Layers an optional TOML file, `FOOTY__`-prefixed environment variables and
//! the service's legacy plain variables (`FOOTBALL_DATA_API_KEY`, `CRON_TOKEN`,
//! `PORT`) on top of built-in defaults.

use crate::error::{PredictError, Result};
use crate::types::GoalRate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret for `POST /refresh`; refresh is disabled when unset
    #[serde(default)]
    pub cron_token: Option<String>,
    #[serde(default = "default_cors_origin")]
    pub cors_allow_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cron_token: None,
            cors_allow_origin: default_cors_origin(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_competitions")]
    pub competitions: Vec<CompetitionConfig>,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            competitions: default_competitions(),
        }
    }
}

/// A tracked competition: display name plus football-data.org code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionConfig {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Goals per side enumerated by the score grid (exclusive upper bound)
    #[serde(default = "default_goal_cap")]
    pub goal_cap: usize,
    #[serde(default = "default_top_scores")]
    pub top_scores: usize,
    /// Completed matches averaged into a goal rate
    #[serde(default = "default_form_window")]
    pub form_window: usize,
    #[serde(default = "default_goal_rate")]
    pub default_goal_rate: f64,
    #[serde(default = "default_home_advantage")]
    pub home_advantage: f64,
    #[serde(default = "default_min_goal_rate")]
    pub min_goal_rate: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            goal_cap: default_goal_cap(),
            top_scores: default_top_scores(),
            form_window: default_form_window(),
            default_goal_rate: default_goal_rate(),
            home_advantage: default_home_advantage(),
            min_goal_rate: default_min_goal_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub persist_path: Option<PathBuf>,
    #[serde(default = "default_startup_warm_days")]
    pub startup_warm_days: u32,
    #[serde(default = "default_max_warm_days")]
    pub max_warm_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            persist_path: None,
            startup_warm_days: default_startup_warm_days(),
            max_warm_days: default_max_warm_days(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8888
}

fn default_cors_origin() -> String {
    "*".to_string()
}

fn default_base_url() -> String {
    "https://api.football-data.org/v4".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_competitions() -> Vec<CompetitionConfig> {
    [
        ("Eredivisie", "DED"),
        ("Premier League", "PL"),
        ("La Liga", "PD"),
        ("Bundesliga", "BL1"),
        ("Ligue 1", "FL1"),
    ]
    .into_iter()
    .map(|(name, code)| CompetitionConfig {
        name: name.to_string(),
        code: code.to_string(),
    })
    .collect()
}

fn default_goal_cap() -> usize {
    6
}

fn default_top_scores() -> usize {
    5
}

fn default_form_window() -> usize {
    3
}

fn default_goal_rate() -> f64 {
    1.2
}

fn default_home_advantage() -> f64 {
    0.2
}

fn default_min_goal_rate() -> f64 {
    0.3
}

fn default_startup_warm_days() -> u32 {
    1
}

fn default_max_warm_days() -> u32 {
    14
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("FOOTY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let mut cfg: Config = settings.try_deserialize()?;
        cfg.apply_legacy_env(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject model tuning the goal model cannot run with
    pub fn validate(&self) -> Result<()> {
        GoalRate::new(self.model.default_goal_rate)?;
        GoalRate::new(self.model.min_goal_rate)?;
        if !self.model.home_advantage.is_finite() {
            return Err(PredictError::InvalidRate(self.model.home_advantage));
        }
        Ok(())
    }

    /// Apply the plain environment variables the service has always read.
    /// Blank values are ignored.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(key) = non_blank("FOOTBALL_DATA_API_KEY") {
            self.provider.api_key = Some(key);
        }
        if let Some(token) = non_blank("CRON_TOKEN") {
            self.server.cron_token = Some(token);
        }
        if let Some(port) = non_blank("PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
    }
}
