//! FootyPredict
//!
//! Serves daily football predictions over HTTP, or prints/warms them from the
//! command line.

use clap::{Parser, Subcommand};
use footy_predict::{
    api::{self, ApiState},
    cache::DateCache,
    client::FootballDataClient,
    config::Config,
    engine::PredictionEngine,
    persist,
    service::{today, PredictionService},
    types::parse_date,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "footy-predict")]
#[command(about = "Daily football match predictions from recent scoring form")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,
    /// Print predictions for one day as JSON
    Predict {
        /// Date (YYYY-MM-DD), defaults to today (UTC)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Warm the cache for a range of days and persist it
    Warm {
        /// Days after the start date to include
        #[arg(short, long, default_value = "3")]
        days: u32,
        /// First date (YYYY-MM-DD), defaults to today (UTC)
        #[arg(short, long)]
        start: Option<String>,
        /// Recompute dates that are already cached
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Predict { date } => predict(config, date).await,
        Commands::Warm { days, start, force } => warm(config, days, start, force).await,
    }
}

fn build_service(config: &Config) -> anyhow::Result<Arc<PredictionService>> {
    let client = FootballDataClient::new(&config.provider)?;
    if !client.has_api_key() {
        tracing::warn!("FOOTBALL_DATA_API_KEY not set, fixture listings will be empty");
    }

    let cache = Arc::new(DateCache::new());
    if let Some(path) = &config.cache.persist_path {
        persist::load_into(&cache, path);
    }

    let engine = PredictionEngine::new(Arc::new(client), &config.model, config.provider.timeout());
    Ok(Arc::new(PredictionService::new(engine, cache)))
}

fn resolve_date(raw: Option<String>) -> anyhow::Result<chrono::NaiveDate> {
    Ok(match raw {
        Some(raw) => parse_date(&raw)?,
        None => today(),
    })
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting FootyPredict API");

    let service = build_service(&config)?;

    // Warm today + a small window so the first requests are served from memory.
    let warm_service = service.clone();
    let warm_days = config.cache.startup_warm_days;
    let persist_path = config.cache.persist_path.clone();
    tokio::spawn(async move {
        warm_service.warm(today(), warm_days).await;
        if let Some(path) = persist_path {
            let cache = warm_service.cache().clone();
            if let Err(e) =
                tokio::task::spawn_blocking(move || persist::save_from(&cache, &path)).await
            {
                tracing::warn!("Cache persistence task failed: {}", e);
            }
        }
    });

    if config.server.cron_token.is_none() {
        tracing::warn!("CRON_TOKEN not set, /refresh is disabled");
    }

    let state = Arc::new(ApiState {
        service,
        cron_token: config.server.cron_token.clone(),
        max_warm_days: config.cache.max_warm_days,
        persist_path: config.cache.persist_path.clone(),
    });

    api::start_server(
        state,
        &config.server.host,
        config.server.port,
        &config.server.cors_allow_origin,
    )
    .await
    .map_err(|e| anyhow::anyhow!("API server error: {}", e))
}

async fn predict(config: Config, date: Option<String>) -> anyhow::Result<()> {
    let date = resolve_date(date)?;
    let service = build_service(&config)?;

    let predictions = service.get_predictions(date).await;
    println!("{}", serde_json::to_string_pretty(predictions.as_ref())?);

    if let Some(path) = &config.cache.persist_path {
        persist::save_from(service.cache(), path);
    }
    Ok(())
}

async fn warm(config: Config, days: u32, start: Option<String>, force: bool) -> anyhow::Result<()> {
    let start = resolve_date(start)?;
    if days > config.cache.max_warm_days {
        anyhow::bail!("days must be between 0 and {}", config.cache.max_warm_days);
    }
    let service = build_service(&config)?;

    let summary = if force {
        service.refresh_range(start, days).await
    } else {
        service.warm(start, days).await
    };

    println!(
        "Warmed {} days from {}: {} predictions",
        summary.days, start, summary.predictions
    );

    match &config.cache.persist_path {
        Some(path) => persist::save_from(service.cache(), path),
        None => tracing::info!("No cache.persist_path configured, results kept in memory only"),
    }
    Ok(())
}
