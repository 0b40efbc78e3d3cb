mod cli;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;

use aze_price::{
    api::{AppState, create_router},
    config::AppConfig,
    db::Db,
    engine::{
        DEFAULT_STALE_THRESHOLD, EngineObserver, Ingestor, IngestorConfig, RetentionManager,
        TracingObserver,
    },
    quote::{AwesomeApiClient, client::DEFAULT_FETCH_TIMEOUT},
    scheduler::{Cadence, Trigger},
    store::{PriceRepository, SqlxPriceRepository},
};
use cli::{Cli, Command};
use common::logger::init_tracing;

const CLEANUP_HOUR_UTC: u32 = 3;
const CLEANUP_MINUTE_UTC: u32 = 0;

/// Connects, ensures the schema and returns the shared repository.
async fn init_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn PriceRepository>> {
    let db = Db::connect(&cfg.database_url)
        .await
        .context("connect database")?;
    db.migrate().await.context("migrate schema")?;

    Ok(Arc::new(SqlxPriceRepository::new(db.pool)))
}

/// Registers the ingestion and retention jobs.
fn start_trigger(
    cfg: &AppConfig,
    repo: Arc<dyn PriceRepository>,
    observer: Arc<dyn EngineObserver>,
) -> anyhow::Result<Trigger> {
    let source = AwesomeApiClient::new(
        &cfg.awesome_api_url,
        cfg.awesome_api_token.clone(),
        DEFAULT_FETCH_TIMEOUT,
    )
    .context("build quote client")?;

    let ingestor = Ingestor::new(
        Arc::new(source),
        repo.clone(),
        observer.clone(),
        IngestorConfig {
            divisor: cfg.divisor,
            fallback: cfg.fallback,
        },
    );
    let retention = RetentionManager::with_default_horizon(repo, observer);
    let cleanup_at = Cadence::daily_at(CLEANUP_HOUR_UTC, CLEANUP_MINUTE_UTC)
        .context("invalid cleanup time of day")?;

    let trigger = Trigger::new();
    trigger.register(Cadence::Every(cfg.polling_interval), Arc::new(ingestor));
    trigger.register(cleanup_at, Arc::new(retention));

    Ok(trigger)
}

async fn serve(cfg: AppConfig) -> anyhow::Result<()> {
    let repo = init_store(&cfg).await?;
    let observer: Arc<dyn EngineObserver> = Arc::new(TracingObserver);

    let trigger = start_trigger(&cfg, repo.clone(), observer)?;

    let app = create_router(AppState::new(repo, DEFAULT_STALE_THRESHOLD));
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    tracing::info!(
        %addr,
        polling_ms = cfg.polling_interval.as_millis() as u64,
        divisor = cfg.divisor.get(),
        "aze price service listening"
    );

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c listener failed; shutting down");
        }
        tracing::info!("Shutdown signal received");
    });

    // Jobs stop even when the server exits with an error.
    trigger.run_until(server).await.context("http server")
}

async fn cleanup(cfg: AppConfig) -> anyhow::Result<()> {
    let repo = init_store(&cfg).await?;
    let retention = RetentionManager::with_default_horizon(repo, Arc::new(TracingObserver));

    let report = retention.run(Utc::now()).await?;

    println!(
        "cleanup cutoff={} before={} removed={} after={}",
        report.cutoff.to_rfc3339(),
        report.before,
        report.removed,
        report.after
    );

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_tracing("aze-price", is_production);

    let cfg = AppConfig::from_env();

    match cli.command() {
        Command::Serve => serve(cfg).await,
        Command::Cleanup => cleanup(cfg).await,
    }
}
