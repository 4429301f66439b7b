//! News Aggregation Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use worldnews_aggregator::aggregate::NewsAggregator;
use worldnews_aggregator::api::{create_router, AppState};
use worldnews_aggregator::config::{AggregatorConfig, FeedCatalog};
use worldnews_aggregator::metrics::Metrics;
use worldnews_aggregator::refresh::{spawn_cache_refresh, RefreshCfg};
use worldnews_aggregator::relay::HttpRelay;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("worldnews_aggregator=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments. Provider API keys
    // (NEWSAPI_KEY, GNEWS_KEY, CURRENTSAPI_KEY, MEDIASTACK_KEY) come from
    // the environment; providers without a key are skipped.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AggregatorConfig::default();
    let metrics = Metrics::init(cfg.combined_ttl.as_secs());

    let catalog = FeedCatalog::load_default()?;
    let relay = Arc::new(HttpRelay::new(cfg.fetch_timeout)?);
    let aggregator = Arc::new(NewsAggregator::new(relay, catalog, cfg));

    spawn_cache_refresh(Arc::clone(&aggregator), RefreshCfg::default());

    let router = create_router(AppState { aggregator }).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "news aggregation service listening");
    axum::serve(listener, router).await?;
    Ok(())
}
