use axum::http::HeaderValue;
use axum::{
    routing::{get, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fa_launchpad::{
    api,
    cache::QueryCache,
    config::Config,
    constants::API_VERSION,
    indexer::IndexerClient,
    integrations::IrysNode,
    services::{self, AssetDataQuery, AssetRegistry, OnchainReader},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fa_launchpad=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting FA launchpad backend");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Network: {}", config.network);
    tracing::info!("API Version: {}", API_VERSION);

    let indexer = Arc::new(IndexerClient::new(
        config.indexer_url.clone(),
        config.aptos_api_key.clone(),
    ));
    let views = Arc::new(OnchainReader::from_config(&config));

    let asset_data = Arc::new(AssetDataQuery::new(
        indexer.clone(),
        views.clone(),
        QueryCache::new(config.query_cache_ttl()),
    ));
    let registry = Arc::new(AssetRegistry::new(
        views,
        indexer,
        config.placeholder_icon.clone(),
        config.registry_resolve_concurrency,
    ));

    // Start background services
    let shutdown = CancellationToken::new();
    let background =
        services::start_background_services(&config, asset_data.clone(), shutdown.clone());

    let app_state = api::AppState {
        config: config.clone(),
        asset_data,
        registry,
        irys: IrysNode::for_network(config.network.upload_network()),
        mint_status: background.mint_status,
        mint_params: Arc::new(background.mint_params),
    };

    let app = build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            shutdown.cancel();
        })
        .await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    let cors = cors_from_config(&state.config);

    Router::new()
        .route("/health", get(api::health::health_check))
        // Mint status
        .route("/api/v1/mint-status", get(api::mint::get_mint_status))
        .route(
            "/api/v1/mint-status/live",
            get(api::mint::get_live_mint_status),
        )
        .route(
            "/api/v1/mint-status/watch",
            put(api::mint::set_watched_asset),
        )
        // Registry
        .route("/api/v1/assets", get(api::assets::list_assets))
        .route("/my-assets", get(api::assets::my_assets))
        // Uploads
        .route("/api/v1/upload/price", get(api::upload::get_upload_price))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
