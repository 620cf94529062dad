//! Fratapp application entry point.
//!
//! Bootstraps the server:
//! 1. Load configuration from environment (fails on missing/short secret)
//! 2. Build the token codec, store, and mailer
//! 3. Assemble the router and layer the routing gate in front of it
//! 4. Start Axum server

use std::net::SocketAddr;
use std::sync::Arc;

use fratapp::{
    auth::middleware::{AppState, RateLimiter},
    cleanup,
    config::Config,
    email::LogMailer,
    gate::routing_gate,
    routes,
    session::TokenCodec,
    storage::MemoryStore,
};

/// How often the background job sweeps expired reset tokens and lapsed
/// rate-limit windows.
const CLEANUP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(600);

#[tokio::main]
async fn main() {
    // Initialize tracing with env filter support (RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config from environment. A missing or too-short SESSION_SECRET
    // stops the process here; no authenticated route is ever served with a
    // weak key.
    let config = Config::from_env().expect("Failed to load config");
    tracing::info!("Starting fratapp on {}", config.bind_addr);

    let config = Arc::new(config);
    let codec = Arc::new(TokenCodec::new(&config));

    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        mailer: Arc::new(LogMailer),
        codec,
        config: config.clone(),
        rate_limiter: Arc::new(RateLimiter::new()),
    };

    tokio::spawn(cleanup::run_cleanup_loop(
        state.store.clone(),
        state.rate_limiter.clone(),
        CLEANUP_INTERVAL,
    ));

    // The gate layers over the whole router (fallback included): every
    // request is classified and resolved before any handler runs.
    let app = routes::router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            routing_gate,
        ))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    tracing::info!("Listening on {}", config.bind_addr);

    // with_connect_info required for ConnectInfo<SocketAddr> extractors
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
