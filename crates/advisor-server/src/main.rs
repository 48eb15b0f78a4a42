//! finance-advisor HTTP Server
//!
//! Axum-based server that drives the two-stage analysis flow. Every
//! interactive session gets its own state; each endpoint is one user action.

mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finance_advisor::Advisor;
use llm_runtime::{build_provider, RuntimeConfig};

use crate::handlers::{
    analyze, create_session, delete_session, get_session, health_check, list_advice,
    request_feedback, select_advice,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing or invalid credentials stop the server here, not per request
    let config = RuntimeConfig::from_env().context("invalid LLM configuration")?;
    let provider = build_provider(&config).context("failed to build LLM provider")?;

    match provider.health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to {}", provider.name());
            tracing::info!("  Model: {}", config.generation.model);
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ {} not reachable - analysis requests will fail", provider.name());
        }
    }

    let advisor = Advisor::new(provider, config.generation.clone()).with_timeout(config.timeout);
    let state = AppState::new(advisor);

    let idle_secs: u64 = match std::env::var("SESSION_IDLE_SECS") {
        Ok(raw) => raw
            .parse::<u64>()
            .context("SESSION_IDLE_SECS must be a whole number of seconds")?,
        Err(_) => 3600,
    };
    if idle_secs > 0 {
        spawn_session_sweeper(&state, Duration::from_secs(idle_secs));
    }

    let app = router(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("finance-advisor server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health                     - Health check");
    tracing::info!("  GET    /api/advice                 - Advice categories");
    tracing::info!("  POST   /api/sessions               - Start a session");
    tracing::info!("  GET    /api/sessions/{{id}}           - Session view");
    tracing::info!("  DELETE /api/sessions/{{id}}           - End a session");
    tracing::info!("  POST   /api/sessions/{{id}}/analyze   - Analyze a profile");
    tracing::info!("  PUT    /api/sessions/{{id}}/advice    - Select advice category");
    tracing::info!("  POST   /api/sessions/{{id}}/feedback  - Get detailed feedback");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically expire sessions nobody has touched within `max_idle`
fn spawn_session_sweeper(state: &AppState, max_idle: Duration) {
    let sessions = Arc::clone(&state.sessions);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(max_idle.min(Duration::from_secs(60)));
        loop {
            ticker.tick().await;
            if let Err(e) = sessions.sweep_idle(max_idle) {
                tracing::error!("Session sweep failed: {}", e);
            }
        }
    });
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/advice", get(list_advice))

        // Sessions
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/analyze", post(analyze))
        .route("/api/sessions/{id}/advice", put(select_advice))
        .route("/api/sessions/{id}/feedback", post(request_feedback))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
