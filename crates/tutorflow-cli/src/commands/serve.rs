//! `tutorflow serve` -- HTTP API over the pipeline.
//!
//! Routes:
//!
//! - `POST /learn` with `{"topic": "..."}` runs the pipeline. The response
//!   is `200` with `{"success": true, "data": <result>}`, or `502` with the
//!   error and the partial record when a stage failed upstream. An empty
//!   topic is rejected with `400`.
//! - `GET /health` reports liveness and the crate version.
//!
//! On shutdown (Ctrl-C) every in-flight pipeline is cancelled.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Args;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use tutorflow_core::{Orchestrator, build_orchestrator};

/// Arguments for `tutorflow serve`.
#[derive(Args)]
pub struct ServeArgs {
    /// Bind address (overrides `server.host`).
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides `server.port`).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Shared state accessible by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline shared by every request.
    pub orchestrator: Orchestrator,
    /// Cancelled when the server shuts down.
    pub shutdown: CancellationToken,
}

/// Body of `POST /learn`.
#[derive(Debug, Deserialize)]
pub struct LearnRequest {
    /// Topic or question to teach.
    #[serde(default)]
    pub topic: String,
}

/// Build the router with all routes.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let cors = if cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/learn", post(learn))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run one pipeline for the posted topic.
pub async fn learn(
    State(state): State<AppState>,
    Json(request): Json<LearnRequest>,
) -> (StatusCode, Json<Value>) {
    if request.topic.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "topic must not be empty" })),
        );
    }

    let cancel = state.shutdown.child_token();
    let result = state
        .orchestrator
        .run_with_cancel(&request.topic, &cancel)
        .await;

    match result.error.clone() {
        None => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": result })),
        ),
        Some(error) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "success": false, "error": error, "data": result })),
        ),
    }
}

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Run the `serve` command until Ctrl-C.
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = super::load_config(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let shutdown = CancellationToken::new();
    let state = AppState {
        orchestrator: build_orchestrator(&config),
        shutdown: shutdown.clone(),
    };
    let app = build_router(state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;
    info!(%addr, "HTTP API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("shutting down");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
