pub mod config;
pub mod db;
pub mod error;
pub mod generation;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use sqlx::PgPool;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::generation::{FallbackInvoker, TextGenerator};
use crate::rate_limit::GenerationRateLimiter;
use crate::state::{AppState, SharedState};

/// Build the shared state around a text generator. The generator is injected
/// so callers decide which provider the invoker talks to.
pub fn build_state(pool: PgPool, config: Config, generator: Arc<dyn TextGenerator>) -> SharedState {
    let invoker = FallbackInvoker::new(generator, &config.generation);
    tracing::info!(
        "Generation candidates: {}",
        invoker.models().join(", ")
    );

    Arc::new(AppState {
        pool,
        config,
        invoker,
        generation_limiter: GenerationRateLimiter::new(),
    })
}

pub fn build_app(state: SharedState) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
