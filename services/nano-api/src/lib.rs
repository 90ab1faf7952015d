//! Nano API Service Library
//!
//! HTTP surface of the nano service: configuration, shared state, the
//! ordered handler registry and the endpoint handlers.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod state;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub use handlers::{Handler, HandlerRegistry};
pub use state::AppState;

/// Build the router: operational endpoints are routed directly, everything
/// else goes through the handler registry.
pub fn build_router(state: Arc<AppState>, registry: Arc<HandlerRegistry>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        .fallback(handlers::dispatch_handler)
        .layer(Extension(state))
        .layer(Extension(registry))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
