use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, stream};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Addon protocol
        .route("/manifest.json", get(stream::manifest))
        .route("/stream/{media_type}/{id}", get(stream::get_streams))
        // Addon protocol with user settings encoded in the path
        .route("/{config}/manifest.json", get(stream::manifest))
        .route(
            "/{config}/stream/{media_type}/{id}",
            get(stream::get_configured_streams),
        )
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        // Playback clients load addons cross-origin
        .layer(CorsLayer::permissive())
}
