//! Axum router configuration with middleware (CORS, request tracing).

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/vac/streaming/{vector_name}",
            post(handlers::vac::stream_vac),
        )
        .route("/vac/{vector_name}", post(handlers::vac::invoke_vac))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
