//! HTTP route handlers and router configuration

mod admin;
mod analysis;
mod relay;

use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the main application router
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        // Health check
        .route("/health", get(admin::health))
        // Analysis resource
        .route("/analytics/", get(analysis::list))
        .route("/analytics/new/", get(analysis::new_page))
        // Create is POST-only; other verbs get the router's 405
        .route("/analytics/new/data/", post(analysis::create))
        .route("/analytics/:id/", get(analysis::detail))
        .route("/analytics/:id/view/", get(analysis::view))
        // Payload update is PUT-only; other verbs get the router's 405
        .route("/analytics/:id/data/", put(analysis::update_data))
        .route(
            "/analytics/:id/remove/",
            get(analysis::remove_confirm).post(analysis::remove),
        )
        .route(
            "/analytics/:id/metadata/",
            get(analysis::metadata_form).post(analysis::metadata_save),
        )
        // OLAP query relay; method handling is inside the handler because
        // misuse must answer 200, not 405
        .route("/analytics/api/", any(relay::api))
        .with_state(state.clone());

    // Add middleware
    router = router.layer(DefaultBodyLimit::max(state.config.body_limit));
    router = router.layer(TraceLayer::new_for_http());

    // Add CORS if enabled
    if state.config.cors_enabled {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}
