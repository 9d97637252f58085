//! API route definitions

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::{handlers, state::AppState};

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health_check))
        .route("/model", get(handlers::model_info))
        .fallback(handlers::handle_404)
        .method_not_allowed_fallback(handlers::handle_405);

    Router::new()
        .nest("/api", api_routes)
        .route("/", get(handlers::serve_index))
        .route("/scout", post(handlers::scout_form))
        .fallback(handlers::handle_404)
        .method_not_allowed_fallback(handlers::handle_405)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
