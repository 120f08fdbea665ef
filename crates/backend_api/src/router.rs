use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{self, SharedState};

/// Create the main application router with all API endpoints
pub fn create_router(state: SharedState) -> Router {
    // Create CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Raw records
        .route("/api/users/:user_id/expenses", get(handlers::list_expenses))
        // Aggregation endpoints
        .route("/api/users/:user_id/analysis", get(handlers::get_analysis))
        .route(
            "/api/users/:user_id/analysis/latest",
            get(handlers::get_latest_analysis),
        )
        // Add shared state
        .with_state(state)
        // Add middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
