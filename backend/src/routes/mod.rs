//! Route definitions for the Purchase Request Service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health_check))
        .route(
            "/generate_purchase_request",
            post(handlers::generate_purchase_request),
        )
}
