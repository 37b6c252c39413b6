//! Purchase Request Service - Backend
//!
//! Accepts inventory spreadsheet uploads and returns per-supplier purchase
//! requests as downloadable spreadsheets.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Router};
use shared::PurchaseRequestCalculator;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;
use services::PurchaseRequestService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub purchase_requests: PurchaseRequestService,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let purchase_requests =
            PurchaseRequestService::new(PurchaseRequestCalculator::new(), config.layout.clone());
        Self {
            config: Arc::new(config),
            purchase_requests,
        }
    }
}

/// Create the application router with all routes and middleware
///
/// Routes are served at the root and again under `/api/v1`.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = DefaultBodyLimit::max(state.config.upload.max_bytes);

    routes::api_routes()
        .nest("/api/v1", routes::api_routes())
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
