use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{http_span, propagate_request_id};
use crate::similarity::BatchRunner;
use crate::store::RelatednessStore;

pub mod admin;
pub mod related;

/// Shared handler state
pub struct AppState {
    pub runner: Arc<BatchRunner>,
    pub store: Arc<dyn RelatednessStore>,
    /// Maximum related items persisted (and servable) per item
    pub top_n: usize,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes(state))
        // request_id must be outermost so the trace span can read it
        .layer(TraceLayer::new_for_http().make_span_with(http_span))
        .layer(middleware::from_fn(propagate_request_id))
}

/// API routes under /api/v1
fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/items/:id/related", get(related::get_related))
        .route("/admin/related/rebuild", post(admin::rebuild))
        .route("/admin/related/cancel", post(admin::cancel))
        .route("/admin/related/status", get(admin::status))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
