use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::api::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/predictions", get(handlers::get_predictions))
        .route("/upload_csv", post(handlers::upload_csv))
        .route("/upload_json", post(handlers::upload_json))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
