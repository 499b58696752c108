use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::types::prediction::PredictionRecord;
use crate::utils::LAST_UPDATE_FORMAT;

#[derive(Debug, Default, Deserialize)]
pub struct PredictionsQuery {
    pub pollutant: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionsResponse {
    pub last_update: Option<String>,
    pub rows: Vec<PredictionRecord>,
}

pub async fn get_predictions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PredictionsQuery>,
) -> Result<Json<PredictionsResponse>, ApiError> {
    let mut snapshot = state.store.read().await?;
    if let Some(pollutant) = query.pollutant.as_deref().filter(|p| !p.trim().is_empty()) {
        snapshot = snapshot.filter_pollutant(pollutant.trim());
    }
    Ok(Json(PredictionsResponse {
        last_update: snapshot
            .last_update
            .map(|ts| ts.format(LAST_UPDATE_FORMAT).to_string()),
        rows: snapshot.rows,
    }))
}
