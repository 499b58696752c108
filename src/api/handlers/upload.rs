use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::ingest::validator::ValidatedTable;
use crate::ingest::{validate_csv, validate_json};

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    pub rows_received: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadJsonRequest {
    #[serde(default)]
    pub rows: Option<Vec<Map<String, Value>>>,
}

pub async fn upload_csv(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut contents = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            contents = Some(field.bytes().await?.to_vec());
            break;
        }
    }
    let contents = contents.ok_or(ApiError::MissingFile)?;
    info!("Received CSV upload of {} bytes", contents.len());

    let table = validate_csv(contents).await?;
    replace_predictions(&state, table).await
}

pub async fn upload_json(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UploadJsonRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let Json(payload) = payload?;
    let table = validate_json(payload.rows)?;
    replace_predictions(&state, table).await
}

async fn replace_predictions(
    state: &AppState,
    table: ValidatedTable,
) -> Result<Json<UploadResponse>, ApiError> {
    let rows_received = table.len();
    state.store.write(table).await?;
    Ok(Json(UploadResponse {
        status: "ok".to_string(),
        rows_received,
    }))
}
