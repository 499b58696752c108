//! Maps library errors onto HTTP responses with a `{"detail": ...}` body.

use crate::ingest::error::IngestError;
use crate::store::error::StoreError;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use serde_json::json;
use std::error::Error as _;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Upload has no 'file' field")]
    MissingFile,

    #[error("Malformed multipart upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Malformed JSON body: {0}")]
    Json(#[from] JsonRejection),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Ingest(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Ingest(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingFile | ApiError::Multipart(_) | ApiError::Json(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.to_string();
        if status.is_server_error() {
            match self.source() {
                Some(source) => error!("Request failed: {detail}: {source}"),
                None => error!("Request failed: {detail}"),
            }
        } else {
            warn!("Rejected request: {detail}");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
