use crate::api::routes::create_router;
use crate::api::state::AppState;
use crate::config::Config;
use crate::error::AircastError;
use crate::store::prediction_store::PredictionStore;
use axum::Router;
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Opens the prediction store and binds the listener, without serving yet.
///
/// # Errors
///
/// Fails when the data directory cannot be created or the address cannot be bound.
pub async fn bind(config: &Config) -> Result<(TcpListener, Router), AircastError> {
    info!("Opening prediction store in {}", config.data_dir.display());
    let store = PredictionStore::open(config.data_dir.clone()).await?;
    let app = create_router(Arc::new(AppState { store }));

    let addr = config.server_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AircastError::Bind(addr.clone(), e))?;
    info!("Listening on {}", addr);
    Ok((listener, app))
}

/// Runs the prediction API until the server fails.
pub async fn serve(config: &Config) -> Result<(), AircastError> {
    let (listener, app) = bind(config).await?;
    axum::serve(listener, app)
        .await
        .map_err(AircastError::Serve)
}
