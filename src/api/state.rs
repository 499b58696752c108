use crate::store::prediction_store::PredictionStore;

pub struct AppState {
    pub store: PredictionStore,
}
