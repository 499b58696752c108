pub mod error;
mod frame;
pub mod prediction_store;
