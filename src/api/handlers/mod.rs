pub mod health;
pub mod predictions;
pub mod upload;

pub use health::health_check;
pub use predictions::get_predictions;
pub use upload::{upload_csv, upload_json};
