pub mod error;
pub mod state;
pub mod views;

pub use error::DashboardError;
pub use state::DashboardState;
pub use views::Dashboard;
