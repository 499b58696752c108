pub mod data_source;
pub mod error;
pub mod loader;

pub use data_source::{DataSource, SourceSpec, SourceSpecs};
pub use loader::SourceLoader;
