pub mod config;
pub mod error;
pub mod summary;

pub use config::{EventConfig, EventMode, TimeUnit};
pub use error::{Result, TteError};
pub use summary::IntegrationSummary;
