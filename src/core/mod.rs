pub mod config;
pub mod context;
pub mod error;
pub mod telemetry;

pub use config::Config;
pub use context::AppContext;
pub use error::{AppError, Result};
