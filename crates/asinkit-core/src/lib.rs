pub mod app_config;
pub mod catalog;
pub mod config;
pub mod source;

pub use app_config::{AppConfig, Environment};
pub use catalog::{Dimension, FetchFailure, FetchStatus, ProductRecord, VariantRef};
pub use config::{load_app_config, load_app_config_from_env};
pub use source::ProductSource;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
