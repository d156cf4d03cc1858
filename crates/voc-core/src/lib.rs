//! Shared domain types and configuration for VOC Radar.

mod app_config;
mod config;
mod products;
mod thresholds;
mod types;

use thiserror::Error;

pub use app_config::{AppConfig, ElasticSettings, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{load_products, ProductEntry, ProductsFile};
pub use thresholds::DetectionThresholds;
pub use types::{
    Action, ActionStatus, ActionType, Confidence, Issue, ReviewRow, SentimentLabel, Trend,
    TrendBucket,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read products file {path}: {source}")]
    ProductsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse products file: {0}")]
    ProductsFileParse(#[source] serde_yaml::Error),

    #[error("products config validation failed: {0}")]
    Validation(String),
}
