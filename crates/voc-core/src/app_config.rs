use std::net::SocketAddr;
use std::path::PathBuf;

use crate::DetectionThresholds;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Connection settings for the Elasticsearch analytics backend.
///
/// Only present when both the base URL and the API key are configured.
#[derive(Clone)]
pub struct ElasticSettings {
    pub base_url: String,
    pub api_key: String,
    pub reviews_index: String,
    pub issues_index: String,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for ElasticSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .field("reviews_index", &self.reviews_index)
            .field("issues_index", &self.issues_index)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub products_path: PathBuf,
    /// `None` when `ELASTIC_BASE_URL` or `ELASTIC_API_KEY` is unset; analyses
    /// then run in fallback mode.
    pub elastic: Option<ElasticSettings>,
    pub thresholds: DetectionThresholds,
}
