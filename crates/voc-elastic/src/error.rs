use thiserror::Error;

/// Errors returned by the Elasticsearch client.
#[derive(Debug, Error)]
pub enum ElasticError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Elasticsearch answered with a non-success status.
    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus { status: u16, url: String, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid Elasticsearch base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
