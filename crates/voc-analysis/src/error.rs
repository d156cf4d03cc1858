use thiserror::Error;
use voc_elastic::ElasticError;

use crate::progress::SequenceError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analytics backend error: {0}")]
    Backend(#[from] ElasticError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no issue destination configured")]
    NoIssueSink,

    #[error("progress sequence violated: {0}")]
    Sequence(#[from] SequenceError),
}
