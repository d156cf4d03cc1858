//! Review analysis for VOC Radar: issue detection, the analysis pipeline and
//! its progress stream, analytics backends, and synthetic review data.

pub mod analyzer;
pub mod backend;
pub mod detector;
pub mod error;
pub mod progress;
pub mod synthetic;

pub use analyzer::{AnalysisOutcome, AnalysisSource, Analyzer};
pub use backend::{AnalyticsBackend, ElasticBackend, FileBackend};
pub use detector::{bucket_daily, detect_issue};
pub use error::AnalysisError;
pub use progress::{AnalysisStep, ProgressEvent, ProgressReporter, SequenceError, StepSequencer};
