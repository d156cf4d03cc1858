//! Elasticsearch client for VOC Radar.
//!
//! Covers the two stable APIs the analyzer depends on (ES|QL `_query` and the
//! document index endpoints) plus the index management and bulk upload calls
//! used to seed review data.

pub mod client;
pub mod error;
pub mod esql;
pub mod mappings;
pub mod rows;

pub use client::{BulkReport, ElasticClient, QueryColumn, QueryResult};
pub use error::ElasticError;
