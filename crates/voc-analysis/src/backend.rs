//! Sources of review data and destinations for detected issues.

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use voc_core::{DetectionThresholds, ElasticSettings, Issue, ReviewRow, TrendBucket};
use voc_elastic::{esql, rows, ElasticClient, ElasticError};

use crate::detector::bucket_daily;
use crate::error::AnalysisError;

/// Analytics store the [`crate::Analyzer`] reads from and writes issues to.
pub trait AnalyticsBackend: Send + Sync {
    /// Reviews for `product` from the last `window_days` days, newest first.
    fn recent_reviews(
        &self,
        product: &str,
        window_days: u32,
    ) -> impl Future<Output = Result<Vec<ReviewRow>, AnalysisError>> + Send;

    /// Daily buckets for `product` over the last `window_days` days, oldest first.
    fn trend_buckets(
        &self,
        product: &str,
        window_days: u32,
        thresholds: &DetectionThresholds,
    ) -> impl Future<Output = Result<Vec<TrendBucket>, AnalysisError>> + Send;

    /// Persists `issue` keyed by its id.
    fn record_issue(&self, issue: &Issue) -> impl Future<Output = Result<(), AnalysisError>> + Send;
}

/// Elasticsearch-backed analytics: ES|QL reads, document index writes.
#[derive(Debug, Clone)]
pub struct ElasticBackend {
    client: ElasticClient,
    reviews_index: String,
    issues_index: String,
}

impl ElasticBackend {
    /// # Errors
    ///
    /// Returns [`ElasticError`] if the HTTP client cannot be built.
    pub fn new(settings: &ElasticSettings) -> Result<Self, ElasticError> {
        Ok(Self::from_client(
            ElasticClient::new(settings)?,
            &settings.reviews_index,
            &settings.issues_index,
        ))
    }

    #[must_use]
    pub fn from_client(client: ElasticClient, reviews_index: &str, issues_index: &str) -> Self {
        Self {
            client,
            reviews_index: reviews_index.to_string(),
            issues_index: issues_index.to_string(),
        }
    }
}

impl AnalyticsBackend for ElasticBackend {
    async fn recent_reviews(
        &self,
        product: &str,
        window_days: u32,
    ) -> Result<Vec<ReviewRow>, AnalysisError> {
        let query = esql::recent_reviews_query(&self.reviews_index, product, window_days);
        let result = self.client.query(&query).await?;
        if esql::hits_row_limit(result.values.len()) {
            tracing::warn!(
                product,
                window_days,
                limit = esql::RECENT_ROW_LIMIT,
                "recent review query hit the row limit; complaint count may be understated"
            );
        }
        Ok(rows::review_rows(&result))
    }

    async fn trend_buckets(
        &self,
        product: &str,
        window_days: u32,
        thresholds: &DetectionThresholds,
    ) -> Result<Vec<TrendBucket>, AnalysisError> {
        let query =
            esql::daily_trend_query(&self.reviews_index, product, window_days, thresholds);
        let result = self.client.query(&query).await?;
        Ok(rows::trend_buckets(&result))
    }

    async fn record_issue(&self, issue: &Issue) -> Result<(), AnalysisError> {
        self.client
            .index_document(&self.issues_index, &issue.id, issue)
            .await?;
        Ok(())
    }
}

/// Reviews held in memory, typically loaded from a generated JSON file.
///
/// Window filtering is relative to a fixed `now` so results are reproducible.
/// Issues are written as `<id>.json` under the optional issues directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    reviews: Vec<ReviewRow>,
    now: DateTime<Utc>,
    issues_dir: Option<PathBuf>,
}

impl FileBackend {
    #[must_use]
    pub fn new(reviews: Vec<ReviewRow>, now: DateTime<Utc>) -> Self {
        Self {
            reviews,
            now,
            issues_dir: None,
        }
    }

    /// Loads a JSON array of reviews from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Io`] if the file cannot be read and
    /// [`AnalysisError::Decode`] if it is not a review array.
    pub async fn load(path: &Path, now: DateTime<Utc>) -> Result<Self, AnalysisError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(io_error(path))?;
        let reviews: Vec<ReviewRow> =
            serde_json::from_str(&raw).map_err(|source| AnalysisError::Decode {
                context: path.display().to_string(),
                source,
            })?;
        tracing::debug!(path = %path.display(), count = reviews.len(), "loaded reviews file");
        Ok(Self::new(reviews, now))
    }

    #[must_use]
    pub fn with_issues_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.issues_dir = Some(dir.into());
        self
    }

    fn window<'a>(
        &'a self,
        product: &'a str,
        window_days: u32,
    ) -> impl Iterator<Item = &'a ReviewRow> + 'a {
        let cutoff = self
            .now
            .checked_sub_signed(Duration::days(i64::from(window_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.reviews
            .iter()
            .filter(move |r| r.product == product && r.timestamp >= cutoff)
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> AnalysisError {
    let path = path.display().to_string();
    move |source| AnalysisError::Io { path, source }
}

impl AnalyticsBackend for FileBackend {
    async fn recent_reviews(
        &self,
        product: &str,
        window_days: u32,
    ) -> Result<Vec<ReviewRow>, AnalysisError> {
        let mut recent: Vec<ReviewRow> = self.window(product, window_days).cloned().collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(recent)
    }

    async fn trend_buckets(
        &self,
        product: &str,
        window_days: u32,
        thresholds: &DetectionThresholds,
    ) -> Result<Vec<TrendBucket>, AnalysisError> {
        let rows: Vec<ReviewRow> = self.window(product, window_days).cloned().collect();
        Ok(bucket_daily(&rows, thresholds))
    }

    async fn record_issue(&self, issue: &Issue) -> Result<(), AnalysisError> {
        let dir = self.issues_dir.as_ref().ok_or(AnalysisError::NoIssueSink)?;
        tokio::fs::create_dir_all(dir).await.map_err(io_error(dir))?;

        let path = dir.join(format!("{}.json", issue.id));
        let body = serde_json::to_vec_pretty(issue).map_err(|source| AnalysisError::Decode {
            context: format!("issue {}", issue.id),
            source,
        })?;
        tokio::fs::write(&path, body).await.map_err(io_error(&path))?;
        tracing::info!(path = %path.display(), "issue written");
        Ok(())
    }
}
