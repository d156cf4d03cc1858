//! The analysis pipeline: fetch, detect, persist, report.

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;
use voc_core::{
    Action, ActionStatus, ActionType, Confidence, DetectionThresholds, Issue, Trend,
};

use crate::backend::AnalyticsBackend;
use crate::detector::{detect_issue, display_date};
use crate::error::AnalysisError;
use crate::progress::{AnalysisStep, ProgressReporter};

/// Where an outcome's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Live,
    /// Canned sample returned when the backend is missing or unreachable.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub source: AnalysisSource,
    pub issues: Vec<Issue>,
    pub actions: Vec<Action>,
}

/// Runs analyses against an optional backend with fixed thresholds.
#[derive(Debug)]
pub struct Analyzer<B> {
    backend: Option<B>,
    thresholds: DetectionThresholds,
}

impl<B: AnalyticsBackend> Analyzer<B> {
    #[must_use]
    pub fn new(backend: Option<B>, thresholds: DetectionThresholds) -> Self {
        Self {
            backend,
            thresholds,
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Analyzes `product`, reporting each completed phase to `progress`.
    ///
    /// Backend failures do not surface here: a missing backend or a failed
    /// fetch yields the canned fallback, and a failed write becomes a
    /// `failed` action.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Sequence`] if `progress` was already used.
    pub async fn analyze(
        &self,
        product: &str,
        progress: &mut ProgressReporter,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let Some(backend) = &self.backend else {
            tracing::warn!(product, "analytics backend not configured; using sample data");
            return fallback(product, progress).await;
        };

        let t = &self.thresholds;
        let (recent, trends) = tokio::join!(
            backend.recent_reviews(product, t.recent_window_days),
            backend.trend_buckets(product, t.trend_window_days, t),
        );
        let (recent, trends) = match (recent, trends) {
            (Ok(recent), Ok(trends)) => (recent, trends),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(product, error = %e, "review query failed; using sample data");
                return fallback(product, progress).await;
            }
        };

        progress
            .complete(
                AnalysisStep::FetchingReviews,
                format!(
                    "{} reviews from the last {} days",
                    recent.len(),
                    t.recent_window_days
                ),
            )
            .await?;
        progress
            .complete(
                AnalysisStep::AnalyzingTrends,
                format!("{} daily buckets over {} days", trends.len(), t.trend_window_days),
            )
            .await?;

        let issue = detect_issue(product, &recent, &trends, t, Utc::now());
        progress
            .complete(
                AnalysisStep::DetectingIssues,
                issue
                    .as_ref()
                    .map_or_else(|| "No issue detected".to_string(), |i| i.title.clone()),
            )
            .await?;

        let mut actions = Vec::new();
        if let Some(issue) = &issue {
            let action = match backend.record_issue(issue).await {
                Ok(()) => {
                    tracing::info!(product, issue_id = %issue.id, "issue recorded");
                    Action::new(
                        ActionType::IssueCreated,
                        ActionStatus::Success,
                        format!("Issue {} created in tracking system", issue.id),
                    )
                }
                Err(e) => {
                    tracing::warn!(product, issue_id = %issue.id, error = %e, "issue write failed");
                    Action::new(
                        ActionType::IssueCreated,
                        ActionStatus::Failed,
                        format!("Failed to record issue {}: {e}", issue.id),
                    )
                }
            };
            actions.push(action);
        }
        progress
            .complete(
                AnalysisStep::CreatingIssue,
                actions
                    .first()
                    .map_or_else(|| "Nothing to record".to_string(), |a| a.message.clone()),
            )
            .await?;

        let issues: Vec<Issue> = issue.into_iter().collect();
        progress
            .complete(
                AnalysisStep::Complete,
                format!("{} issue(s), {} action(s)", issues.len(), actions.len()),
            )
            .await?;

        Ok(AnalysisOutcome {
            source: AnalysisSource::Live,
            issues,
            actions,
        })
    }
}

async fn fallback(
    product: &str,
    progress: &mut ProgressReporter,
) -> Result<AnalysisOutcome, AnalysisError> {
    for step in AnalysisStep::SEQUENCE {
        progress.complete(step, "Using sample data").await?;
    }
    let (issue, action) = sample_outcome(product);
    Ok(AnalysisOutcome {
        source: AnalysisSource::Fallback,
        issues: vec![issue],
        actions: vec![action],
    })
}

/// The canned issue and action shown when no live data is available.
#[must_use]
pub fn sample_outcome(product: &str) -> (Issue, Action) {
    let now = Utc::now();
    let ticket: u16 = rand::rng().random_range(1000..10_000);

    let issue = Issue {
        id: format!("issue-{}", Uuid::new_v4()),
        title: "Packaging Leakage Issue".to_string(),
        description: format!(
            "Multiple customers reporting product leakage from packaging for {product}. \
             Issue appears to be affecting product integrity during shipping."
        ),
        confidence: Confidence::High,
        platforms: vec!["Marketplace A".to_string(), "Marketplace B".to_string()],
        trend: Trend::Increasing,
        review_count: 18,
        first_detected: display_date(now),
        evidence: vec![
            "Product arrived with leaking container, very disappointed".to_string(),
            "Package was damaged and contents spilled out".to_string(),
            "Leakage issue - needs immediate attention".to_string(),
        ],
    };
    let action = Action::new(
        ActionType::IssueCreated,
        ActionStatus::Success,
        format!("Issue #{ticket} created in tracking system"),
    );
    (issue, action)
}
