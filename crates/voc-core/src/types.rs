use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Neutral => write!(f, "neutral"),
            SentimentLabel::Negative => write!(f, "negative"),
        }
    }
}

/// One customer review as stored in the reviews index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRow {
    pub product: String,
    pub platform: String,
    pub review_text: String,
    /// Star rating, 1 to 5.
    pub rating: u8,
    /// Model sentiment in `[0.0, 1.0]`; lower is more negative.
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_id: Option<String>,
    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Daily aggregate of review sentiment for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendBucket {
    pub timestamp: DateTime<Utc>,
    pub avg_sentiment: f64,
    pub complaint_count: u64,
    pub total_reviews: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Stable,
    Decreasing,
}

/// A detected customer-facing problem with a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: String,
    pub confidence: Confidence,
    pub platforms: Vec<String>,
    pub trend: Trend,
    pub review_count: u64,
    /// Display date, e.g. `"Oct 17, 2026"`.
    pub first_detected: String,
    /// One to three review snippets backing the issue.
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    IssueCreated,
    ResponseDrafted,
    AlertSent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Pending,
    Failed,
}

/// Audit entry for one side effect attempted during an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionType,
    pub status: ActionStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Action {
    #[must_use]
    pub fn new(kind: ActionType, status: ActionStatus, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_serializes_camel_case_fields() {
        let issue = Issue {
            id: "issue-1".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            confidence: Confidence::Medium,
            platforms: vec!["Marketplace A".to_string()],
            trend: Trend::Stable,
            review_count: 4,
            first_detected: "Jan 2, 2026".to_string(),
            evidence: vec!["leaking".to_string()],
        };
        let json = serde_json::to_value(&issue).expect("serialize");
        assert_eq!(json["reviewCount"], 4);
        assert_eq!(json["firstDetected"], "Jan 2, 2026");
        assert_eq!(json["confidence"], "medium");
        assert_eq!(json["trend"], "stable");
    }

    #[test]
    fn action_serializes_type_key() {
        let action = Action::new(ActionType::IssueCreated, ActionStatus::Failed, "boom");
        let json = serde_json::to_value(&action).expect("serialize");
        assert_eq!(json["type"], "issue_created");
        assert_eq!(json["status"], "failed");
    }

    #[test]
    fn review_row_reads_at_timestamp_field() {
        let row: ReviewRow = serde_json::from_value(serde_json::json!({
            "product": "Product A",
            "platform": "Marketplace A",
            "review_text": "Packaging was leaking when it arrived.",
            "rating": 1,
            "sentiment_score": 0.12,
            "sentiment_label": "negative",
            "review_id": "review-1",
            "@timestamp": "2026-10-01T10:00:00Z"
        }))
        .expect("deserialize");
        assert_eq!(row.rating, 1);
        assert_eq!(row.sentiment_label, SentimentLabel::Negative);
        assert_eq!(row.timestamp.to_rfc3339(), "2026-10-01T10:00:00+00:00");
    }
}
