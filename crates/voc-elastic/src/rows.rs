//! Decoding of ES|QL tables into domain rows.
//!
//! Columns are looked up by name, so extra or reordered columns are fine.
//! Rows missing a required value are skipped rather than failing the query.

use chrono::{DateTime, Utc};
use serde_json::Value;
use voc_core::{ReviewRow, SentimentLabel, TrendBucket};

use crate::client::QueryResult;

struct Row<'a> {
    result: &'a QueryResult,
    values: &'a [Value],
}

impl Row<'_> {
    fn get(&self, column: &str) -> Option<&Value> {
        self.result
            .column_index(column)
            .and_then(|i| self.values.get(i))
            .filter(|v| !v.is_null())
    }

    fn str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    fn f64(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn u64(&self, column: &str) -> Option<u64> {
        let value = self.get(column)?;
        value
            .as_u64()
            .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
    }

    fn timestamp(&self, column: &str) -> Option<DateTime<Utc>> {
        self.str(column)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

fn rows(result: &QueryResult) -> impl Iterator<Item = Row<'_>> {
    result.values.iter().map(move |values| Row { result, values })
}

fn parse_label(raw: Option<&str>, sentiment_score: f64) -> SentimentLabel {
    match raw {
        Some("positive") => SentimentLabel::Positive,
        Some("negative") => SentimentLabel::Negative,
        Some("neutral") => SentimentLabel::Neutral,
        _ if sentiment_score >= 0.7 => SentimentLabel::Positive,
        _ if sentiment_score < 0.4 => SentimentLabel::Negative,
        _ => SentimentLabel::Neutral,
    }
}

/// Decodes review rows from a [`crate::esql::recent_reviews_query`] result.
#[must_use]
pub fn review_rows(result: &QueryResult) -> Vec<ReviewRow> {
    let mut out = Vec::with_capacity(result.values.len());
    for row in rows(result) {
        let decoded = (|| {
            let sentiment_score = row.f64("sentiment_score")?;
            let rating = u8::try_from(row.u64("rating")?).ok()?;
            Some(ReviewRow {
                product: row.str("product")?.to_string(),
                platform: row.str("platform").unwrap_or_default().to_string(),
                review_text: row.str("review_text").unwrap_or_default().to_string(),
                rating,
                sentiment_score,
                sentiment_label: parse_label(row.str("sentiment_label"), sentiment_score),
                review_id: row.str("review_id").map(str::to_string),
                timestamp: row.timestamp("@timestamp")?,
            })
        })();

        match decoded {
            Some(review) => out.push(review),
            None => tracing::debug!(values = ?row.values, "skipping undecodable review row"),
        }
    }
    out
}

/// Decodes trend buckets from a [`crate::esql::daily_trend_query`] result.
#[must_use]
pub fn trend_buckets(result: &QueryResult) -> Vec<TrendBucket> {
    let mut out = Vec::with_capacity(result.values.len());
    for row in rows(result) {
        let decoded = (|| {
            Some(TrendBucket {
                timestamp: row.timestamp("day")?,
                avg_sentiment: row.f64("avg_sentiment")?,
                complaint_count: row.u64("complaint_count").unwrap_or(0),
                total_reviews: row.u64("total_reviews").unwrap_or(0),
            })
        })();

        match decoded {
            Some(bucket) => out.push(bucket),
            None => tracing::debug!(values = ?row.values, "skipping undecodable trend bucket"),
        }
    }
    out
}
