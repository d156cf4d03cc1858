//! Issue detection over recent reviews and daily trend buckets.
//!
//! Everything here is pure: the caller supplies the rows, the thresholds and
//! the clock. Persisting a detected issue is the analyzer's job.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveTime, Utc};
use uuid::Uuid;
use voc_core::{Confidence, DetectionThresholds, Issue, ReviewRow, Trend, TrendBucket};

/// Evidence used when no review text qualifies.
pub const FALLBACK_EVIDENCE: &str =
    "Customer feedback indicates a decline in satisfaction for this product.";

/// Platform label used when no review names a platform.
pub const MULTIPLE_PLATFORMS: &str = "Multiple Platforms";

/// Sentiment assumed when there is no data at all.
const NEUTRAL_SENTIMENT: f64 = 0.5;

/// Aggregate signals computed before deciding whether an issue exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub total_complaints: usize,
    pub avg_sentiment: f64,
    pub trend: Trend,
    pub confidence: Confidence,
}

#[must_use]
pub fn is_complaint(row: &ReviewRow, thresholds: &DetectionThresholds) -> bool {
    thresholds.is_complaint(row.sentiment_score, row.rating)
}

/// Mean bucket sentiment when buckets exist, else mean row sentiment, else neutral.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_sentiment(recent: &[ReviewRow], trends: &[TrendBucket]) -> f64 {
    if !trends.is_empty() {
        return trends.iter().map(|b| b.avg_sentiment).sum::<f64>() / trends.len() as f64;
    }
    if !recent.is_empty() {
        return recent.iter().map(|r| r.sentiment_score).sum::<f64>() / recent.len() as f64;
    }
    NEUTRAL_SENTIMENT
}

/// Compares the oldest and newest bucket complaint counts.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn classify_trend(trends: &[TrendBucket], thresholds: &DetectionThresholds) -> Trend {
    if trends.len() < 2 {
        return Trend::Stable;
    }

    let mut ordered: Vec<&TrendBucket> = trends.iter().collect();
    ordered.sort_by_key(|b| b.timestamp);

    let (Some(oldest), Some(newest)) = (ordered.first(), ordered.last()) else {
        return Trend::Stable;
    };
    let oldest = oldest.complaint_count as f64;
    let newest = newest.complaint_count as f64;

    if newest > oldest * thresholds.trend_increase_ratio {
        Trend::Increasing
    } else if newest < oldest * thresholds.trend_decrease_ratio {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

#[must_use]
pub fn classify_confidence(
    total_complaints: usize,
    avg_sentiment: f64,
    thresholds: &DetectionThresholds,
) -> Confidence {
    if total_complaints >= thresholds.high_confidence_complaints
        || avg_sentiment < thresholds.high_confidence_sentiment
    {
        Confidence::High
    } else if total_complaints < thresholds.low_confidence_complaints
        && avg_sentiment >= thresholds.low_confidence_sentiment
    {
        Confidence::Low
    } else {
        Confidence::Medium
    }
}

/// Distinct platforms in first-seen order.
#[must_use]
pub fn collect_platforms(recent: &[ReviewRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    let platforms: Vec<String> = recent
        .iter()
        .map(|r| r.platform.trim())
        .filter(|p| !p.is_empty() && seen.insert(*p))
        .map(str::to_string)
        .collect();

    if platforms.is_empty() {
        vec![MULTIPLE_PLATFORMS.to_string()]
    } else {
        platforms
    }
}

/// Up to `max_evidence` review texts, complaints first. Never empty.
#[must_use]
pub fn collect_evidence(recent: &[ReviewRow], thresholds: &DetectionThresholds) -> Vec<String> {
    let texts = |complaints_only: bool| -> Vec<String> {
        recent
            .iter()
            .filter(|r| !complaints_only || is_complaint(r, thresholds))
            .map(|r| r.review_text.trim())
            .filter(|t| !t.is_empty())
            .take(thresholds.max_evidence)
            .map(str::to_string)
            .collect()
    };

    let mut evidence = texts(true);
    if evidence.is_empty() {
        evidence = texts(false);
    }
    if evidence.is_empty() {
        evidence.push(FALLBACK_EVIDENCE.to_string());
    }
    evidence
}

/// Computes the aggregate signals, or `None` when nothing crosses a threshold.
#[must_use]
pub fn evaluate(
    recent: &[ReviewRow],
    trends: &[TrendBucket],
    thresholds: &DetectionThresholds,
) -> Option<Detection> {
    let total_complaints = recent.iter().filter(|r| is_complaint(r, thresholds)).count();
    let avg_sentiment = average_sentiment(recent, trends);

    if total_complaints < thresholds.min_complaints && avg_sentiment >= thresholds.alert_sentiment
    {
        return None;
    }

    Some(Detection {
        total_complaints,
        avg_sentiment,
        trend: classify_trend(trends, thresholds),
        confidence: classify_confidence(total_complaints, avg_sentiment, thresholds),
    })
}

/// Runs detection for `product` and builds the resulting issue, if any.
#[must_use]
pub fn detect_issue(
    product: &str,
    recent: &[ReviewRow],
    trends: &[TrendBucket],
    thresholds: &DetectionThresholds,
    now: DateTime<Utc>,
) -> Option<Issue> {
    let detection = evaluate(recent, trends, thresholds)?;

    let title = if detection.total_complaints >= thresholds.min_complaints {
        format!("High Complaint Volume: {product}")
    } else {
        format!("Sentiment Decline: {product}")
    };

    let description = format!(
        "{count} complaint{plural} in the last {days} days for {product}; \
         average sentiment {avg:.2} with a {trend} complaint trend.",
        count = detection.total_complaints,
        plural = if detection.total_complaints == 1 { "" } else { "s" },
        days = thresholds.recent_window_days,
        avg = detection.avg_sentiment,
        trend = trend_word(detection.trend),
    );

    let review_count = if detection.total_complaints > 0 {
        detection.total_complaints as u64
    } else {
        recent.len() as u64
    };

    let first_detected = recent
        .iter()
        .filter(|r| is_complaint(r, thresholds))
        .map(|r| r.timestamp)
        .min()
        .unwrap_or(now);

    Some(Issue {
        id: format!("issue-{}", Uuid::new_v4()),
        title,
        description,
        confidence: detection.confidence,
        platforms: collect_platforms(recent),
        trend: detection.trend,
        review_count,
        first_detected: display_date(first_detected),
        evidence: collect_evidence(recent, thresholds),
    })
}

/// Formats a date the way the dashboard shows it, e.g. `Oct 7, 2026`.
#[must_use]
pub fn display_date(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

fn trend_word(trend: Trend) -> &'static str {
    match trend {
        Trend::Increasing => "rising",
        Trend::Stable => "steady",
        Trend::Decreasing => "falling",
    }
}

/// Aggregates rows into one bucket per UTC day, oldest first.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn bucket_daily(rows: &[ReviewRow], thresholds: &DetectionThresholds) -> Vec<TrendBucket> {
    #[derive(Default)]
    struct Acc {
        sentiment_sum: f64,
        complaints: u64,
        total: u64,
    }

    let mut days: BTreeMap<chrono::NaiveDate, Acc> = BTreeMap::new();
    for row in rows {
        let acc = days.entry(row.timestamp.date_naive()).or_default();
        acc.sentiment_sum += row.sentiment_score;
        acc.total += 1;
        if is_complaint(row, thresholds) {
            acc.complaints += 1;
        }
    }

    days.into_iter()
        .map(|(day, acc)| TrendBucket {
            timestamp: day.and_time(NaiveTime::MIN).and_utc(),
            avg_sentiment: acc.sentiment_sum / acc.total as f64,
            complaint_count: acc.complaints,
            total_reviews: acc.total,
        })
        .collect()
}
