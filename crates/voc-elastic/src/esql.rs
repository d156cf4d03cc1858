//! ES|QL query builders for the review analysis.

use voc_core::DetectionThresholds;

/// Columns returned by [`recent_reviews_query`], in order.
pub const REVIEW_COLUMNS: &[&str] = &[
    "product",
    "platform",
    "review_text",
    "rating",
    "sentiment_score",
    "sentiment_label",
    "review_id",
    "@timestamp",
];

/// Upper bound on rows pulled for the recent window.
pub const RECENT_ROW_LIMIT: usize = 1000;

/// Whether a recent-window result was cut off at [`RECENT_ROW_LIMIT`].
#[must_use]
pub fn hits_row_limit(rows: usize) -> bool {
    rows >= RECENT_ROW_LIMIT
}

/// Quotes `value` as an ES|QL string literal.
#[must_use]
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Reviews for `product` from the last `days` days, newest first.
///
/// At most [`RECENT_ROW_LIMIT`] rows come back. A busier window is truncated
/// to its newest rows, which undercounts complaints; callers should check
/// [`hits_row_limit`].
#[must_use]
pub fn recent_reviews_query(index: &str, product: &str, days: u32) -> String {
    format!(
        "FROM {index} \
         | WHERE product == {product} AND @timestamp >= NOW() - {days} days \
         | KEEP {columns} \
         | SORT @timestamp DESC \
         | LIMIT {RECENT_ROW_LIMIT}",
        product = string_literal(product),
        columns = REVIEW_COLUMNS.join(", "),
    )
}

/// Daily sentiment and complaint aggregates for `product` over the last `days` days.
///
/// The complaint predicate mirrors [`DetectionThresholds::is_complaint`] so
/// server-side buckets agree with locally computed ones.
#[must_use]
pub fn daily_trend_query(
    index: &str,
    product: &str,
    days: u32,
    thresholds: &DetectionThresholds,
) -> String {
    format!(
        "FROM {index} \
         | WHERE product == {product} AND @timestamp >= NOW() - {days} days \
         | EVAL day = DATE_TRUNC(1 day, @timestamp), \
                is_complaint = CASE(sentiment_score < {score} OR rating <= {rating}, 1, 0) \
         | STATS avg_sentiment = AVG(sentiment_score), \
                 complaint_count = SUM(is_complaint), \
                 total_reviews = COUNT(*) BY day \
         | SORT day ASC",
        product = string_literal(product),
        score = thresholds.complaint_sentiment_max,
        rating = thresholds.complaint_rating_max,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_literal_escapes_quotes_and_backslashes() {
        assert_eq!(string_literal(r#"Say "hi"\now"#), r#""Say \"hi\"\\now""#);
    }

    #[test]
    fn string_literal_escapes_control_whitespace() {
        assert_eq!(
            string_literal("Line one\nline two\r\tend"),
            r#""Line one\nline two\r\tend""#
        );
        let q = recent_reviews_query("customer_reviews", "Bad\nName", 7);
        assert!(!q.contains('\n'), "{q}");
    }

    #[test]
    fn row_limit_is_detected_at_the_cap() {
        assert!(!hits_row_limit(RECENT_ROW_LIMIT - 1));
        assert!(hits_row_limit(RECENT_ROW_LIMIT));
        let q = recent_reviews_query("customer_reviews", "Product A", 7);
        assert!(q.ends_with(&format!("LIMIT {RECENT_ROW_LIMIT}")), "{q}");
    }

    #[test]
    fn recent_query_filters_product_and_window() {
        let q = recent_reviews_query("customer_reviews", "Product A", 7);
        assert!(q.starts_with("FROM customer_reviews"));
        assert!(q.contains(r#"product == "Product A""#), "{q}");
        assert!(q.contains("NOW() - 7 days"), "{q}");
        assert!(q.contains("KEEP product, platform, review_text"), "{q}");
        assert!(q.contains("SORT @timestamp DESC"), "{q}");
    }

    #[test]
    fn trend_query_uses_configured_complaint_predicate() {
        let thresholds = DetectionThresholds::default();
        let q = daily_trend_query("customer_reviews", "Product B", 30, &thresholds);
        assert!(q.contains("NOW() - 30 days"), "{q}");
        assert!(q.contains("sentiment_score < 0.35 OR rating <= 2"), "{q}");
        assert!(q.contains("BY day"), "{q}");
        assert!(q.ends_with("SORT day ASC"), "{q}");
    }
}
