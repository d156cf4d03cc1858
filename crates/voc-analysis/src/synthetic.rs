//! Synthetic review data for demos and local runs.
//!
//! Produces a 60/20/20 positive/neutral/negative mix spread over the last 90
//! days, plus a burst of recent packaging complaints for `Product A` so the
//! detector has something to find.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rand::Rng;
use voc_core::{ReviewRow, SentimentLabel};

pub const PRODUCTS: [&str; 3] = ["Product A", "Product B", "Product C"];
pub const PLATFORMS: [&str; 3] = ["Marketplace A", "Marketplace B", "Marketplace C"];

pub const DEFAULT_REVIEWS_PER_PRODUCT: usize = 200;

/// Product that receives the seeded complaint burst.
pub const SEEDED_PRODUCT: &str = "Product A";
pub const SEEDED_COMPLAINTS: usize = 15;
pub const SEEDED_COMPLAINT_TEXT: &str = "Product arrived with leaking container, very disappointed";

const HISTORY_DAYS: i64 = 90;
const SEEDED_WINDOW_MS: i64 = 5 * 24 * 60 * 60 * 1000;

const POSITIVE_REVIEWS: &[&str] = &[
    "Great product! Very satisfied with my purchase.",
    "Excellent quality, exactly as described.",
    "Love it! Would definitely buy again.",
    "Amazing value for money. Highly recommend!",
    "Perfect! Fast shipping and great packaging.",
    "Outstanding product quality. Exceeded expectations.",
    "Very happy with this purchase. Great customer service too.",
    "Top quality product. Will order more soon.",
];

const NEUTRAL_REVIEWS: &[&str] = &[
    "Product is okay, nothing special.",
    "It works as expected, but could be better.",
    "Average product, does the job.",
    "Decent quality, but not exceptional.",
    "It's fine, but I expected more.",
    "Okay product, meets basic requirements.",
];

const NEGATIVE_REVIEWS: &[&str] = &[
    "Product arrived damaged. Very disappointed.",
    "Poor quality, not worth the price.",
    "Packaging was leaking when it arrived.",
    "Quality has gone down since last purchase.",
    "Not as described. Very disappointed.",
    "Product leaked during shipping. Container was broken.",
    "Packaging issue - contents spilled out.",
    "Quality degradation noticed. Not the same as before.",
    "Leakage problem with packaging. Needs immediate attention.",
    "Product arrived with leaking container, very disappointed.",
    "Package was damaged and contents spilled out.",
    "Leakage issue - needs immediate attention.",
    "Quality not as good as before.",
    "Seems different from what I ordered last time.",
    "Packaging leakage is a serious problem.",
    "Multiple issues with product quality lately.",
];

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn slug(product: &str) -> String {
    product.to_lowercase().replace(' ', "-")
}

/// One review for `product` on `platform`, `days_ago` days before `now`.
pub fn generate_review<R: Rng>(
    rng: &mut R,
    product: &str,
    platform: &str,
    days_ago: i64,
    now: DateTime<Utc>,
) -> ReviewRow {
    let roll: f64 = rng.random();
    let (label, score, text, rating) = if roll < 0.6 {
        (
            SentimentLabel::Positive,
            0.7 + rng.random::<f64>() * 0.3,
            pick(rng, POSITIVE_REVIEWS),
            rng.random_range(4..=5),
        )
    } else if roll < 0.8 {
        (
            SentimentLabel::Neutral,
            0.4 + rng.random::<f64>() * 0.3,
            pick(rng, NEUTRAL_REVIEWS),
            3,
        )
    } else {
        (
            SentimentLabel::Negative,
            rng.random::<f64>() * 0.4,
            pick(rng, NEGATIVE_REVIEWS),
            rng.random_range(1..=2),
        )
    };

    let time = NaiveTime::from_hms_opt(rng.random_range(0..24), rng.random_range(0..60), 0)
        .unwrap_or(NaiveTime::MIN);
    let day = (now - Duration::days(days_ago)).date_naive();

    ReviewRow {
        product: product.to_string(),
        platform: platform.to_string(),
        review_text: text.to_string(),
        rating,
        sentiment_score: round2(score),
        sentiment_label: label,
        review_id: None,
        timestamp: day.and_time(time).and_utc(),
    }
}

/// `count` reviews for `product`, plus the complaint burst for [`SEEDED_PRODUCT`].
pub fn generate_product_reviews<R: Rng>(
    rng: &mut R,
    product: &str,
    count: usize,
    now: DateTime<Utc>,
) -> Vec<ReviewRow> {
    let slug = slug(product);
    let mut reviews = Vec::with_capacity(count + SEEDED_COMPLAINTS);

    for i in 0..count {
        let platform = pick(rng, &PLATFORMS);
        let days_ago = rng.random_range(0..HISTORY_DAYS);
        let mut review = generate_review(rng, product, platform, days_ago, now);
        review.review_id = Some(format!("review-{slug}-{i}"));
        reviews.push(review);
    }

    if product == SEEDED_PRODUCT {
        for i in 0..SEEDED_COMPLAINTS {
            reviews.push(ReviewRow {
                product: product.to_string(),
                platform: PLATFORMS[0].to_string(),
                review_text: SEEDED_COMPLAINT_TEXT.to_string(),
                rating: 1,
                sentiment_score: 0.2,
                sentiment_label: SentimentLabel::Negative,
                review_id: Some(format!("review-issue-{i}")),
                timestamp: now - Duration::milliseconds(rng.random_range(0..SEEDED_WINDOW_MS)),
            });
        }
    }

    reviews
}

/// Reviews for every product in [`PRODUCTS`].
pub fn generate_all_reviews<R: Rng>(
    rng: &mut R,
    count_per_product: usize,
    now: DateTime<Utc>,
) -> Vec<ReviewRow> {
    PRODUCTS
        .iter()
        .flat_map(|product| generate_product_reviews(rng, product, count_per_product, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use voc_core::DetectionThresholds;

    use super::*;
    use crate::detector::{bucket_daily, classify_trend, detect_issue};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-17T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn generates_expected_volume_and_unique_ids() {
        let mut rng = StdRng::seed_from_u64(7);
        let reviews = generate_all_reviews(&mut rng, DEFAULT_REVIEWS_PER_PRODUCT, now());
        assert_eq!(reviews.len(), 3 * 200 + SEEDED_COMPLAINTS);

        let ids: HashSet<_> = reviews.iter().filter_map(|r| r.review_id.clone()).collect();
        assert_eq!(ids.len(), reviews.len());
    }

    #[test]
    fn reviews_respect_band_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        for r in generate_product_reviews(&mut rng, "Product B", 500, now()) {
            assert!((0.0..=1.0).contains(&r.sentiment_score));
            assert!((1..=5).contains(&r.rating));
            assert!(r.timestamp > now() - Duration::days(HISTORY_DAYS + 1));
            match r.sentiment_label {
                SentimentLabel::Positive => assert!(r.rating >= 4 && r.sentiment_score >= 0.7),
                SentimentLabel::Neutral => assert_eq!(r.rating, 3),
                SentimentLabel::Negative => assert!(r.rating <= 2 && r.sentiment_score <= 0.4),
            }
        }
    }

    #[test]
    fn same_seed_same_output() {
        let a = generate_all_reviews(&mut StdRng::seed_from_u64(3), 50, now());
        let b = generate_all_reviews(&mut StdRng::seed_from_u64(3), 50, now());
        assert_eq!(a, b);
    }

    #[test]
    fn only_product_a_gets_seeded_burst() {
        let mut rng = StdRng::seed_from_u64(5);
        let b = generate_product_reviews(&mut rng, "Product B", 10, now());
        assert_eq!(b.len(), 10);

        let a = generate_product_reviews(&mut rng, "Product A", 10, now());
        let seeded: Vec<_> = a
            .iter()
            .filter(|r| r.review_id.as_deref().is_some_and(|id| id.starts_with("review-issue-")))
            .collect();
        assert_eq!(seeded.len(), SEEDED_COMPLAINTS);
        assert!(seeded
            .iter()
            .all(|r| r.timestamp >= now() - Duration::days(5) && r.platform == "Marketplace A"));
    }

    #[test]
    fn generated_product_a_always_yields_an_issue() {
        let t = DetectionThresholds::default();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rows = generate_product_reviews(&mut rng, "Product A", 200, now());

            let recent: Vec<ReviewRow> = rows
                .iter()
                .filter(|r| r.timestamp >= now() - Duration::days(7))
                .cloned()
                .collect();
            let month: Vec<ReviewRow> = rows
                .iter()
                .filter(|r| r.timestamp >= now() - Duration::days(30))
                .cloned()
                .collect();
            let trends = bucket_daily(&month, &t);

            let issue = detect_issue("Product A", &recent, &trends, &t, now());
            let issue = issue.unwrap_or_else(|| panic!("seed {seed} produced no issue"));
            assert!(issue.review_count >= 15, "seed {seed}: {}", issue.review_count);
            assert!(issue.platforms.contains(&"Marketplace A".to_string()));
            assert_eq!(issue.trend, classify_trend(&trends, &t), "seed {seed}");
        }
    }
}
