use serde::{Deserialize, Serialize};

/// Numeric knobs for issue detection.
///
/// The defaults are demo values; every field can be overridden through the
/// `VOC_*` environment variables read by [`crate::load_app_config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionThresholds {
    /// A review with `sentiment_score` strictly below this is a complaint.
    pub complaint_sentiment_max: f64,
    /// A review with `rating` at or below this is a complaint.
    pub complaint_rating_max: u8,
    /// Complaint count at which an issue fires.
    pub min_complaints: usize,
    /// Average sentiment strictly below this fires an issue.
    pub alert_sentiment: f64,
    pub high_confidence_complaints: usize,
    pub high_confidence_sentiment: f64,
    pub low_confidence_complaints: usize,
    pub low_confidence_sentiment: f64,
    /// Newest bucket above `oldest * trend_increase_ratio` is increasing.
    pub trend_increase_ratio: f64,
    /// Newest bucket below `oldest * trend_decrease_ratio` is decreasing.
    pub trend_decrease_ratio: f64,
    pub max_evidence: usize,
    pub recent_window_days: u32,
    pub trend_window_days: u32,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            complaint_sentiment_max: 0.35,
            complaint_rating_max: 2,
            min_complaints: 3,
            alert_sentiment: 0.45,
            high_confidence_complaints: 15,
            high_confidence_sentiment: 0.3,
            low_confidence_complaints: 5,
            low_confidence_sentiment: 0.42,
            trend_increase_ratio: 1.3,
            trend_decrease_ratio: 0.7,
            max_evidence: 3,
            recent_window_days: 7,
            trend_window_days: 30,
        }
    }
}

impl DetectionThresholds {
    /// Returns `true` when a review with this score and rating counts as a complaint.
    #[must_use]
    pub fn is_complaint(&self, sentiment_score: f64, rating: u8) -> bool {
        sentiment_score < self.complaint_sentiment_max || rating <= self.complaint_rating_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_score_is_complaint_regardless_of_rating() {
        let t = DetectionThresholds::default();
        assert!(t.is_complaint(0.34, 5));
    }

    #[test]
    fn low_rating_is_complaint_regardless_of_score() {
        let t = DetectionThresholds::default();
        assert!(t.is_complaint(0.9, 2));
    }

    #[test]
    fn boundary_score_is_not_complaint() {
        let t = DetectionThresholds::default();
        assert!(!t.is_complaint(0.35, 3));
    }
}
