//! Linear analysis phases and the progress events emitted as each completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStep {
    Idle,
    FetchingReviews,
    AnalyzingTrends,
    DetectingIssues,
    CreatingIssue,
    Complete,
}

impl AnalysisStep {
    /// Steps after `Idle`, in the only order they may complete.
    pub const SEQUENCE: [AnalysisStep; 5] = [
        AnalysisStep::FetchingReviews,
        AnalysisStep::AnalyzingTrends,
        AnalysisStep::DetectingIssues,
        AnalysisStep::CreatingIssue,
        AnalysisStep::Complete,
    ];

    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::FetchingReviews),
            Self::FetchingReviews => Some(Self::AnalyzingTrends),
            Self::AnalyzingTrends => Some(Self::DetectingIssues),
            Self::DetectingIssues => Some(Self::CreatingIssue),
            Self::CreatingIssue => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    /// 1-based position in [`Self::SEQUENCE`]; `Idle` is 0.
    #[must_use]
    pub fn position(self) -> usize {
        Self::SEQUENCE
            .iter()
            .position(|s| *s == self)
            .map_or(0, |i| i + 1)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FetchingReviews => "fetching_reviews",
            Self::AnalyzingTrends => "analyzing_trends",
            Self::DetectingIssues => "detecting_issues",
            Self::CreatingIssue => "creating_issue",
            Self::Complete => "complete",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Waiting to start",
            Self::FetchingReviews => "Fetching recent reviews",
            Self::AnalyzingTrends => "Analyzing sentiment trends",
            Self::DetectingIssues => "Detecting emerging issues",
            Self::CreatingIssue => "Creating issue record",
            Self::Complete => "Analysis complete",
        }
    }
}

impl std::fmt::Display for AnalysisStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    #[error("step {to} cannot follow {from}")]
    OutOfOrder { from: AnalysisStep, to: AnalysisStep },

    #[error("analysis already complete")]
    Finished,
}

/// Enforces the linear step order. Not restartable once complete.
#[derive(Debug, Clone)]
pub struct StepSequencer {
    current: AnalysisStep,
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl StepSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: AnalysisStep::Idle,
        }
    }

    #[must_use]
    pub fn current(&self) -> AnalysisStep {
        self.current
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current == AnalysisStep::Complete
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::Finished`] after `Complete`, and
    /// [`SequenceError::OutOfOrder`] when `next` is not the immediate successor.
    pub fn advance(&mut self, next: AnalysisStep) -> Result<(), SequenceError> {
        match self.current.next() {
            None => Err(SequenceError::Finished),
            Some(expected) if expected == next => {
                self.current = next;
                Ok(())
            }
            Some(_) => Err(SequenceError::OutOfOrder {
                from: self.current,
                to: next,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub step: AnalysisStep,
    pub index: usize,
    pub total: usize,
    pub label: String,
    pub detail: String,
    pub at: DateTime<Utc>,
}

/// Advances a [`StepSequencer`] and forwards one event per completed step.
#[derive(Debug)]
pub struct ProgressReporter {
    sequencer: StepSequencer,
    tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl ProgressReporter {
    /// A reporter that only tracks the sequence.
    #[must_use]
    pub fn silent() -> Self {
        Self {
            sequencer: StepSequencer::new(),
            tx: None,
        }
    }

    #[must_use]
    pub fn channel(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self {
            sequencer: StepSequencer::new(),
            tx: Some(tx),
        }
    }

    #[must_use]
    pub fn current(&self) -> AnalysisStep {
        self.sequencer.current()
    }

    /// Marks `step` complete and emits its event.
    ///
    /// A closed receiver is not an error; the event is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError`] if `step` is out of order.
    pub async fn complete(
        &mut self,
        step: AnalysisStep,
        detail: impl Into<String>,
    ) -> Result<(), SequenceError> {
        self.sequencer.advance(step)?;

        let Some(tx) = &self.tx else {
            return Ok(());
        };

        let event = ProgressEvent {
            step,
            index: step.position(),
            total: AnalysisStep::SEQUENCE.len(),
            label: step.label().to_string(),
            detail: detail.into(),
            at: Utc::now(),
        };
        if tx.send(event).await.is_err() {
            tracing::debug!(step = %step, "progress receiver dropped; discarding event");
            self.tx = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_sequence_advances_in_order() {
        let mut seq = StepSequencer::new();
        for step in AnalysisStep::SEQUENCE {
            seq.advance(step).expect("in order");
        }
        assert!(seq.is_complete());
    }

    #[test]
    fn skipping_a_step_is_rejected() {
        let mut seq = StepSequencer::new();
        seq.advance(AnalysisStep::FetchingReviews).unwrap();
        let err = seq.advance(AnalysisStep::DetectingIssues).unwrap_err();
        assert_eq!(
            err,
            SequenceError::OutOfOrder {
                from: AnalysisStep::FetchingReviews,
                to: AnalysisStep::DetectingIssues,
            }
        );
        assert_eq!(seq.current(), AnalysisStep::FetchingReviews);
    }

    #[test]
    fn no_restart_after_complete() {
        let mut seq = StepSequencer::new();
        for step in AnalysisStep::SEQUENCE {
            seq.advance(step).unwrap();
        }
        assert_eq!(
            seq.advance(AnalysisStep::FetchingReviews),
            Err(SequenceError::Finished)
        );
    }

    #[test]
    fn repeating_a_step_is_rejected() {
        let mut seq = StepSequencer::new();
        seq.advance(AnalysisStep::FetchingReviews).unwrap();
        assert!(seq.advance(AnalysisStep::FetchingReviews).is_err());
    }

    #[test]
    fn step_serializes_snake_case() {
        let json = serde_json::to_value(AnalysisStep::FetchingReviews).unwrap();
        assert_eq!(json, "fetching_reviews");
        assert_eq!(AnalysisStep::CreatingIssue.to_string(), "creating_issue");
        assert_eq!(AnalysisStep::Idle.position(), 0);
        assert_eq!(AnalysisStep::Complete.position(), 5);
    }

    #[tokio::test]
    async fn reporter_emits_one_event_per_step() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut reporter = ProgressReporter::channel(tx);
        reporter
            .complete(AnalysisStep::FetchingReviews, "12 reviews")
            .await
            .unwrap();
        reporter
            .complete(AnalysisStep::AnalyzingTrends, "30 buckets")
            .await
            .unwrap();
        drop(reporter);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.step, AnalysisStep::FetchingReviews);
        assert_eq!(first.index, 1);
        assert_eq!(first.total, 5);
        assert_eq!(first.label, "Fetching recent reviews");
        assert_eq!(first.detail, "12 reviews");
        assert_eq!(rx.recv().await.unwrap().index, 2);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn dropped_receiver_is_not_an_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut reporter = ProgressReporter::channel(tx);
        reporter
            .complete(AnalysisStep::FetchingReviews, "")
            .await
            .expect("closed channel is tolerated");
        assert_eq!(reporter.current(), AnalysisStep::FetchingReviews);
    }

    #[tokio::test]
    async fn reporter_rejects_out_of_order_step() {
        let mut reporter = ProgressReporter::silent();
        assert!(reporter
            .complete(AnalysisStep::Complete, "done")
            .await
            .is_err());
    }
}
