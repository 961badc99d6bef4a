use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::Card;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("session is not finished: {answered} of {total} cards answered")]
    Incomplete { answered: usize, total: usize },
}

/// Aggregate summary for a completed play-through.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    answered: usize,
    correct: usize,
    score: u32,
    max_score: u32,
}

impl SessionSummary {
    /// Build a summary from the final state of every card.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `SessionSummaryError::Incomplete` if any card is still unanswered.
    pub fn from_cards(
        cards: &[Card],
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }

        let mut answered = 0_usize;
        let mut correct = 0_usize;
        let mut score = 0_u32;
        let mut max_score = 0_u32;

        for card in cards {
            max_score = max_score.saturating_add(card.points());
            match card.is_correct() {
                Some(true) => {
                    answered += 1;
                    correct += 1;
                    score = score.saturating_add(card.points());
                }
                Some(false) => answered += 1,
                None => {}
            }
        }

        if answered != cards.len() {
            return Err(SessionSummaryError::Incomplete {
                answered,
                total: cards.len(),
            });
        }

        Ok(Self {
            started_at,
            completed_at,
            answered,
            correct,
            score,
            max_score,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.answered
    }

    /// Number of cards answered correctly.
    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    #[must_use]
    pub fn accuracy_percent(&self) -> f64 {
        if self.max_score == 0 {
            return 0.0;
        }
        f64::from(self.score) / f64::from(self.max_score) * 100.0
    }

    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, CardId, QuestionDraft};
    use crate::time::fixed_now;

    fn answered_cards() -> Vec<Card> {
        let mut first = Card::new(
            CardId::new(1),
            QuestionDraft::single_choice("q1", ["a", "b"], 1, 5)
                .validate()
                .unwrap(),
        );
        first.record(Answer::Choice(1));

        let mut second = Card::new(
            CardId::new(2),
            QuestionDraft::free_response("q2", 10).validate().unwrap(),
        );
        second.record(Answer::Verdict(false));

        vec![first, second]
    }

    #[test]
    fn summary_counts_correct_cards() {
        let now = fixed_now();
        let later = now + chrono::Duration::seconds(90);

        let summary = SessionSummary::from_cards(&answered_cards(), now, later).unwrap();

        assert_eq!(summary.answered(), 2);
        assert_eq!(summary.correct(), 1);
        assert_eq!(summary.score(), 5);
        assert_eq!(summary.max_score(), 15);
        assert_eq!(summary.duration(), chrono::Duration::seconds(90));
    }

    #[test]
    fn summary_rejects_unanswered_cards() {
        let now = fixed_now();
        let mut cards = answered_cards();
        cards.push(Card::new(
            CardId::new(3),
            QuestionDraft::free_response("q3", 5).validate().unwrap(),
        ));

        let err = SessionSummary::from_cards(&cards, now, now).unwrap_err();
        assert_eq!(
            err,
            SessionSummaryError::Incomplete {
                answered: 2,
                total: 3
            }
        );
    }

    #[test]
    fn summary_rejects_reversed_time_range() {
        let now = fixed_now();
        let earlier = now - chrono::Duration::seconds(1);

        let err = SessionSummary::from_cards(&answered_cards(), now, earlier).unwrap_err();
        assert_eq!(err, SessionSummaryError::InvalidTimeRange);
    }
}
