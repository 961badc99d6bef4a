use serde::Serialize;

use crate::model::{
    answer::Answer,
    ids::CardId,
    question::{Question, QuestionKind},
};

/// Recorded result of answering a card. Written once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardOutcome {
    pub answer: Answer,
    pub is_correct: bool,
}

/// One question on the board, with its reveal and answer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    id: CardId,
    question: Question,
    is_flipped: bool,
    outcome: Option<CardOutcome>,
}

impl Card {
    pub(crate) fn new(id: CardId, question: Question) -> Self {
        Self {
            id,
            question,
            is_flipped: false,
            outcome: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.question.kind()
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.question.points()
    }

    /// Whether the question face is showing.
    #[must_use]
    pub fn is_flipped(&self) -> bool {
        self.is_flipped
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.outcome.is_some()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&CardOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn user_answer(&self) -> Option<&Answer> {
        self.outcome.as_ref().map(|outcome| &outcome.answer)
    }

    /// `None` until answered.
    #[must_use]
    pub fn is_correct(&self) -> Option<bool> {
        self.outcome.as_ref().map(|outcome| outcome.is_correct)
    }

    pub(crate) fn flip(&mut self) -> bool {
        let changed = !self.is_flipped;
        self.is_flipped = true;
        changed
    }

    pub(crate) fn unflip(&mut self) -> bool {
        let changed = self.is_flipped;
        self.is_flipped = false;
        changed
    }

    /// Scores and stores `answer`.
    ///
    /// Returns `None` without touching the card if it is already answered or
    /// the answer shape does not fit the question.
    pub(crate) fn record(&mut self, answer: Answer) -> Option<bool> {
        if self.outcome.is_some() {
            return None;
        }
        let is_correct = self.question.key().evaluate(&answer)?;
        self.outcome = Some(CardOutcome { answer, is_correct });
        Some(is_correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionDraft;

    fn single_choice_card() -> Card {
        let question = QuestionDraft::single_choice("q", ["a", "b", "c", "d"], 2, 5)
            .validate()
            .unwrap();
        Card::new(CardId::new(1), question)
    }

    #[test]
    fn record_is_write_once() {
        let mut card = single_choice_card();

        assert_eq!(card.record(Answer::Choice(2)), Some(true));
        assert_eq!(card.record(Answer::Choice(0)), None);

        assert_eq!(card.user_answer(), Some(&Answer::Choice(2)));
        assert_eq!(card.is_correct(), Some(true));
    }

    #[test]
    fn record_rejects_wrong_shape() {
        let mut card = single_choice_card();

        assert_eq!(card.record(Answer::Verdict(true)), None);
        assert!(!card.is_answered());
    }

    #[test]
    fn flip_reports_changes() {
        let mut card = single_choice_card();

        assert!(card.flip());
        assert!(!card.flip());
        assert!(card.unflip());
        assert!(!card.unflip());
    }
}
