//! Authoritative in-memory quiz state.
//!
//! All mutation goes through the transition methods on [`SessionStore`].
//! Invalid transitions are absorbed: they leave the state untouched, return
//! [`Transition::Ignored`], and do not notify observers.

use std::fmt;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use crate::model::{
    Answer, Card, CardId, GameState, Progress, Question, QuestionDraft, QuestionSetError,
    SessionSummary, validate_all,
};
use crate::time::Clock;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors building a session. Runtime transitions never fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error(transparent)]
    Questions(#[from] QuestionSetError),
    #[error("total points of the question set exceed {}", u32::MAX)]
    ScoreOverflow,
}

//
// ─── TRANSITIONS ───────────────────────────────────────────────────────────────
//

/// Why an intent was absorbed without changing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum IgnoreReason {
    UnknownCard,
    AlreadyAnswered,
    AnotherCardActive,
    NotActive,
    AlreadyFlipped,
    NothingOpen,
    AnswerShapeMismatch,
    NotFlipped,
    CountdownRunning,
    NotMultiChoice,
    OptionOutOfRange,
    EmptySelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored(IgnoreReason),
}

impl Transition {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// A successful answer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scored {
    pub card_id: CardId,
    pub is_correct: bool,
    pub points_awarded: u32,
}

//
// ─── SNAPSHOT / OBSERVERS ──────────────────────────────────────────────────────
//

/// Full session state handed to observers after every applied transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub cards: Vec<Card>,
    pub active_card: Option<CardId>,
    pub progress: Progress,
    pub game_state: GameState,
}

impl SessionSnapshot {
    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id() == id)
    }
}

pub type Observer = Box<dyn FnMut(&SessionSnapshot) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

pub struct SessionStore {
    clock: Clock,
    cards: Vec<Card>,
    active_card: Option<CardId>,
    progress: Progress,
    game_state: GameState,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("cards", &self.cards.len())
            .field("active_card", &self.active_card)
            .field("progress", &self.progress)
            .field("game_state", &self.game_state)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Builds a fresh session: ids assigned from 1 in order, nothing answered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty and
    /// `SessionError::ScoreOverflow` if their points do not fit in a `u32`.
    pub fn new(questions: Vec<Question>, clock: Clock) -> Result<Self, SessionError> {
        let mut store = Self {
            clock,
            cards: Vec::new(),
            active_card: None,
            progress: Progress::default(),
            game_state: GameState::Playing,
            started_at: clock.now(),
            completed_at: None,
            observers: Vec::new(),
            next_subscription: 0,
        };
        store.initialize(questions)?;
        Ok(store)
    }

    /// Validates raw definitions, then builds the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Questions` for the first malformed definition.
    /// Returns `SessionError::Empty` if no definitions are given.
    pub fn from_drafts(
        drafts: impl IntoIterator<Item = QuestionDraft>,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        Self::new(validate_all(drafts)?, clock)
    }

    fn initialize(&mut self, questions: Vec<Question>) -> Result<(), SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        let max_score = questions
            .iter()
            .try_fold(0u32, |total, question| total.checked_add(question.points()))
            .ok_or(SessionError::ScoreOverflow)?;

        self.cards = questions
            .into_iter()
            .enumerate()
            .map(|(position, question)| Card::new(CardId::from_position(position), question))
            .collect();
        self.active_card = None;
        self.progress = Progress {
            answered: 0,
            total: self.cards.len(),
            score: 0,
            max_score,
        };
        self.game_state = GameState::Playing;
        self.started_at = self.clock.now();
        self.completed_at = None;
        Ok(())
    }

    /// Discards all answers and starts over with a new question list.
    ///
    /// Observers stay subscribed and receive the fresh snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty; the current
    /// session is left as it was.
    pub fn reset(&mut self, questions: Vec<Question>) -> Result<(), SessionError> {
        self.initialize(questions)?;
        info!("session reset with {} cards", self.progress.total);
        self.notify();
        Ok(())
    }

    /// Starts over with the same questions.
    pub fn restart(&mut self) {
        let questions: Vec<Question> = self.cards.iter().map(|c| c.question().clone()).collect();
        if self.reset(questions).is_err() {
            debug!("restart skipped: session has no cards");
        }
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id() == id)
    }

    #[must_use]
    pub fn active_card(&self) -> Option<CardId> {
        self.active_card
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress
    }

    #[must_use]
    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            cards: self.cards.clone(),
            active_card: self.active_card,
            progress: self.progress,
            game_state: self.game_state,
        }
    }

    /// Final summary, available once every card is answered.
    #[must_use]
    pub fn summary(&self) -> Option<SessionSummary> {
        let completed_at = self.completed_at?;
        SessionSummary::from_cards(&self.cards, self.started_at, completed_at).ok()
    }

    //
    // ─── OBSERVERS ─────────────────────────────────────────────────────────────
    //

    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, observer) in &mut self.observers {
            observer(&snapshot);
        }
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Makes `id` the active card. Does not flip it.
    pub fn open_card(&mut self, id: CardId) -> Transition {
        let Some(card) = self.card(id) else {
            return ignored("open", id, IgnoreReason::UnknownCard);
        };
        if card.is_answered() {
            return ignored("open", id, IgnoreReason::AlreadyAnswered);
        }
        if self.active_card.is_some() {
            return ignored("open", id, IgnoreReason::AnotherCardActive);
        }

        self.active_card = Some(id);
        self.notify();
        Transition::Applied
    }

    /// Reveals the question face of the active card.
    ///
    /// Late flip signals for a card that has since been closed land here as
    /// `NotActive`.
    pub fn flip_card(&mut self, id: CardId) -> Transition {
        if self.active_card != Some(id) {
            return ignored("flip", id, IgnoreReason::NotActive);
        }
        let Some(card) = self.cards.iter_mut().find(|card| card.id() == id) else {
            return ignored("flip", id, IgnoreReason::UnknownCard);
        };
        if !card.flip() {
            return ignored("flip", id, IgnoreReason::AlreadyFlipped);
        }

        self.notify();
        Transition::Applied
    }

    /// Clears the active card and turns every card face-down.
    pub fn close_card(&mut self) -> Transition {
        let had_active = self.active_card.take().is_some();
        let mut unflipped = false;
        for card in &mut self.cards {
            unflipped |= card.unflip();
        }

        if !had_active && !unflipped {
            debug!("close ignored: {:?}", IgnoreReason::NothingOpen);
            return Transition::Ignored(IgnoreReason::NothingOpen);
        }

        self.notify();
        Transition::Applied
    }

    /// Scores `answer` against card `id` and updates progress.
    ///
    /// This is the only way a card becomes answered. Returns `None` for an
    /// unknown card, a card that is already answered, or an answer whose
    /// shape does not fit the question.
    pub fn submit_answer(&mut self, id: CardId, answer: Answer) -> Option<Scored> {
        let Some(card) = self.cards.iter_mut().find(|card| card.id() == id) else {
            ignored("submit", id, IgnoreReason::UnknownCard);
            return None;
        };
        if card.is_answered() {
            ignored("submit", id, IgnoreReason::AlreadyAnswered);
            return None;
        }
        let Some(is_correct) = card.record(answer) else {
            ignored("submit", id, IgnoreReason::AnswerShapeMismatch);
            return None;
        };

        let points_awarded = if is_correct { card.points() } else { 0 };
        self.progress.answered += 1;
        self.progress.score += points_awarded;
        debug!(
            "card {id} answered ({}), progress {}/{}",
            if is_correct { "correct" } else { "incorrect" },
            self.progress.answered,
            self.progress.total
        );

        self.compute_game_state();
        self.notify();

        Some(Scored {
            card_id: id,
            is_correct,
            points_awarded,
        })
    }

    /// Moves to `Completed` once every card is answered. Never moves back.
    pub fn compute_game_state(&mut self) -> GameState {
        if self.game_state == GameState::Playing && self.progress.is_complete() {
            self.game_state = GameState::Completed;
            self.completed_at = Some(self.clock.now());
            info!(
                "quiz completed: score {}/{}",
                self.progress.score, self.progress.max_score
            );
        }
        self.game_state
    }
}

fn ignored(action: &str, id: CardId, reason: IgnoreReason) -> Transition {
    debug!("{action} card {id} ignored: {reason:?}");
    Transition::Ignored(reason)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::data::default_questions;
    use crate::time::{fixed_clock, fixed_now};

    fn store(drafts: Vec<QuestionDraft>) -> SessionStore {
        SessionStore::from_drafts(drafts, fixed_clock()).unwrap()
    }

    fn mixed() -> SessionStore {
        store(vec![
            QuestionDraft::single_choice("q1", ["a", "b", "c", "d"], 2, 5),
            QuestionDraft::multi_choice("q2", ["a", "b", "c", "d"], [0, 1, 3], 8),
            QuestionDraft::free_response("q3", 10),
        ])
    }

    fn id(n: u64) -> CardId {
        CardId::new(n)
    }

    fn assert_consistent(store: &SessionStore) {
        let answered = store.cards().iter().filter(|c| c.is_answered()).count();
        let score: u32 = store
            .cards()
            .iter()
            .filter(|c| c.is_correct() == Some(true))
            .map(Card::points)
            .sum();
        assert_eq!(store.progress().answered, answered);
        assert_eq!(store.progress().score, score);
    }

    #[test]
    fn initialize_assigns_ids_and_totals() {
        let store = mixed();

        let ids: Vec<_> = store.cards().iter().map(Card::id).collect();
        assert_eq!(ids, vec![id(1), id(2), id(3)]);
        assert_eq!(
            store.progress(),
            Progress {
                answered: 0,
                total: 3,
                score: 0,
                max_score: 23
            }
        );
        assert_eq!(store.game_state(), GameState::Playing);
        assert_eq!(store.active_card(), None);
    }

    #[test]
    fn empty_question_list_is_rejected() {
        let err = SessionStore::new(Vec::new(), fixed_clock()).unwrap_err();
        assert_eq!(err, SessionError::Empty);
    }

    #[test]
    fn malformed_question_is_rejected() {
        let mut bad = QuestionDraft::multi_choice("q", ["a", "b"], [0], 5);
        bad.options = None;

        let err = SessionStore::from_drafts(vec![bad], fixed_clock()).unwrap_err();
        assert!(matches!(err, SessionError::Questions(QuestionSetError { index: 0, .. })));
    }

    #[test]
    fn point_total_beyond_u32_is_rejected() {
        let drafts = vec![
            QuestionDraft::free_response("huge", u32::MAX),
            QuestionDraft::free_response("one more", 1),
        ];
        let err = SessionStore::from_drafts(drafts, fixed_clock()).unwrap_err();
        assert_eq!(err, SessionError::ScoreOverflow);

        let mut store = mixed();
        let overflowing = validate_all(vec![
            QuestionDraft::free_response("huge", u32::MAX),
            QuestionDraft::free_response("one more", 1),
        ])
        .unwrap();
        assert_eq!(store.reset(overflowing), Err(SessionError::ScoreOverflow));
        assert_eq!(store.progress().max_score, 23);
    }

    #[test]
    fn open_requires_no_other_active_card() {
        let mut store = mixed();

        assert_eq!(store.open_card(id(1)), Transition::Applied);
        assert_eq!(
            store.open_card(id(2)),
            Transition::Ignored(IgnoreReason::AnotherCardActive)
        );
        assert_eq!(store.active_card(), Some(id(1)));
    }

    #[test]
    fn open_rejects_unknown_and_answered_cards() {
        let mut store = mixed();

        assert_eq!(
            store.open_card(id(99)),
            Transition::Ignored(IgnoreReason::UnknownCard)
        );

        store.submit_answer(id(1), Answer::Choice(2)).unwrap();
        assert_eq!(
            store.open_card(id(1)),
            Transition::Ignored(IgnoreReason::AlreadyAnswered)
        );
    }

    #[test]
    fn open_does_not_flip() {
        let mut store = mixed();
        store.open_card(id(1));

        assert!(!store.card(id(1)).unwrap().is_flipped());
        assert_eq!(store.flip_card(id(1)), Transition::Applied);
        assert!(store.card(id(1)).unwrap().is_flipped());
    }

    #[test]
    fn stale_flip_for_inactive_card_is_ignored() {
        let mut store = mixed();

        store.open_card(id(1));
        store.close_card();
        store.open_card(id(2));

        assert_eq!(
            store.flip_card(id(1)),
            Transition::Ignored(IgnoreReason::NotActive)
        );
        assert!(!store.card(id(1)).unwrap().is_flipped());
        assert_eq!(store.active_card(), Some(id(2)));
    }

    #[test]
    fn close_resets_every_card() {
        let mut store = mixed();
        store.open_card(id(2));
        store.flip_card(id(2));

        assert_eq!(store.close_card(), Transition::Applied);
        assert_eq!(store.active_card(), None);
        assert!(store.cards().iter().all(|c| !c.is_flipped()));
        assert_eq!(
            store.close_card(),
            Transition::Ignored(IgnoreReason::NothingOpen)
        );
    }

    #[test]
    fn single_choice_scenario() {
        let mut store = mixed();

        let scored = store.submit_answer(id(1), Answer::Choice(2)).unwrap();
        assert!(scored.is_correct);
        assert_eq!(scored.points_awarded, 5);

        let before = store.snapshot();
        assert_eq!(store.submit_answer(id(1), Answer::Choice(2)), None);
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.progress().answered, 1);
    }

    #[test]
    fn single_choice_wrong_index_scores_nothing() {
        let mut store = mixed();

        let scored = store.submit_answer(id(1), Answer::Choice(0)).unwrap();
        assert!(!scored.is_correct);
        assert_eq!(store.progress().score, 0);
        assert_eq!(store.progress().answered, 1);
        assert_consistent(&store);
    }

    #[test]
    fn multi_choice_scenario() {
        let mut timed_out = mixed();
        let scored = timed_out.submit_answer(id(2), Answer::choices([])).unwrap();
        assert!(!scored.is_correct);

        let mut answered = mixed();
        let scored = answered
            .submit_answer(id(2), Answer::choices([1, 3, 0]))
            .unwrap();
        assert!(scored.is_correct);
        assert_eq!(answered.progress().score, 8);
    }

    #[test]
    fn multi_choice_order_does_not_matter() {
        let drafts = || vec![QuestionDraft::multi_choice("q", ["a", "b", "c"], [0, 2], 8)];

        let mut forward = store(drafts());
        let mut backward = store(drafts());
        forward.submit_answer(id(1), Answer::choices([0, 2]));
        backward.submit_answer(id(1), Answer::choices([2, 0]));

        assert_eq!(forward.progress(), backward.progress());
        assert_eq!(forward.progress().score, 8);
    }

    #[test]
    fn free_response_uses_moderator_verdict() {
        let mut store = mixed();

        assert!(store.submit_answer(id(3), Answer::Verdict(true)).unwrap().is_correct);
        assert_eq!(store.progress().score, 10);
    }

    #[test]
    fn mismatched_answer_shape_is_ignored() {
        let mut store = mixed();

        assert_eq!(store.submit_answer(id(3), Answer::Choice(0)), None);
        assert!(!store.card(id(3)).unwrap().is_answered());
        assert_eq!(store.progress().answered, 0);
    }

    #[test]
    fn unknown_card_submission_is_ignored() {
        let mut store = mixed();
        assert_eq!(store.submit_answer(id(42), Answer::Verdict(true)), None);
        assert_consistent(&store);
    }

    #[test]
    fn completes_exactly_when_all_answered() {
        let mut store = mixed();

        store.submit_answer(id(1), Answer::Choice(2));
        assert_eq!(store.game_state(), GameState::Playing);
        store.submit_answer(id(2), Answer::choices([0]));
        assert_eq!(store.game_state(), GameState::Playing);
        assert!(store.summary().is_none());

        store.submit_answer(id(3), Answer::Verdict(false));
        assert_eq!(store.game_state(), GameState::Completed);
        assert_eq!(store.completed_at(), Some(fixed_now()));
        assert_consistent(&store);

        let summary = store.summary().unwrap();
        assert_eq!(summary.correct(), 1);
        assert_eq!(summary.score(), 5);
        assert_eq!(summary.max_score(), 23);
    }

    #[test]
    fn default_set_answered_correctly_reaches_max_score() {
        let mut store = SessionStore::from_drafts(default_questions(), fixed_clock()).unwrap();
        assert_eq!(store.progress().total, 16);
        assert_eq!(store.progress().max_score, 91);

        let answers: Vec<(CardId, Answer)> = store
            .cards()
            .iter()
            .map(|card| {
                let answer = match card.question().key() {
                    crate::model::AnswerKey::SingleChoice { correct, .. } => {
                        Answer::Choice(*correct)
                    }
                    crate::model::AnswerKey::MultiChoice { correct, .. } => {
                        Answer::Choices(correct.clone())
                    }
                    crate::model::AnswerKey::FreeResponse => Answer::Verdict(true),
                };
                (card.id(), answer)
            })
            .collect();

        for (card_id, answer) in answers {
            assert_eq!(store.game_state(), GameState::Playing);
            store.submit_answer(card_id, answer).unwrap();
            assert_consistent(&store);
        }

        assert_eq!(store.progress().score, store.progress().max_score);
        assert_eq!(store.game_state(), GameState::Completed);
    }

    #[test]
    fn reset_restores_fresh_state() {
        let mut store = mixed();
        store.open_card(id(1));
        store.flip_card(id(1));
        store.submit_answer(id(1), Answer::Choice(2));

        store.restart();

        assert_eq!(store.active_card(), None);
        assert_eq!(store.progress().answered, 0);
        assert_eq!(store.progress().score, 0);
        assert_eq!(store.progress().max_score, 23);
        assert_eq!(store.game_state(), GameState::Playing);
        assert!(store.cards().iter().all(|c| !c.is_answered() && !c.is_flipped()));
    }

    #[test]
    fn reset_with_empty_list_keeps_session() {
        let mut store = mixed();
        store.submit_answer(id(1), Answer::Choice(2));

        assert_eq!(store.reset(Vec::new()), Err(SessionError::Empty));
        assert_eq!(store.progress().answered, 1);
    }

    #[test]
    fn observers_see_applied_transitions_only() {
        let mut store = mixed();
        let seen: Arc<Mutex<Vec<SessionSnapshot>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let subscription = store.subscribe(Box::new(move |snapshot| {
            sink.lock().unwrap().push(snapshot.clone());
        }));

        store.open_card(id(1));
        store.open_card(id(2));
        store.flip_card(id(1));
        store.submit_answer(id(1), Answer::Choice(2));
        store.submit_answer(id(1), Answer::Choice(2));

        {
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 3);
            assert_eq!(seen[0].active_card, Some(id(1)));
            assert!(seen[1].card(id(1)).unwrap().is_flipped());
            assert_eq!(seen[2].progress.answered, 1);
        }

        assert!(store.unsubscribe(subscription));
        assert!(!store.unsubscribe(subscription));
        store.close_card();
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn snapshot_serializes_for_presentation() {
        let mut store = mixed();
        store.open_card(id(1));

        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(json["activeCard"], 1);
        assert_eq!(json["gameState"], "playing");
        assert_eq!(json["progress"]["maxScore"], 23);
        assert_eq!(json["cards"][1]["question"]["key"]["type"], "multi-choice");
    }
}
