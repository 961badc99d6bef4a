//! Card interaction controller.
//!
//! Layers the timed behaviour of a card on top of [`SessionStore`]: opening a
//! card schedules its flip, a running countdown forces a wrong answer when it
//! reaches zero, and every answer schedules the card to close again. Each
//! timer class has one slot; starting a new timer of a class cancels the old
//! one. Stale firings still reach the store, whose guards absorb them.

use std::collections::BTreeSet;
use std::time::Duration;

use log::{debug, trace};
use serde::Serialize;

use quiz_core::model::{Answer, CardId, Question, QuestionKind};
use quiz_core::{
    IgnoreReason, Observer, Scored, SessionError, SessionSnapshot, SessionStore, SubscriptionId,
    Transition,
};

use crate::settings::TimingSettings;
use crate::timers::{TimerHandle, TimerKind, TimerQueue};

/// Where a card is in its open/answer cycle, as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardStage {
    Closed,
    OpenPendingFlip,
    OpenFlipped,
    CountdownRunning,
    Answered,
}

/// Something a timer did while the timeline advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ControllerEvent {
    Flipped { card: CardId },
    CountdownTick { card: CardId, remaining: u32 },
    CountdownExpired { card: CardId, scored: bool },
    AutoClosed { card: CardId },
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    card: CardId,
    handle: TimerHandle,
}

#[derive(Debug, Clone, Copy)]
struct Countdown {
    card: CardId,
    remaining: u32,
    handle: TimerHandle,
}

#[derive(Debug, Clone)]
struct Selection {
    card: CardId,
    indices: BTreeSet<usize>,
}

#[derive(Debug)]
pub struct CardController {
    store: SessionStore,
    settings: TimingSettings,
    timers: TimerQueue,
    now: Duration,
    flip: Option<Pending>,
    countdown: Option<Countdown>,
    auto_close: Option<Pending>,
    selection: Option<Selection>,
}

impl CardController {
    #[must_use]
    pub fn new(store: SessionStore, settings: TimingSettings) -> Self {
        Self {
            store,
            settings,
            timers: TimerQueue::new(),
            now: Duration::ZERO,
            flip: None,
            countdown: None,
            auto_close: None,
            selection: None,
        }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn settings(&self) -> &TimingSettings {
        &self.settings
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.store.snapshot()
    }

    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        self.store.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Position on the controller's timeline.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn stage(&self, id: CardId) -> CardStage {
        if self.store.active_card() != Some(id) {
            return CardStage::Closed;
        }
        let Some(card) = self.store.card(id) else {
            return CardStage::Closed;
        };
        if card.is_answered() {
            CardStage::Answered
        } else if self.countdown.is_some_and(|c| c.card == id) {
            CardStage::CountdownRunning
        } else if card.is_flipped() {
            CardStage::OpenFlipped
        } else {
            CardStage::OpenPendingFlip
        }
    }

    /// Seconds left on the countdown for `id`, if one is running.
    #[must_use]
    pub fn countdown_remaining(&self, id: CardId) -> Option<u32> {
        self.countdown
            .filter(|c| c.card == id)
            .map(|c| c.remaining)
    }

    /// Draft multi-choice selection for `id`.
    #[must_use]
    pub fn selection(&self, id: CardId) -> Option<&BTreeSet<usize>> {
        self.selection
            .as_ref()
            .filter(|s| s.card == id)
            .map(|s| &s.indices)
    }

    //
    // ─── INTENTS ───────────────────────────────────────────────────────────────
    //

    /// Opens `id` and schedules its flip.
    pub fn open_card(&mut self, id: CardId) -> Transition {
        let transition = self.store.open_card(id);
        if transition.is_applied() {
            self.cancel_all_slots();
            let handle = self
                .timers
                .schedule(self.now + self.settings.flip_delay(), TimerKind::Flip(id));
            self.flip = Some(Pending { card: id, handle });
        }
        transition
    }

    /// Closes whatever is open and drops every pending timer for it.
    pub fn close_card(&mut self) -> Transition {
        self.cancel_all_slots();
        self.store.close_card()
    }

    pub fn start_countdown(&mut self, id: CardId) -> Transition {
        let Some(card) = self.store.card(id) else {
            return ignored("countdown", id, IgnoreReason::UnknownCard);
        };
        if self.store.active_card() != Some(id) {
            return ignored("countdown", id, IgnoreReason::NotActive);
        }
        if card.is_answered() {
            return ignored("countdown", id, IgnoreReason::AlreadyAnswered);
        }
        if !card.is_flipped() {
            return ignored("countdown", id, IgnoreReason::NotFlipped);
        }
        if self.countdown.is_some_and(|c| c.card == id) {
            return ignored("countdown", id, IgnoreReason::CountdownRunning);
        }

        self.cancel_countdown();
        let handle = self.schedule_tick(id);
        self.countdown = Some(Countdown {
            card: id,
            remaining: self.settings.countdown_seconds(),
            handle,
        });
        debug!(
            "countdown started for card {id}: {}s",
            self.settings.countdown_seconds()
        );
        Transition::Applied
    }

    /// Submits an answer for `id`. If `id` is the open card, it closes after
    /// the auto-close delay.
    pub fn submit_answer(&mut self, id: CardId, answer: Answer) -> Option<Scored> {
        let scored = self.store.submit_answer(id, answer)?;
        self.after_scored(scored);
        Some(scored)
    }

    /// Toggles option `index` in the draft selection of a multi-choice card.
    pub fn toggle_option(&mut self, id: CardId, index: usize) -> Transition {
        let Some(card) = self.store.card(id) else {
            return ignored("toggle", id, IgnoreReason::UnknownCard);
        };
        if self.store.active_card() != Some(id) {
            return ignored("toggle", id, IgnoreReason::NotActive);
        }
        if card.is_answered() {
            return ignored("toggle", id, IgnoreReason::AlreadyAnswered);
        }
        if !card.is_flipped() {
            return ignored("toggle", id, IgnoreReason::NotFlipped);
        }
        if card.kind() != QuestionKind::MultiChoice {
            return ignored("toggle", id, IgnoreReason::NotMultiChoice);
        }
        if index >= card.question().options().len() {
            return ignored("toggle", id, IgnoreReason::OptionOutOfRange);
        }

        if !matches!(&self.selection, Some(selection) if selection.card == id) {
            self.selection = Some(Selection {
                card: id,
                indices: BTreeSet::new(),
            });
        }
        if let Some(selection) = self.selection.as_mut() {
            if !selection.indices.remove(&index) {
                selection.indices.insert(index);
            }
        }
        Transition::Applied
    }

    /// Submits the draft selection for `id`. An empty selection is not
    /// submitted.
    pub fn submit_selection(&mut self, id: CardId) -> Option<Scored> {
        let indices = match self.selection(id) {
            Some(indices) if !indices.is_empty() => indices.clone(),
            _ => {
                ignored("submit selection", id, IgnoreReason::EmptySelection);
                return None;
            }
        };
        self.submit_answer(id, Answer::Choices(indices))
    }

    /// Starts over with a new question list, dropping every timer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty; nothing changes.
    pub fn reset(&mut self, questions: Vec<Question>) -> Result<(), SessionError> {
        self.store.reset(questions)?;
        self.cancel_all_slots();
        self.timers.cancel_all();
        Ok(())
    }

    /// Starts over with the same questions.
    pub fn restart(&mut self) {
        self.cancel_all_slots();
        self.timers.cancel_all();
        self.store.restart();
    }

    //
    // ─── TIMELINE ──────────────────────────────────────────────────────────────
    //

    /// Moves the timeline forward by `delta`, firing every timer that falls
    /// due on the way.
    pub fn advance(&mut self, delta: Duration) -> Vec<ControllerEvent> {
        let target = self.now + delta;
        let mut events = Vec::new();
        while let Some((deadline, handle, kind)) = self.timers.pop_due(target) {
            trace!("{kind:?} due at {deadline:?} for card {}", kind.card_id());
            self.now = deadline;
            self.fire(handle, kind, &mut events);
        }
        self.now = target;
        events
    }

    fn fire(&mut self, handle: TimerHandle, kind: TimerKind, events: &mut Vec<ControllerEvent>) {
        match kind {
            TimerKind::Flip(card) => {
                if self.flip.is_some_and(|p| p.handle == handle) {
                    self.flip = None;
                }
                if self.store.flip_card(card).is_applied() {
                    events.push(ControllerEvent::Flipped { card });
                }
            }
            TimerKind::CountdownTick(card) => self.tick(handle, card, events),
            TimerKind::AutoClose(card) => {
                if self.auto_close.is_some_and(|p| p.handle == handle) {
                    self.auto_close = None;
                }
                if self.store.active_card() == Some(card) {
                    self.cancel_all_slots();
                    self.store.close_card();
                    events.push(ControllerEvent::AutoClosed { card });
                } else {
                    debug!("auto-close for card {card} skipped: no longer active");
                }
            }
        }
    }

    fn tick(&mut self, handle: TimerHandle, card: CardId, events: &mut Vec<ControllerEvent>) {
        let Some(countdown) = self.countdown.as_mut().filter(|c| c.handle == handle) else {
            trace!("stale countdown tick for card {card}");
            return;
        };

        countdown.remaining = countdown.remaining.saturating_sub(1);
        let remaining = countdown.remaining;
        trace!("countdown for card {card}: {remaining}s left");
        events.push(ControllerEvent::CountdownTick { card, remaining });

        if remaining > 0 {
            let next = self.schedule_tick(card);
            if let Some(countdown) = self.countdown.as_mut() {
                countdown.handle = next;
            }
            return;
        }

        self.countdown = None;
        let forced = self
            .store
            .card(card)
            .map(|c| c.question().key().forced_incorrect());
        let scored = forced
            .and_then(|answer| self.submit_answer(card, answer))
            .is_some();
        debug!("countdown expired for card {card}, forced answer recorded: {scored}");
        events.push(ControllerEvent::CountdownExpired { card, scored });
    }

    //
    // ─── SLOTS ─────────────────────────────────────────────────────────────────
    //

    fn after_scored(&mut self, scored: Scored) {
        let id = scored.card_id;
        if self.countdown.is_some_and(|c| c.card == id) {
            self.cancel_countdown();
        }
        if self.selection.as_ref().is_some_and(|s| s.card == id) {
            self.selection = None;
        }
        // Only the open card has anything to close.
        if self.store.active_card() != Some(id) {
            debug!("card {id} answered while closed; no auto-close scheduled");
            return;
        }
        self.cancel_auto_close();
        let handle = self.timers.schedule(
            self.now + self.settings.auto_close_delay(),
            TimerKind::AutoClose(id),
        );
        self.auto_close = Some(Pending { card: id, handle });
    }

    fn schedule_tick(&mut self, card: CardId) -> TimerHandle {
        self.timers.schedule(
            self.now + self.settings.countdown_tick(),
            TimerKind::CountdownTick(card),
        )
    }

    fn cancel_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            self.timers.cancel(countdown.handle);
        }
    }

    fn cancel_auto_close(&mut self) {
        if let Some(pending) = self.auto_close.take() {
            if self.timers.cancel(pending.handle) {
                trace!("auto-close for card {} canceled", pending.card);
            }
        }
    }

    fn cancel_flip(&mut self) {
        if let Some(pending) = self.flip.take() {
            if self.timers.cancel(pending.handle) {
                trace!("flip for card {} canceled", pending.card);
            }
        }
    }

    fn cancel_all_slots(&mut self) {
        self.cancel_flip();
        self.cancel_countdown();
        self.cancel_auto_close();
        self.selection = None;
    }
}

fn ignored(action: &str, id: CardId, reason: IgnoreReason) -> Transition {
    debug!("{action} card {id} ignored: {reason:?}");
    Transition::Ignored(reason)
}
