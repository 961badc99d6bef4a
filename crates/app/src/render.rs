use quiz_core::SessionSnapshot;
use quiz_core::model::{Card, GameState, Progress, SessionSummary};
use services::ControllerEvent;

use crate::commands::option_letter;

pub fn progress_line(progress: &Progress) -> String {
    format!(
        "answered {}/{} | score {}/{}",
        progress.answered, progress.total, progress.score, progress.max_score
    )
}

pub fn board(snapshot: &SessionSnapshot) -> String {
    let cells: Vec<String> = snapshot
        .cards
        .iter()
        .map(|card| {
            let mark = match card.is_correct() {
                Some(true) => "+",
                Some(false) => "x",
                None if snapshot.active_card == Some(card.id()) => "*",
                None => " ",
            };
            format!("[{:>2}{mark}]", card.id().value())
        })
        .collect();

    cells
        .chunks(4)
        .map(|row| row.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn card_face(card: &Card) -> String {
    let question = card.question();
    let mut out = format!(
        "#{} {} ({} pts)\n{}",
        card.id(),
        question.kind(),
        question.points(),
        question.prompt()
    );
    for (index, option) in question.options().iter().enumerate() {
        out.push_str(&format!("\n  {}. {option}", option_letter(index)));
    }
    out
}

/// Observer output for every snapshot.
pub fn snapshot(snapshot: &SessionSnapshot) -> String {
    let mut out = progress_line(&snapshot.progress);
    if let Some(card) = snapshot.active_card.and_then(|id| snapshot.card(id)) {
        if card.is_flipped() && !card.is_answered() {
            out.push('\n');
            out.push_str(&card_face(card));
        }
        if let Some(correct) = card.is_correct() {
            if correct {
                out.push_str(&format!("\ncorrect! +{} pts", card.points()));
            } else {
                out.push_str("\nincorrect");
            }
        }
    }
    if snapshot.game_state == GameState::Completed && snapshot.active_card.is_none() {
        out.push_str("\nall cards answered. type `reset` to play again");
    }
    out
}

pub fn event(event: &ControllerEvent) -> Option<String> {
    match event {
        ControllerEvent::CountdownTick { card, remaining }
            if *remaining <= 5 || *remaining % 10 == 0 =>
        {
            Some(format!("card {card}: {remaining}s left"))
        }
        ControllerEvent::CountdownExpired { card, .. } => Some(format!("card {card}: time is up")),
        _ => None,
    }
}

pub fn summary(summary: &SessionSummary) -> String {
    format!(
        "final score {}/{} ({:.1}%), {} of {} correct in {}s",
        summary.score(),
        summary.max_score(),
        summary.accuracy_percent(),
        summary.correct(),
        summary.answered(),
        summary.duration().num_seconds()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::SessionStore;
    use quiz_core::data::default_questions;
    use quiz_core::model::{Answer, CardId};
    use quiz_core::time::fixed_clock;

    #[test]
    fn board_marks_active_and_answered_cards() {
        let mut store = SessionStore::from_drafts(default_questions(), fixed_clock()).unwrap();
        store.submit_answer(CardId::new(2), Answer::Choice(0));
        store.submit_answer(CardId::new(3), Answer::Choice(0));
        store.open_card(CardId::new(4));

        let board = board(&store.snapshot());
        let first_row = board.lines().next().unwrap();
        assert_eq!(first_row, "[ 1 ] [ 2+] [ 3x] [ 4*]");
        assert_eq!(board.lines().count(), 4);
    }

    #[test]
    fn flipped_card_shows_lettered_options() {
        let mut store = SessionStore::from_drafts(default_questions(), fixed_clock()).unwrap();
        store.open_card(CardId::new(2));
        store.flip_card(CardId::new(2));

        let text = snapshot(&store.snapshot());
        assert!(text.starts_with("answered 0/16 | score 0/91"));
        assert!(text.contains("A. Mount Everest"));
        assert!(text.contains("D. Aconcagua"));
    }
}
