mod answer;
mod card;
mod ids;
mod progress;
mod question;
mod session;

pub use answer::Answer;
pub use ids::{CardId, ParseIdError};

pub use card::{Card, CardOutcome};
pub use progress::{GameState, Progress};
pub use question::{
    AnswerKey, CorrectAnswerDraft, Question, QuestionDraft, QuestionError, QuestionKind,
    QuestionSetError, validate_all,
};
pub use session::{SessionSummary, SessionSummaryError};
