use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::answer::Answer;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons a question definition cannot be turned into a playable card.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyPrompt,

    #[error("points must be > 0")]
    ZeroPoints,

    #[error("{kind} question requires options")]
    MissingOptions { kind: QuestionKind },

    #[error("{kind} question needs at least 2 options, got {len}")]
    TooFewOptions { kind: QuestionKind, len: usize },

    #[error("{kind} question requires a correct answer")]
    MissingCorrectAnswer { kind: QuestionKind },

    #[error("correct answer shape does not match a {kind} question")]
    KeyShapeMismatch { kind: QuestionKind },

    #[error("correct answer index {index} is out of range for {len} options")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("multi-choice question requires at least one correct option")]
    EmptyCorrectSet,

    #[error("free-response question cannot carry options or a correct answer")]
    UnexpectedAnswerKey,
}

/// A question list failed validation; `index` is the zero-based position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("question at index {index} is invalid: {source}")]
pub struct QuestionSetError {
    pub index: usize,
    #[source]
    pub source: QuestionError,
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// The three supported question formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    #[serde(alias = "multiple")]
    SingleChoice,
    #[serde(alias = "multiselect")]
    MultiChoice,
    /// Judged live by a moderator instead of against a stored key.
    #[serde(alias = "shortanswer")]
    FreeResponse,
}

impl QuestionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::SingleChoice => "single-choice",
            QuestionKind::MultiChoice => "multi-choice",
            QuestionKind::FreeResponse => "free-response",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── ANSWER KEY ────────────────────────────────────────────────────────────────
//

/// Options and correct answer, shaped by question kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AnswerKey {
    SingleChoice {
        options: Vec<String>,
        correct: usize,
    },
    MultiChoice {
        options: Vec<String>,
        correct: BTreeSet<usize>,
    },
    FreeResponse,
}

impl AnswerKey {
    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        match self {
            AnswerKey::SingleChoice { .. } => QuestionKind::SingleChoice,
            AnswerKey::MultiChoice { .. } => QuestionKind::MultiChoice,
            AnswerKey::FreeResponse => QuestionKind::FreeResponse,
        }
    }

    /// Options in display order; empty for free-response questions.
    #[must_use]
    pub fn options(&self) -> &[String] {
        match self {
            AnswerKey::SingleChoice { options, .. } | AnswerKey::MultiChoice { options, .. } => {
                options
            }
            AnswerKey::FreeResponse => &[],
        }
    }

    /// Scores a submitted answer.
    ///
    /// Returns `None` when the answer's shape does not match this key.
    /// Multi-choice answers must match the key exactly as a set; there is no
    /// partial credit. A free-response verdict is itself the moderator's
    /// judgment.
    #[must_use]
    pub fn evaluate(&self, answer: &Answer) -> Option<bool> {
        match (self, answer) {
            (AnswerKey::SingleChoice { correct, .. }, Answer::Choice(index)) => {
                Some(index == correct)
            }
            (AnswerKey::MultiChoice { correct, .. }, Answer::Choices(indices)) => {
                Some(indices == correct)
            }
            (AnswerKey::FreeResponse, Answer::Verdict(verdict)) => Some(*verdict),
            _ => None,
        }
    }

    /// The answer submitted when a countdown runs out.
    ///
    /// Single-choice picks option 0, or option 1 when 0 is the correct one.
    #[must_use]
    pub fn forced_incorrect(&self) -> Answer {
        match self {
            AnswerKey::SingleChoice { correct, .. } => {
                Answer::Choice(if *correct == 0 { 1 } else { 0 })
            }
            AnswerKey::MultiChoice { .. } => Answer::Choices(BTreeSet::new()),
            AnswerKey::FreeResponse => Answer::Verdict(false),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated question, ready to be placed on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    prompt: String,
    key: AnswerKey,
    points: u32,
    image_ref: String,
}

impl Question {
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn key(&self) -> &AnswerKey {
        &self.key
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.key.kind()
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        self.key.options()
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Correct answer as written in a question file: one index or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswerDraft {
    Index(usize),
    Indices(Vec<usize>),
}

/// Unvalidated question definition, as loaded from a static dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<CorrectAnswerDraft>,
    pub points: u32,
    #[serde(default)]
    pub image_ref: String,
}

impl QuestionDraft {
    pub fn single_choice<S: Into<String>>(
        prompt: impl Into<String>,
        options: impl IntoIterator<Item = S>,
        correct: usize,
        points: u32,
    ) -> Self {
        Self {
            kind: QuestionKind::SingleChoice,
            prompt: prompt.into(),
            options: Some(options.into_iter().map(Into::into).collect()),
            correct_answer: Some(CorrectAnswerDraft::Index(correct)),
            points,
            image_ref: String::new(),
        }
    }

    pub fn multi_choice<S: Into<String>>(
        prompt: impl Into<String>,
        options: impl IntoIterator<Item = S>,
        correct: impl IntoIterator<Item = usize>,
        points: u32,
    ) -> Self {
        Self {
            kind: QuestionKind::MultiChoice,
            prompt: prompt.into(),
            options: Some(options.into_iter().map(Into::into).collect()),
            correct_answer: Some(CorrectAnswerDraft::Indices(correct.into_iter().collect())),
            points,
            image_ref: String::new(),
        }
    }

    pub fn free_response(prompt: impl Into<String>, points: u32) -> Self {
        Self {
            kind: QuestionKind::FreeResponse,
            prompt: prompt.into(),
            options: None,
            correct_answer: None,
            points,
            image_ref: String::new(),
        }
    }

    #[must_use]
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = image_ref.into();
        self
    }

    /// Checks the draft and builds a typed `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text is blank, points are zero, or the
    /// options/correct answer do not fit the declared kind.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if self.points == 0 {
            return Err(QuestionError::ZeroPoints);
        }

        let kind = self.kind;
        let key = match kind {
            QuestionKind::SingleChoice => {
                let options = require_options(kind, self.options)?;
                let correct = match self.correct_answer {
                    Some(CorrectAnswerDraft::Index(index)) => index,
                    Some(CorrectAnswerDraft::Indices(_)) => {
                        return Err(QuestionError::KeyShapeMismatch { kind });
                    }
                    None => return Err(QuestionError::MissingCorrectAnswer { kind }),
                };
                check_index(correct, options.len())?;
                AnswerKey::SingleChoice { options, correct }
            }
            QuestionKind::MultiChoice => {
                let options = require_options(kind, self.options)?;
                let correct: BTreeSet<usize> = match self.correct_answer {
                    Some(CorrectAnswerDraft::Indices(indices)) => indices.into_iter().collect(),
                    Some(CorrectAnswerDraft::Index(_)) => {
                        return Err(QuestionError::KeyShapeMismatch { kind });
                    }
                    None => return Err(QuestionError::MissingCorrectAnswer { kind }),
                };
                if correct.is_empty() {
                    return Err(QuestionError::EmptyCorrectSet);
                }
                for &index in &correct {
                    check_index(index, options.len())?;
                }
                AnswerKey::MultiChoice { options, correct }
            }
            QuestionKind::FreeResponse => {
                if self.options.is_some() || self.correct_answer.is_some() {
                    return Err(QuestionError::UnexpectedAnswerKey);
                }
                AnswerKey::FreeResponse
            }
        };

        Ok(Question {
            prompt,
            key,
            points: self.points,
            image_ref: self.image_ref,
        })
    }
}

fn require_options(
    kind: QuestionKind,
    options: Option<Vec<String>>,
) -> Result<Vec<String>, QuestionError> {
    let options = options.ok_or(QuestionError::MissingOptions { kind })?;
    if options.len() < 2 {
        return Err(QuestionError::TooFewOptions {
            kind,
            len: options.len(),
        });
    }
    Ok(options)
}

fn check_index(index: usize, len: usize) -> Result<(), QuestionError> {
    if index >= len {
        return Err(QuestionError::IndexOutOfRange { index, len });
    }
    Ok(())
}

/// Validates a whole question list, stopping at the first bad entry.
///
/// # Errors
///
/// Returns `QuestionSetError` naming the position of the first invalid draft.
pub fn validate_all(
    drafts: impl IntoIterator<Item = QuestionDraft>,
) -> Result<Vec<Question>, QuestionSetError> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            draft
                .validate()
                .map_err(|source| QuestionSetError { index, source })
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
