//! Loading question sets from JSON.

use std::path::Path;

use quiz_core::SessionError;
use quiz_core::model::{Question, QuestionDraft, validate_all};

use crate::error::QuestionLoadError;

/// Parses and validates a JSON array of question definitions.
///
/// # Errors
///
/// Returns `QuestionLoadError::Json` for malformed JSON,
/// `QuestionLoadError::Questions` for an invalid definition and
/// `QuestionLoadError::Session` for an empty list.
pub fn load_questions_from_str(json: &str) -> Result<Vec<Question>, QuestionLoadError> {
    let drafts: Vec<QuestionDraft> = serde_json::from_str(json)?;
    let questions = validate_all(drafts)?;
    if questions.is_empty() {
        return Err(SessionError::Empty.into());
    }
    log::debug!("loaded {} questions", questions.len());
    Ok(questions)
}

/// Reads a question file and validates it.
///
/// # Errors
///
/// Returns `QuestionLoadError::Io` if the file cannot be read, otherwise the
/// same errors as [`load_questions_from_str`].
pub fn load_questions_from_path(path: impl AsRef<Path>) -> Result<Vec<Question>, QuestionLoadError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| QuestionLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_questions_from_str(&json)
}
