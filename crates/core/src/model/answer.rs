use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::question::QuestionKind;

/// A submitted answer, shaped by the kind of question it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Answer {
    /// Index of the chosen option.
    Choice(usize),
    /// Chosen option indices; a set, so order and duplicates do not matter.
    Choices(BTreeSet<usize>),
    /// Moderator verdict for a free-response question.
    Verdict(bool),
}

impl Answer {
    /// Builds a multi-choice answer from indices in any order.
    pub fn choices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self::Choices(indices.into_iter().collect())
    }

    /// Kind of question this answer can be submitted to.
    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        match self {
            Answer::Choice(_) => QuestionKind::SingleChoice,
            Answer::Choices(_) => QuestionKind::MultiChoice,
            Answer::Verdict(_) => QuestionKind::FreeResponse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_collapse_order_and_duplicates() {
        assert_eq!(Answer::choices([2, 0]), Answer::choices([0, 2]));
        assert_eq!(Answer::choices([2, 0, 2]), Answer::choices([0, 2]));
    }

    #[test]
    fn answer_reports_its_kind() {
        assert_eq!(Answer::Choice(1).kind(), QuestionKind::SingleChoice);
        assert_eq!(Answer::choices([]).kind(), QuestionKind::MultiChoice);
        assert_eq!(Answer::Verdict(true).kind(), QuestionKind::FreeResponse);
    }

    #[test]
    fn answer_serializes_tagged() {
        let json = serde_json::to_string(&Answer::choices([3, 1])).unwrap();
        assert_eq!(json, r#"{"kind":"choices","value":[1,3]}"#);
    }
}
