use serde::Serialize;

/// Aggregated view of quiz progress, recomputed on every answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    pub score: u32,
    pub max_score: u32,
}

impl Progress {
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.answered)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answered == self.total
    }

    /// Score as a percentage of the maximum score.
    #[must_use]
    pub fn accuracy_percent(&self) -> f64 {
        if self.max_score == 0 {
            return 0.0;
        }
        f64::from(self.score) / f64::from(self.max_score) * 100.0
    }
}

/// Whether the play-through is still going.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    #[default]
    Playing,
    Completed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_is_relative_to_max_score() {
        let progress = Progress {
            answered: 4,
            total: 4,
            score: 15,
            max_score: 20,
        };
        assert!((progress.accuracy_percent() - 75.0).abs() < f64::EPSILON);
        assert_eq!(progress.remaining(), 0);
        assert!(progress.is_complete());
    }

    #[test]
    fn empty_progress_has_zero_accuracy() {
        assert_eq!(Progress::default().accuracy_percent(), 0.0);
    }
}
