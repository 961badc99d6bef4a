use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a quiz card.
///
/// Ids are assigned sequentially from 1 in display order when a session is built.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(u64);

impl CardId {
    /// Creates a new `CardId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Id for the card at the given zero-based display position.
    pub(crate) fn from_position(position: usize) -> Self {
        Self(u64::try_from(position).unwrap_or(u64::MAX).saturating_add(1))
    }
}

impl fmt::Debug for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardId({})", self.0)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing a `CardId` from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid card id: {:?}", self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for CardId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u64>() {
            Ok(id) if id > 0 => Ok(CardId::new(id)),
            _ => Err(ParseIdError { raw: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_id_display_and_debug() {
        let id = CardId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{id:?}"), "CardId(42)");
    }

    #[test]
    fn card_id_from_str() {
        let id: CardId = " 7 ".parse().unwrap();
        assert_eq!(id, CardId::new(7));
    }

    #[test]
    fn card_id_rejects_zero_and_garbage() {
        assert!("0".parse::<CardId>().is_err());
        assert!("seven".parse::<CardId>().is_err());
    }

    #[test]
    fn positions_map_to_one_based_ids() {
        assert_eq!(CardId::from_position(0), CardId::new(1));
        assert_eq!(CardId::from_position(15), CardId::new(16));
    }
}
