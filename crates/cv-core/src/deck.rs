//! # Deck Composition
//!
//! A Commander deck is complete when its cards add up to exactly 100.
//! That count is the only legality rule enforced; color identity, singleton
//! and banned-list checks are not.

use crate::error::{AppError, Result};
use crate::models::DeckEntry;

/// Number of cards a finished Commander deck holds.
pub const COMMANDER_DECK_SIZE: i64 = 100;

/// Shown when a card is added to a deck that is already full.
pub const DECK_FULL_MESSAGE: &str = "Commander decks must have exactly 100 cards!";

/// Completeness of the selected deck. A pure function of its card total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckStatus {
    /// No cards; no banner.
    Empty,
    /// Some cards but not 100; warning banner.
    Incomplete,
    /// Exactly 100; success banner, adding disabled.
    Complete,
}

impl DeckStatus {
    pub fn from_total(total: i64) -> Self {
        if total <= 0 {
            DeckStatus::Empty
        } else if total == COMMANDER_DECK_SIZE {
            DeckStatus::Complete
        } else {
            DeckStatus::Incomplete
        }
    }
}

/// Sum of quantities across a deck's entries.
pub fn card_total(entries: &[DeckEntry]) -> i64 {
    entries.iter().map(|e| e.entry.quantity).sum()
}

/// Whether one more card may be added to a deck currently holding `total`.
pub fn accepts_more(total: i64) -> bool {
    total < COMMANDER_DECK_SIZE
}

/// Rejects an addition to a full deck before anything is written.
pub fn ensure_room(total: i64) -> Result<()> {
    if accepts_more(total) {
        Ok(())
    } else {
        Err(AppError::Validation(DECK_FULL_MESSAGE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_total() {
        assert_eq!(DeckStatus::from_total(0), DeckStatus::Empty);
        assert_eq!(DeckStatus::from_total(1), DeckStatus::Incomplete);
        assert_eq!(DeckStatus::from_total(99), DeckStatus::Incomplete);
        assert_eq!(DeckStatus::from_total(100), DeckStatus::Complete);
    }

    #[test]
    fn ceiling_is_exclusive_at_one_hundred() {
        assert!(accepts_more(99));
        assert!(!accepts_more(100));
        assert!(!accepts_more(101));
    }

    #[test]
    fn full_deck_is_a_validation_error() {
        assert!(ensure_room(0).is_ok());
        let err = ensure_room(100).unwrap_err();
        assert_eq!(err, AppError::Validation(DECK_FULL_MESSAGE.into()));
        assert_eq!(err.to_string(), DECK_FULL_MESSAGE);
    }
}
