//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use crate::error::Result;
use crate::models::{
    Account, Card, Deck, DeckCard, DeckEntry, DeckSummary, Identity, NewCard, NewDeck,
    OwnedCard, Session, UserCard,
};
use uuid::Uuid;

/// Data persistence contract for cards, collections and decks.
///
/// Every method taking an `owner` must only see or touch rows that identity owns.
/// Card definitions are global.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VaultRepo: Send + Sync {
    // Card Operations
    async fn insert_card(&self, card: NewCard) -> anyhow::Result<Card>;

    // Collection Operations
    async fn insert_user_card(&self, owner: Uuid, card_id: Uuid, quantity: i64) -> anyhow::Result<UserCard>;
    async fn list_user_cards(&self, owner: Uuid) -> anyhow::Result<Vec<OwnedCard>>;

    // Deck Operations
    /// Newest first.
    async fn list_decks(&self, owner: Uuid) -> anyhow::Result<Vec<DeckSummary>>;
    async fn insert_deck(&self, owner: Uuid, deck: NewDeck) -> anyhow::Result<Deck>;
    /// Removes the deck and, through the store, every card in it.
    async fn delete_deck(&self, owner: Uuid, deck_id: Uuid) -> anyhow::Result<()>;

    // Deck Card Operations
    async fn list_deck_cards(&self, owner: Uuid, deck_id: Uuid) -> anyhow::Result<Vec<DeckEntry>>;
    async fn insert_deck_card(&self, owner: Uuid, deck_id: Uuid, card_id: Uuid, quantity: i64) -> anyhow::Result<DeckCard>;
    async fn delete_deck_card(&self, owner: Uuid, deck_card_id: Uuid) -> anyhow::Result<()>;
}

/// Storage for logins and issued sessions.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn create_account(&self, account: Account) -> anyhow::Result<()>;
    /// Email comparison is case-insensitive.
    async fn find_account_by_email(&self, email: &str) -> anyhow::Result<Option<Account>>;

    async fn store_session(&self, token_digest: &str, user_id: Uuid) -> anyhow::Result<()>;
    async fn find_session(&self, token_digest: &str) -> anyhow::Result<Option<Identity>>;
    async fn delete_session(&self, token_digest: &str) -> anyhow::Result<()>;
}

/// Identity contract: email/password accounts with bearer sessions.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Registers a new identity and opens a session for it.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session>;

    /// Authenticates an existing identity.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Revokes a session. Unknown tokens are not an error.
    async fn sign_out(&self, token: &str) -> Result<()>;

    /// Resolves a previously issued token back to its identity.
    async fn restore(&self, token: &str) -> Result<Option<Identity>>;
}
