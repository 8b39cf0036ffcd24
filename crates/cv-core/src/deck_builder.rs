//! # Deck Builder View
//!
//! Lists the owner's decks, shows the cards of the selected one and guards
//! the 100-card ceiling when adding.

use std::sync::Arc;

use log::warn;
use uuid::Uuid;

use crate::deck::{self, DeckStatus};
use crate::models::{Card, DeckEntry, DeckSummary, Identity, NewDeck};
use crate::traits::VaultRepo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckBuilderMode {
    Browsing,
    CreatingDeck,
    AddingCard,
}

pub struct DeckBuilderView {
    repo: Arc<dyn VaultRepo>,
    owner: Identity,
    decks: Vec<DeckSummary>,
    selected: Option<Uuid>,
    deck_cards: Vec<DeckEntry>,
    available: Vec<Card>,
    loading: bool,
    mode: DeckBuilderMode,
    alert: Option<String>,
}

impl DeckBuilderView {
    pub fn new(repo: Arc<dyn VaultRepo>, owner: Identity) -> Self {
        Self {
            repo,
            owner,
            decks: Vec::new(),
            selected: None,
            deck_cards: Vec::new(),
            available: Vec::new(),
            loading: true,
            mode: DeckBuilderMode::Browsing,
            alert: None,
        }
    }

    pub async fn load_decks(&mut self) {
        match self.repo.list_decks(self.owner.user_id).await {
            Ok(decks) => self.decks = decks,
            Err(e) => warn!("loading decks for {} failed: {e:#}", self.owner.email),
        }
        self.loading = false;
    }

    /// Reloads the selected deck's cards. Does nothing without a selection.
    pub async fn load_deck_cards(&mut self) {
        let Some(deck_id) = self.selected else { return };
        match self.repo.list_deck_cards(self.owner.user_id, deck_id).await {
            Ok(cards) => self.deck_cards = cards,
            Err(e) => warn!("loading cards of deck {deck_id} failed: {e:#}"),
        }
    }

    /// The owner's collection, flattened to card definitions, as the add-to-deck pool.
    pub async fn load_available_cards(&mut self) {
        match self.repo.list_user_cards(self.owner.user_id).await {
            Ok(owned) => self.available = owned.into_iter().map(|o| o.card).collect(),
            Err(e) => warn!("loading available cards for {} failed: {e:#}", self.owner.email),
        }
    }

    /// Inserts a deck with no commander and an empty description, and puts it
    /// at the top of the list. The new deck is not selected.
    pub async fn create_deck(&mut self, name: &str) -> bool {
        let new_deck = NewDeck { name: name.to_string(), ..Default::default() };
        match self.repo.insert_deck(self.owner.user_id, new_deck).await {
            Ok(deck) => {
                self.decks.insert(0, DeckSummary { deck, commander: None });
                self.mode = DeckBuilderMode::Browsing;
                true
            }
            Err(e) => {
                warn!("creating deck {name:?} failed: {e:#}");
                false
            }
        }
    }

    /// Deletes a deck. Clears the selection and its cards if it was the selected one.
    pub async fn delete_deck(&mut self, deck_id: Uuid) -> bool {
        if let Err(e) = self.repo.delete_deck(self.owner.user_id, deck_id).await {
            warn!("deleting deck {deck_id} failed: {e:#}");
            return false;
        }
        self.decks.retain(|d| d.deck.id != deck_id);
        if self.selected == Some(deck_id) {
            self.selected = None;
            self.deck_cards.clear();
            self.mode = DeckBuilderMode::Browsing;
        }
        true
    }

    /// Selects a deck and fetches its cards. Unknown ids are ignored.
    pub async fn select_deck(&mut self, deck_id: Uuid) {
        if !self.decks.iter().any(|d| d.deck.id == deck_id) {
            return;
        }
        if self.selected != Some(deck_id) {
            self.selected = Some(deck_id);
            self.deck_cards.clear();
        }
        self.load_deck_cards().await;
    }

    /// Adds one copy of an available card to the selected deck.
    ///
    /// Rejected without touching the store when the deck already holds 100 cards.
    /// The stored row is counted right away, so a failed refresh cannot let the
    /// deck run past the ceiling.
    pub async fn add_card_to_deck(&mut self, card_id: Uuid) -> bool {
        let Some(deck_id) = self.selected else { return false };
        let Some(card) = self.available.iter().find(|c| c.id == card_id).cloned() else {
            warn!("card {card_id} is not in the collection of {}", self.owner.email);
            return false;
        };

        if let Err(e) = deck::ensure_room(self.card_total()) {
            self.alert = Some(e.to_string());
            return false;
        }

        match self.repo.insert_deck_card(self.owner.user_id, deck_id, card_id, 1).await {
            Ok(entry) => {
                self.deck_cards.push(DeckEntry { entry, card });
                self.load_deck_cards().await;
                self.mode = DeckBuilderMode::Browsing;
                true
            }
            Err(e) => {
                self.alert = Some(format!("Error: {e}"));
                false
            }
        }
    }

    pub async fn remove_card_from_deck(&mut self, deck_card_id: Uuid) -> bool {
        if let Err(e) = self.repo.delete_deck_card(self.owner.user_id, deck_card_id).await {
            warn!("removing deck card {deck_card_id} failed: {e:#}");
            return false;
        }
        self.load_deck_cards().await;
        true
    }

    pub fn open_create_deck(&mut self) {
        self.mode = DeckBuilderMode::CreatingDeck;
    }

    /// Opens the card picker. Needs a selected deck with room left.
    pub fn open_add_card(&mut self) {
        if self.selected.is_some() && self.can_add_cards() {
            self.mode = DeckBuilderMode::AddingCard;
        }
    }

    pub fn close_dialog(&mut self) {
        self.mode = DeckBuilderMode::Browsing;
    }

    pub fn card_total(&self) -> i64 {
        deck::card_total(&self.deck_cards)
    }

    pub fn status(&self) -> DeckStatus {
        DeckStatus::from_total(self.card_total())
    }

    pub fn can_add_cards(&self) -> bool {
        deck::accepts_more(self.card_total())
    }

    pub fn decks(&self) -> &[DeckSummary] {
        &self.decks
    }

    pub fn selected(&self) -> Option<&DeckSummary> {
        let id = self.selected?;
        self.decks.iter().find(|d| d.deck.id == id)
    }

    pub fn deck_cards(&self) -> &[DeckEntry] {
        &self.deck_cards
    }

    pub fn available_cards(&self) -> &[Card] {
        &self.available
    }

    pub fn mode(&self) -> DeckBuilderMode {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }
}
