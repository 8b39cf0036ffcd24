//! # Collection View
//!
//! The signed-in user's owned cards, a name filter over them, and a form for
//! creating a new card definition that lands straight in the collection.

use std::sync::Arc;

use log::warn;

use crate::models::{Color, Identity, NewCard, OwnedCard};
use crate::traits::VaultRepo;

/// Presentation bucket for a card tile. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBucket {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
}

impl ColorBucket {
    /// First match wins: White, Blue, Black, Red, Green, then colorless.
    pub fn of(colors: &[Color]) -> Self {
        if colors.contains(&Color::White) {
            ColorBucket::White
        } else if colors.contains(&Color::Blue) {
            ColorBucket::Blue
        } else if colors.contains(&Color::Black) {
            ColorBucket::Black
        } else if colors.contains(&Color::Red) {
            ColorBucket::Red
        } else if colors.contains(&Color::Green) {
            ColorBucket::Green
        } else {
            ColorBucket::Colorless
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ColorBucket::White => "white",
            ColorBucket::Blue => "blue",
            ColorBucket::Black => "black",
            ColorBucket::Red => "red",
            ColorBucket::Green => "green",
            ColorBucket::Colorless => "colorless",
        }
    }
}

/// Contents of the add-card form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardDraft {
    pub name: String,
    pub type_line: String,
    pub mana_cost: String,
    pub colors: Vec<Color>,
    pub color_identity: Vec<Color>,
    pub is_legendary: bool,
}

impl CardDraft {
    fn to_new_card(&self) -> NewCard {
        NewCard {
            name: self.name.clone(),
            type_line: non_blank(&self.type_line),
            mana_cost: non_blank(&self.mana_cost),
            colors: self.colors.clone(),
            color_identity: self.color_identity.clone(),
            is_legendary: self.is_legendary,
        }
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollectionMode {
    Browsing,
    AddingCard(CardDraft),
}

pub struct CollectionView {
    repo: Arc<dyn VaultRepo>,
    owner: Identity,
    cards: Vec<OwnedCard>,
    loading: bool,
    filter: String,
    mode: CollectionMode,
    alert: Option<String>,
}

impl CollectionView {
    pub fn new(repo: Arc<dyn VaultRepo>, owner: Identity) -> Self {
        Self {
            repo,
            owner,
            cards: Vec::new(),
            loading: true,
            filter: String::new(),
            mode: CollectionMode::Browsing,
            alert: None,
        }
    }

    /// Replaces the list with the owner's cards. On failure the previous list stays.
    pub async fn load_cards(&mut self) {
        match self.repo.list_user_cards(self.owner.user_id).await {
            Ok(cards) => self.cards = cards,
            Err(e) => warn!("loading collection for {} failed: {e:#}", self.owner.email),
        }
        self.loading = false;
    }

    /// Creates the card definition, then links it to the owner with quantity 1.
    ///
    /// Either failure raises an alert and stops; the form stays open with the
    /// draft intact. Returns whether both inserts succeeded.
    pub async fn create_card(&mut self, draft: CardDraft) -> bool {
        let card = match self.repo.insert_card(draft.to_new_card()).await {
            Ok(card) => card,
            Err(e) => {
                self.alert = Some(format!("Error creating card: {e}"));
                self.mode = CollectionMode::AddingCard(draft);
                return false;
            }
        };

        if let Err(e) = self.repo.insert_user_card(self.owner.user_id, card.id, 1).await {
            self.alert = Some(format!("Error adding to collection: {e}"));
            self.mode = CollectionMode::AddingCard(draft);
            return false;
        }

        self.mode = CollectionMode::Browsing;
        self.load_cards().await;
        true
    }

    pub fn open_add_card(&mut self) {
        if self.mode == CollectionMode::Browsing {
            self.mode = CollectionMode::AddingCard(CardDraft::default());
        }
    }

    pub fn cancel(&mut self) {
        self.mode = CollectionMode::Browsing;
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// Cards whose name contains the filter, ignoring case.
    pub fn filtered(&self) -> Vec<&OwnedCard> {
        let needle = self.filter.to_lowercase();
        self.cards
            .iter()
            .filter(|owned| owned.card.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn cards(&self) -> &[OwnedCard] {
        &self.cards
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn mode(&self) -> &CollectionMode {
        &self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Hands out the pending alert once.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }
}
