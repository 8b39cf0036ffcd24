//! # Domain Models
//!
//! These structs represent the core entities of Commander's Vault.
//! We use UUID v7 for time-ordered, globally unique identification.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// One of the five mana colors, stored by its single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "W")]
    White,
    #[serde(rename = "U")]
    Blue,
    #[serde(rename = "B")]
    Black,
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "G")]
    Green,
}

impl Color {
    /// WUBRG order.
    pub const ALL: [Color; 5] = [Color::White, Color::Blue, Color::Black, Color::Red, Color::Green];

    pub fn code(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'W' => Some(Color::White),
            'U' => Some(Color::Blue),
            'B' => Some(Color::Black),
            'R' => Some(Color::Red),
            'G' => Some(Color::Green),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A card definition. Shared by every user; never duplicated per owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub name: String,
    pub mana_cost: Option<String>,
    pub type_line: Option<String>,
    pub oracle_text: Option<String>,
    pub colors: Vec<Color>,
    pub color_identity: Vec<Color>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub rarity: Option<String>,
    pub set_code: Option<String>,
    pub image_url: Option<String>,
    pub is_legendary: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when inserting a card. Everything not listed here starts empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCard {
    pub name: String,
    pub type_line: Option<String>,
    pub mana_cost: Option<String>,
    pub colors: Vec<Color>,
    pub color_identity: Vec<Color>,
    pub is_legendary: bool,
}

/// One user's ownership of a quantity of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub card_id: Uuid,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// A `UserCard` joined with its card definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedCard {
    pub entry: UserCard,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// The card acting as commander, if one has been chosen
    pub commander_id: Option<Uuid>,
    pub description: String,
    pub color_identity: Vec<Color>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDeck {
    pub name: String,
    pub description: String,
    pub commander_id: Option<Uuid>,
}

/// A deck joined with its commander card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckSummary {
    pub deck: Deck,
    pub commander: Option<Card>,
}

/// One card's membership within a deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckCard {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub card_id: Uuid,
    pub quantity: i64,
    /// Reserved grouping (lands, ramp, removal...). No view writes it.
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A `DeckCard` joined with its card definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub entry: DeckCard,
    pub card: Card,
}

/// The authenticated identity every persistence call is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// A stored login. `password_hash` is a PHC string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful sign-up or sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Opaque bearer token handed to the client
    pub token: String,
    pub identity: Identity,
}

/// Parses a comma or whitespace separated list of color codes ("W, U" or "WU").
/// Unknown characters are ignored and duplicates collapse.
impl FromStr for ColorSet {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut colors: Vec<Color> = s.chars().filter_map(Color::from_code).collect();
        colors.sort();
        colors.dedup();
        Ok(ColorSet(colors))
    }
}

/// Wrapper used when colors arrive as free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorSet(pub Vec<Color>);

impl fmt::Display for ColorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for color in &self.0 {
            write!(f, "{color}")?;
        }
        Ok(())
    }
}
