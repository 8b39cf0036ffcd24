//! # cv-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `cv-core` domain models.
//!
//! Every owner-scoped statement filters on the owning user, so a session can
//! never read or change another user's collection or decks.

use std::str::FromStr;

use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use cv_core::models::{
    Account, Card, Color, Deck, DeckCard, DeckEntry, DeckSummary, Identity, NewCard, NewDeck,
    OwnedCard, UserCard,
};
use cv_core::traits::{AccountRepo, VaultRepo};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS accounts (
        id            BLOB PRIMARY KEY,
        email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
        password_hash TEXT NOT NULL,
        created_at    TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        token_digest TEXT PRIMARY KEY,
        user_id      BLOB NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        created_at   TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS cards (
        id             BLOB PRIMARY KEY,
        name           TEXT NOT NULL,
        mana_cost      TEXT,
        type_line      TEXT,
        oracle_text    TEXT,
        colors         TEXT NOT NULL DEFAULT '[]',
        color_identity TEXT NOT NULL DEFAULT '[]',
        power          TEXT,
        toughness      TEXT,
        rarity         TEXT,
        set_code       TEXT,
        image_url      TEXT,
        is_legendary   INTEGER NOT NULL DEFAULT 0,
        created_at     TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS user_cards (
        id         BLOB PRIMARY KEY,
        user_id    BLOB NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        card_id    BLOB NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
        quantity   INTEGER NOT NULL DEFAULT 1 CHECK (quantity >= 1),
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS decks (
        id             BLOB PRIMARY KEY,
        user_id        BLOB NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        name           TEXT NOT NULL,
        commander_id   BLOB REFERENCES cards(id) ON DELETE SET NULL,
        description    TEXT NOT NULL DEFAULT '',
        color_identity TEXT NOT NULL DEFAULT '[]',
        created_at     TEXT NOT NULL,
        updated_at     TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS deck_cards (
        id         BLOB PRIMARY KEY,
        deck_id    BLOB NOT NULL REFERENCES decks(id) ON DELETE CASCADE,
        card_id    BLOB NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
        quantity   INTEGER NOT NULL DEFAULT 1 CHECK (quantity >= 1),
        category   TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS user_cards_user ON user_cards (user_id)",
    "CREATE INDEX IF NOT EXISTS decks_user ON decks (user_id, created_at)",
    "CREATE INDEX IF NOT EXISTS deck_cards_deck ON deck_cards (deck_id)",
];

/// Card columns, prefixed so they can sit next to the joined row's own columns.
const CARD_COLUMNS: &str = "c.id AS c_id, c.name AS c_name, c.mana_cost AS c_mana_cost, \
    c.type_line AS c_type_line, c.oracle_text AS c_oracle_text, c.colors AS c_colors, \
    c.color_identity AS c_color_identity, c.power AS c_power, c.toughness AS c_toughness, \
    c.rarity AS c_rarity, c.set_code AS c_set_code, c.image_url AS c_image_url, \
    c.is_legendary AS c_is_legendary, c.created_at AS c_created_at";

pub struct SqliteVaultRepo {
    pool: SqlitePool,
}

impl SqliteVaultRepo {
    /// Opens (creating if needed) the database at `url` and applies the schema.
    ///
    /// In-memory URLs get a single connection that is never recycled; each
    /// SQLite connection would otherwise see its own empty database.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url {url:?}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().max_connections(5).connect_with(options).await?
        };

        let repo = Self { pool };
        repo.migrate().await?;
        log::info!("sqlite store ready at {url}");
        Ok(repo)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

// Helper for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> anyhow::Result<Uuid> {
    Uuid::from_slice(blob).context("malformed uuid column")
}

// Fixed-width so that TEXT ordering matches time ordering
fn ts_to_text(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn text_to_ts(text: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(text)
        .with_context(|| format!("malformed timestamp {text:?}"))?
        .with_timezone(&Utc))
}

fn colors_to_text(colors: &[Color]) -> anyhow::Result<String> {
    Ok(serde_json::to_string(colors)?)
}

fn text_to_colors(text: &str) -> anyhow::Result<Vec<Color>> {
    Ok(serde_json::from_str(text)?)
}

fn uuid_col(row: &SqliteRow, col: &str) -> anyhow::Result<Uuid> {
    blob_to_uuid(&row.try_get::<Vec<u8>, _>(col)?)
}

fn ts_col(row: &SqliteRow, col: &str) -> anyhow::Result<DateTime<Utc>> {
    text_to_ts(&row.try_get::<String, _>(col)?)
}

fn card_from_row(row: &SqliteRow) -> anyhow::Result<Card> {
    Ok(Card {
        id: uuid_col(row, "c_id")?,
        name: row.try_get("c_name")?,
        mana_cost: row.try_get("c_mana_cost")?,
        type_line: row.try_get("c_type_line")?,
        oracle_text: row.try_get("c_oracle_text")?,
        colors: text_to_colors(&row.try_get::<String, _>("c_colors")?)?,
        color_identity: text_to_colors(&row.try_get::<String, _>("c_color_identity")?)?,
        power: row.try_get("c_power")?,
        toughness: row.try_get("c_toughness")?,
        rarity: row.try_get("c_rarity")?,
        set_code: row.try_get("c_set_code")?,
        image_url: row.try_get("c_image_url")?,
        is_legendary: row.try_get("c_is_legendary")?,
        created_at: ts_col(row, "c_created_at")?,
    })
}

fn deck_from_row(row: &SqliteRow) -> anyhow::Result<Deck> {
    Ok(Deck {
        id: uuid_col(row, "d_id")?,
        user_id: uuid_col(row, "d_user_id")?,
        name: row.try_get("d_name")?,
        commander_id: row
            .try_get::<Option<Vec<u8>>, _>("d_commander_id")?
            .map(|blob| blob_to_uuid(&blob))
            .transpose()?,
        description: row.try_get("d_description")?,
        color_identity: text_to_colors(&row.try_get::<String, _>("d_color_identity")?)?,
        created_at: ts_col(row, "d_created_at")?,
        updated_at: ts_col(row, "d_updated_at")?,
    })
}

#[async_trait]
impl VaultRepo for SqliteVaultRepo {
    async fn insert_card(&self, new: NewCard) -> anyhow::Result<Card> {
        let card = Card {
            id: Uuid::now_v7(),
            name: new.name,
            mana_cost: new.mana_cost,
            type_line: new.type_line,
            oracle_text: None,
            colors: new.colors,
            color_identity: new.color_identity,
            power: None,
            toughness: None,
            rarity: None,
            set_code: None,
            image_url: None,
            is_legendary: new.is_legendary,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO cards (id, name, mana_cost, type_line, colors, color_identity, is_legendary, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(card.id))
        .bind(&card.name)
        .bind(&card.mana_cost)
        .bind(&card.type_line)
        .bind(colors_to_text(&card.colors)?)
        .bind(colors_to_text(&card.color_identity)?)
        .bind(card.is_legendary)
        .bind(ts_to_text(card.created_at))
        .execute(&self.pool)
        .await?;

        Ok(card)
    }

    async fn insert_user_card(&self, owner: Uuid, card_id: Uuid, quantity: i64) -> anyhow::Result<UserCard> {
        let row = UserCard {
            id: Uuid::now_v7(),
            user_id: owner,
            card_id,
            quantity,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO user_cards (id, user_id, card_id, quantity, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(row.id))
            .bind(uuid_to_blob(row.user_id))
            .bind(uuid_to_blob(row.card_id))
            .bind(row.quantity)
            .bind(ts_to_text(row.created_at))
            .execute(&self.pool)
            .await?;

        Ok(row)
    }

    async fn list_user_cards(&self, owner: Uuid) -> anyhow::Result<Vec<OwnedCard>> {
        let sql = format!(
            "SELECT uc.id AS uc_id, uc.user_id AS uc_user_id, uc.card_id AS uc_card_id, \
                    uc.quantity AS uc_quantity, uc.created_at AS uc_created_at, {CARD_COLUMNS} \
             FROM user_cards uc JOIN cards c ON c.id = uc.card_id \
             WHERE uc.user_id = ? \
             ORDER BY uc.created_at ASC, uc.id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(uuid_to_blob(owner))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> anyhow::Result<OwnedCard> {
                Ok(OwnedCard {
                    entry: UserCard {
                        id: uuid_col(row, "uc_id")?,
                        user_id: uuid_col(row, "uc_user_id")?,
                        card_id: uuid_col(row, "uc_card_id")?,
                        quantity: row.try_get("uc_quantity")?,
                        created_at: ts_col(row, "uc_created_at")?,
                    },
                    card: card_from_row(row)?,
                })
            })
            .collect()
    }

    async fn list_decks(&self, owner: Uuid) -> anyhow::Result<Vec<DeckSummary>> {
        let sql = format!(
            "SELECT d.id AS d_id, d.user_id AS d_user_id, d.name AS d_name, \
                    d.commander_id AS d_commander_id, d.description AS d_description, \
                    d.color_identity AS d_color_identity, d.created_at AS d_created_at, \
                    d.updated_at AS d_updated_at, {CARD_COLUMNS} \
             FROM decks d LEFT JOIN cards c ON c.id = d.commander_id \
             WHERE d.user_id = ? \
             ORDER BY d.created_at DESC, d.id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(uuid_to_blob(owner))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> anyhow::Result<DeckSummary> {
                let commander = match row.try_get::<Option<Vec<u8>>, _>("c_id")? {
                    Some(_) => Some(card_from_row(row)?),
                    None => None,
                };
                Ok(DeckSummary { deck: deck_from_row(row)?, commander })
            })
            .collect()
    }

    async fn insert_deck(&self, owner: Uuid, new: NewDeck) -> anyhow::Result<Deck> {
        let now = Utc::now();
        let deck = Deck {
            id: Uuid::now_v7(),
            user_id: owner,
            name: new.name,
            commander_id: new.commander_id,
            description: new.description,
            color_identity: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO decks (id, user_id, name, commander_id, description, color_identity, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(deck.id))
        .bind(uuid_to_blob(deck.user_id))
        .bind(&deck.name)
        .bind(deck.commander_id.map(uuid_to_blob))
        .bind(&deck.description)
        .bind(colors_to_text(&deck.color_identity)?)
        .bind(ts_to_text(deck.created_at))
        .bind(ts_to_text(deck.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(deck)
    }

    /// Deck cards go with the deck through `ON DELETE CASCADE`.
    async fn delete_deck(&self, owner: Uuid, deck_id: Uuid) -> anyhow::Result<()> {
        let done = sqlx::query("DELETE FROM decks WHERE id = ? AND user_id = ?")
            .bind(uuid_to_blob(deck_id))
            .bind(uuid_to_blob(owner))
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            bail!("permission denied for deck {deck_id}");
        }
        Ok(())
    }

    async fn list_deck_cards(&self, owner: Uuid, deck_id: Uuid) -> anyhow::Result<Vec<DeckEntry>> {
        let sql = format!(
            "SELECT dc.id AS dc_id, dc.deck_id AS dc_deck_id, dc.card_id AS dc_card_id, \
                    dc.quantity AS dc_quantity, dc.category AS dc_category, \
                    dc.created_at AS dc_created_at, {CARD_COLUMNS} \
             FROM deck_cards dc \
             JOIN decks d ON d.id = dc.deck_id \
             JOIN cards c ON c.id = dc.card_id \
             WHERE dc.deck_id = ? AND d.user_id = ? \
             ORDER BY dc.created_at ASC, dc.id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(uuid_to_blob(deck_id))
            .bind(uuid_to_blob(owner))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> anyhow::Result<DeckEntry> {
                Ok(DeckEntry {
                    entry: DeckCard {
                        id: uuid_col(row, "dc_id")?,
                        deck_id: uuid_col(row, "dc_deck_id")?,
                        card_id: uuid_col(row, "dc_card_id")?,
                        quantity: row.try_get("dc_quantity")?,
                        category: row.try_get("dc_category")?,
                        created_at: ts_col(row, "dc_created_at")?,
                    },
                    card: card_from_row(row)?,
                })
            })
            .collect()
    }

    /// Inserts only when `deck_id` belongs to `owner`.
    async fn insert_deck_card(&self, owner: Uuid, deck_id: Uuid, card_id: Uuid, quantity: i64) -> anyhow::Result<DeckCard> {
        let row = DeckCard {
            id: Uuid::now_v7(),
            deck_id,
            card_id,
            quantity,
            category: None,
            created_at: Utc::now(),
        };

        let result = sqlx::query(
            "INSERT INTO deck_cards (id, deck_id, card_id, quantity, category, created_at) \
             SELECT ?, d.id, ?, ?, NULL, ? FROM decks d WHERE d.id = ? AND d.user_id = ?",
        )
        .bind(uuid_to_blob(row.id))
        .bind(uuid_to_blob(row.card_id))
        .bind(row.quantity)
        .bind(ts_to_text(row.created_at))
        .bind(uuid_to_blob(deck_id))
        .bind(uuid_to_blob(owner))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            bail!("permission denied for deck {deck_id}");
        }
        Ok(row)
    }

    async fn delete_deck_card(&self, owner: Uuid, deck_card_id: Uuid) -> anyhow::Result<()> {
        let done = sqlx::query(
            "DELETE FROM deck_cards WHERE id = ? \
             AND deck_id IN (SELECT id FROM decks WHERE user_id = ?)",
        )
        .bind(uuid_to_blob(deck_card_id))
        .bind(uuid_to_blob(owner))
        .execute(&self.pool)
        .await?;
        if done.rows_affected() == 0 {
            bail!("permission denied for deck card {deck_card_id}");
        }
        Ok(())
    }
}

#[async_trait]
impl AccountRepo for SqliteVaultRepo {
    async fn create_account(&self, account: Account) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO accounts (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)")
            .bind(uuid_to_blob(account.id))
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(ts_to_text(account.created_at))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_account_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query("SELECT id, email, password_hash, created_at FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> anyhow::Result<Account> {
            Ok(Account {
                id: uuid_col(&row, "id")?,
                email: row.try_get("email")?,
                password_hash: row.try_get("password_hash")?,
                created_at: ts_col(&row, "created_at")?,
            })
        })
        .transpose()
    }

    async fn store_session(&self, token_digest: &str, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO sessions (token_digest, user_id, created_at) VALUES (?, ?, ?)")
            .bind(token_digest)
            .bind(uuid_to_blob(user_id))
            .bind(ts_to_text(Utc::now()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_session(&self, token_digest: &str) -> anyhow::Result<Option<Identity>> {
        let row = sqlx::query(
            "SELECT a.id, a.email FROM sessions s JOIN accounts a ON a.id = s.user_id \
             WHERE s.token_digest = ?",
        )
        .bind(token_digest)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> anyhow::Result<Identity> {
            Ok(Identity {
                user_id: uuid_col(&row, "id")?,
                email: row.try_get("email")?,
            })
        })
        .transpose()
    }

    async fn delete_session(&self, token_digest: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token_digest = ?")
            .bind(token_digest)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> SqliteVaultRepo {
        SqliteVaultRepo::new("sqlite::memory:").await.unwrap()
    }

    async fn account(repo: &SqliteVaultRepo, email: &str) -> Uuid {
        let id = Uuid::now_v7();
        repo.create_account(Account {
            id,
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();
        id
    }

    fn new_card(name: &str) -> NewCard {
        NewCard { name: name.into(), ..Default::default() }
    }

    #[tokio::test]
    async fn test_card_joins_collection() {
        let repo = repo().await;
        let owner = account(&repo, "teferi@vault.test").await;

        let card = repo
            .insert_card(NewCard {
                name: "Teferi, Master of Time".into(),
                type_line: Some("Legendary Planeswalker - Teferi".into()),
                mana_cost: Some("{2}{U}{U}".into()),
                colors: vec![Color::Blue],
                color_identity: vec![Color::Blue],
                is_legendary: true,
            })
            .await
            .unwrap();
        repo.insert_user_card(owner, card.id, 1).await.unwrap();

        let owned = repo.list_user_cards(owner).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].card, card);
        assert_eq!(owned[0].entry.quantity, 1);
    }

    #[tokio::test]
    async fn test_repeated_adds_create_duplicate_rows() {
        let repo = repo().await;
        let owner = account(&repo, "dupe@vault.test").await;
        let card = repo.insert_card(new_card("Sol Ring")).await.unwrap();
        repo.insert_user_card(owner, card.id, 1).await.unwrap();
        repo.insert_user_card(owner, card.id, 1).await.unwrap();
        assert_eq!(repo.list_user_cards(owner).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_collections_are_scoped_to_owner() {
        let repo = repo().await;
        let alice = account(&repo, "alice@vault.test").await;
        let bob = account(&repo, "bob@vault.test").await;
        let card = repo.insert_card(new_card("Command Tower")).await.unwrap();
        repo.insert_user_card(alice, card.id, 1).await.unwrap();

        assert_eq!(repo.list_user_cards(alice).await.unwrap().len(), 1);
        assert!(repo.list_user_cards(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_decks_newest_first_with_commander() {
        let repo = repo().await;
        let owner = account(&repo, "ravos@vault.test").await;
        let commander = repo.insert_card(new_card("Ravos, Soultender")).await.unwrap();

        let first = repo
            .insert_deck(owner, NewDeck { name: "First".into(), commander_id: Some(commander.id), ..Default::default() })
            .await
            .unwrap();
        let second = repo.insert_deck(owner, NewDeck { name: "Second".into(), ..Default::default() }).await.unwrap();

        let decks = repo.list_decks(owner).await.unwrap();
        assert_eq!(decks.len(), 2);
        assert_eq!(decks[0].deck.id, second.id);
        assert!(decks[0].commander.is_none());
        assert_eq!(decks[1].deck.id, first.id);
        assert_eq!(decks[1].commander.as_ref().map(|c| c.name.as_str()), Some("Ravos, Soultender"));
    }

    #[tokio::test]
    async fn test_delete_deck_cascades_to_cards() {
        let repo = repo().await;
        let owner = account(&repo, "cascade@vault.test").await;
        let card = repo.insert_card(new_card("Forest")).await.unwrap();
        let deck = repo.insert_deck(owner, NewDeck { name: "Gone".into(), ..Default::default() }).await.unwrap();
        repo.insert_deck_card(owner, deck.id, card.id, 1).await.unwrap();

        repo.delete_deck(owner, deck.id).await.unwrap();

        let (orphans,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM deck_cards")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
        assert!(repo.list_decks(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_deck_is_untouchable() {
        let repo = repo().await;
        let alice = account(&repo, "alice@vault.test").await;
        let mallory = account(&repo, "mallory@vault.test").await;
        let card = repo.insert_card(new_card("Island")).await.unwrap();
        let deck = repo.insert_deck(alice, NewDeck { name: "Mine".into(), ..Default::default() }).await.unwrap();
        let entry = repo.insert_deck_card(alice, deck.id, card.id, 1).await.unwrap();

        let err = repo.insert_deck_card(mallory, deck.id, card.id, 1).await.unwrap_err();
        assert!(err.to_string().contains("permission denied"));

        let err = repo.delete_deck_card(mallory, entry.id).await.unwrap_err();
        assert!(err.to_string().contains("permission denied"));
        let err = repo.delete_deck(mallory, deck.id).await.unwrap_err();
        assert!(err.to_string().contains("permission denied"));
        assert!(repo.list_deck_cards(mallory, deck.id).await.unwrap().is_empty());
        assert_eq!(repo.list_decks(alice).await.unwrap().len(), 1);

        let cards = repo.list_deck_cards(alice, deck.id).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].entry.category, None);
    }

    #[tokio::test]
    async fn test_sessions_resolve_to_identity() {
        let repo = repo().await;
        let id = account(&repo, "Kaya@Vault.test").await;

        let found = repo.find_account_by_email("kaya@vault.test").await.unwrap().unwrap();
        assert_eq!(found.id, id);

        repo.store_session("digest", id).await.unwrap();
        let identity = repo.find_session("digest").await.unwrap().unwrap();
        assert_eq!(identity.user_id, id);
        assert_eq!(identity.email, "Kaya@Vault.test");

        repo.delete_session("digest").await.unwrap();
        assert!(repo.find_session("digest").await.unwrap().is_none());
    }

    #[test]
    fn test_timestamps_sort_as_text() {
        let early = "2026-01-01T00:00:00.5Z".parse::<DateTime<Utc>>().unwrap();
        let late = "2026-01-01T00:00:00.123456Z".parse::<DateTime<Utc>>().unwrap();
        assert!(early > late);
        assert!(ts_to_text(early) > ts_to_text(late));
        assert_eq!(text_to_ts(&ts_to_text(early)).unwrap(), early);
    }
}
