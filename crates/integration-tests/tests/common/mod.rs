//! Shared fixtures: a fresh in-memory store and signed-up owners.
#![allow(dead_code)]

use std::sync::Arc;

use cv_auth_simple::SimpleAuthProvider;
use cv_core::models::{Card, Identity, NewCard};
use cv_core::traits::{AuthProvider, VaultRepo};
use cv_db_sqlite::SqliteVaultRepo;

pub const SESSION_KEY: &str = "integration-key";

pub struct Fixture {
    pub repo: Arc<dyn VaultRepo>,
    pub auth: Arc<dyn AuthProvider>,
}

pub async fn fixture() -> Fixture {
    let store = Arc::new(SqliteVaultRepo::new("sqlite::memory:").await.unwrap());
    let auth = Arc::new(SimpleAuthProvider::new(store.clone(), SESSION_KEY));
    Fixture { repo: store, auth }
}

impl Fixture {
    pub async fn owner(&self, email: &str) -> Identity {
        self.auth.sign_up(email, "planeswalker").await.unwrap().identity
    }

    /// Creates a card definition and puts one copy in `owner`'s collection.
    pub async fn owned_card(&self, owner: &Identity, name: &str) -> Card {
        let card = self
            .repo
            .insert_card(NewCard { name: name.into(), ..Default::default() })
            .await
            .unwrap();
        self.repo.insert_user_card(owner.user_id, card.id, 1).await.unwrap();
        card
    }
}
