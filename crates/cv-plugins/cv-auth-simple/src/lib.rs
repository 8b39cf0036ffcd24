//! # cv-auth-simple
//!
//! Argon2-based implementation of `AuthProvider`.
//! Handles email/password accounts and opaque bearer sessions.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use cv_core::error::{AppError, Result};
use cv_core::models::{Account, Identity, Session};
use cv_core::traits::{AccountRepo, AuthProvider};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Shortest password accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

const INVALID_CREDENTIALS: &str = "Invalid login credentials";

pub struct SimpleAuthProvider {
    accounts: Arc<dyn AccountRepo>,
    /// Mixed into every token digest
    session_key: String,
}

impl SimpleAuthProvider {
    /// Accepts the session key (e.g., from an environment variable)
    pub fn new(accounts: Arc<dyn AccountRepo>, session_key: &str) -> Self {
        Self {
            accounts,
            session_key: session_key.to_string(),
        }
    }

    /// Digest stored in place of the token itself.
    fn token_digest(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.session_key.as_bytes());
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// 32 random bytes, URL-safe base64.
    fn new_token() -> Result<String> {
        let mut bytes = [0u8; 32];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| AppError::Internal(format!("no randomness available: {e}")))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    fn verify_password(password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    async fn open_session(&self, identity: Identity) -> Result<Session> {
        let token = Self::new_token()?;
        self.accounts
            .store_session(&self.token_digest(&token), identity.user_id)
            .await
            .map_err(|e| AppError::Auth(format!("{e:#}")))?;
        Ok(Session { token, identity })
    }
}

fn validate_email(email: &str) -> Result<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AppError::Auth(
            "Unable to validate email address: invalid format".into(),
        )),
    }
}

#[async_trait]
impl AuthProvider for SimpleAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        validate_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Auth(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let existing = self
            .accounts
            .find_account_by_email(email)
            .await
            .map_err(|e| AppError::Auth(format!("{e:#}")))?;
        if existing.is_some() {
            return Err(AppError::Auth("User already registered".into()));
        }

        let account = Account {
            id: Uuid::now_v7(),
            email: email.to_string(),
            password_hash: Self::hash_password(password)?,
            created_at: Utc::now(),
        };
        let identity = Identity { user_id: account.id, email: account.email.clone() };
        self.accounts
            .create_account(account)
            .await
            .map_err(|e| AppError::Auth(format!("{e:#}")))?;

        self.open_session(identity).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let account = self
            .accounts
            .find_account_by_email(email.trim())
            .await
            .map_err(|e| AppError::Auth(format!("{e:#}")))?
            .ok_or_else(|| AppError::Auth(INVALID_CREDENTIALS.into()))?;

        if !Self::verify_password(password, &account.password_hash) {
            log::debug!("password mismatch for {}", account.email);
            return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
        }

        self.open_session(Identity { user_id: account.id, email: account.email }).await
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        self.accounts
            .delete_session(&self.token_digest(token))
            .await
            .map_err(AppError::persistence)
    }

    async fn restore(&self, token: &str) -> Result<Option<Identity>> {
        self.accounts
            .find_session(&self.token_digest(token))
            .await
            .map_err(AppError::persistence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_core::traits::MockAccountRepo;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Just enough of an account store to exercise the provider end to end.
    #[derive(Default)]
    struct MemoryAccounts {
        accounts: Mutex<Vec<Account>>,
        sessions: Mutex<HashMap<String, Uuid>>,
    }

    #[async_trait]
    impl AccountRepo for MemoryAccounts {
        async fn create_account(&self, account: Account) -> anyhow::Result<()> {
            self.accounts.lock().unwrap().push(account);
            Ok(())
        }

        async fn find_account_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.email.eq_ignore_ascii_case(email))
                .cloned())
        }

        async fn store_session(&self, token_digest: &str, user_id: Uuid) -> anyhow::Result<()> {
            self.sessions.lock().unwrap().insert(token_digest.to_string(), user_id);
            Ok(())
        }

        async fn find_session(&self, token_digest: &str) -> anyhow::Result<Option<Identity>> {
            let Some(user_id) = self.sessions.lock().unwrap().get(token_digest).copied() else {
                return Ok(None);
            };
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == user_id)
                .map(|a| Identity { user_id: a.id, email: a.email.clone() }))
        }

        async fn delete_session(&self, token_digest: &str) -> anyhow::Result<()> {
            self.sessions.lock().unwrap().remove(token_digest);
            Ok(())
        }
    }

    fn provider() -> (SimpleAuthProvider, Arc<MemoryAccounts>) {
        let store = Arc::new(MemoryAccounts::default());
        (SimpleAuthProvider::new(store.clone(), "test-key"), store)
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let (auth, store) = provider();
        let created = auth.sign_up("  karn@vault.test ", "silverg0lem").await.unwrap();
        assert_eq!(created.identity.email, "karn@vault.test");
        assert!(store.accounts.lock().unwrap()[0].password_hash.starts_with("$argon2"));

        let session = auth.sign_in("KARN@vault.test", "silverg0lem").await.unwrap();
        assert_eq!(session.identity.user_id, created.identity.user_id);
        assert_ne!(session.token, created.token);
    }

    #[tokio::test]
    async fn rejects_bad_sign_ups() {
        let (auth, _) = provider();
        let err = auth.sign_up("not-an-email", "longenough").await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));

        let err = auth.sign_up("ugin@vault.test", "12345").await.unwrap_err();
        assert_eq!(err.to_string(), "Password should be at least 6 characters");

        auth.sign_up("ugin@vault.test", "123456").await.unwrap();
        let err = auth.sign_up("Ugin@vault.test", "abcdefg").await.unwrap_err();
        assert_eq!(err.to_string(), "User already registered");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let (auth, _) = provider();
        auth.sign_up("sorin@vault.test", "markov-blood").await.unwrap();

        let wrong = auth.sign_in("sorin@vault.test", "nope-nope").await.unwrap_err();
        let unknown = auth.sign_in("nobody@vault.test", "markov-blood").await.unwrap_err();
        assert_eq!(wrong, unknown);
        assert_eq!(wrong.to_string(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn tokens_are_stored_as_digests() {
        let (auth, store) = provider();
        let session = auth.sign_up("tamiyo@vault.test", "moonsage").await.unwrap();

        let sessions = store.sessions.lock().unwrap().clone();
        assert!(!sessions.contains_key(&session.token));
        assert!(sessions.contains_key(&auth.token_digest(&session.token)));
    }

    #[tokio::test]
    async fn restore_and_idempotent_sign_out() {
        let (auth, _) = provider();
        let session = auth.sign_up("nahiri@vault.test", "harbinger").await.unwrap();

        let restored = auth.restore(&session.token).await.unwrap();
        assert_eq!(restored, Some(session.identity.clone()));

        auth.sign_out(&session.token).await.unwrap();
        auth.sign_out(&session.token).await.unwrap();
        assert_eq!(auth.restore(&session.token).await.unwrap(), None);
        assert_eq!(auth.restore("forged").await.unwrap(), None);
    }

    #[tokio::test]
    async fn store_outage_is_an_auth_error() {
        let mut accounts = MockAccountRepo::new();
        accounts
            .expect_find_account_by_email()
            .returning(|_| Err(anyhow::anyhow!("network unreachable")));
        let auth = SimpleAuthProvider::new(Arc::new(accounts), "k");

        let err = auth.sign_in("gideon@vault.test", "whatever").await.unwrap_err();
        assert_eq!(err, AppError::Auth("network unreachable".into()));
    }
}
