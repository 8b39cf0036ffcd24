//! # Session Provider
//!
//! Tracks who is signed in for one client. Views never read this directly;
//! the shell hands them the identity when they mount.

use std::sync::Arc;

use log::info;
use tokio::sync::watch;

use crate::error::Result;
use crate::models::{Identity, Session};
use crate::traits::AuthProvider;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Initial restoration has not finished yet
    Loading,
    SignedOut,
    SignedIn(Identity),
}

pub struct SessionProvider {
    auth: Arc<dyn AuthProvider>,
    state: watch::Sender<SessionState>,
    token: Option<String>,
}

impl SessionProvider {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self { auth, state, token: None }
    }

    /// Resolves a stored token (if any) into the initial session.
    /// A token that no longer resolves, or a failed lookup, leaves the client signed out.
    pub async fn restore(&mut self, token: Option<&str>) {
        let identity = match token {
            Some(token) => match self.auth.restore(token).await {
                Ok(Some(identity)) => {
                    self.token = Some(token.to_string());
                    Some(identity)
                }
                Ok(None) => None,
                Err(e) => {
                    log::warn!("session restore failed: {e}");
                    None
                }
            },
            None => None,
        };
        self.publish(identity);
    }

    pub async fn sign_up(&mut self, email: &str, password: &str) -> Result<Session> {
        let session = self.auth.sign_up(email, password).await?;
        info!("signed up {}", session.identity.email);
        self.adopt(&session).await;
        Ok(session)
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Session> {
        let session = self.auth.sign_in(email, password).await?;
        info!("signed in {}", session.identity.email);
        self.adopt(&session).await;
        Ok(session)
    }

    /// Ends the current session. Calling it while signed out does nothing.
    pub async fn sign_out(&mut self) {
        if let Some(token) = self.token.take() {
            if let Err(e) = self.auth.sign_out(&token).await {
                log::warn!("remote sign-out failed: {e}");
            }
        }
        if let SessionState::SignedIn(identity) = &*self.state.borrow() {
            info!("signed out {}", identity.email);
        }
        self.publish(None);
    }

    pub fn identity(&self) -> Option<Identity> {
        match &*self.state.borrow() {
            SessionState::SignedIn(identity) => Some(identity.clone()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Loading)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Receives every identity change from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Switches to `session`, revoking the token it replaces.
    async fn adopt(&mut self, session: &Session) {
        if let Some(old) = self.token.replace(session.token.clone()) {
            if old != session.token {
                if let Err(e) = self.auth.sign_out(&old).await {
                    log::warn!("revoking replaced session failed: {e}");
                }
            }
        }
        self.publish(Some(session.identity.clone()));
    }

    fn publish(&self, identity: Option<Identity>) {
        let next = match identity {
            Some(identity) => SessionState::SignedIn(identity),
            None => SessionState::SignedOut,
        };
        self.state.send_replace(next);
    }
}
