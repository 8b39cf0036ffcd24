//! # Client Registry
//!
//! Each browser gets its own session provider and shell, keyed by the
//! `cv_client` cookie. All requests from one client serialize on its lock.
//! A stored session is restored in the background, so a new client renders
//! as loading until the lookup lands.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::HttpRequest;
use cv_core::session::SessionProvider;
use cv_core::shell::{SharedShell, Shell};
use cv_core::traits::{AuthProvider, VaultRepo};
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const CLIENT_COOKIE: &str = "cv_client";
pub const SESSION_COOKIE: &str = "cv_session";

pub struct Client {
    pub session: SessionProvider,
    shell: Option<SharedShell>,
    /// Last sign-in/up failure, shown once on the auth screen
    pub auth_error: Option<String>,
    last_seen: Instant,
}

impl Client {
    fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            session: SessionProvider::new(auth),
            shell: None,
            auth_error: None,
            last_seen: Instant::now(),
        }
    }

    /// The shell for the signed-in identity, mounted on first use.
    /// Signed-out clients have none.
    pub async fn shell(&mut self, repo: &Arc<dyn VaultRepo>) -> Option<SharedShell> {
        let Some(identity) = self.session.identity() else {
            self.shell = None;
            return None;
        };
        if let Some(shell) = &self.shell {
            return Some(shell.clone());
        }
        let shell = Arc::new(Mutex::new(Shell::open(repo.clone(), identity).await));
        self.shell = Some(shell.clone());
        Some(shell)
    }

    /// Tears down the mounted views; the next request mounts fresh ones.
    pub fn unmount(&mut self) {
        self.shell = None;
    }
}

/// A request's client and the id to hand back in the cookie.
pub struct Attached {
    pub id: String,
    pub client: Arc<Mutex<Client>>,
}

#[derive(Default)]
pub struct ClientRegistry {
    clients: DashMap<String, Arc<Mutex<Client>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the request's client, or registers a new one and starts restoring
    /// its session from the `cv_session` cookie.
    ///
    /// Unknown client ids are never adopted; a fresh id is issued instead.
    pub async fn attach(&self, auth: &Arc<dyn AuthProvider>, req: &HttpRequest) -> Attached {
        if let Some(cookie) = req.cookie(CLIENT_COOKIE) {
            let known = self.clients.get(cookie.value()).map(|entry| entry.value().clone());
            if let Some(client) = known {
                client.lock().await.last_seen = Instant::now();
                return Attached { id: cookie.value().to_string(), client };
            }
        }

        let id = Uuid::new_v4().to_string();
        let client = Arc::new(Mutex::new(Client::new(auth.clone())));
        self.clients.insert(id.clone(), client.clone());
        match req.cookie(SESSION_COOKIE) {
            Some(cookie) => {
                restore_in_background(client.clone(), auth.clone(), cookie.value().to_string())
            }
            None => client.lock().await.session.restore(None).await,
        }
        log::debug!("registered client {id}");
        Attached { id, client }
    }

    /// Drops clients idle for longer than `max_idle`. Busy clients are kept.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.clients.len();
        self.clients.retain(|_, client| match client.try_lock() {
            Ok(client) => client.last_seen.elapsed() < max_idle,
            Err(_) => true,
        });
        let evicted = before.saturating_sub(self.clients.len());
        if evicted > 0 {
            log::info!("evicted {evicted} idle clients");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Resolves `token` without holding the client's lock. The result is dropped
/// if the client signed in or out in the meantime.
fn restore_in_background(client: Arc<Mutex<Client>>, auth: Arc<dyn AuthProvider>, token: String) {
    actix_web::rt::spawn(async move {
        let mut restored = SessionProvider::new(auth);
        restored.restore(Some(&token)).await;
        let mut client = client.lock().await;
        if client.session.is_loading() {
            client.session = restored;
        }
    });
}
