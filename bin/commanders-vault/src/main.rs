//! # Commander's Vault Binary
//!
//! The entry point that assembles the application based on compile-time features.

mod config;

use std::sync::Arc;
use std::time::Duration;

use actix_files::Files;
use actix_web::{web, App, HttpServer};
use cv_api::handlers::AppState;
use cv_api::middleware::{cors_policy, security_headers, standard_middleware};
use cv_core::traits::{AccountRepo, AuthProvider, VaultRepo};

#[cfg(feature = "db-sqlite")]
use cv_db_sqlite::SqliteVaultRepo;

#[cfg(feature = "auth-simple")]
use cv_auth_simple::SimpleAuthProvider;

#[cfg(not(all(feature = "db-sqlite", feature = "auth-simple")))]
compile_error!("a persistence plugin (db-sqlite) and an auth plugin (auth-simple) are required");

use crate::config::Config;

/// Clients untouched for this long lose their view state.
const CLIENT_IDLE: Duration = Duration::from_secs(60 * 60);
const EVICT_EVERY: Duration = Duration::from_secs(5 * 60);

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;

    // 1. Persistence
    let store = Arc::new(SqliteVaultRepo::new(&config.database_url).await?);
    let repo: Arc<dyn VaultRepo> = store.clone();
    let accounts: Arc<dyn AccountRepo> = store;

    // 2. Auth
    let auth: Arc<dyn AuthProvider> = Arc::new(SimpleAuthProvider::new(accounts, &config.session_key));

    let state = web::Data::new(AppState::new(repo, auth));

    let sweeper = state.clone();
    actix_web::rt::spawn(async move {
        let mut ticks = tokio::time::interval(EVICT_EVERY);
        loop {
            ticks.tick().await;
            sweeper.clients.evict_idle(CLIENT_IDLE);
        }
    });

    log::info!("Commander's Vault starting on http://{}", config.bind);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(security_headers())
            .wrap(cors_policy())
            .wrap(standard_middleware())
            .service(Files::new("/static", "./static"))
            .configure(cv_api::configure_routes)
    })
    .bind(&config.bind)?
    .run()
    .await?;

    Ok(())
}
