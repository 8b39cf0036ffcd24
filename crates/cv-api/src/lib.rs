//! # cv-api
//!
//! The web routing and orchestration layer for Commander's Vault.

pub mod clients;
pub mod handlers;
pub mod middleware;

use actix_web::web;

/// Registers every page and form endpoint.
///
/// Routes are added flat, so the binary can still mount `/static` alongside.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health))
        // Session
        .route("/auth/sign-in", web::post().to(handlers::sign_in))
        .route("/auth/sign-up", web::post().to(handlers::sign_up))
        .route("/auth/sign-out", web::post().to(handlers::sign_out))
        .route("/tab/{tab}", web::post().to(handlers::switch_tab))
        // Collection
        .route("/collection/filter", web::post().to(handlers::filter_collection))
        .route("/collection/new", web::post().to(handlers::open_new_card))
        .route("/collection/cancel", web::post().to(handlers::cancel_new_card))
        .route("/collection/cards", web::post().to(handlers::create_card))
        // Deck builder
        .route("/decks", web::post().to(handlers::create_deck))
        .route("/decks/new", web::post().to(handlers::open_new_deck))
        .route("/decks/cancel", web::post().to(handlers::cancel_deck_dialog))
        .route("/decks/add-card", web::post().to(handlers::open_card_picker))
        .route("/decks/cards", web::post().to(handlers::add_deck_card))
        .route("/decks/{id}/select", web::post().to(handlers::select_deck))
        .route("/decks/{id}/delete", web::post().to(handlers::delete_deck))
        .route("/deck-cards/{id}/delete", web::post().to(handlers::remove_deck_card))
        // Assistant
        .route("/assistant", web::post().to(handlers::ask_assistant));
}
