//! commanders-vault/crates/cv-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Commander's Vault:
//! models, ports, the deck-composition rule and the per-client views.

pub mod models;
pub mod traits;
pub mod error;
pub mod deck;
pub mod session;
pub mod collection;
pub mod deck_builder;
pub mod assistant;
pub mod shell;

// Re-exporting for easier access in other crates
pub use models::*;
pub use traits::*;
pub use error::*;
