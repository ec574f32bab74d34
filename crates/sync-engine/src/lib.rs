// crates/sync-engine/src/lib.rs
//! Favorite and reading-status synchronization
//!
//! This crate keeps one authoritative client-side entry per book and the rules
//! for changing it:
//! - [`StatusStore`]: per-book entries with change subscriptions
//! - [`SyncEngine`]: optimistic mutations, backend calls, rollback on failure
//! - [`views`]: headless card, detail and list bindings
//!
//! # Example
//!
//! ```rust,no_run
//! use museu_network::{ApiClient, ClientConfig, MemorySessionStore};
//! use museu_sync_engine::{StatusStore, SyncConfig, SyncEngine};
//! use museu_core::BookId;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ClientConfig::default(), Arc::new(MemorySessionStore::new()))?;
//! let engine = SyncEngine::new(StatusStore::new(), Arc::new(client), SyncConfig::default());
//!
//! let book = BookId::from(42u64);
//! let _watch = engine.store().subscribe(&book, |entry| {
//!     println!("favorite: {}", entry.is_favorite);
//! })?;
//!
//! engine.toggle_favorite(&book).await?;
//! # Ok(())
//! # }
//! ```

mod api;
mod engine;
mod error;
mod store;
mod types;
pub mod views;

pub use api::FavoritesApi;
pub use engine::{ErrorReporter, SyncConfig, SyncEngine};
pub use error::{ErrorKind, SyncError, SyncResult};
pub use store::{StatusCallback, StatusStore, Subscription};
pub use types::MutationOutcome;
pub use views::{
    BookCard, BookDetail, ControlState, DropdownEvent, FavoriteIcon, FavoritesList, ListRow,
    ListSummary, StatusChoice, StatusDropdown, StatusOption,
};
