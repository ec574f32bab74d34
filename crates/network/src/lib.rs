// crates/network/src/lib.rs
//! REST client for the Museu Literário backend
//!
//! Wraps the catalog, auth, favorites and follow endpoints behind typed
//! methods on [`ApiClient`], normalizes the backend's assorted response shapes
//! into `museu_core` types, and owns the signed-in session: a `401` naming an
//! invalid or expired token clears the [`SessionStore`] and notifies the
//! registered [`SessionListener`].

mod api;
mod client;
mod error;
mod session;
mod types;
mod wire;

pub use client::{ApiClient, ClientConfig};
pub use error::{NetworkError, NetworkResult};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionListener, SessionStore};
pub use types::{FavoriteRecord, StatusUpdate};
