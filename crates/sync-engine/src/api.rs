// crates/sync-engine/src/api.rs
//! The network calls the engine needs, as a trait so tests can script them

use async_trait::async_trait;
use museu_core::{BookId, ReadingStatus};
use museu_network::{ApiClient, FavoriteRecord, NetworkResult, StatusUpdate};

/// Favorites endpoints used by [`crate::SyncEngine`]
#[async_trait]
pub trait FavoritesApi: Send + Sync {
    /// Adds the book to the reader's favorites with an initial status
    async fn add_favorite(&self, book_id: &BookId, status: ReadingStatus) -> NetworkResult<()>;

    /// Removes the book (and its reading status) from the favorites
    async fn remove_favorite(&self, book_id: &BookId) -> NetworkResult<()>;

    /// Changes status and progress of an already favorited book
    async fn update_reading_status(
        &self,
        book_id: &BookId,
        update: &StatusUpdate,
    ) -> NetworkResult<()>;

    /// Lists the reader's favorites
    async fn favorites(&self) -> NetworkResult<Vec<FavoriteRecord>>;
}

#[async_trait]
impl FavoritesApi for ApiClient {
    async fn add_favorite(&self, book_id: &BookId, status: ReadingStatus) -> NetworkResult<()> {
        ApiClient::add_favorite(self, book_id, status).await
    }

    async fn remove_favorite(&self, book_id: &BookId) -> NetworkResult<()> {
        ApiClient::remove_favorite(self, book_id).await
    }

    async fn update_reading_status(
        &self,
        book_id: &BookId,
        update: &StatusUpdate,
    ) -> NetworkResult<()> {
        ApiClient::update_reading_status(self, book_id, update).await
    }

    async fn favorites(&self) -> NetworkResult<Vec<FavoriteRecord>> {
        ApiClient::favorites(self).await
    }
}
