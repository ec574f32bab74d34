// crates/sync-engine/src/engine.rs
//! Optimistic favorite and reading-status mutations
//!
//! Every user action follows the same path: under the store lock the book is
//! checked idle, a snapshot is taken and the optimistic value written together
//! with a `PendingOperation`; then the backend is called with a timeout; then
//! the entry is either confirmed or restored from the snapshot. A second
//! action on a pending book is rejected without touching the store or the
//! network.

use crate::api::FavoritesApi;
use crate::error::{ErrorKind, SyncError, SyncResult};
use crate::store::{Begin, StatusStore};
use crate::types::MutationOutcome;
use chrono::Utc;
use museu_core::{
    BookId, BookStatusEntry, EntryPatch, OperationKind, PendingOperation, ReadingStatus,
};
use museu_network::{ClientConfig, FavoriteRecord, NetworkResult, StatusUpdate};
use museu_resilience::with_timeout;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Callback receiving each failure once, after the store has been rolled back
///
/// The book is `None` for failures not tied to one book (loading the list).
pub type ErrorReporter = Arc<dyn Fn(Option<&BookId>, &SyncError) + Send + Sync>;

/// Configuration for the sync engine
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Unanswered mutations are rolled back after this long
    pub mutation_timeout: Duration,
    /// Bound on loading the favorites list, retries included
    pub read_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            mutation_timeout: Duration::from_secs(10),
            read_timeout: ClientConfig::default().read_budget(),
        }
    }
}

/// The only writer of user intent into the [`StatusStore`]
pub struct SyncEngine {
    store: StatusStore,
    api: Arc<dyn FavoritesApi>,
    config: SyncConfig,
    reporter: Option<ErrorReporter>,
}

impl SyncEngine {
    /// Creates a new sync engine over `store`
    pub fn new(store: StatusStore, api: Arc<dyn FavoritesApi>, config: SyncConfig) -> Self {
        Self {
            store,
            api,
            config,
            reporter: None,
        }
    }

    /// Registers where failures are surfaced to the reader
    pub fn with_reporter(mut self, reporter: ErrorReporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Flips the favorite flag
    ///
    /// Turning it on adds the book with its current status (want-to-read if
    /// none); turning it off removes it.
    pub async fn toggle_favorite(&self, book_id: &BookId) -> SyncResult<MutationOutcome> {
        let begun = self.begin(book_id, OperationKind::FavoriteToggle, |entry| {
            Ok(Some(EntryPatch::new().favorite(!entry.is_favorite)))
        })?;
        let operation = match begun {
            Begin::Started(operation) => operation,
            Begin::Busy => return Ok(MutationOutcome::Rejected),
            Begin::Unchanged(entry) => return Ok(MutationOutcome::Confirmed(entry)),
        };

        let previous = operation.previous;
        let result = if previous.is_favorite {
            self.call(self.api.remove_favorite(book_id)).await
        } else {
            let status = previous.reading_status.unwrap_or(ReadingStatus::WantToRead);
            self.call(self.api.add_favorite(book_id, status)).await
        };

        self.finish(book_id, &operation, result, EntryPatch::new())
    }

    /// Sets the reading status
    ///
    /// Progress is kept when the new status is `Reading` and reset otherwise.
    /// A book that is not yet a favorite is added with the new status. On
    /// success the book is always a favorite.
    pub async fn set_reading_status(
        &self,
        book_id: &BookId,
        status: ReadingStatus,
    ) -> SyncResult<MutationOutcome> {
        let begun = self.begin(book_id, OperationKind::StatusChange, |entry| {
            let progress = if status.tracks_progress() {
                entry.progress
            } else {
                0
            };
            Ok(Some(EntryPatch::new().status(Some(status)).progress(progress)))
        })?;
        let operation = match begun {
            Begin::Started(operation) => operation,
            Begin::Busy => return Ok(MutationOutcome::Rejected),
            Begin::Unchanged(entry) => return Ok(MutationOutcome::Confirmed(entry)),
        };

        let previous = operation.previous;
        let result = if previous.is_favorite {
            let progress = if status.tracks_progress() {
                previous.progress
            } else {
                0
            };
            let mut update = StatusUpdate::new(status, progress);
            if status.tracks_progress() && previous.reading_status != Some(status) {
                update = update.started_on(Utc::now().date_naive());
            }
            self.call(self.api.update_reading_status(book_id, &update))
                .await
        } else {
            self.call(self.api.add_favorite(book_id, status)).await
        };

        self.finish(
            book_id,
            &operation,
            result,
            EntryPatch::new().favorite(true),
        )
    }

    /// Removes the reading status together with the favorite
    ///
    /// Succeeds without a request when there is nothing to clear. A book that
    /// is no longer a favorite has no row on the server, so its leftover
    /// status is cleared locally; a 404 from the server means the same.
    pub async fn clear_reading_status(&self, book_id: &BookId) -> SyncResult<MutationOutcome> {
        let begun = self.begin(book_id, OperationKind::ClearStatus, |entry| {
            if !entry.is_favorite && entry.reading_status.is_none() {
                return Ok(None);
            }
            Ok(Some(EntryPatch::new().favorite(false).status(None).progress(0)))
        })?;
        let operation = match begun {
            Begin::Started(operation) => operation,
            Begin::Busy => return Ok(MutationOutcome::Rejected),
            Begin::Unchanged(entry) => return Ok(MutationOutcome::Confirmed(entry)),
        };

        let result = if operation.previous.is_favorite {
            match self.call(self.api.remove_favorite(book_id)).await {
                Err(error) if error.kind() == ErrorKind::NotFound => {
                    log::debug!("Book {}: already gone from favorites", book_id);
                    Ok(())
                }
                other => other,
            }
        } else {
            Ok(())
        };
        self.finish(book_id, &operation, result, EntryPatch::new())
    }

    /// Records reading progress for a book being read
    pub async fn update_progress(
        &self,
        book_id: &BookId,
        percent: u8,
    ) -> SyncResult<MutationOutcome> {
        let begun = self.begin(book_id, OperationKind::ProgressUpdate, |entry| {
            if percent > 100 {
                return Err(SyncError::Validation(format!(
                    "Progress must be between 0 and 100, got {}",
                    percent
                )));
            }
            if entry.reading_status != Some(ReadingStatus::Reading) {
                return Err(SyncError::Validation(
                    "Progress can only be recorded while reading".to_string(),
                ));
            }
            if entry.progress == percent {
                return Ok(None);
            }
            Ok(Some(EntryPatch::new().progress(percent)))
        });
        let operation = match begun {
            Ok(Begin::Started(operation)) => operation,
            Ok(Begin::Busy) => return Ok(MutationOutcome::Rejected),
            Ok(Begin::Unchanged(entry)) => return Ok(MutationOutcome::Confirmed(entry)),
            Err(error) => {
                self.report(book_id, &error);
                return Err(error);
            }
        };

        let update = StatusUpdate::new(ReadingStatus::Reading, percent);
        let result = self
            .call(self.api.update_reading_status(book_id, &update))
            .await;
        self.finish(book_id, &operation, result, EntryPatch::new())
    }

    /// Writes server state for each listed book that is not mid-mutation
    ///
    /// Returns how many entries were updated.
    pub fn hydrate(&self, records: &[FavoriteRecord]) -> SyncResult<usize> {
        let mut applied = 0;
        for record in records {
            let patch = EntryPatch::new()
                .favorite(true)
                .status(record.reading_status)
                .progress(record.progress);

            if self.store.set_if_idle(&record.book_id, patch)?.is_some() {
                applied += 1;
            } else {
                log::debug!("Book {}: pending, server state skipped", record.book_id);
            }
        }

        log::debug!("Hydrated {} of {} favorites", applied, records.len());
        Ok(applied)
    }

    /// Loads the reader's favorites and hydrates the store with them
    pub async fn refresh_favorites(&self) -> SyncResult<Vec<FavoriteRecord>> {
        let error = match with_timeout(self.config.read_timeout, self.api.favorites()).await {
            Ok(Ok(records)) => {
                self.hydrate(&records)?;
                log::info!("Loaded {} favorites", records.len());
                return Ok(records);
            }
            Ok(Err(e)) => SyncError::from(e),
            Err(timeout) => SyncError::Timeout(timeout.elapsed_limit()),
        };

        log::warn!("Failed to load favorites: {}", error);
        if let Some(reporter) = &self.reporter {
            reporter(None, &error);
        }
        Err(error)
    }

    fn begin<F>(&self, book_id: &BookId, kind: OperationKind, optimistic: F) -> SyncResult<Begin>
    where
        F: FnOnce(&BookStatusEntry) -> SyncResult<Option<EntryPatch>>,
    {
        let begun = self.store.begin(book_id, kind, optimistic)?;
        if let Begin::Busy = begun {
            log::debug!("Book {}: {} rejected, operation in flight", book_id, kind);
        }
        Ok(begun)
    }

    async fn call<F>(&self, request: F) -> SyncResult<()>
    where
        F: Future<Output = NetworkResult<()>>,
    {
        match with_timeout(self.config.mutation_timeout, request).await {
            Ok(result) => result.map_err(SyncError::from),
            Err(timeout) => Err(SyncError::Timeout(timeout.elapsed_limit())),
        }
    }

    /// Confirms or rolls back `operation`
    fn finish(
        &self,
        book_id: &BookId,
        operation: &PendingOperation,
        result: SyncResult<()>,
        confirm: EntryPatch,
    ) -> SyncResult<MutationOutcome> {
        match result {
            Ok(()) => {
                let settled = self.store.settle(book_id, operation.id, confirm)?;
                log::info!("Book {}: {} confirmed", book_id, operation.kind);
                Ok(MutationOutcome::Confirmed(
                    settled.unwrap_or_else(|| self.store.get(book_id)),
                ))
            }
            Err(error) => {
                self.store.settle(
                    book_id,
                    operation.id,
                    EntryPatch::restore(operation.previous),
                )?;
                log::warn!(
                    "Book {}: {} rolled back: {}",
                    book_id,
                    operation.kind,
                    error
                );
                self.report(book_id, &error);
                Err(error)
            }
        }
    }

    fn report(&self, book_id: &BookId, error: &SyncError) {
        if let Some(reporter) = &self.reporter {
            reporter(Some(book_id), error);
        }
    }
}
