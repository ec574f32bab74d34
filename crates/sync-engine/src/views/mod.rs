// crates/sync-engine/src/views/mod.rs
//! Headless view adapters
//!
//! Card, detail and list bindings subscribe to the [`StatusStore`], keep the
//! latest entry for their book(s), turn it into a [`ControlState`] render
//! model and forward reader intent to the [`SyncEngine`]. They hold no
//! business rules.

mod card;
mod detail;
mod dropdown;
mod list;

pub use card::BookCard;
pub use detail::BookDetail;
pub use dropdown::{DropdownEvent, StatusDropdown};
pub use list::{FavoritesList, ListRow, ListSummary};

use crate::engine::SyncEngine;
use crate::error::{SyncError, SyncResult};
use crate::store::{StatusStore, Subscription};
use crate::types::MutationOutcome;
use museu_core::{BookId, BookStatusEntry, ReadingStatus};
use std::sync::{Arc, Mutex};

/// Favorite control glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteIcon {
    Filled,
    Outline,
}

/// One entry of the status dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChoice {
    Status(ReadingStatus),
    Clear,
}

impl StatusChoice {
    /// Dropdown order
    pub const ALL: [StatusChoice; 4] = [
        StatusChoice::Status(ReadingStatus::WantToRead),
        StatusChoice::Status(ReadingStatus::Reading),
        StatusChoice::Status(ReadingStatus::Finished),
        StatusChoice::Clear,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StatusChoice::Status(status) => status.label(),
            StatusChoice::Clear => "Clear status",
        }
    }
}

/// Rendered dropdown option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOption {
    pub choice: StatusChoice,
    pub label: &'static str,
    pub selected: bool,
}

/// Everything needed to draw the favorite toggle and status dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub book_id: BookId,
    pub favorite_icon: FavoriteIcon,
    /// Accessible label of the favorite toggle
    pub favorite_label: String,
    /// Text of the dropdown button
    pub status_label: String,
    pub options: Vec<StatusOption>,
    pub selected: Option<ReadingStatus>,
    /// Shown while reading
    pub progress: Option<u8>,
    /// Controls ignore input while a mutation is in flight
    pub disabled: bool,
    /// Show a busy indicator
    pub busy: bool,
}

impl ControlState {
    /// Render model for `entry`; `title` names the book in accessible labels
    pub fn from_entry(entry: &BookStatusEntry, title: Option<&str>) -> Self {
        let name = title
            .map(str::to_string)
            .unwrap_or_else(|| format!("book {}", entry.book_id));

        let (favorite_icon, favorite_label) = if entry.is_favorite {
            (FavoriteIcon::Filled, format!("Remove {} from favorites", name))
        } else {
            (FavoriteIcon::Outline, format!("Add {} to favorites", name))
        };

        let status_label = match entry.reading_status {
            Some(ReadingStatus::Reading) => format!("Reading ({}%)", entry.progress),
            Some(status) => status.label().to_string(),
            None => "Set reading status".to_string(),
        };

        let options = StatusChoice::ALL
            .iter()
            .map(|choice| StatusOption {
                choice: *choice,
                label: choice.label(),
                selected: matches!(choice, StatusChoice::Status(s) if Some(*s) == entry.reading_status),
            })
            .collect();

        let busy = entry.is_pending();
        Self {
            book_id: entry.book_id.clone(),
            favorite_icon,
            favorite_label,
            status_label,
            options,
            selected: entry.reading_status,
            progress: entry
                .reading_status
                .filter(|s| s.tracks_progress())
                .map(|_| entry.progress),
            disabled: busy,
            busy,
        }
    }
}

/// Forwards a dropdown choice to the engine
pub(crate) async fn dispatch_choice(
    engine: &SyncEngine,
    book_id: &BookId,
    choice: StatusChoice,
) -> SyncResult<MutationOutcome> {
    match choice {
        StatusChoice::Status(status) => engine.set_reading_status(book_id, status).await,
        StatusChoice::Clear => engine.clear_reading_status(book_id).await,
    }
}

/// A live subscription to one book, releasing the entry when dropped
pub(crate) struct Binding {
    store: StatusStore,
    book_id: BookId,
    latest: Arc<Mutex<BookStatusEntry>>,
    subscription: Option<Subscription>,
}

impl Binding {
    pub(crate) fn new(store: &StatusStore, book_id: BookId) -> SyncResult<Self> {
        let latest = Arc::new(Mutex::new(BookStatusEntry::new(book_id.clone())));

        let sink = latest.clone();
        let subscription = store.subscribe(&book_id, move |entry| {
            if let Ok(mut latest) = sink.lock() {
                *latest = entry.clone();
            }
        })?;

        // Seeded after subscribing, under the same lock the callback takes,
        // so a write racing with creation is never lost
        {
            let mut seed = latest.lock().map_err(|_| SyncError::lock_poisoned())?;
            *seed = store.get(&book_id);
        }

        Ok(Self {
            store: store.clone(),
            book_id,
            latest,
            subscription: Some(subscription),
        })
    }

    pub(crate) fn book_id(&self) -> &BookId {
        &self.book_id
    }

    /// Last entry delivered by the store
    pub(crate) fn entry(&self) -> BookStatusEntry {
        self.latest
            .lock()
            .map(|entry| entry.clone())
            .unwrap_or_else(|_| self.store.get(&self.book_id))
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        if let Err(e) = self.store.release(&self.book_id) {
            log::warn!("Failed to release book {}: {}", self.book_id, e);
        }
    }
}
