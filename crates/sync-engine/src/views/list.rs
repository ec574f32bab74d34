// crates/sync-engine/src/views/list.rs
//! Favorites page: many books with an optional status filter

use super::{dispatch_choice, Binding, ControlState, StatusChoice};
use crate::engine::SyncEngine;
use crate::error::{SyncError, SyncResult};
use crate::types::MutationOutcome;
use museu_core::{Book, BookId, BookStatusEntry, ReadingStatus};
use museu_network::FavoriteRecord;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One visible line of the favorites list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub book_id: BookId,
    pub title: String,
    pub controls: ControlState,
}

/// Counts over the books currently shown (ignoring the filter)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListSummary {
    pub total: usize,
    pub want_to_read: usize,
    pub reading: usize,
    pub finished: usize,
}

struct Tracked {
    binding: Binding,
    book: Option<Book>,
}

/// List binding over every book the reader has favorited or tagged
///
/// Books whose entry is neither favorite nor has a status are hidden, so a
/// removal disappears optimistically and comes back if it is rolled back.
pub struct FavoritesList {
    engine: Arc<SyncEngine>,
    books: BTreeMap<BookId, Tracked>,
    filter: Option<ReadingStatus>,
}

impl FavoritesList {
    /// Empty list; call [`FavoritesList::load`] to fill it
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        Self {
            engine,
            books: BTreeMap::new(),
            filter: None,
        }
    }

    /// List over records that were already fetched
    pub fn from_records(engine: Arc<SyncEngine>, records: &[FavoriteRecord]) -> SyncResult<Self> {
        engine.hydrate(records)?;
        let mut list = Self::new(engine);
        for record in records {
            list.track(record)?;
        }
        Ok(list)
    }

    /// Fetches the reader's favorites and starts tracking them
    ///
    /// Returns the number of records the backend listed.
    pub async fn load(&mut self) -> SyncResult<usize> {
        let records = self.engine.refresh_favorites().await?;
        for record in &records {
            self.track(record)?;
        }
        Ok(records.len())
    }

    fn track(&mut self, record: &FavoriteRecord) -> SyncResult<()> {
        if let Some(tracked) = self.books.get_mut(&record.book_id) {
            if record.book.is_some() {
                tracked.book = record.book.clone();
            }
            return Ok(());
        }

        let binding = Binding::new(self.engine.store(), record.book_id.clone())?;
        self.books.insert(
            record.book_id.clone(),
            Tracked {
                binding,
                book: record.book.clone(),
            },
        );
        Ok(())
    }

    pub fn filter(&self) -> Option<ReadingStatus> {
        self.filter
    }

    /// Shows only books with `status`; `None` shows everything
    pub fn set_filter(&mut self, status: Option<ReadingStatus>) {
        self.filter = status;
    }

    /// Number of tracked books, shown or not
    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Rows to render, ordered by book id
    pub fn rows(&self) -> Vec<ListRow> {
        self.visible()
            .filter(|(_, entry)| self.filter.is_none() || entry.reading_status == self.filter)
            .map(|(tracked, entry)| {
                let title = tracked.book.as_ref().map(|book| book.title.as_str());
                ListRow {
                    book_id: entry.book_id.clone(),
                    title: tracked
                        .book
                        .as_ref()
                        .map(Book::display_title)
                        .unwrap_or_else(|| format!("Book #{}", entry.book_id)),
                    controls: ControlState::from_entry(&entry, title),
                }
            })
            .collect()
    }

    pub fn summary(&self) -> ListSummary {
        let mut summary = ListSummary::default();
        for (_, entry) in self.visible() {
            summary.total += 1;
            match entry.reading_status {
                Some(ReadingStatus::WantToRead) => summary.want_to_read += 1,
                Some(ReadingStatus::Reading) => summary.reading += 1,
                Some(ReadingStatus::Finished) => summary.finished += 1,
                None => {}
            }
        }
        summary
    }

    pub async fn toggle(&self, book_id: &BookId) -> SyncResult<MutationOutcome> {
        self.ensure_tracked(book_id)?;
        self.engine.toggle_favorite(book_id).await
    }

    pub async fn choose(
        &self,
        book_id: &BookId,
        choice: StatusChoice,
    ) -> SyncResult<MutationOutcome> {
        self.ensure_tracked(book_id)?;
        dispatch_choice(&self.engine, book_id, choice).await
    }

    fn visible(&self) -> impl Iterator<Item = (&Tracked, BookStatusEntry)> {
        self.books
            .values()
            .map(|tracked| (tracked, tracked.binding.entry()))
            .filter(|(_, entry)| entry.is_favorite || entry.reading_status.is_some())
    }

    fn ensure_tracked(&self, book_id: &BookId) -> SyncResult<()> {
        if self.books.contains_key(book_id) {
            Ok(())
        } else {
            Err(SyncError::NotFound(format!("book {} is not in the list", book_id)))
        }
    }
}
