// crates/sync-engine/src/store.rs
//! Per-book favorite and reading-status state shared by every view

use crate::error::{SyncError, SyncResult};
use museu_core::{BookId, BookStatusEntry, EntryPatch, OperationId, OperationKind, PendingOperation};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

/// Callback run with the updated entry after every write to a book
pub type StatusCallback = Arc<dyn Fn(&BookStatusEntry) + Send + Sync>;

#[derive(Default)]
struct Slot {
    entry: Option<BookStatusEntry>,
    subscribers: Vec<(u64, StatusCallback)>,
    /// Released while a mutation was in flight; evicted once it settles
    release_when_idle: bool,
}

#[derive(Default)]
struct StoreInner {
    slots: HashMap<BookId, Slot>,
    next_subscriber: u64,
}

/// Outcome of trying to start a mutation
pub(crate) enum Begin {
    /// Optimistic patch applied; the operation is now pending
    Started(PendingOperation),
    /// Another operation is already in flight for the book
    Busy,
    /// Nothing to do; the entry is returned as-is
    Unchanged(BookStatusEntry),
}

/// In-memory map from book id to `BookStatusEntry`
///
/// Clones share the same state. Subscribers of a book are called, in
/// subscription order and outside the internal lock, after each write to it.
#[derive(Clone, Default)]
pub struct StatusStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl StatusStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entry for `book_id`, or a default one if the book is unknown
    pub fn get(&self, book_id: &BookId) -> BookStatusEntry {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| {
                inner
                    .slots
                    .get(book_id)
                    .and_then(|slot| slot.entry.clone())
            })
            .unwrap_or_else(|| BookStatusEntry::new(book_id.clone()))
    }

    /// Merges `patch` into the entry and notifies its subscribers
    pub fn set(&self, book_id: &BookId, patch: EntryPatch) -> SyncResult<BookStatusEntry> {
        let (entry, callbacks) = {
            let mut inner = self.inner.lock().map_err(|_| SyncError::lock_poisoned())?;
            let slot = inner.slots.entry(book_id.clone()).or_default();
            let entry = write_entry(slot, book_id, patch);
            (entry, callbacks_of(slot))
        };

        notify(&callbacks, &entry);
        Ok(entry)
    }

    /// Applies `patch` unless a mutation is in flight for the book
    pub fn set_if_idle(
        &self,
        book_id: &BookId,
        patch: EntryPatch,
    ) -> SyncResult<Option<BookStatusEntry>> {
        let (entry, callbacks) = {
            let mut inner = self.inner.lock().map_err(|_| SyncError::lock_poisoned())?;
            let slot = inner.slots.entry(book_id.clone()).or_default();
            if slot.entry.as_ref().is_some_and(BookStatusEntry::is_pending) {
                return Ok(None);
            }
            let entry = write_entry(slot, book_id, patch);
            (entry, callbacks_of(slot))
        };

        notify(&callbacks, &entry);
        Ok(Some(entry))
    }

    /// Starts a mutation: checks the book is idle, builds the optimistic
    /// patch from the current entry and marks the entry pending, all under
    /// one lock
    pub(crate) fn begin<F>(
        &self,
        book_id: &BookId,
        kind: OperationKind,
        optimistic: F,
    ) -> SyncResult<Begin>
    where
        F: FnOnce(&BookStatusEntry) -> SyncResult<Option<EntryPatch>>,
    {
        let (operation, entry, callbacks) = {
            let mut inner = self.inner.lock().map_err(|_| SyncError::lock_poisoned())?;
            let slot = inner.slots.entry(book_id.clone()).or_default();
            let current = slot
                .entry
                .clone()
                .unwrap_or_else(|| BookStatusEntry::new(book_id.clone()));

            if current.is_pending() {
                return Ok(Begin::Busy);
            }

            let Some(patch) = optimistic(&current)? else {
                return Ok(Begin::Unchanged(current));
            };

            let operation = PendingOperation::new(kind, current.snapshot());
            let entry = write_entry(slot, book_id, patch.pending(operation.clone()));
            (operation, entry, callbacks_of(slot))
        };

        log::debug!(
            "Book {}: {} {} started",
            book_id,
            operation.kind,
            operation.id
        );
        notify(&callbacks, &entry);
        Ok(Begin::Started(operation))
    }

    /// Finishes a mutation, but only if `operation` is still the one pending
    pub(crate) fn settle(
        &self,
        book_id: &BookId,
        operation: OperationId,
        patch: EntryPatch,
    ) -> SyncResult<Option<BookStatusEntry>> {
        let (entry, callbacks) = {
            let mut inner = self.inner.lock().map_err(|_| SyncError::lock_poisoned())?;
            let Some(slot) = inner.slots.get_mut(book_id) else {
                return Ok(None);
            };

            let current_op = slot
                .entry
                .as_ref()
                .and_then(|e| e.pending_operation.as_ref())
                .map(|op| op.id);
            if current_op != Some(operation) {
                log::debug!("Book {}: operation {} is stale", book_id, operation);
                return Ok(None);
            }

            let entry = write_entry(slot, book_id, patch.settled());
            let callbacks = callbacks_of(slot);
            if slot.release_when_idle && slot.subscribers.is_empty() {
                inner.slots.remove(book_id);
                log::debug!("Book {}: released after settling", book_id);
            }
            (entry, callbacks)
        };

        notify(&callbacks, &entry);
        Ok(Some(entry))
    }

    /// Registers `callback` for writes to `book_id`
    pub fn subscribe<F>(&self, book_id: &BookId, callback: F) -> SyncResult<Subscription>
    where
        F: Fn(&BookStatusEntry) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().map_err(|_| SyncError::lock_poisoned())?;
        inner.next_subscriber += 1;
        let id = inner.next_subscriber;

        let slot = inner.slots.entry(book_id.clone()).or_default();
        slot.release_when_idle = false;
        slot.subscribers.push((id, Arc::new(callback)));

        Ok(Subscription {
            store: Arc::downgrade(&self.inner),
            book_id: book_id.clone(),
            id,
            active: true,
        })
    }

    /// Number of live subscriptions for `book_id`
    pub fn subscriber_count(&self, book_id: &BookId) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.slots.get(book_id).map_or(0, |s| s.subscribers.len()))
            .unwrap_or(0)
    }

    /// Forgets the book if nobody observes it and nothing is in flight
    ///
    /// An unobserved book with a mutation in flight is evicted when that
    /// mutation settles instead. Returns true if the entry was evicted now.
    pub fn release(&self, book_id: &BookId) -> SyncResult<bool> {
        let mut inner = self.inner.lock().map_err(|_| SyncError::lock_poisoned())?;

        let Some(slot) = inner.slots.get_mut(book_id) else {
            return Ok(false);
        };
        if !slot.subscribers.is_empty() {
            return Ok(false);
        }
        if slot.entry.as_ref().is_some_and(BookStatusEntry::is_pending) {
            slot.release_when_idle = true;
            return Ok(false);
        }

        inner.slots.remove(book_id);
        log::debug!("Book {}: released", book_id);
        Ok(true)
    }

    /// Books that currently have an entry, sorted
    pub fn book_ids(&self) -> Vec<BookId> {
        let mut ids: Vec<BookId> = self
            .inner
            .lock()
            .map(|inner| {
                inner
                    .slots
                    .iter()
                    .filter(|(_, slot)| slot.entry.is_some())
                    .map(|(id, _)| id.clone())
                    .collect()
            })
            .unwrap_or_default();
        ids.sort();
        ids
    }
}

fn write_entry(slot: &mut Slot, book_id: &BookId, patch: EntryPatch) -> BookStatusEntry {
    let entry = slot
        .entry
        .get_or_insert_with(|| BookStatusEntry::new(book_id.clone()));
    entry.apply(patch);
    entry.clone()
}

fn callbacks_of(slot: &Slot) -> Vec<StatusCallback> {
    slot.subscribers.iter().map(|(_, cb)| cb.clone()).collect()
}

fn notify(callbacks: &[StatusCallback], entry: &BookStatusEntry) {
    for callback in callbacks {
        callback(entry);
    }
}

/// Handle for one subscription; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    store: Weak<Mutex<StoreInner>>,
    book_id: BookId,
    id: u64,
    active: bool,
}

impl Subscription {
    pub fn book_id(&self) -> &BookId {
        &self.book_id
    }

    /// Detaches the callback
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        let Some(store) = self.store.upgrade() else {
            return;
        };
        if let Ok(mut inner) = store.lock() {
            if let Some(slot) = inner.slots.get_mut(&self.book_id) {
                slot.subscribers.retain(|(id, _)| *id != self.id);
            }
        };
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("book_id", &self.book_id)
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use museu_core::{EntrySnapshot, ReadingStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn id(n: u64) -> BookId {
        BookId::from(n)
    }

    #[test]
    fn test_get_returns_default_without_inserting() {
        let store = StatusStore::new();
        let entry = store.get(&id(1));

        assert_eq!(entry, BookStatusEntry::new(id(1)));
        assert!(store.book_ids().is_empty());
    }

    #[test]
    fn test_set_merges_fields() {
        let store = StatusStore::new();
        store
            .set(&id(1), EntryPatch::new().status(Some(ReadingStatus::Reading)).progress(40))
            .unwrap();
        let entry = store.set(&id(1), EntryPatch::new().favorite(true)).unwrap();

        assert!(entry.is_favorite);
        assert_eq!(entry.reading_status, Some(ReadingStatus::Reading));
        assert_eq!(entry.progress, 40);
        assert_eq!(store.get(&id(1)), entry);
    }

    #[test]
    fn test_clearing_status_zeroes_progress() {
        let store = StatusStore::new();
        store
            .set(&id(1), EntryPatch::new().status(Some(ReadingStatus::Reading)).progress(70))
            .unwrap();
        let entry = store.set(&id(1), EntryPatch::new().status(None)).unwrap();
        assert_eq!(entry.progress, 0);
    }

    #[test]
    fn test_subscribers_notified_in_order_with_new_entry() {
        let store = StatusStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = seen.clone();
        let _a = store
            .subscribe(&id(7), move |e| first.lock().unwrap().push(("a", e.is_favorite)))
            .unwrap();
        let second = seen.clone();
        let _b = store
            .subscribe(&id(7), move |e| second.lock().unwrap().push(("b", e.is_favorite)))
            .unwrap();

        store.set(&id(7), EntryPatch::new().favorite(true)).unwrap();
        store.set(&id(8), EntryPatch::new().favorite(true)).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![("a", true), ("b", true)]);
    }

    #[test]
    fn test_unsubscribe_and_drop_detach() {
        let store = StatusStore::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let explicit = store
            .subscribe(&id(1), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        let counter = calls.clone();
        let dropped = store
            .subscribe(&id(1), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(store.subscriber_count(&id(1)), 2);

        explicit.unsubscribe();
        drop(dropped);
        assert_eq!(store.subscriber_count(&id(1)), 0);

        store.set(&id(1), EntryPatch::new().favorite(true)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_callback_may_read_the_store() {
        let store = StatusStore::new();
        let observed = Arc::new(Mutex::new(None));

        let reader = store.clone();
        let slot = observed.clone();
        let _sub = store
            .subscribe(&id(3), move |e| {
                *slot.lock().unwrap() = Some(reader.get(&e.book_id).is_favorite);
            })
            .unwrap();

        store.set(&id(3), EntryPatch::new().favorite(true)).unwrap();
        assert_eq!(*observed.lock().unwrap(), Some(true));
    }

    #[test]
    fn test_begin_rejects_while_pending() {
        let store = StatusStore::new();

        let started = store
            .begin(&id(5), OperationKind::FavoriteToggle, |e| {
                Ok(Some(EntryPatch::new().favorite(!e.is_favorite)))
            })
            .unwrap();
        let Begin::Started(op) = started else {
            panic!("first begin should start");
        };
        assert_eq!(op.previous, EntrySnapshot::default());
        assert!(store.get(&id(5)).is_pending());

        let second = store
            .begin(&id(5), OperationKind::StatusChange, |_| {
                panic!("optimistic patch must not be built while pending")
            })
            .unwrap();
        assert!(matches!(second, Begin::Busy));
        assert_eq!(store.get(&id(5)).pending_operation, Some(op));
    }

    #[test]
    fn test_begin_unchanged_and_validation_leave_store_alone() {
        let store = StatusStore::new();

        let outcome = store
            .begin(&id(2), OperationKind::ClearStatus, |_| Ok(None))
            .unwrap();
        assert!(matches!(outcome, Begin::Unchanged(_)));

        let err = store.begin(&id(2), OperationKind::ProgressUpdate, |_| {
            Err(SyncError::Validation("not reading".into()))
        });
        assert!(err.is_err());
        assert!(!store.get(&id(2)).is_pending());
    }

    #[test]
    fn test_settle_ignores_stale_operation() {
        let store = StatusStore::new();
        let Begin::Started(op) = store
            .begin(&id(9), OperationKind::FavoriteToggle, |_| {
                Ok(Some(EntryPatch::new().favorite(true)))
            })
            .unwrap()
        else {
            panic!("should start");
        };

        let stale = store
            .settle(&id(9), OperationId::new(), EntryPatch::new())
            .unwrap();
        assert!(stale.is_none());
        assert!(store.get(&id(9)).is_pending());

        let settled = store.settle(&id(9), op.id, EntryPatch::new()).unwrap().unwrap();
        assert!(!settled.is_pending());
        assert!(settled.is_favorite);
    }

    #[test]
    fn test_set_if_idle_skips_pending() {
        let store = StatusStore::new();
        store
            .begin(&id(4), OperationKind::FavoriteToggle, |_| {
                Ok(Some(EntryPatch::new().favorite(true)))
            })
            .unwrap();

        let skipped = store
            .set_if_idle(&id(4), EntryPatch::new().favorite(false))
            .unwrap();
        assert!(skipped.is_none());
        assert!(store.get(&id(4)).is_favorite);
    }

    #[test]
    fn test_release_only_when_unobserved_and_idle() {
        let store = StatusStore::new();
        store.set(&id(1), EntryPatch::new().favorite(true)).unwrap();

        let sub = store.subscribe(&id(1), |_| {}).unwrap();
        assert!(!store.release(&id(1)).unwrap());

        drop(sub);
        assert!(store.release(&id(1)).unwrap());
        assert_eq!(store.get(&id(1)), BookStatusEntry::new(id(1)));
        assert!(store.book_ids().is_empty());
    }

    #[test]
    fn test_release_while_pending_evicts_after_settle() {
        let store = StatusStore::new();
        let sub = store.subscribe(&id(6), |_| {}).unwrap();
        let Begin::Started(op) = store
            .begin(&id(6), OperationKind::FavoriteToggle, |_| {
                Ok(Some(EntryPatch::new().favorite(true)))
            })
            .unwrap()
        else {
            panic!("should start");
        };

        drop(sub);
        assert!(!store.release(&id(6)).unwrap());
        assert_eq!(store.book_ids(), vec![id(6)]);

        let settled = store.settle(&id(6), op.id, EntryPatch::new()).unwrap().unwrap();
        assert!(settled.is_favorite);
        assert!(store.book_ids().is_empty());
    }

    #[test]
    fn test_resubscribing_cancels_deferred_release() {
        let store = StatusStore::new();
        let Begin::Started(op) = store
            .begin(&id(8), OperationKind::FavoriteToggle, |_| {
                Ok(Some(EntryPatch::new().favorite(true)))
            })
            .unwrap()
        else {
            panic!("should start");
        };
        assert!(!store.release(&id(8)).unwrap());

        let _sub = store.subscribe(&id(8), |_| {}).unwrap();
        store.settle(&id(8), op.id, EntryPatch::new()).unwrap();
        assert!(store.get(&id(8)).is_favorite);
        assert_eq!(store.book_ids(), vec![id(8)]);
    }

    #[test]
    fn test_subscription_outlives_store() {
        let store = StatusStore::new();
        let sub = store.subscribe(&id(1), |_| {}).unwrap();
        drop(store);
        sub.unsubscribe();
    }
}
