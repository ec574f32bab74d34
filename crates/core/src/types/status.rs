//! Per-book favorite and reading-status state
//!
//! A `BookStatusEntry` is the client's view of one row of the user's
//! "favoritos" collection: whether the book is favorited, how far along the
//! reader is, and whether a mutation is currently in flight for it.

use crate::types::BookId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Stage of engagement with a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReadingStatus {
    #[serde(rename = "WANT_TO_READ", alias = "QUERO_LER")]
    WantToRead,
    #[serde(rename = "READING", alias = "LENDO")]
    Reading,
    #[serde(rename = "FINISHED", alias = "LIDO")]
    Finished,
}

impl ReadingStatus {
    /// All statuses in dropdown order
    pub const ALL: [ReadingStatus; 3] = [Self::WantToRead, Self::Reading, Self::Finished];

    /// Wire name used by the backend
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Self::WantToRead => "WANT_TO_READ",
            Self::Reading => "READING",
            Self::Finished => "FINISHED",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::WantToRead => "Want to read",
            Self::Reading => "Reading",
            Self::Finished => "Finished",
        }
    }

    /// Progress only carries meaning while reading
    pub fn tracks_progress(&self) -> bool {
        matches!(self, Self::Reading)
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire_str())
    }
}

/// Error returned when a reading status cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown reading status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for ReadingStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "WANT_TO_READ" | "WANT" | "QUERO_LER" => Ok(Self::WantToRead),
            "READING" | "LENDO" => Ok(Self::Reading),
            "FINISHED" | "READ" | "DONE" | "LIDO" => Ok(Self::Finished),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Identifier of one in-flight mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Creates a new random operation id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // short form is enough to correlate log lines
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

/// Kind of mutation in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    FavoriteToggle,
    StatusChange,
    ProgressUpdate,
    ClearStatus,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FavoriteToggle => write!(f, "favorite-toggle"),
            Self::StatusChange => write!(f, "status-change"),
            Self::ProgressUpdate => write!(f, "progress-update"),
            Self::ClearStatus => write!(f, "clear-status"),
        }
    }
}

/// The user-visible fields of an entry, captured for rollback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub is_favorite: bool,
    pub reading_status: Option<ReadingStatus>,
    pub progress: u8,
}

/// Descriptor of the mutation currently in flight for a book
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOperation {
    pub id: OperationId,
    pub kind: OperationKind,
    /// State to restore if the server rejects the mutation
    pub previous: EntrySnapshot,
    pub started_at: DateTime<Utc>,
}

impl PendingOperation {
    /// Creates a pending operation that rolls back to `previous`
    pub fn new(kind: OperationKind, previous: EntrySnapshot) -> Self {
        Self {
            id: OperationId::new(),
            kind,
            previous,
            started_at: Utc::now(),
        }
    }
}

/// Client-side status of one book
#[derive(Debug, Clone, PartialEq)]
pub struct BookStatusEntry {
    pub book_id: BookId,
    pub is_favorite: bool,
    pub reading_status: Option<ReadingStatus>,
    /// Percentage 0-100, meaningful while reading
    pub progress: u8,
    pub pending_operation: Option<PendingOperation>,
}

impl BookStatusEntry {
    /// Default entry: not favorite, no status, idle
    pub fn new(book_id: BookId) -> Self {
        Self {
            book_id,
            is_favorite: false,
            reading_status: None,
            progress: 0,
            pending_operation: None,
        }
    }

    /// Returns true while a mutation is in flight
    pub fn is_pending(&self) -> bool {
        self.pending_operation.is_some()
    }

    /// Captures the user-visible fields
    pub fn snapshot(&self) -> EntrySnapshot {
        EntrySnapshot {
            is_favorite: self.is_favorite,
            reading_status: self.reading_status,
            progress: self.progress,
        }
    }

    /// Merges the fields present in `patch`, keeping the entry consistent
    pub fn apply(&mut self, patch: EntryPatch) {
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
        if let Some(status) = patch.reading_status {
            self.reading_status = status;
        }
        if let Some(progress) = patch.progress {
            self.progress = progress.min(100);
        }
        if let Some(pending) = patch.pending_operation {
            self.pending_operation = pending;
        }

        if self.reading_status.is_none() {
            self.progress = 0;
        }
    }
}

/// Partial update for a `BookStatusEntry`; absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    pub is_favorite: Option<bool>,
    pub reading_status: Option<Option<ReadingStatus>>,
    pub progress: Option<u8>,
    pub pending_operation: Option<Option<PendingOperation>>,
}

impl EntryPatch {
    /// Creates an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch restoring every user-visible field from a snapshot
    pub fn restore(snapshot: EntrySnapshot) -> Self {
        Self {
            is_favorite: Some(snapshot.is_favorite),
            reading_status: Some(snapshot.reading_status),
            progress: Some(snapshot.progress),
            pending_operation: None,
        }
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = Some(is_favorite);
        self
    }

    pub fn status(mut self, status: Option<ReadingStatus>) -> Self {
        self.reading_status = Some(status);
        self
    }

    pub fn progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Marks the entry as busy with `operation`
    pub fn pending(mut self, operation: PendingOperation) -> Self {
        self.pending_operation = Some(Some(operation));
        self
    }

    /// Clears the in-flight marker
    pub fn settled(mut self) -> Self {
        self.pending_operation = Some(None);
        self
    }

    /// Returns true if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.is_favorite.is_none()
            && self.reading_status.is_none()
            && self.progress.is_none()
            && self.pending_operation.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_entry() {
        let entry = BookStatusEntry::new(BookId::from(42u64));
        assert!(!entry.is_favorite);
        assert_eq!(entry.reading_status, None);
        assert_eq!(entry.progress, 0);
        assert!(!entry.is_pending());
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&ReadingStatus::WantToRead).unwrap();
        assert_eq!(json, "\"WANT_TO_READ\"");

        let parsed: ReadingStatus = serde_json::from_str("\"LENDO\"").unwrap();
        assert_eq!(parsed, ReadingStatus::Reading);

        let parsed: ReadingStatus = serde_json::from_str("\"FINISHED\"").unwrap();
        assert_eq!(parsed, ReadingStatus::Finished);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("want-to-read".parse::<ReadingStatus>(), Ok(ReadingStatus::WantToRead));
        assert_eq!("reading".parse::<ReadingStatus>(), Ok(ReadingStatus::Reading));
        assert_eq!(" Finished ".parse::<ReadingStatus>(), Ok(ReadingStatus::Finished));
        assert!("paused".parse::<ReadingStatus>().is_err());
    }

    #[test]
    fn test_apply_merges_only_present_fields() {
        let mut entry = BookStatusEntry::new(BookId::from(1u64));
        entry.apply(EntryPatch::new().status(Some(ReadingStatus::Reading)).progress(40));
        entry.apply(EntryPatch::new().favorite(true));

        assert!(entry.is_favorite);
        assert_eq!(entry.reading_status, Some(ReadingStatus::Reading));
        assert_eq!(entry.progress, 40);
    }

    #[test]
    fn test_clearing_status_zeroes_progress() {
        let mut entry = BookStatusEntry::new(BookId::from(1u64));
        entry.apply(EntryPatch::new().status(Some(ReadingStatus::Reading)).progress(70));
        entry.apply(EntryPatch::new().status(None));

        assert_eq!(entry.progress, 0);
        assert_eq!(entry.reading_status, None);
    }

    #[test]
    fn test_progress_without_status_is_dropped() {
        let mut entry = BookStatusEntry::new(BookId::from(1u64));
        entry.apply(EntryPatch::new().progress(50));
        assert_eq!(entry.progress, 0);
    }

    #[test]
    fn test_progress_is_capped() {
        let mut entry = BookStatusEntry::new(BookId::from(1u64));
        entry.apply(EntryPatch::new().status(Some(ReadingStatus::Reading)).progress(250));
        assert_eq!(entry.progress, 100);
    }

    #[test]
    fn test_snapshot_and_restore() {
        let mut entry = BookStatusEntry::new(BookId::from(9u64));
        let before = entry.snapshot();

        let op = PendingOperation::new(OperationKind::StatusChange, before);
        entry.apply(
            EntryPatch::new()
                .favorite(true)
                .status(Some(ReadingStatus::Finished))
                .pending(op),
        );
        assert!(entry.is_pending());

        entry.apply(EntryPatch::restore(before).settled());
        assert_eq!(entry.snapshot(), before);
        assert!(!entry.is_pending());
    }

    #[test]
    fn test_empty_patch() {
        assert!(EntryPatch::new().is_empty());
        assert!(!EntryPatch::new().favorite(false).is_empty());
    }

    #[test]
    fn test_operation_id_display_is_short() {
        assert_eq!(OperationId::new().to_string().len(), 8);
    }
}
