//! Domain types shared by the Museu Literário client crates

pub mod types;

// Re-export commonly used types
pub use types::{
    Author, AuthorId, Book, BookId, BookStatusEntry, EntryPatch, EntrySnapshot, Genre,
    OperationId, OperationKind, ParseStatusError, PendingOperation, RankedBook, ReadingStatus,
    User, Validator,
};
