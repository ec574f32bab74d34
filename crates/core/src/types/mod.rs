//! Domain types for the Museu Literário client
//!
//! This module contains all domain models organized by responsibility:
//! - `common`: the `Validator` trait
//! - `book`: catalog records (books, authors, genres, ranking rows)
//! - `status`: per-book favorite and reading-status state
//! - `user`: the signed-in reader

mod book;
mod common;
mod status;
mod user;

// Re-export all public types
pub use book::{Author, AuthorId, Book, BookId, Genre, RankedBook};
pub use common::Validator;
pub use status::{
    BookStatusEntry, EntryPatch, EntrySnapshot, OperationId, OperationKind, ParseStatusError,
    PendingOperation, ReadingStatus,
};
pub use user::User;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_types_are_exported() {
        let _book_id: BookId = BookId::from(42u64);
        let _author_id: AuthorId = AuthorId::from(7u64);
        let _entry: BookStatusEntry = BookStatusEntry::new(BookId::from("abc"));
        let _op: OperationId = OperationId::new();
        assert!(Book::new(1u64, "Iracema").is_valid());
    }

    #[test]
    fn test_status_ordering_follows_reading_flow() {
        assert!(ReadingStatus::WantToRead < ReadingStatus::Reading);
        assert!(ReadingStatus::Reading < ReadingStatus::Finished);
    }
}
