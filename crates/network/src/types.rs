// crates/network/src/types.rs
//! Typed request bodies and normalized response records

use chrono::NaiveDate;
use museu_core::{Book, BookId, ReadingStatus};
use serde::Serialize;

/// Body of `PATCH /favoritos/status/{livroId}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    #[serde(rename = "statusLeitura")]
    pub status: ReadingStatus,
    #[serde(rename = "progresso")]
    pub progress: u8,
    #[serde(rename = "dataInicio", skip_serializing_if = "Option::is_none")]
    pub started_on: Option<NaiveDate>,
}

impl StatusUpdate {
    pub fn new(status: ReadingStatus, progress: u8) -> Self {
        Self {
            status,
            progress: progress.min(100),
            started_on: None,
        }
    }

    pub fn started_on(mut self, date: NaiveDate) -> Self {
        self.started_on = Some(date);
        self
    }
}

/// One row of the reader's favorites, whatever shape the backend sent it in
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteRecord {
    pub book_id: BookId,
    /// Present when the backend nests the book under `livro`
    pub book: Option<Book>,
    pub reading_status: Option<ReadingStatus>,
    pub progress: u8,
    pub started_on: Option<NaiveDate>,
}

impl FavoriteRecord {
    pub fn new(book_id: impl Into<BookId>) -> Self {
        Self {
            book_id: book_id.into(),
            book: None,
            reading_status: None,
            progress: 0,
            started_on: None,
        }
    }

    pub fn with_status(mut self, status: ReadingStatus, progress: u8) -> Self {
        self.reading_status = Some(status);
        self.progress = progress.min(100);
        self
    }

    /// Title for listings, falling back to the id
    pub fn title(&self) -> String {
        self.book
            .as_ref()
            .map(|b| b.display_title())
            .unwrap_or_else(|| format!("Book #{}", self.book_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_update_wire_shape() {
        let update = StatusUpdate::new(ReadingStatus::Reading, 40)
            .started_on(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "statusLeitura": "READING",
                "progresso": 40,
                "dataInicio": "2026-10-01"
            })
        );
    }

    #[test]
    fn test_status_update_omits_missing_date() {
        let json = serde_json::to_value(StatusUpdate::new(ReadingStatus::Finished, 250)).unwrap();
        assert_eq!(json["progresso"], 100);
        assert!(json.get("dataInicio").is_none());
    }

    #[test]
    fn test_record_title_fallback() {
        let record = FavoriteRecord::new(9u64);
        assert_eq!(record.title(), "Book #9");
    }
}
