//! Catalog domain models: books, authors, genres and ranking rows

use crate::types::Validator;
use serde::{Deserialize, Serialize};

/// Unique identifier for a book
///
/// The backend hands out numeric ids, but older endpoints echo them back as
/// strings, so the id is kept in its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Creates a BookId from any string form
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    /// Returns the BookId as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the numeric value when the id is purely numeric
    pub fn as_number(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    /// Encodes the id the way the backend expects it in request bodies
    pub fn to_json_value(&self) -> serde_json::Value {
        match self.as_number() {
            Some(n) => serde_json::Value::from(n),
            None => serde_json::Value::from(self.0.clone()),
        }
    }
}

impl From<u64> for BookId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for BookId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an author ("escritor")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(String);

impl AuthorId {
    /// Creates an AuthorId from any string form
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    /// Returns the AuthorId as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for AuthorId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for AuthorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for AuthorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A book in the literary catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: Option<String>,
    pub author_id: Option<AuthorId>,
    pub genre: Option<String>,
    pub published_year: Option<i32>,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
    pub average_rating: Option<f32>, // 0-5
    pub page_count: Option<u32>,
}

impl Book {
    /// Creates a book with only the required fields
    pub fn new(id: impl Into<BookId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: None,
            author_id: None,
            genre: None,
            published_year: None,
            synopsis: None,
            cover_url: None,
            average_rating: None,
            page_count: None,
        }
    }

    /// Returns "Title, by Author" or just the title
    pub fn display_title(&self) -> String {
        match &self.author {
            Some(author) => format!("{}, by {}", self.title, author),
            None => self.title.clone(),
        }
    }
}

impl Validator for Book {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.id.as_str().is_empty() {
            errors.push("Book id cannot be empty".to_string());
        }

        if self.title.trim().is_empty() {
            errors.push("Title cannot be empty".to_string());
        }

        if let Some(rating) = self.average_rating {
            if !(0.0..=5.0).contains(&rating) {
                errors.push("Average rating must be between 0 and 5".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// An author page entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub nationality: Option<String>,
    pub biography: Option<String>,
    pub photo_url: Option<String>,
    pub follower_count: Option<u64>,
    /// Whether the signed-in user follows this author, when the backend says
    pub followed: Option<bool>,
    pub books: Vec<Book>,
}

impl Author {
    /// Creates an author with only the required fields
    pub fn new(id: impl Into<AuthorId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nationality: None,
            biography: None,
            photo_url: None,
            follower_count: None,
            followed: None,
            books: Vec::new(),
        }
    }
}

/// A literary genre as listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
    pub book_count: Option<u64>,
}

/// One row of the ranking page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedBook {
    /// 1-based position
    pub position: u32,
    pub book: Book,
    pub favorite_count: Option<u64>,
    pub score: Option<f64>,
}
