//! Book data types.

use crate::{RepositoryError, RepositoryResult};
use serde::{Deserialize, Serialize};

/// A book record.
///
/// `id` is store-assigned and stable; it is the sole equality key for
/// cache operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned identifier.
    pub id: String,
    /// Title (non-empty).
    pub title: String,
    /// Author (non-empty).
    pub author: String,
    /// Genre (non-empty).
    pub genre: String,
    /// Whether the book is on the shelf or checked out.
    pub is_available: bool,
}

/// Create payload: a book without an identifier.
///
/// The store assigns the id on insert. Title, author, and genre must be
/// non-empty before submission; [`validate`](Self::validate) is checked
/// before any store call is made.
#[derive(Debug, Clone, Serialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub is_available: bool,
}

impl BookDraft {
    /// Create a draft; new books start available.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            is_available: true,
        }
    }

    /// Check the required fields.
    pub fn validate(&self) -> RepositoryResult<()> {
        validate_required(&self.title, &self.author, &self.genre)
    }
}

/// Full replacement of a book's mutable fields for update.
#[derive(Debug, Clone)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub is_available: bool,
}

impl BookFields {
    /// Start an edit from the current record.
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            is_available: book.is_available,
        }
    }

    /// Check the required fields.
    pub fn validate(&self) -> RepositoryResult<()> {
        validate_required(&self.title, &self.author, &self.genre)
    }
}

fn validate_required(title: &str, author: &str, genre: &str) -> RepositoryResult<()> {
    if title.trim().is_empty() {
        return Err(RepositoryError::Validation("title"));
    }
    if author.trim().is_empty() {
        return Err(RepositoryError::Validation("author"));
    }
    if genre.trim().is_empty() {
        return Err(RepositoryError::Validation("genre"));
    }
    Ok(())
}

/// Store-level partial update payload (PostgREST PATCH body).
///
/// Absent fields are left untouched by the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

impl BookPatch {
    /// Patch that flips only availability.
    pub fn availability(is_available: bool) -> Self {
        Self {
            is_available: Some(is_available),
            ..Self::default()
        }
    }
}

impl From<&BookFields> for BookPatch {
    fn from(fields: &BookFields) -> Self {
        Self {
            title: Some(fields.title.clone()),
            author: Some(fields.author.clone()),
            genre: Some(fields.genre.clone()),
            is_available: Some(fields.is_available),
        }
    }
}
