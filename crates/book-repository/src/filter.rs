//! Search filtering over the cached catalog.
//!
//! Pure derivation: never mutates the cache, never reorders. The displayed
//! list is always `filter(cache, criteria)`.

use crate::types::Book;
use serde::{Deserialize, Serialize};

/// Which field the search term matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Author,
    Id,
}

impl std::str::FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "author" => Ok(SearchField::Author),
            "id" => Ok(SearchField::Id),
            other => Err(format!("unknown search field: {}", other)),
        }
    }
}

impl std::fmt::Display for SearchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchField::Author => f.write_str("author"),
            SearchField::Id => f.write_str("id"),
        }
    }
}

/// Search criteria: a term (possibly empty) and the field it applies to.
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    pub term: String,
    pub field: SearchField,
}

impl FilterCriteria {
    pub fn new(term: impl Into<String>, field: SearchField) -> Self {
        Self {
            term: term.into(),
            field,
        }
    }
}

/// Derive the displayed subset of the catalog.
///
/// Keeps every entry whose selected field contains the term as a
/// case-insensitive substring. An empty term is the identity mapping.
/// Output order equals input order.
pub fn filter(books: &[Book], criteria: &FilterCriteria) -> Vec<Book> {
    if criteria.term.is_empty() {
        return books.to_vec();
    }

    let needle = criteria.term.to_lowercase();
    books
        .iter()
        .filter(|book| {
            let haystack = match criteria.field {
                SearchField::Author => &book.author,
                SearchField::Id => &book.id,
            };
            haystack.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
