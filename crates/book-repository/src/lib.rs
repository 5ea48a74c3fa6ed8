//! Book records for Librarium.
//!
//! This crate provides:
//! - The [`Book`] data model and its create/update payloads
//! - The [`BookStore`] seam and a PostgREST client ([`PostgrestBookStore`])
//! - [`BookRepository`], the in-memory catalog cache with
//!   create/update/delete/toggle operations
//! - The pure search [`filter`] over the cached catalog
//!
//! The record store is the source of truth; the repository's cache is a
//! client-side copy that converges to it after every mutation and is
//! replaced wholesale on every full reload.

mod error;
mod filter;
mod repository;
mod store;
mod types;

pub use error::{RepositoryError, RepositoryResult};
pub use filter::{filter, FilterCriteria, SearchField};
pub use repository::BookRepository;
pub use store::{BookStore, PostgrestBookStore, StoreContext};
pub use types::{Book, BookDraft, BookFields, BookPatch};
