//! The in-memory catalog cache and its operations.

use crate::store::BookStore;
use crate::types::{Book, BookDraft, BookFields, BookPatch};
use crate::RepositoryResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Book repository: the single owner of the in-memory catalog.
///
/// The record store is the source of truth. The cache is replaced wholesale
/// on every full reload and converges to the store after each mutation; it
/// is mutated only by this type's own operation continuations, so no
/// external writer races with it. Remote mutations are last-write-wins:
/// two writers editing the same record concurrently can stomp one another,
/// and nothing here detects that.
pub struct BookRepository {
    store: Arc<dyn BookStore>,
    books: Mutex<Vec<Book>>,
    loading: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl BookRepository {
    /// Create a repository over a record store.
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self {
            store,
            books: Mutex::new(Vec::new()),
            loading: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// Snapshot of the cached catalog (title order, as listed).
    pub fn books(&self) -> Vec<Book> {
        self.books.lock().unwrap().clone()
    }

    /// Whether a reload is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// The error recorded by the last failed reload, if any.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }

    /// Cache lookup by identifier.
    pub fn find(&self, id: &str) -> Option<Book> {
        self.books.lock().unwrap().iter().find(|b| b.id == id).cloned()
    }

    /// Replace a cached entry with a server-confirmed record.
    ///
    /// Entries not currently cached are left for the next full reload.
    fn replace_entry(&self, book: &Book) {
        let mut books = self.books.lock().unwrap();
        if let Some(slot) = books.iter_mut().find(|b| b.id == book.id) {
            *slot = book.clone();
        }
    }

    /// Reload the full catalog, ordered by title ascending.
    ///
    /// On success the cache is replaced wholesale and any stored error is
    /// cleared; on failure the previous cache is retained and the error is
    /// recorded. Loading is signaled from invocation until resolution.
    pub async fn refresh(&self) -> RepositoryResult<Vec<Book>> {
        self.loading.store(true, Ordering::SeqCst);
        debug!("Reloading catalog");

        let result = self.store.select_all().await;
        self.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(books) => {
                *self.books.lock().unwrap() = books.clone();
                *self.last_error.lock().unwrap() = None;
                info!(count = books.len(), "Catalog reloaded");
                Ok(books)
            }
            Err(e) => {
                *self.last_error.lock().unwrap() = Some(e.to_string());
                warn!(error = %e, "Catalog reload failed, keeping previous cache");
                Err(e)
            }
        }
    }

    /// Create a book.
    ///
    /// Required fields are checked locally first; a validation failure
    /// issues no store call. On success the cache is intentionally not
    /// refreshed; the catalog screen reloads on return.
    pub async fn create(&self, draft: &BookDraft) -> RepositoryResult<Book> {
        draft.validate()?;

        let book = self.store.insert(draft).await?;
        info!(book_id = %book.id, title = %book.title, "Book created");
        Ok(book)
    }

    /// Replace a book's mutable fields.
    ///
    /// On success the cached entry is replaced with the server-confirmed
    /// record; on failure the cache is left untouched so the edit form can
    /// stay open with its values.
    pub async fn update(&self, id: &str, fields: &BookFields) -> RepositoryResult<Book> {
        fields.validate()?;

        let updated = self.store.update(id, &BookPatch::from(fields)).await?;
        self.replace_entry(&updated);
        info!(book_id = %updated.id, "Book updated");
        Ok(updated)
    }

    /// Delete a book.
    ///
    /// `confirmed` carries the user's answer to the blocking yes/no prompt;
    /// without it no store call is issued. Returns whether the deletion
    /// happened. On store failure no local mutation occurs.
    pub async fn remove(&self, id: &str, confirmed: bool) -> RepositoryResult<bool> {
        if !confirmed {
            debug!(book_id = id, "Removal declined");
            return Ok(false);
        }

        self.store.delete(id).await?;
        self.books.lock().unwrap().retain(|b| b.id != id);
        info!(book_id = id, "Book removed");
        Ok(true)
    }

    /// Flip a book's availability.
    ///
    /// Reads the current value and submits the inverse as a single partial
    /// update. The cached entry is replaced with the store's authoritative
    /// response, not the locally computed inverse. Last-write-wins: no
    /// check is made against intervening writes.
    pub async fn toggle_availability(&self, id: &str) -> RepositoryResult<Book> {
        let current = match self.find(id) {
            Some(book) => book,
            None => self.store.select_one(id).await?,
        };

        let patch = BookPatch::availability(!current.is_available);
        let updated = self.store.update(id, &patch).await?;
        self.replace_entry(&updated);
        info!(
            book_id = %updated.id,
            is_available = updated.is_available,
            "Availability toggled"
        );
        Ok(updated)
    }

    /// Point lookup for the detail screen.
    ///
    /// Not-found is a distinct error so the caller can redirect to the
    /// catalog instead of rendering an empty detail view.
    pub async fn get(&self, id: &str) -> RepositoryResult<Book> {
        self.store.select_one(id).await
    }
}
