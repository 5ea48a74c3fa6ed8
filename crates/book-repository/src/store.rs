//! Record store seam and PostgREST client.

use crate::types::{Book, BookDraft, BookPatch};
use crate::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use std::sync::RwLock;
use tracing::{debug, error};

/// Authentication context for record store requests.
#[derive(Clone)]
pub struct StoreContext {
    /// JWT access token for the signed-in user.
    pub access_token: String,
}

/// Capability set required from the hosted record store, against the
/// `books` collection.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All records, ordered by title ascending.
    async fn select_all(&self) -> RepositoryResult<Vec<Book>>;

    /// Point lookup by identifier.
    async fn select_one(&self, id: &str) -> RepositoryResult<Book>;

    /// Insert a draft; the store assigns the identifier.
    async fn insert(&self, draft: &BookDraft) -> RepositoryResult<Book>;

    /// Partial update, returning the stored record.
    async fn update(&self, id: &str, patch: &BookPatch) -> RepositoryResult<Book>;

    /// Delete by identifier.
    async fn delete(&self, id: &str) -> RepositoryResult<()>;
}

/// PostgREST client for the `books` table.
pub struct PostgrestBookStore {
    http_client: reqwest::Client,
    api_url: String,
    anon_key: String,
    context: RwLock<Option<StoreContext>>,
}

impl PostgrestBookStore {
    /// Create a new store client.
    ///
    /// # Arguments
    /// * `api_url` - The Supabase project API URL (e.g., `https://xyz.supabase.co`)
    /// * `anon_key` - The Supabase publishable API key
    pub fn new(api_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_url: api_url.into(),
            anon_key: anon_key.into(),
            context: RwLock::new(None),
        }
    }

    /// Set the authentication context (after sign-in).
    pub fn set_context(&self, context: StoreContext) {
        *self.context.write().unwrap() = Some(context);
    }

    /// Build the REST API URL for a table.
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.api_url, table)
    }

    fn access_token(&self) -> RepositoryResult<String> {
        self.context
            .read()
            .unwrap()
            .as_ref()
            .map(|c| c.access_token.clone())
            .ok_or(RepositoryError::NotSignedIn)
    }

    /// Map a non-success response to a store error.
    async fn check(&self, response: reqwest::Response) -> RepositoryResult<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            error!(status, message = %message, "Record store request failed");
            return Err(RepositoryError::Store { status, message });
        }
        Ok(response)
    }
}

#[async_trait]
impl BookStore for PostgrestBookStore {
    async fn select_all(&self) -> RepositoryResult<Vec<Book>> {
        let token = self.access_token()?;
        let url = format!("{}?select=*&order=title.asc", self.rest_url("books"));

        debug!(url = %url, "Listing books");

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .send()
            .await?;

        let books: Vec<Book> = self.check(response).await?.json().await?;
        debug!(count = books.len(), "Listed books");
        Ok(books)
    }

    async fn select_one(&self, id: &str) -> RepositoryResult<Book> {
        let token = self.access_token()?;
        let url = format!("{}?id=eq.{}&select=*&limit=1", self.rest_url("books"), id);

        debug!(book_id = id, "Fetching book");

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .send()
            .await?;

        let rows: Vec<Book> = self.check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn insert(&self, draft: &BookDraft) -> RepositoryResult<Book> {
        let token = self.access_token()?;
        let url = self.rest_url("books");

        debug!(title = %draft.title, "Inserting book");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(std::slice::from_ref(draft))
            .send()
            .await?;

        let rows: Vec<Book> = self.check(response).await?.json().await?;
        rows.into_iter().next().ok_or(RepositoryError::Store {
            status: 500,
            message: "insert returned no representation".to_string(),
        })
    }

    async fn update(&self, id: &str, patch: &BookPatch) -> RepositoryResult<Book> {
        let token = self.access_token()?;
        let url = format!("{}?id=eq.{}", self.rest_url("books"), id);

        debug!(book_id = id, "Updating book");

        let response = self
            .http_client
            .patch(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;

        let rows: Vec<Book> = self.check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        let token = self.access_token()?;
        let url = format!("{}?id=eq.{}", self.rest_url("books"), id);

        debug!(book_id = id, "Deleting book");

        let response = self
            .http_client
            .delete(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        self.check(response).await?;
        debug!(book_id = id, "Book deleted");
        Ok(())
    }
}

impl std::fmt::Debug for PostgrestBookStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestBookStore")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}
