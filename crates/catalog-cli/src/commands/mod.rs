//! Screen commands.

mod auth;
mod books;

pub use auth::{login, logout, status};
pub use books::{books_add, books_edit, books_list, books_remove, books_show, books_toggle};

use crate::output::OutputFormat;

use anyhow::Result;
use book_repository::{BookRepository, PostgrestBookStore, StoreContext};
use catalog_auth::{FileSessionStore, GotrueClient, SessionManager};
use catalog_core::{Config, Paths};
use route_guard::{decide, Route, RouteDecision};
use std::sync::Arc;
use tracing::debug;

/// Everything a mounted screen needs: the session manager (activated, with
/// its change subscription registered) and the book repository wired to the
/// signed-in user's token.
pub struct Screen {
    pub manager: SessionManager,
    pub repository: BookRepository,
}

impl Drop for Screen {
    /// Screen teardown releases the session subscription exactly once.
    fn drop(&mut self) {
        self.manager.deactivate();
    }
}

/// Mount a screen: load config, activate the session manager, and wire the
/// record store with the current session's token.
pub async fn mount() -> Result<Screen> {
    let paths = Paths::new()?;
    let config = Config::load(&paths)?;
    config.validate()?;

    let session_store = Arc::new(FileSessionStore::new()?);
    let provider = Arc::new(GotrueClient::new(
        &config.supabase_url,
        &config.supabase_publishable_key,
        session_store,
    ));

    let manager = SessionManager::new(provider);
    manager.activate().await?;

    let store = Arc::new(PostgrestBookStore::new(
        &config.supabase_url,
        &config.supabase_publishable_key,
    ));
    if let Some(session) = manager.session() {
        store.set_context(StoreContext {
            access_token: session.access_token,
        });
    }

    let repository = BookRepository::new(store);

    debug!(signed_in = manager.is_signed_in(), "Screen mounted");

    Ok(Screen {
        manager,
        repository,
    })
}

/// Resolve a guarded screen through the route guard.
///
/// Returns Ok when the screen renders; a redirect to sign-in becomes the
/// error the user sees.
pub fn guard(screen: &Screen, route: &Route) -> Result<()> {
    match decide(route, screen.manager.is_signed_in()) {
        RouteDecision::Render(_) => Ok(()),
        RouteDecision::Redirect(Route::SignIn) => {
            anyhow::bail!("Not signed in. Run 'librarium login' first.")
        }
        RouteDecision::Redirect(other) => {
            anyhow::bail!("Redirected to {}", other.path())
        }
    }
}

/// The entry screen: `/` is redirect-only.
///
/// With a session present the user lands on the catalog; otherwise they are
/// sent to sign in.
pub async fn root(format: &OutputFormat) -> Result<()> {
    let screen = mount().await?;

    match decide(&Route::Root, screen.manager.is_signed_in()) {
        RouteDecision::Redirect(Route::Catalog) => {
            books::render_catalog(&screen, None, format).await
        }
        _ => anyhow::bail!("Not signed in. Run 'librarium login' first."),
    }
}

/// Ask the user for confirmation.
pub fn confirm(prompt: &str) -> bool {
    use std::io::{self, Write};

    print!("{} [y/N] ", prompt);
    io::stdout().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
