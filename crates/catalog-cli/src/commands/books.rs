//! Catalog screens.

use super::{confirm, guard, mount, Screen};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use book_repository::{
    filter, Book, BookDraft, BookFields, FilterCriteria, RepositoryError, SearchField,
};
use route_guard::Route;

/// What the catalog screen shows when there is nothing to list.
///
/// "No books yet" is gated on the unfiltered cache being empty; a search
/// with no matches is a different state and keeps the catalog's framing.
#[derive(Debug, PartialEq, Eq)]
enum EmptyState {
    NoBooks,
    NoMatches,
}

fn empty_state(total: usize, visible: usize) -> Option<EmptyState> {
    if total == 0 {
        Some(EmptyState::NoBooks)
    } else if visible == 0 {
        Some(EmptyState::NoMatches)
    } else {
        None
    }
}

fn print_book_table(books: &[Book]) {
    println!(
        "{:<12} {:<30} {:<22} {:<18} {}",
        "ID", "Title", "Author", "Genre", "Status"
    );
    println!("{}", "-".repeat(96));
    for book in books {
        println!(
            "{:<12} {:<30} {:<22} {:<18} {}",
            book.id,
            book.title,
            book.author,
            book.genre,
            if book.is_available {
                "Available"
            } else {
                "Checked out"
            }
        );
    }
}

fn print_book_detail(book: &Book) {
    println!("Book Details");
    output::print_divider();
    output::print_row("ID", &book.id);
    output::print_row("Title", &book.title);
    output::print_row("Author", &book.author);
    output::print_row("Genre", &book.genre);
    output::print_row(
        "Status",
        if book.is_available {
            "Available"
        } else {
            "Checked out"
        },
    );
}

/// Render the catalog screen: reload, apply the filter, print.
pub async fn render_catalog(
    screen: &Screen,
    criteria: Option<&FilterCriteria>,
    format: &OutputFormat,
) -> Result<()> {
    let books = screen.repository.refresh().await?;
    let visible = match criteria {
        Some(criteria) => filter(&books, criteria),
        None => books.clone(),
    };

    match format {
        OutputFormat::Text => match empty_state(books.len(), visible.len()) {
            Some(EmptyState::NoBooks) => {
                println!("No books yet. Add some books to get started!");
            }
            Some(EmptyState::NoMatches) => {
                println!("No books match your search.");
            }
            None => print_book_table(&visible),
        },
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&visible)?);
        }
    }

    Ok(())
}

/// The catalog screen.
pub async fn books_list(
    search: Option<&str>,
    by: SearchField,
    format: &OutputFormat,
) -> Result<()> {
    let screen = mount().await?;
    guard(&screen, &Route::Catalog)?;

    let criteria = search.map(|term| FilterCriteria::new(term, by));
    render_catalog(&screen, criteria.as_ref(), format).await
}

/// The add-book screen.
pub async fn books_add(
    title: &str,
    author: &str,
    genre: &str,
    checked_out: bool,
    format: &OutputFormat,
) -> Result<()> {
    let screen = mount().await?;
    guard(&screen, &Route::AddBook)?;

    let mut draft = BookDraft::new(title, author, genre);
    draft.is_available = !checked_out;

    let book = screen.repository.create(&draft).await?;
    output::print_success(&format!("Added \"{}\" ({})", book.title, book.id), format);

    // Back to the catalog, which reloads on return
    render_catalog(&screen, None, format).await
}

/// The book detail screen.
pub async fn books_show(id: &str, format: &OutputFormat) -> Result<()> {
    let screen = mount().await?;
    guard(&screen, &Route::BookDetail(id.to_string()))?;

    match screen.repository.get(id).await {
        Ok(book) => {
            match format {
                OutputFormat::Text => print_book_detail(&book),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&book)?),
            }
            Ok(())
        }
        Err(RepositoryError::NotFound(_)) => {
            // Missing detail redirects to the catalog rather than rendering
            // an empty view
            output::print_error(&format!("Book {} not found", id), format);
            render_catalog(&screen, None, format).await
        }
        Err(e) => Err(e.into()),
    }
}

/// The edit form on the detail screen.
///
/// Unspecified flags keep the current values; the store receives the full
/// mutable field set. On failure nothing local changes and the error is
/// shown in place.
pub async fn books_edit(
    id: &str,
    title: Option<&str>,
    author: Option<&str>,
    genre: Option<&str>,
    available: Option<bool>,
    format: &OutputFormat,
) -> Result<()> {
    let screen = mount().await?;
    guard(&screen, &Route::BookDetail(id.to_string()))?;

    let current = match screen.repository.get(id).await {
        Ok(book) => book,
        Err(RepositoryError::NotFound(_)) => {
            output::print_error(&format!("Book {} not found", id), format);
            return render_catalog(&screen, None, format).await;
        }
        Err(e) => return Err(e.into()),
    };

    let mut fields = BookFields::from_book(&current);
    if let Some(title) = title {
        fields.title = title.to_string();
    }
    if let Some(author) = author {
        fields.author = author.to_string();
    }
    if let Some(genre) = genre {
        fields.genre = genre.to_string();
    }
    if let Some(available) = available {
        fields.is_available = available;
    }

    let updated = screen.repository.update(id, &fields).await?;
    output::print_success(&format!("Updated \"{}\"", updated.title), format);

    if let OutputFormat::Text = format {
        print_book_detail(&updated);
    }
    Ok(())
}

/// Delete a book from the detail screen.
///
/// Requires explicit confirmation before any store call; `--yes` answers
/// the prompt up front.
pub async fn books_remove(id: &str, yes: bool, format: &OutputFormat) -> Result<()> {
    let screen = mount().await?;
    guard(&screen, &Route::BookDetail(id.to_string()))?;

    let book = match screen.repository.get(id).await {
        Ok(book) => book,
        Err(RepositoryError::NotFound(_)) => {
            output::print_error(&format!("Book {} not found", id), format);
            return render_catalog(&screen, None, format).await;
        }
        Err(e) => return Err(e.into()),
    };

    let confirmed = yes
        || confirm(&format!(
            "Are you sure you want to delete \"{}\"?",
            book.title
        ));

    if !screen.repository.remove(id, confirmed).await? {
        output::print_success("Deletion cancelled.", format);
        return Ok(());
    }

    output::print_success(&format!("Deleted \"{}\"", book.title), format);

    // Back to the catalog
    render_catalog(&screen, None, format).await
}

/// Toggle a book's availability from the detail screen.
pub async fn books_toggle(id: &str, format: &OutputFormat) -> Result<()> {
    let screen = mount().await?;
    guard(&screen, &Route::BookDetail(id.to_string()))?;

    match screen.repository.toggle_availability(id).await {
        Ok(book) => {
            output::print_success(
                &format!(
                    "\"{}\" is now {}",
                    book.title,
                    if book.is_available {
                        "available"
                    } else {
                        "checked out"
                    }
                ),
                format,
            );
            Ok(())
        }
        Err(RepositoryError::NotFound(_)) => {
            output::print_error(&format!("Book {} not found", id), format);
            render_catalog(&screen, None, format).await
        }
        Err(e) => Err(e.into()),
    }
}
