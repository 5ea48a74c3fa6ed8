//! Librarium CLI - manage the library catalog from the terminal.

mod commands;
mod output;

use book_repository::SearchField;
use catalog_core::LogConfig;
use clap::{Parser, Subcommand};

/// Librarium CLI - browse and manage the library catalog.
#[derive(Parser)]
#[command(name = "librarium")]
#[command(about = "Librarium CLI for the library catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login,

    /// Sign out and clear the session
    Logout,

    /// Show session status
    Status,

    /// Browse and manage books
    Books {
        #[command(subcommand)]
        command: BookCommands,
    },
}

#[derive(Subcommand)]
enum BookCommands {
    /// List the catalog
    List {
        /// Search term
        #[arg(short, long)]
        search: Option<String>,
        /// Field to search by (author or id)
        #[arg(long, default_value = "author")]
        by: SearchField,
    },
    /// Add a new book
    Add {
        /// Title
        #[arg(long)]
        title: String,
        /// Author
        #[arg(long)]
        author: String,
        /// Genre
        #[arg(long)]
        genre: String,
        /// Mark the new book as checked out instead of available
        #[arg(long)]
        checked_out: bool,
    },
    /// Show a book's details
    Show {
        /// Book ID
        id: String,
    },
    /// Edit a book's fields
    Edit {
        /// Book ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New author
        #[arg(long)]
        author: Option<String>,
        /// New genre
        #[arg(long)]
        genre: Option<String>,
        /// New availability
        #[arg(long)]
        available: Option<bool>,
    },
    /// Delete a book
    Remove {
        /// Book ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Toggle a book's availability
    Toggle {
        /// Book ID
        id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    catalog_core::init_logging(LogConfig {
        service_name: "cli".into(),
        default_level: cli.log_level.clone(),
        also_stderr: false,
        ..Default::default()
    });

    let result = match cli.command {
        // No subcommand: the redirect-only entry screen
        None => commands::root(&cli.format).await,
        Some(Commands::Login) => commands::login(&cli.format).await,
        Some(Commands::Logout) => commands::logout(&cli.format).await,
        Some(Commands::Status) => commands::status(&cli.format).await,
        Some(Commands::Books { command }) => match command {
            BookCommands::List { search, by } => {
                commands::books_list(search.as_deref(), by, &cli.format).await
            }
            BookCommands::Add {
                title,
                author,
                genre,
                checked_out,
            } => commands::books_add(&title, &author, &genre, checked_out, &cli.format).await,
            BookCommands::Show { id } => commands::books_show(&id, &cli.format).await,
            BookCommands::Edit {
                id,
                title,
                author,
                genre,
                available,
            } => {
                commands::books_edit(
                    &id,
                    title.as_deref(),
                    author.as_deref(),
                    genre.as_deref(),
                    available,
                    &cli.format,
                )
                .await
            }
            BookCommands::Remove { id, yes } => commands::books_remove(&id, yes, &cli.format).await,
            BookCommands::Toggle { id } => commands::books_toggle(&id, &cli.format).await,
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
