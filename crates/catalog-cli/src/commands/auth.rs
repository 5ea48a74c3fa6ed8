//! Authentication commands.

use super::{books, mount};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use route_guard::{decide, Route, RouteDecision};

/// Sign in with email and password.
///
/// When a session is already present the guard redirects to the catalog
/// instead of re-authenticating.
pub async fn login(format: &OutputFormat) -> Result<()> {
    use std::io::{self, Write};

    let screen = mount().await?;

    if let RouteDecision::Redirect(Route::Catalog) =
        decide(&Route::SignIn, screen.manager.is_signed_in())
    {
        output::print_success("Already signed in.", format);
        return books::render_catalog(&screen, None, format).await;
    }

    print!("Email: ");
    io::stdout().flush()?;
    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    let email = email.trim().to_string();

    if email.is_empty() {
        anyhow::bail!("Email is required");
    }

    let password = rpassword::prompt_password("Password: ")?;

    if password.is_empty() {
        anyhow::bail!("Password is required");
    }

    let session = screen
        .manager
        .sign_in_with_password(&email, &password)
        .await?;

    let display = session.email.as_deref().unwrap_or(&session.user_id);
    output::print_success(&format!("Signed in as {}", display), format);
    Ok(())
}

/// Sign out.
///
/// A provider failure leaves the session untouched; the error is surfaced
/// and the user is not treated as signed out.
pub async fn logout(format: &OutputFormat) -> Result<()> {
    let screen = mount().await?;

    if !screen.manager.is_signed_in() {
        output::print_success("Not signed in.", format);
        return Ok(());
    }

    screen.manager.sign_out().await?;
    output::print_success("Signed out.", format);
    Ok(())
}

/// Show the current session state.
pub async fn status(format: &OutputFormat) -> Result<()> {
    let screen = mount().await?;

    match format {
        OutputFormat::Text => match screen.manager.session() {
            Some(session) => {
                println!("Signed in");
                output::print_row("User", &session.user_id);
                if let Some(email) = &session.email {
                    output::print_row("Email", email);
                }
                output::print_row("Expires", &session.expires_at);
            }
            None => println!("Not signed in"),
        },
        OutputFormat::Json => {
            let body = serde_json::json!({
                "state": screen.manager.state(),
                "session": screen.manager.session(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
