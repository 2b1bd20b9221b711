//! Log in and store the session.

use anyhow::{Context, Result};
use feed_client::FeedApi;

use crate::app::App;

/// Run the login command.
pub async fn run<A: FeedApi + 'static>(
    app: &App<A>,
    id: &str,
    password: Option<&str>,
) -> Result<()> {
    let password = match password {
        Some(p) => p.to_string(),
        None => prompt_password()?,
    };

    let session = app.session.login(id, &password).await.context("Login failed")?;

    println!("Logged in as {}", session.subject_id().unwrap_or(id));
    if !session.roles().is_empty() {
        let roles: Vec<&str> = session.roles().iter().map(String::as_str).collect();
        println!("  Roles: {}", roles.join(", "));
    }
    Ok(())
}

fn prompt_password() -> Result<String> {
    rpassword::prompt_password("Password: ").context("Failed to read password")
}
