//! Show the current session.

use anyhow::Result;
use feed_client::FeedApi;

use crate::app::App;

/// Run the whoami command.
pub async fn run<A: FeedApi + 'static>(app: &App<A>) -> Result<()> {
    let session = app.session.snapshot().await;
    match session.subject_id() {
        Some(subject) if session.is_authenticated() => {
            println!("Logged in as {}", subject);
            let roles: Vec<&str> = session.roles().iter().map(String::as_str).collect();
            if roles.is_empty() {
                println!("  Roles: (none)");
            } else {
                println!("  Roles: {}", roles.join(", "));
            }
            println!("  Server: {}", app.config.base_url);
        }
        _ => {
            println!("Not logged in.");
            println!();
            println!("Run 'feed login <id>' to sign in.");
        }
    }
    Ok(())
}
