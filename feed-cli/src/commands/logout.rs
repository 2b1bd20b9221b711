//! Clear the stored session.

use anyhow::{Context, Result};
use feed_client::FeedApi;

use crate::app::App;

/// Run the logout command.
pub async fn run<A: FeedApi + 'static>(app: &App<A>) -> Result<()> {
    if !app.session.is_authenticated().await {
        println!("Not logged in.");
        return Ok(());
    }
    app.session.logout().await.context("Failed to clear session")?;
    println!("Logged out.");
    Ok(())
}
