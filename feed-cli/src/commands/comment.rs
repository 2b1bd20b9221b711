//! Comment on a record.

use anyhow::{Context, Result};
use feed_client::FeedApi;
use feed_types::{ItemId, NewComment};

use crate::app::App;

/// Run the comment command.
pub async fn run<A: FeedApi + 'static>(app: &App<A>, id: ItemId, content: &str) -> Result<()> {
    if !app.session.is_authenticated().await {
        anyhow::bail!("Not logged in. Run 'feed login <id>' first.");
    }

    let created = app
        .submitter()
        .submit_comment(id, NewComment::new(content))
        .await
        .context("Failed to comment")?;

    println!("Commented on #{} (comment #{})", id.value(), created.id.value());
    Ok(())
}
