//! Print one page of the feed.

use anyhow::{Context, Result};
use feed_client::FeedApi;
use feed_core::has_more_after;
use feed_types::PageCursor;

use super::item_line;
use crate::app::App;

/// Run the list command.
pub async fn run<A: FeedApi + 'static>(app: &App<A>, page: u32, size: Option<u32>) -> Result<()> {
    let size = size.unwrap_or(app.config.page_size).max(1);
    let cursor = PageCursor::new(page);
    let items = app
        .fetcher()
        .load_page(cursor, size)
        .await
        .context("Failed to load page")?;

    if items.is_empty() {
        println!("No records on page {}.", page);
        return Ok(());
    }
    for item in &items {
        println!("{}", item_line(item));
    }
    let next = cursor.next();
    if has_more_after(items.len(), size) && next != cursor {
        println!();
        println!("More: feed list --page {}", next);
    }
    Ok(())
}
