//! Print one record with its comments.

use anyhow::{Context, Result};
use feed_client::FeedApi;
use feed_types::ItemId;

use super::comment_line;
use crate::app::App;

/// Run the show command.
pub async fn run<A: FeedApi + 'static>(app: &App<A>, id: ItemId) -> Result<()> {
    let fetcher = app.fetcher();
    let item = fetcher
        .load_item(id)
        .await
        .context("Failed to load record")?
        .ok_or_else(|| anyhow::anyhow!("No record {}", id))?;

    println!("{}", item.title);
    println!("  By:    {}", item.author);
    println!("  Date:  {}", item.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(views) = item.view_count {
        println!("  Views: {}", views);
    }
    println!();
    println!("{}", item.body);

    let comments = fetcher
        .load_comments(id)
        .await
        .context("Failed to load comments")?;
    println!();
    println!("Comments ({}):", comments.len());
    for comment in &comments {
        println!("{}", comment_line(comment));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use feed_client::{Call, MockApi};
    use tempfile::tempdir;

    #[tokio::test]
    async fn show_loads_item_and_comments() {
        let dir = tempdir().unwrap();
        let api = MockApi::new();
        api.set_item(fixtures::item(7));
        api.set_comments(ItemId::new(7), vec![fixtures::comment(1, 7)]);
        let app = fixtures::app(&api, dir.path()).await;
        app.session.login("user", "pw").await.unwrap();

        run(&app, ItemId::new(7)).await.unwrap();

        let calls: Vec<Call> = api.calls().into_iter().map(|r| r.call).collect();
        assert!(calls.contains(&Call::Item(ItemId::new(7))));
        assert!(calls.contains(&Call::Comments(ItemId::new(7))));
    }

    #[tokio::test]
    async fn show_missing_record_fails() {
        let dir = tempdir().unwrap();
        let app = fixtures::app(&MockApi::new(), dir.path()).await;
        let err = run(&app, ItemId::new(404)).await.unwrap_err();
        assert!(err.to_string().contains("No record"));
    }
}
