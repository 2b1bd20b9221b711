//! Follow the live feed, or one record's comments, until interrupted.

use anyhow::Result;
use feed_client::{CommentThread, FeedApi, FeedUpdate, FeedView, StreamTransport};
use feed_core::ScrollMetrics;
use feed_types::ItemId;
use std::sync::Arc;
use tracing::{debug, info};

use super::{comment_line, item_line};
use crate::app::App;

/// Options for the follow command.
#[derive(Debug, Clone)]
pub struct FollowOptions {
    /// Pages to load before waiting on the stream.
    pub pages: u32,
    /// Stop after this many pushed records.
    pub count: Option<usize>,
    /// Follow this record's comments instead of the feed.
    pub comments: Option<ItemId>,
}

/// Run the follow command.
pub async fn run<A, S>(app: &App<A>, transport: Arc<S>, options: FollowOptions) -> Result<()>
where
    A: FeedApi + 'static,
    S: StreamTransport,
{
    match options.comments {
        Some(id) => follow_comments(app, transport, id, options.count).await,
        None => follow_feed(app, transport, options.pages.max(1), options.count).await,
    }
}

fn reached(arrived: usize, count: Option<usize>) -> bool {
    count.map(|limit| arrived >= limit).unwrap_or(false)
}

async fn follow_feed<A, S>(
    app: &App<A>,
    transport: Arc<S>,
    pages: u32,
    count: Option<usize>,
) -> Result<()>
where
    A: FeedApi + 'static,
    S: StreamTransport,
{
    let mut view = FeedView::new(&app.config, app.fetcher(), transport);
    view.mount();
    info!(url = %app.config.url(&app.config.new_posts_path()), "following feed");

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    let mut pages_loaded = 0;
    let mut arrived = 0;
    loop {
        let update = tokio::select! {
            _ = &mut interrupted => break,
            update = view.next_update() => update,
        };
        let Some(update) = update else { break };

        match update {
            FeedUpdate::PageLoaded {
                added, has_more, ..
            } => {
                let items = view.items();
                for item in &items[items.len().saturating_sub(added)..] {
                    println!("{}", item_line(item));
                }
                pages_loaded += 1;
                if has_more && pages_loaded < pages {
                    view.on_scroll(ScrollMetrics::at_end());
                }
            }
            FeedUpdate::Prepended(_) => {
                if let Some(item) = view.items().first() {
                    println!("NEW {}", item_line(item));
                }
                arrived += 1;
                if reached(arrived, count) {
                    break;
                }
            }
            FeedUpdate::StreamStatus(status) => debug!(?status, "stream status"),
            FeedUpdate::Notice(err) => eprintln!("! {}", err),
        }
    }

    view.close();
    Ok(())
}

async fn follow_comments<A, S>(
    app: &App<A>,
    transport: Arc<S>,
    id: ItemId,
    count: Option<usize>,
) -> Result<()>
where
    A: FeedApi + 'static,
    S: StreamTransport,
{
    let mut thread = CommentThread::new(&app.config, id, app.fetcher(), transport);
    thread.mount().await;
    info!(item = %id, "following comments");

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    let mut arrived = 0;
    loop {
        let update = tokio::select! {
            _ = &mut interrupted => break,
            update = thread.next_update() => update,
        };
        let Some(update) = update else { break };

        match update {
            FeedUpdate::PageLoaded { .. } => {
                println!("Comments on #{}:", id.value());
                for comment in thread.comments() {
                    println!("{}", comment_line(comment));
                }
            }
            FeedUpdate::Prepended(_) => {
                if let Some(comment) = thread.comments().first() {
                    println!("NEW{}", comment_line(comment));
                }
                arrived += 1;
                if reached(arrived, count) {
                    break;
                }
            }
            FeedUpdate::StreamStatus(status) => debug!(?status, "stream status"),
            FeedUpdate::Notice(err) => eprintln!("! {}", err),
        }
    }

    thread.close();
    Ok(())
}
