//! Mounted views: a paged feed and a comment thread.
//!
//! A view owns its merged store, its live stream and at most one in-flight
//! snapshot load. [`FeedView::next_update`] waits on whichever finishes
//! first and applies it, so all mutation of the store happens on the
//! caller's task, one event at a time. Closing or dropping a view releases
//! its stream.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use feed_core::{
    FeedState, FeedStore, PageRequest, Placement, ScrollController, ScrollMetrics, StreamNotice,
    StreamStatus,
};
use feed_types::{Comment, FeedItem, ItemId, PageCursor};
use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::error::ClientError;
use crate::fetcher::PagedFetcher;
use crate::stream::{LiveStreamClient, StreamUpdate};
use crate::transport::{FeedApi, StreamTransport};

type Load<T> = Pin<Box<dyn Future<Output = Result<Vec<T>, ClientError>> + Send>>;

/// Something that changed in a view.
#[derive(Debug)]
pub enum FeedUpdate {
    /// A snapshot load finished.
    PageLoaded {
        /// The page that was loaded.
        cursor: PageCursor,
        /// Records received.
        received: usize,
        /// Records that were new.
        added: usize,
        /// Whether another page may exist.
        has_more: bool,
    },
    /// A pushed record was placed at the head.
    Prepended(ItemId),
    /// The live stream changed status.
    StreamStatus(StreamStatus),
    /// A failure to show to the user.
    Notice(ClientError),
}

enum Wake<T> {
    Loaded(Result<Vec<T>, ClientError>),
    Stream(Option<StreamUpdate<T>>),
}

fn stream_update(status: StreamStatus, notice: StreamNotice) -> FeedUpdate {
    match notice {
        StreamNotice::Failed { reason } => FeedUpdate::Notice(ClientError::Stream(reason)),
        _ => FeedUpdate::StreamStatus(status),
    }
}

/// A mounted, paged feed of records.
pub struct FeedView<A, S> {
    state: FeedState<FeedItem>,
    fetcher: PagedFetcher<A>,
    stream: LiveStreamClient<FeedItem, S>,
    scroll: ScrollController,
    in_flight: Option<(PageRequest, Load<FeedItem>)>,
}

impl<A, S> FeedView<A, S>
where
    A: FeedApi + 'static,
    S: StreamTransport,
{
    /// Create an unmounted view.
    pub fn new(config: &FeedConfig, fetcher: PagedFetcher<A>, transport: Arc<S>) -> Self {
        Self {
            state: FeedState::new(config.page_size),
            fetcher,
            stream: LiveStreamClient::new(transport, config.new_posts_path()),
            scroll: ScrollController::new(config.scroll_threshold),
            in_flight: None,
        }
    }

    /// Open the stream and start loading the first page.
    pub fn mount(&mut self) {
        self.stream.connect();
        self.state.set_stream_status(self.stream.status());
        if let Some(request) = self.state.pagination_mut().begin() {
            self.start(request);
        }
    }

    /// Handle a scroll or resize. Returns true if a page load started.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        match self.scroll.on_scroll(&metrics, self.state.pagination_mut()) {
            Some(request) => {
                self.start(request);
                true
            }
            None => false,
        }
    }

    fn start(&mut self, request: PageRequest) {
        debug!(page = request.cursor.page(), "starting page load");
        let fetcher = self.fetcher.clone();
        let load: Load<FeedItem> =
            Box::pin(async move { fetcher.load_page(request.cursor, request.size).await });
        self.in_flight = Some((request, load));
    }

    /// Wait for the next change and apply it.
    ///
    /// Returns `None` when there is nothing left to wait for: no page load in
    /// flight and the stream closed or never opened. Cancel-safe.
    pub async fn next_update(&mut self) -> Option<FeedUpdate> {
        loop {
            let loading = self.in_flight.is_some();
            let streaming = !self.stream.is_closed() && self.stream.status() != StreamStatus::Init;

            let wake = {
                let in_flight = &mut self.in_flight;
                let load = async move {
                    match in_flight.as_mut() {
                        Some((_, load)) => load.await,
                        None => std::future::pending().await,
                    }
                };
                let pushed = self.stream.next();
                tokio::select! {
                    result = load, if loading => Wake::Loaded(result),
                    update = pushed, if streaming => Wake::Stream(update),
                    else => return None,
                }
            };

            match wake {
                Wake::Loaded(result) => {
                    let Some((request, _)) = self.in_flight.take() else {
                        continue;
                    };
                    match result {
                        Ok(items) => {
                            let received = items.len();
                            let added = self.state.apply_page(request, items);
                            return Some(FeedUpdate::PageLoaded {
                                cursor: request.cursor,
                                received,
                                added,
                                has_more: self.state.has_more(),
                            });
                        }
                        Err(e) => {
                            warn!(page = request.cursor.page(), error = %e, "page load failed");
                            self.state.fail_page(request);
                            return Some(FeedUpdate::Notice(e));
                        }
                    }
                }
                Wake::Stream(Some(StreamUpdate::Item(item))) => {
                    let id = item.id;
                    if self.state.apply_stream_item(item) {
                        return Some(FeedUpdate::Prepended(id));
                    }
                    debug!(%id, "pushed record already present");
                }
                Wake::Stream(Some(StreamUpdate::Notice(notice))) => {
                    self.state.set_stream_status(self.stream.status());
                    return Some(stream_update(self.stream.status(), notice));
                }
                Wake::Stream(None) => {
                    self.state.set_stream_status(self.stream.status());
                }
            }
        }
    }

    /// Release the stream. Idempotent.
    pub fn close(&mut self) {
        self.stream.close();
        self.state.set_stream_status(StreamStatus::Closed);
    }

    /// The merged records, newest first.
    pub fn items(&self) -> &[FeedItem] {
        self.state.items()
    }

    /// The full view state.
    pub fn state(&self) -> &FeedState<FeedItem> {
        &self.state
    }

    /// Whether another page may exist.
    pub fn has_more(&self) -> bool {
        self.state.has_more()
    }

    /// Whether a page load is in flight.
    pub fn is_loading_page(&self) -> bool {
        self.state.is_loading_page()
    }

    /// Current stream status.
    pub fn stream_status(&self) -> StreamStatus {
        self.stream.status()
    }
}

/// The comments of one record, live.
///
/// Comments are fetched in one request and pushed ones are placed at the
/// head, the same merge rules as a feed.
pub struct CommentThread<A, S> {
    item: ItemId,
    store: FeedStore<Comment>,
    fetcher: PagedFetcher<A>,
    stream: LiveStreamClient<Comment, S>,
    in_flight: Option<Load<Comment>>,
}

impl<A, S> CommentThread<A, S>
where
    A: FeedApi + 'static,
    S: StreamTransport,
{
    /// Create an unmounted thread for `item`.
    pub fn new(
        config: &FeedConfig,
        item: ItemId,
        fetcher: PagedFetcher<A>,
        transport: Arc<S>,
    ) -> Self {
        Self {
            item,
            store: FeedStore::new(),
            fetcher,
            stream: LiveStreamClient::new(transport, config.comment_stream_path(item)),
            in_flight: None,
        }
    }

    /// Open the stream with the session's credential and load the comments.
    pub async fn mount(&mut self) {
        if let Some(session) = self.fetcher.session() {
            self.stream.set_credential(session.credential().await);
        }
        self.stream.connect();

        let fetcher = self.fetcher.clone();
        let item = self.item;
        self.in_flight = Some(Box::pin(async move { fetcher.load_comments(item).await }));
    }

    /// Wait for the next change and apply it. Same contract as
    /// [`FeedView::next_update`].
    pub async fn next_update(&mut self) -> Option<FeedUpdate> {
        loop {
            let loading = self.in_flight.is_some();
            let streaming = !self.stream.is_closed() && self.stream.status() != StreamStatus::Init;

            let wake = {
                let in_flight = &mut self.in_flight;
                let load = async move {
                    match in_flight.as_mut() {
                        Some(load) => load.await,
                        None => std::future::pending().await,
                    }
                };
                let pushed = self.stream.next();
                tokio::select! {
                    result = load, if loading => Wake::Loaded(result),
                    update = pushed, if streaming => Wake::Stream(update),
                    else => return None,
                }
            };

            match wake {
                Wake::Loaded(result) => {
                    self.in_flight = None;
                    return Some(match result {
                        Ok(comments) => {
                            let received = comments.len();
                            let added = self.store.merge(comments, Placement::Append);
                            FeedUpdate::PageLoaded {
                                cursor: PageCursor::first(),
                                received,
                                added,
                                has_more: false,
                            }
                        }
                        Err(e) => {
                            warn!(item = %self.item, error = %e, "comment load failed");
                            FeedUpdate::Notice(e)
                        }
                    });
                }
                Wake::Stream(Some(StreamUpdate::Item(comment))) => {
                    if comment.item_id != self.item {
                        debug!(item = %self.item, other = %comment.item_id, "ignoring comment for another record");
                        continue;
                    }
                    let id = comment.id;
                    if self.store.prepend(comment) {
                        return Some(FeedUpdate::Prepended(id));
                    }
                }
                Wake::Stream(Some(StreamUpdate::Notice(notice))) => {
                    return Some(stream_update(self.stream.status(), notice));
                }
                Wake::Stream(None) => {}
            }
        }
    }

    /// Release the stream. Idempotent.
    pub fn close(&mut self) {
        self.stream.close();
    }

    /// The record these comments belong to.
    pub fn item(&self) -> ItemId {
        self.item
    }

    /// The merged comments, newest pushed first.
    pub fn comments(&self) -> &[Comment] {
        self.store.items()
    }

    /// Current stream status.
    pub fn stream_status(&self) -> StreamStatus {
        self.stream.status()
    }
}
