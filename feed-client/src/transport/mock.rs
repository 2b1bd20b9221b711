//! Mock transports for testing.
//!
//! [`MockApi`] serves scripted pages, records and accounts, and records every
//! call with the bearer it carried. [`MockStream`] hands out channel-backed
//! connections that a test pushes signals into.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use feed_core::{Credential, PageRequest, ReadyState};
use feed_types::{
    Comment, FeedItem, ItemId, LoginRequest, LoginResponse, NewComment, NewItem,
};
use serde::Serialize;
use tokio::sync::{mpsc, watch};

use super::{ApiError, FeedApi, SignalStream, SourceSignal, StreamTransport};

/// A call received by [`MockApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `fetch_page`.
    Page(PageRequest),
    /// `fetch_item`.
    Item(ItemId),
    /// `fetch_comments`.
    Comments(ItemId),
    /// `create_item`.
    CreateItem(NewItem),
    /// `create_comment`.
    CreateComment(ItemId, NewComment),
    /// `login`, with the subject id.
    Login(String),
}

/// A recorded call and the bearer token it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    /// The call.
    pub call: Call,
    /// Raw bearer token, if one was attached.
    pub bearer: Option<String>,
}

struct Account {
    password: String,
    roles: Vec<String>,
}

struct MockApiInner {
    pages: HashMap<u32, Vec<FeedItem>>,
    items: HashMap<ItemId, FeedItem>,
    comments: HashMap<ItemId, Vec<Comment>>,
    accounts: HashMap<String, Account>,
    calls: Vec<Recorded>,
    failures: VecDeque<ApiError>,
    next_id: u64,
    created_at: NaiveDateTime,
}

impl Default for MockApiInner {
    fn default() -> Self {
        Self {
            pages: HashMap::new(),
            items: HashMap::new(),
            comments: HashMap::new(),
            accounts: HashMap::new(),
            calls: Vec::new(),
            failures: VecDeque::new(),
            next_id: 1000,
            created_at: NaiveDateTime::default(),
        }
    }
}

/// Mock request/response API for testing.
pub struct MockApi {
    inner: Arc<Mutex<MockApiInner>>,
    page_gate: Arc<watch::Sender<bool>>,
}

impl MockApi {
    /// Create a new mock API with no data.
    pub fn new() -> Self {
        let (page_gate, _) = watch::channel(false);
        Self {
            inner: Arc::new(Mutex::new(MockApiInner::default())),
            page_gate: Arc::new(page_gate),
        }
    }

    /// Serve `items` for page index `page`. Unset pages are empty.
    pub fn set_page(&self, page: u32, items: Vec<FeedItem>) {
        let mut inner = self.inner.lock().unwrap();
        inner.pages.insert(page, items);
    }

    /// Serve a single record.
    pub fn set_item(&self, item: FeedItem) {
        let mut inner = self.inner.lock().unwrap();
        inner.items.insert(item.id, item);
    }

    /// Serve the comments of a record.
    pub fn set_comments(&self, id: ItemId, comments: Vec<Comment>) {
        let mut inner = self.inner.lock().unwrap();
        inner.comments.insert(id, comments);
    }

    /// Register an account. Login returns the token `token-<id>`.
    pub fn add_account(&self, id: &str, password: &str, roles: &[&str]) {
        let mut inner = self.inner.lock().unwrap();
        inner.accounts.insert(
            id.to_string(),
            Account {
                password: password.to_string(),
                roles: roles.iter().map(|r| r.to_string()).collect(),
            },
        );
    }

    /// Cause the next call, of any kind, to fail with `error`.
    pub fn fail_next(&self, error: ApiError) {
        let mut inner = self.inner.lock().unwrap();
        inner.failures.push_back(error);
    }

    /// Hold page responses until [`MockApi::release_pages`] is called.
    pub fn hold_pages(&self) {
        self.page_gate.send_replace(true);
    }

    /// Let held page responses complete.
    pub fn release_pages(&self) {
        self.page_gate.send_replace(false);
    }

    /// All calls received so far.
    pub fn calls(&self) -> Vec<Recorded> {
        let inner = self.inner.lock().unwrap();
        inner.calls.clone()
    }

    /// Number of page calls received so far.
    pub fn page_calls(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .calls
            .iter()
            .filter(|r| matches!(r.call, Call::Page(_)))
            .count()
    }

    fn record(&self, call: Call, bearer: Option<&Credential>) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Recorded {
            call,
            bearer: bearer.map(|c| c.expose().to_string()),
        });
        match inner.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockApi {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            page_gate: Arc::clone(&self.page_gate),
        }
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: None,
    }
}

#[async_trait]
impl FeedApi for MockApi {
    async fn fetch_page(
        &self,
        request: PageRequest,
        bearer: Option<&Credential>,
    ) -> Result<Vec<FeedItem>, ApiError> {
        let mut gate = self.page_gate.subscribe();
        let _ = gate.wait_for(|held| !*held).await;

        self.record(Call::Page(request), bearer)?;
        let inner = self.inner.lock().unwrap();
        let mut items = inner
            .pages
            .get(&request.cursor.page())
            .cloned()
            .unwrap_or_default();
        items.truncate(request.size as usize);
        Ok(items)
    }

    async fn fetch_item(
        &self,
        id: ItemId,
        bearer: Option<&Credential>,
    ) -> Result<FeedItem, ApiError> {
        self.record(Call::Item(id), bearer)?;
        let inner = self.inner.lock().unwrap();
        inner.items.get(&id).cloned().ok_or_else(not_found)
    }

    async fn fetch_comments(
        &self,
        id: ItemId,
        bearer: Option<&Credential>,
    ) -> Result<Vec<Comment>, ApiError> {
        self.record(Call::Comments(id), bearer)?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.comments.get(&id).cloned().unwrap_or_default())
    }

    async fn create_item(
        &self,
        item: &NewItem,
        bearer: Option<&Credential>,
    ) -> Result<FeedItem, ApiError> {
        self.record(Call::CreateItem(item.clone()), bearer)?;
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        Ok(FeedItem {
            id: ItemId::new(inner.next_id),
            title: item.title.clone(),
            body: item.content.clone(),
            author: "mock".into(),
            created_at: inner.created_at,
            view_count: Some(0),
        })
    }

    async fn create_comment(
        &self,
        id: ItemId,
        comment: &NewComment,
        bearer: Option<&Credential>,
    ) -> Result<Comment, ApiError> {
        self.record(Call::CreateComment(id, comment.clone()), bearer)?;
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        Ok(Comment {
            id: ItemId::new(inner.next_id),
            item_id: id,
            body: comment.content.clone(),
            author: "mock".into(),
            created_at: inner.created_at,
        })
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.record(Call::Login(request.id.clone()), None)?;
        let inner = self.inner.lock().unwrap();
        match inner.accounts.get(&request.id) {
            Some(account) if account.password == request.password => Ok(LoginResponse {
                token: Some(format!("token-{}", request.id)),
                id: Some(request.id.clone()),
                roles: Some(account.roles.clone()),
                error: None,
            }),
            _ => Err(ApiError::Status {
                status: 401,
                message: Some("Invalid credentials".into()),
            }),
        }
    }
}

#[derive(Default)]
struct MockStreamInner {
    connections: Vec<mpsc::UnboundedSender<SourceSignal>>,
    opened: Vec<(String, Option<String>)>,
    backlog: Vec<SourceSignal>,
}

/// Mock stream transport for testing.
///
/// Signals pushed before any connection is opened are replayed to the first
/// connection.
#[derive(Default)]
pub struct MockStream {
    inner: Arc<Mutex<MockStreamInner>>,
}

impl MockStream {
    /// Create a new mock stream transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a signal to the most recent connection.
    pub fn push(&self, signal: SourceSignal) {
        let mut inner = self.inner.lock().unwrap();
        match inner.connections.last() {
            Some(tx) => {
                let _ = tx.send(signal);
            }
            None => inner.backlog.push(signal),
        }
    }

    /// Report the connection as open.
    pub fn push_open(&self) {
        self.push(SourceSignal::Open);
    }

    /// Push one record as a JSON event.
    pub fn push_json<T: Serialize>(&self, value: &T) {
        let data = serde_json::to_string(value).unwrap();
        self.push(SourceSignal::Message(data));
    }

    /// Report an error with the given readiness.
    pub fn push_error(&self, ready_state: ReadyState, reason: &str) {
        self.push(SourceSignal::Error {
            ready_state,
            reason: reason.to_string(),
        });
    }

    /// Paths opened so far, with the bearer token each carried.
    pub fn opened(&self) -> Vec<(String, Option<String>)> {
        let inner = self.inner.lock().unwrap();
        inner.opened.clone()
    }

    /// Connections whose consumer has not dropped them.
    pub fn live_connections(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.connections.iter().filter(|tx| !tx.is_closed()).count()
    }
}

impl Clone for MockStream {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl StreamTransport for MockStream {
    fn open(&self, path: &str, bearer: Option<&Credential>) -> SignalStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap();
        for signal in inner.backlog.drain(..) {
            let _ = tx.send(signal);
        }
        inner
            .opened
            .push((path.to_string(), bearer.map(|c| c.expose().to_string())));
        inner.connections.push(tx);

        Box::pin(futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|signal| (signal, rx))
        }))
    }
}
