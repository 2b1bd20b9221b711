//! Transport abstraction for the feed client.
//!
//! Two seams separate the client from the network:
//!
//! - [`FeedApi`]: request/response calls (pages, items, comments, mutations,
//!   login)
//! - [`StreamTransport`]: long-lived server-sent event connections that
//!   reconnect on their own and report their readiness with every error
//!
//! The HTTP implementations use reqwest; the mocks keep shared state so a
//! test can script server behavior and inspect what was sent.
//!
//! # Example
//!
//! ```ignore
//! let api = MockApi::new();
//! api.set_page(0, items);
//! let page = api.fetch_page(PageRequest { cursor: PageCursor::first(), size: 5 }).await?;
//! ```

mod http;
mod mock;
mod sse;

pub use http::HttpApi;
pub use mock::{Call, MockApi, MockStream, Recorded};
pub use sse::SseTransport;

use std::pin::Pin;

use async_trait::async_trait;
use feed_core::{Credential, PageRequest, ReadyState, StreamEvent};
use feed_types::{Comment, FeedItem, ItemId, LoginRequest, LoginResponse, NewComment, NewItem};
use futures_util::Stream;
use thiserror::Error;

/// Request/response transport errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Endpoint unreachable or request timed out.
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    /// Server answered with a non-success status.
    #[error("server returned status {status}")]
    Status {
        /// HTTP status.
        status: u16,
        /// The `error` field of the response body, if any.
        message: Option<String>,
    },

    /// Response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Request/response calls against the feed server.
///
/// `bearer` is attached as an `Authorization: Bearer` header when present.
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// Fetch one page of the collection, newest first.
    async fn fetch_page(
        &self,
        request: PageRequest,
        bearer: Option<&Credential>,
    ) -> Result<Vec<FeedItem>, ApiError>;

    /// Fetch a single record.
    async fn fetch_item(
        &self,
        id: ItemId,
        bearer: Option<&Credential>,
    ) -> Result<FeedItem, ApiError>;

    /// Fetch all comments attached to a record.
    async fn fetch_comments(
        &self,
        id: ItemId,
        bearer: Option<&Credential>,
    ) -> Result<Vec<Comment>, ApiError>;

    /// Create a record.
    async fn create_item(
        &self,
        item: &NewItem,
        bearer: Option<&Credential>,
    ) -> Result<FeedItem, ApiError>;

    /// Create a comment on a record.
    async fn create_comment(
        &self,
        id: ItemId,
        comment: &NewComment,
        bearer: Option<&Credential>,
    ) -> Result<Comment, ApiError>;

    /// Exchange a subject id and password for a session.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;
}

/// What a stream transport reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSignal {
    /// Connection established or re-established.
    Open,
    /// One event's data.
    Message(String),
    /// An error, with the transport's readiness at that moment.
    Error {
        /// Readiness of the transport.
        ready_state: ReadyState,
        /// Description of the failure.
        reason: String,
    },
}

impl From<SourceSignal> for StreamEvent {
    fn from(signal: SourceSignal) -> Self {
        match signal {
            SourceSignal::Open => StreamEvent::Opened,
            SourceSignal::Message(data) => StreamEvent::Message { data },
            SourceSignal::Error {
                ready_state,
                reason,
            } => StreamEvent::TransportError {
                ready_state,
                reason,
            },
        }
    }
}

/// Signals from one stream connection. Dropping it releases the connection.
pub type SignalStream = Pin<Box<dyn Stream<Item = SourceSignal> + Send>>;

/// Long-lived push connections.
pub trait StreamTransport: Send + Sync {
    /// Open a stream at a path relative to the API root.
    ///
    /// The returned stream keeps reconnecting until the server ends it or
    /// the stream is dropped.
    fn open(&self, path: &str, bearer: Option<&Credential>) -> SignalStream;
}
