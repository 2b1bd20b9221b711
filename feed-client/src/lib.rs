//! # feed-client
//!
//! Client library for the livefeed synchronization engine.
//!
//! This is the main library that front ends use to show a live feed.
//!
//! ## Features
//!
//! - **Snapshot + Stream**: paged REST snapshot merged with a server-sent
//!   event stream into one deduplicated list
//! - **Scroll-Driven Paging**: further pages load as the viewport nears the end
//! - **Session Guard**: bearer credential injection, 401/403 handling,
//!   durable session storage
//! - **Transport Abstraction**: pluggable HTTP and stream transports (reqwest, mock)
//! - **Pure State Machines**: uses feed-core for side-effect-free logic
//!
//! ## Example
//!
//! ```ignore
//! use feed_client::{FeedConfig, FeedView, HttpApi, PagedFetcher, SseTransport};
//!
//! let config = FeedConfig::new("http://localhost:8080/api");
//! let api = Arc::new(HttpApi::new(&config)?);
//! let transport = Arc::new(SseTransport::new(&config)?);
//!
//! let mut view = FeedView::new(&config, PagedFetcher::new(api), transport);
//! view.mount();
//! while let Some(update) = view.next_update().await {
//!     // re-render from view.items()
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod fetcher;
pub mod session;
pub mod store;
pub mod stream;
pub mod submit;
pub mod transport;
pub mod view;

pub use config::FeedConfig;
pub use error::{ClientError, ValidationError};
pub use fetcher::PagedFetcher;
pub use session::{SessionGuard, SessionSignal};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoreError};
pub use stream::{LiveStreamClient, StreamUpdate};
pub use submit::MutationSubmitter;
pub use transport::{
    ApiError, Call, FeedApi, HttpApi, MockApi, MockStream, Recorded, SignalStream, SourceSignal,
    SseTransport, StreamTransport,
};
pub use view::{CommentThread, FeedUpdate, FeedView};
