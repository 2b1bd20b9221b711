//! # feed-core
//!
//! Pure logic for livefeed (no I/O, instant tests).
//!
//! This crate implements the state machines and algorithms behind the feed
//! without any network or disk I/O, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about state transitions
//!
//! The actual I/O (HTTP, server-sent events, the session file) is performed
//! by `feed-client`, which interprets the actions produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod feed;
pub mod merge;
pub mod pagination;
pub mod scroll;
pub mod session;
pub mod stream;

pub use feed::FeedState;
pub use merge::{merge, FeedStore, Placement};
pub use pagination::{has_more_after, PageRequest, Pagination, DEFAULT_PAGE_SIZE};
pub use scroll::{ScrollController, ScrollMetrics, DEFAULT_SCROLL_THRESHOLD};
pub use session::{classify_status, Credential, ResponseClass, SessionError, SessionState};
pub use stream::{ReadyState, StreamAction, StreamEvent, StreamNotice, StreamStatus};
