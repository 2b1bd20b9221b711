//! # feed-types
//!
//! Wire format types for the livefeed synchronization engine.
//!
//! This crate provides the foundational types used across all livefeed crates:
//! - [`ItemId`], [`PageCursor`] - Identity and ordering types
//! - [`FeedItem`], [`Comment`] - Immutable server-assigned records
//! - [`NewItem`], [`NewComment`] - Mutation payloads
//! - [`LoginRequest`], [`LoginResponse`] - Authentication payloads
//! - [`decode`], [`PayloadError`] - Single-record decoding and its errors

#![warn(missing_docs)]
#![warn(clippy::all)]

mod auth;
mod error;
mod ids;
mod item;

pub use auth::{LoginRequest, LoginResponse};
pub use error::PayloadError;
pub use ids::{ItemId, PageCursor};
pub use item::{decode, Comment, FeedItem, Keyed, NewComment, NewItem};
