//! CLI command implementations.

pub mod comment;
pub mod follow;
pub mod list;
pub mod login;
pub mod logout;
pub mod post;
pub mod show;
pub mod whoami;

use feed_types::{Comment, FeedItem};

/// One-line summary of a record.
pub fn item_line(item: &FeedItem) -> String {
    format!(
        "#{:<6} {}  ({}, {})",
        item.id.value(),
        item.title,
        item.author,
        item.created_at.format("%Y-%m-%d %H:%M")
    )
}

/// One-line summary of a comment.
pub fn comment_line(comment: &Comment) -> String {
    format!(
        "  [{}] {}: {}",
        comment.created_at.format("%Y-%m-%d %H:%M"),
        comment.author,
        comment.body
    )
}
