//! Feed records and mutation payloads.
//!
//! Field names follow the collection server's JSON representation
//! (`content`, `registrant`, `registeredDateTime`); the Rust side uses
//! the feed vocabulary (`body`, `author`, `created_at`).

use chrono::NaiveDateTime;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{ItemId, PayloadError};

/// A record that can be deduplicated by its server-assigned id.
pub trait Keyed {
    /// The stable identity of this record.
    fn key(&self) -> ItemId;
}

/// Decode a single JSON record, as delivered by one stream event or a
/// single-item response. Blank input is [`PayloadError::Empty`].
pub fn decode<T: DeserializeOwned>(json: &str) -> Result<T, PayloadError> {
    if json.trim().is_empty() {
        return Err(PayloadError::Empty);
    }
    serde_json::from_str(json).map_err(PayloadError::Malformed)
}

/// A top-level feed entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Server-assigned identity.
    pub id: ItemId,
    /// Headline.
    pub title: String,
    /// Body text.
    #[serde(rename = "content")]
    pub body: String,
    /// Name of the subject who created the item.
    #[serde(rename = "registrant")]
    pub author: String,
    /// Creation time as reported by the server (local, zone-less).
    #[serde(rename = "registeredDateTime")]
    pub created_at: NaiveDateTime,
    /// View counter, when the endpoint reports one.
    #[serde(
        rename = "viewCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub view_count: Option<u64>,
}

impl Keyed for FeedItem {
    fn key(&self) -> ItemId {
        self.id
    }
}

/// A comment attached to a [`FeedItem`]. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Server-assigned identity.
    pub id: ItemId,
    /// The item this comment belongs to.
    #[serde(rename = "boardId")]
    pub item_id: ItemId,
    /// Comment text.
    #[serde(rename = "content")]
    pub body: String,
    /// Name of the subject who wrote the comment.
    #[serde(rename = "registrant", default)]
    pub author: String,
    /// Creation time as reported by the server.
    #[serde(rename = "registeredDateTime")]
    pub created_at: NaiveDateTime,
}

impl Keyed for Comment {
    fn key(&self) -> ItemId {
        self.id
    }
}

/// Body of `POST /collection`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NewItem {
    /// Headline (required).
    pub title: String,
    /// Body text (required).
    pub content: String,
    /// Free-form note for administrators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl NewItem {
    /// Create a new item payload without a memo.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            memo: None,
        }
    }

    /// Attach a memo.
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// Body of `POST /collection/{id}/comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NewComment {
    /// Comment text (required).
    pub content: String,
}

impl NewComment {
    /// Create a new comment payload.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM_JSON: &str = r#"{
        "id": 42,
        "title": "hello",
        "content": "first post",
        "registrant": "admin",
        "registeredDateTime": "2025-03-01T09:30:00",
        "modifier": "admin",
        "modifiedDateTime": "2025-03-01T09:30:00",
        "memo": null,
        "viewCount": 7
    }"#;

    #[test]
    fn decodes_server_item() {
        let item = decode::<FeedItem>(ITEM_JSON).unwrap();
        assert_eq!(item.id, ItemId::new(42));
        assert_eq!(item.body, "first post");
        assert_eq!(item.author, "admin");
        assert_eq!(item.view_count, Some(7));
        assert_eq!(item.created_at.to_string(), "2025-03-01 09:30:00");
    }

    #[test]
    fn view_count_is_optional() {
        let json = r#"{"id":1,"title":"t","content":"c","registrant":"a",
                       "registeredDateTime":"2025-03-01T09:30:00.123456"}"#;
        let item = decode::<FeedItem>(json).unwrap();
        assert_eq!(item.view_count, None);
    }

    #[test]
    fn malformed_item_is_an_error() {
        assert!(matches!(
            decode::<FeedItem>("{not json"),
            Err(PayloadError::Malformed(_))
        ));
        assert!(matches!(
            decode::<FeedItem>(r#"{"id":1}"#),
            Err(PayloadError::Malformed(_))
        ));
    }

    #[test]
    fn blank_payload_is_empty() {
        assert!(matches!(decode::<FeedItem>("  "), Err(PayloadError::Empty)));
    }

    #[test]
    fn decodes_comment() {
        let json = r#"{"id":3,"boardId":42,"content":"nice","registrant":"user",
                       "registeredDateTime":"2025-03-01T10:00:00"}"#;
        let comment = decode::<Comment>(json).unwrap();
        assert_eq!(comment.key(), ItemId::new(3));
        assert_eq!(comment.item_id, ItemId::new(42));
    }

    #[test]
    fn new_item_omits_missing_memo() {
        let json = serde_json::to_string(&NewItem::new("t", "c")).unwrap();
        assert_eq!(json, r#"{"title":"t","content":"c"}"#);

        let json = serde_json::to_string(&NewItem::new("t", "c").with_memo("m")).unwrap();
        assert!(json.contains(r#""memo":"m""#));
    }
}
