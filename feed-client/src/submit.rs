//! Mutations: new records and comments.
//!
//! A successful submission does not touch any feed. The created record
//! reaches every open view, including the submitter's own, only through the
//! live stream.

use std::sync::Arc;

use feed_types::{Comment, FeedItem, ItemId, NewComment, NewItem};
use tracing::info;

use crate::error::{ClientError, ValidationError};
use crate::session::SessionGuard;
use crate::transport::FeedApi;

/// Sends mutations through the session guard.
pub struct MutationSubmitter<A> {
    session: Arc<SessionGuard<A>>,
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

impl<A: FeedApi> MutationSubmitter<A> {
    /// Create a submitter.
    pub fn new(session: Arc<SessionGuard<A>>) -> Self {
        Self { session }
    }

    /// Validate and create a record. Returns the server's copy.
    pub async fn submit(&self, item: NewItem) -> Result<FeedItem, ClientError> {
        require("title", &item.title)?;
        require("content", &item.content)?;

        let api = self.session.api();
        let created = self
            .session
            .authorized(|credential| async move {
                api.create_item(&item, credential.as_ref()).await
            })
            .await?;
        info!(id = %created.id, "record created");
        Ok(created)
    }

    /// Validate and create a comment on a record.
    pub async fn submit_comment(
        &self,
        id: ItemId,
        comment: NewComment,
    ) -> Result<Comment, ClientError> {
        require("content", &comment.content)?;

        let api = self.session.api();
        let created = self
            .session
            .authorized(|credential| async move {
                api.create_comment(id, &comment, credential.as_ref()).await
            })
            .await?;
        info!(item = %id, id = %created.id, "comment created");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionSignal;
    use crate::store::MemorySessionStore;
    use crate::transport::{ApiError, Call, MockApi};

    async fn submitter(api: &MockApi, login: Option<&str>) -> MutationSubmitter<MockApi> {
        api.add_account("admin", "pw", &["ADMIN"]);
        api.add_account("user", "pw", &["USER"]);
        let session = Arc::new(
            SessionGuard::init(Arc::new(api.clone()), Arc::new(MemorySessionStore::new())).await,
        );
        if let Some(id) = login {
            session.login(id, "pw").await.unwrap();
        }
        MutationSubmitter::new(session)
    }

    fn creates(api: &MockApi) -> usize {
        api.calls()
            .iter()
            .filter(|r| matches!(r.call, Call::CreateItem(_) | Call::CreateComment(..)))
            .count()
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_locally() {
        let api = MockApi::new();
        let submitter = submitter(&api, Some("admin")).await;

        let err = submitter.submit(NewItem::new("   ", "body")).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::Empty { field: "title" })
        ));
        let err = submitter.submit(NewItem::new("title", "\n")).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::Empty { field: "content" })
        ));
        let err = submitter
            .submit_comment(ItemId::new(1), NewComment::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));

        assert_eq!(creates(&api), 0);
    }

    #[tokio::test]
    async fn submit_carries_credential_and_memo() {
        let api = MockApi::new();
        let submitter = submitter(&api, Some("admin")).await;

        let created = submitter
            .submit(NewItem::new("Release", "v2 is out").with_memo("pin"))
            .await
            .unwrap();
        assert_eq!(created.title, "Release");

        let last = api.calls().pop().unwrap();
        match last.call {
            Call::CreateItem(item) => assert_eq!(item.memo.as_deref(), Some("pin")),
            other => panic!("unexpected call {:?}", other),
        }
        assert_eq!(last.bearer.as_deref(), Some("token-admin"));
    }

    #[tokio::test]
    async fn forbidden_is_authz_and_keeps_session() {
        let api = MockApi::new();
        let submitter = submitter(&api, Some("user")).await;
        api.fail_next(ApiError::Status {
            status: 403,
            message: None,
        });

        let err = submitter.submit(NewItem::new("t", "c")).await.unwrap_err();
        assert!(matches!(err, ClientError::Authz));
        assert!(submitter.session.is_authenticated().await);
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_signals() {
        let api = MockApi::new();
        let submitter = submitter(&api, Some("admin")).await;
        let mut signals = submitter.session.subscribe();
        api.fail_next(ApiError::Status {
            status: 401,
            message: None,
        });

        let err = submitter.submit(NewItem::new("t", "c")).await.unwrap_err();
        assert!(matches!(err, ClientError::Auth { .. }));
        assert!(!submitter.session.is_authenticated().await);
        assert_eq!(signals.recv().await.unwrap(), SessionSignal::LoginRequired);
        // Not retried
        assert_eq!(creates(&api), 1);
    }

    #[tokio::test]
    async fn network_failure_is_reported_once() {
        let api = MockApi::new();
        let submitter = submitter(&api, Some("admin")).await;
        api.fail_next(ApiError::Unreachable("reset".into()));

        let err = submitter
            .submit_comment(ItemId::new(2), NewComment::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(creates(&api), 1);
    }
}
