//! Publish a new record.

use anyhow::{Context, Result};
use feed_client::FeedApi;
use feed_types::NewItem;

use crate::app::App;

/// Role required to publish.
const PUBLISHER_ROLE: &str = "ADMIN";

/// Run the post command.
pub async fn run<A: FeedApi + 'static>(app: &App<A>, item: NewItem) -> Result<()> {
    if !app.session.is_authenticated().await {
        anyhow::bail!("Not logged in. Run 'feed login <id>' first.");
    }
    if !app.session.has_role(PUBLISHER_ROLE).await {
        anyhow::bail!("Publishing requires the {} role.", PUBLISHER_ROLE);
    }

    let created = app
        .submitter()
        .submit(item)
        .await
        .context("Failed to publish")?;

    println!("Published #{}", created.id.value());
    println!("It will appear in every open feed once the stream delivers it.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use feed_client::{ApiError, Call, MockApi};
    use tempfile::tempdir;

    fn creates(api: &MockApi) -> usize {
        api.calls()
            .iter()
            .filter(|r| matches!(r.call, Call::CreateItem(_)))
            .count()
    }

    #[tokio::test]
    async fn admin_can_post() {
        let dir = tempdir().unwrap();
        let api = MockApi::new();
        let app = fixtures::app(&api, dir.path()).await;
        app.session.login("admin", "pw").await.unwrap();

        run(&app, NewItem::new("Hello", "world")).await.unwrap();
        assert_eq!(creates(&api), 1);
    }

    #[tokio::test]
    async fn anonymous_and_non_admin_are_refused_locally() {
        let dir = tempdir().unwrap();
        let api = MockApi::new();
        let app = fixtures::app(&api, dir.path()).await;

        assert!(run(&app, NewItem::new("Hello", "world")).await.is_err());
        app.session.login("user", "pw").await.unwrap();
        assert!(run(&app, NewItem::new("Hello", "world")).await.is_err());
        assert_eq!(creates(&api), 0);
    }

    #[tokio::test]
    async fn rejected_session_is_cleared() {
        let dir = tempdir().unwrap();
        let api = MockApi::new();
        let app = fixtures::app(&api, dir.path()).await;
        app.session.login("admin", "pw").await.unwrap();
        api.fail_next(ApiError::Status {
            status: 401,
            message: None,
        });

        assert!(run(&app, NewItem::new("Hello", "world")).await.is_err());
        assert!(!app.session.is_authenticated().await);
        assert!(!dir.path().join("session.json").exists());
    }
}
