//! Wiring shared by every command.

use anyhow::{Context, Result};
use feed_client::{
    FeedApi, FeedConfig, FileSessionStore, HttpApi, MutationSubmitter, PagedFetcher,
    SessionGuard, SessionSignal, SessionStore,
};
use std::path::Path;
use std::sync::Arc;

/// Client configuration plus the session guard over one API.
pub struct App<A> {
    /// Client configuration.
    pub config: FeedConfig,
    /// Session guard.
    pub session: Arc<SessionGuard<A>>,
}

impl App<HttpApi> {
    /// Connect to the configured server with the session in `data_dir`.
    pub async fn open(config: FeedConfig, data_dir: &Path) -> Result<Self> {
        let api = HttpApi::new(&config).context("Failed to create HTTP client")?;
        let store = Arc::new(FileSessionStore::new(data_dir));
        Ok(Self::with_api(config, api, store).await)
    }
}

impl<A: FeedApi + 'static> App<A> {
    /// Build an app over any API and session store.
    pub async fn with_api(config: FeedConfig, api: A, store: Arc<dyn SessionStore>) -> Self {
        let session = Arc::new(SessionGuard::init(Arc::new(api), store).await);
        Self { config, session }
    }

    /// Fetcher whose reads carry the session.
    pub fn fetcher(&self) -> PagedFetcher<A> {
        PagedFetcher::with_session(Arc::clone(&self.session))
    }

    /// Submitter for mutations.
    pub fn submitter(&self) -> MutationSubmitter<A> {
        MutationSubmitter::new(Arc::clone(&self.session))
    }

    /// Tell the user when the server rejects the stored session.
    pub fn watch_session(&self) {
        let mut signals = self.session.subscribe();
        tokio::spawn(async move {
            while let Ok(signal) = signals.recv().await {
                if signal == SessionSignal::LoginRequired {
                    eprintln!("Session expired or rejected. Run 'feed login' to sign in again.");
                }
            }
        });
    }
}
