//! reqwest-backed request/response transport.

use async_trait::async_trait;
use feed_core::{Credential, PageRequest};
use feed_types::{Comment, FeedItem, ItemId, LoginRequest, LoginResponse, NewComment, NewItem};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ApiError, FeedApi};
use crate::config::FeedConfig;

/// HTTP implementation of [`FeedApi`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    config: FeedConfig,
}

impl HttpApi {
    /// Create a client for the configured server.
    pub fn new(config: &FeedConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Unreachable(e.to_string()))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn collection_url(&self, suffix: &str) -> String {
        let path = if suffix.is_empty() {
            self.config.collection.clone()
        } else {
            format!("{}/{}", self.config.collection, suffix)
        };
        self.config.url(&path)
    }

    fn authorize(request: RequestBuilder, bearer: Option<&Credential>) -> RequestBuilder {
        match bearer {
            Some(credential) => request.bearer_auth(credential.expose()),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Pull the `error` field out of a failure body, if it has one.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<LoginResponse>(body)
        .ok()
        .and_then(|r| r.error)
}

#[async_trait]
impl FeedApi for HttpApi {
    async fn fetch_page(
        &self,
        request: PageRequest,
        bearer: Option<&Credential>,
    ) -> Result<Vec<FeedItem>, ApiError> {
        let url = self.collection_url("");
        debug!(page = request.cursor.page(), size = request.size, "fetching page");
        let query = [("page", request.cursor.page()), ("size", request.size)];
        Self::send(Self::authorize(self.client.get(url).query(&query), bearer)).await
    }

    async fn fetch_item(
        &self,
        id: ItemId,
        bearer: Option<&Credential>,
    ) -> Result<FeedItem, ApiError> {
        let url = self.collection_url(&id.to_string());
        Self::send(Self::authorize(self.client.get(url), bearer)).await
    }

    async fn fetch_comments(
        &self,
        id: ItemId,
        bearer: Option<&Credential>,
    ) -> Result<Vec<Comment>, ApiError> {
        let url = self.collection_url(&format!("{}/comments", id));
        Self::send(Self::authorize(self.client.get(url), bearer)).await
    }

    async fn create_item(
        &self,
        item: &NewItem,
        bearer: Option<&Credential>,
    ) -> Result<FeedItem, ApiError> {
        let url = self.collection_url("");
        Self::send(Self::authorize(self.client.post(url).json(item), bearer)).await
    }

    async fn create_comment(
        &self,
        id: ItemId,
        comment: &NewComment,
        bearer: Option<&Credential>,
    ) -> Result<Comment, ApiError> {
        let url = self.collection_url(&format!("{}/comments", id));
        Self::send(Self::authorize(self.client.post(url).json(comment), bearer)).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let url = self.config.url("auth/login");
        Self::send(self.client.post(url).json(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_urls() {
        let api = HttpApi::new(&FeedConfig::default()).unwrap();
        assert_eq!(api.collection_url(""), "http://localhost:8080/api/boards");
        assert_eq!(
            api.collection_url("7/comments"),
            "http://localhost:8080/api/boards/7/comments"
        );
    }

    #[test]
    fn error_message_from_body() {
        assert_eq!(
            error_message(r#"{"error":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(error_message("<html>oops</html>"), None);
        assert_eq!(error_message(""), None);
    }

    #[tokio::test]
    async fn unreachable_server_is_reported() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let config = FeedConfig::new("http://127.0.0.1:9/api")
            .with_request_timeout(std::time::Duration::from_secs(2));
        let api = HttpApi::new(&config).unwrap();

        let result = api
            .fetch_page(
                PageRequest {
                    cursor: feed_types::PageCursor::first(),
                    size: 5,
                },
                None,
            )
            .await;
        assert!(matches!(result, Err(ApiError::Unreachable(_))));
    }
}
