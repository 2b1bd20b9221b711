//! Server-sent event transport.
//!
//! Each opened stream is a small reconnecting state machine driven by
//! polling: dial, read events, back off, dial again. Readiness is reported
//! the way a browser `EventSource` reports it:
//!
//! - network failure or end of body: `Connecting`, then a retry
//! - non-success status or wrong content type: `Closed`, no retry
//! - undecodable event data on a live connection: `Open`, then a retry

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use eventsource_stream::{EventStream, EventStreamError, Eventsource};
use feed_core::{Credential, ReadyState};
use futures_util::{Stream, StreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::{ApiError, SignalStream, SourceSignal, StreamTransport};
use crate::config::FeedConfig;

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send + Sync>>;

/// reqwest-backed [`StreamTransport`].
#[derive(Debug, Clone)]
pub struct SseTransport {
    client: Client,
    config: FeedConfig,
}

impl SseTransport {
    /// Create a transport for the configured server.
    pub fn new(config: &FeedConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Unreachable(e.to_string()))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

impl StreamTransport for SseTransport {
    fn open(&self, path: &str, bearer: Option<&Credential>) -> SignalStream {
        let connection = Connection {
            client: self.client.clone(),
            url: self.config.url(path),
            bearer: bearer.cloned(),
            retry: self.config.stream_retry,
            phase: Phase::Dial,
        };
        Box::pin(futures_util::stream::unfold(connection, Connection::step))
    }
}

enum Phase {
    Dial,
    Streaming(EventStream<ByteStream>),
    Backoff,
    Done,
}

struct Connection {
    client: Client,
    url: String,
    bearer: Option<Credential>,
    retry: Duration,
    phase: Phase,
}

impl Connection {
    async fn step(mut self) -> Option<(SourceSignal, Self)> {
        loop {
            match std::mem::replace(&mut self.phase, Phase::Done) {
                Phase::Done => return None,

                Phase::Backoff => {
                    tokio::time::sleep(self.retry).await;
                    self.phase = Phase::Dial;
                }

                Phase::Dial => match self.dial().await {
                    Ok(events) => {
                        debug!(url = %self.url, "stream connected");
                        self.phase = Phase::Streaming(events);
                        return Some((SourceSignal::Open, self));
                    }
                    Err((ReadyState::Closed, reason)) => {
                        return Some((error(ReadyState::Closed, reason), self));
                    }
                    Err((ready_state, reason)) => {
                        debug!(url = %self.url, %reason, "stream dial failed, retrying");
                        self.phase = Phase::Backoff;
                        return Some((error(ready_state, reason), self));
                    }
                },

                Phase::Streaming(mut events) => match events.next().await {
                    Some(Ok(event)) => {
                        if let Some(retry) = event.retry {
                            self.retry = retry;
                        }
                        self.phase = Phase::Streaming(events);
                        // Comments and keep-alives carry no data
                        if !event.data.is_empty() {
                            return Some((SourceSignal::Message(event.data), self));
                        }
                    }
                    Some(Err(EventStreamError::Transport(e))) => {
                        self.phase = Phase::Backoff;
                        return Some((error(ReadyState::Connecting, e.to_string()), self));
                    }
                    Some(Err(e)) => {
                        warn!(url = %self.url, error = %e, "undecodable event stream");
                        self.phase = Phase::Backoff;
                        return Some((error(ReadyState::Open, e.to_string()), self));
                    }
                    None => {
                        self.phase = Phase::Backoff;
                        return Some((
                            error(ReadyState::Connecting, "stream ended by server".into()),
                            self,
                        ));
                    }
                },
            }
        }
    }

    async fn dial(&self) -> Result<EventStream<ByteStream>, (ReadyState, String)> {
        let mut request = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");
        if let Some(credential) = &self.bearer {
            request = request.bearer_auth(credential.expose());
        }

        let response = request
            .send()
            .await
            .map_err(|e| (ReadyState::Connecting, e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Err((ReadyState::Closed, "server ended the stream".into()));
        }
        if !status.is_success() {
            warn!(url = %self.url, status = status.as_u16(), "stream refused");
            return Err((ReadyState::Closed, format!("server returned status {}", status)));
        }

        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("text/event-stream"))
            .unwrap_or(false);
        if !is_event_stream {
            warn!(url = %self.url, "stream answered with a non event-stream body");
            return Err((ReadyState::Closed, "unexpected content type".into()));
        }

        let bytes: ByteStream = Box::pin(response.bytes_stream());
        Ok(bytes.eventsource())
    }
}

fn error(ready_state: ReadyState, reason: String) -> SourceSignal {
    SourceSignal::Error {
        ready_state,
        reason,
    }
}
