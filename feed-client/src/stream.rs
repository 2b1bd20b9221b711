//! Live push stream client.
//!
//! [`LiveStreamClient`] drives the [`StreamStatus`] state machine from the
//! signals of one [`StreamTransport`] connection and turns payloads into
//! typed records. It is polled, not spawned: nothing happens between calls
//! to [`LiveStreamClient::next`], and after [`LiveStreamClient::close`]
//! nothing is ever delivered again, including signals already buffered.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;

use feed_core::{Credential, StreamAction, StreamEvent, StreamNotice, StreamStatus};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::transport::{SignalStream, StreamTransport};

/// What the stream hands to its consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamUpdate<T> {
    /// A record arrived.
    Item(T),
    /// The connection changed state.
    Notice(StreamNotice),
}

/// One live stream of records of type `T`.
pub struct LiveStreamClient<T, S> {
    transport: Arc<S>,
    path: String,
    credential: Option<Credential>,
    status: StreamStatus,
    signals: Option<SignalStream>,
    pending: VecDeque<StreamUpdate<T>>,
    _record: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned, S: StreamTransport> LiveStreamClient<T, S> {
    /// Create a client for the stream at `path`. Nothing is opened yet.
    pub fn new(transport: Arc<S>, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
            credential: None,
            status: StreamStatus::new(),
            signals: None,
            pending: VecDeque::new(),
            _record: PhantomData,
        }
    }

    /// Bearer credential for the next connection.
    pub fn set_credential(&mut self, credential: Option<Credential>) {
        self.credential = credential;
    }

    /// Current status.
    pub fn status(&self) -> StreamStatus {
        self.status
    }

    /// Whether the stream is finished.
    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    /// Open the connection. Has no effect unless the stream is new.
    pub fn connect(&mut self) {
        self.apply(StreamEvent::ConnectRequested);
    }

    /// Close the stream and release the connection. Idempotent.
    pub fn close(&mut self) {
        self.apply(StreamEvent::CloseRequested);
        self.pending.clear();
        self.signals = None;
    }

    /// Wait for the next record or notice.
    ///
    /// Returns `None` once the stream is closed, or if it was never
    /// connected. Cancel-safe: dropping the future loses nothing.
    pub async fn next(&mut self) -> Option<StreamUpdate<T>> {
        loop {
            if let Some(update) = self.pending.pop_front() {
                return Some(update);
            }
            if self.status.is_closed() {
                return None;
            }
            let signals = self.signals.as_mut()?;
            let event = match signals.next().await {
                Some(signal) => signal.into(),
                None => StreamEvent::TransportError {
                    ready_state: feed_core::ReadyState::Closed,
                    reason: "transport finished".into(),
                },
            };
            self.apply(event);
        }
    }

    fn apply(&mut self, event: StreamEvent) {
        let (status, actions) = self.status.on_event(event);
        if status != self.status {
            debug!(path = %self.path, from = ?self.status, to = ?status, "stream transition");
        }
        self.status = status;

        for action in actions {
            match action {
                StreamAction::Dial => {
                    debug!(path = %self.path, "opening stream");
                    self.signals = Some(self.transport.open(&self.path, self.credential.as_ref()));
                }
                StreamAction::Deliver { data } => match feed_types::decode::<T>(&data) {
                    Ok(record) => self.pending.push_back(StreamUpdate::Item(record)),
                    Err(e) => {
                        warn!(path = %self.path, error = %e, "dropping malformed stream payload")
                    }
                },
                StreamAction::Release => {
                    self.signals = None;
                }
                StreamAction::Notify(notice) => {
                    match &notice {
                        StreamNotice::Opened => info!(path = %self.path, "stream open"),
                        StreamNotice::Reconnecting => {
                            debug!(path = %self.path, "stream reconnecting")
                        }
                        StreamNotice::Ended => info!(path = %self.path, "stream completed normally"),
                        StreamNotice::Failed { reason } => {
                            warn!(path = %self.path, %reason, "stream failed")
                        }
                    }
                    self.pending.push_back(StreamUpdate::Notice(notice));
                }
            }
        }
    }
}

impl<T, S> Drop for LiveStreamClient<T, S> {
    fn drop(&mut self) {
        if self.signals.take().is_some() {
            debug!(path = %self.path, "stream released on drop");
        }
    }
}
