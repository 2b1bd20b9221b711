//! Connection state machine for the live push stream.
//!
//! This module provides a pure, side-effect-free state machine for the
//! lifecycle of one server-sent event connection. It takes events reported
//! by the transport as input and produces a new status plus a list of
//! actions to execute.
//!
//! The transport below it reconnects on its own and reports its readiness
//! with every error notification. That readiness decides how the error is
//! read:
//!
//! | status               | event                                 | next         | actions                       |
//! |----------------------|---------------------------------------|--------------|-------------------------------|
//! | `Init`               | `ConnectRequested`                    | `Connecting` | `Dial`                        |
//! | `Connecting`/`Error` | `Opened`                              | `Open`       | `Notify(Opened)`              |
//! | `Open`               | `Message`                             | `Open`       | `Deliver`                     |
//! | not `Init`/`Closed`  | `TransportError { Closed }`           | `Closed`     | `Release`, `Notify(Ended)`    |
//! | not `Init`/`Closed`  | `TransportError { Connecting }`       | `Connecting` | `Notify(Reconnecting)`        |
//! | `Connecting`/`Open`  | `TransportError { Open }`             | `Error`      | `Notify(Failed)`              |
//! | `Init`               | `CloseRequested`                      | `Closed`     | (none)                        |
//! | not `Init`/`Closed`  | `CloseRequested`                      | `Closed`     | `Release`                     |
//! | `Closed`             | anything                              | `Closed`     | (none)                        |
//!
//! Every other pair leaves the status unchanged with no actions.

/// Status of the live stream as seen by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamStatus {
    /// Not yet connected.
    #[default]
    Init,
    /// Connection (or reconnection) in progress.
    Connecting,
    /// Connected and delivering events.
    Open,
    /// Closed, either by the consumer or by a graceful end of stream.
    Closed,
    /// Connectivity failure surfaced to the user.
    Error,
}

/// Readiness of the underlying transport when it reported an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// The transport is retrying the connection.
    Connecting,
    /// The transport still considers the connection open.
    Open,
    /// The transport has given up and will not reconnect.
    Closed,
}

/// Events reported to the stream state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Consumer asked to connect.
    ConnectRequested,
    /// Transport established (or re-established) the connection.
    Opened,
    /// One event payload arrived.
    Message {
        /// Raw event data.
        data: String,
    },
    /// Transport reported an error.
    TransportError {
        /// Readiness at the moment of the error.
        ready_state: ReadyState,
        /// Description of the failure.
        reason: String,
    },
    /// Consumer asked to close.
    CloseRequested,
}

/// Notices for the consumer of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamNotice {
    /// Connection established.
    Opened,
    /// Transport is reconnecting.
    Reconnecting,
    /// Stream ended normally.
    Ended,
    /// Connectivity failure.
    Failed {
        /// Description of the failure.
        reason: String,
    },
}

impl StreamNotice {
    /// Whether this notice should be shown to the user.
    ///
    /// Graceful ends and reconnection attempts are not user-facing.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Actions to be executed by the stream client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamAction {
    /// Open the transport connection.
    Dial,
    /// Parse and deliver one payload.
    Deliver {
        /// Raw event data.
        data: String,
    },
    /// Release the transport connection.
    Release,
    /// Report a notice to the consumer.
    Notify(StreamNotice),
}

impl StreamStatus {
    /// Create a new state machine in the Init status.
    pub fn new() -> Self {
        Self::Init
    }

    /// Process an event and return the new status plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller (feed-client)
    /// is responsible for executing the returned actions.
    pub fn on_event(self, event: StreamEvent) -> (Self, Vec<StreamAction>) {
        use StreamEvent as E;

        match (self, event) {
            // Nothing leaves Closed
            (Self::Closed, _) => (Self::Closed, vec![]),

            // From Init
            (Self::Init, E::ConnectRequested) => (Self::Connecting, vec![StreamAction::Dial]),
            (Self::Init, E::CloseRequested) => (Self::Closed, vec![]),
            (Self::Init, _) => (Self::Init, vec![]),

            // Consumer close from any live status
            (_, E::CloseRequested) => (Self::Closed, vec![StreamAction::Release]),

            // Connection established or recovered
            (Self::Connecting | Self::Error, E::Opened) => (
                Self::Open,
                vec![StreamAction::Notify(StreamNotice::Opened)],
            ),

            // Payloads are only delivered while open
            (Self::Open, E::Message { data }) => (Self::Open, vec![StreamAction::Deliver { data }]),

            // Transport errors, read by readiness
            (
                _,
                E::TransportError {
                    ready_state: ReadyState::Closed,
                    ..
                },
            ) => (
                Self::Closed,
                vec![
                    StreamAction::Release,
                    StreamAction::Notify(StreamNotice::Ended),
                ],
            ),
            (
                _,
                E::TransportError {
                    ready_state: ReadyState::Connecting,
                    ..
                },
            ) => (
                Self::Connecting,
                vec![StreamAction::Notify(StreamNotice::Reconnecting)],
            ),
            (
                Self::Connecting | Self::Open,
                E::TransportError {
                    ready_state: ReadyState::Open,
                    reason,
                },
            ) => (
                Self::Error,
                vec![StreamAction::Notify(StreamNotice::Failed { reason })],
            ),

            // Invalid transitions - stay in current status
            (status, _) => (status, vec![]),
        }
    }

    /// Check if events are currently being delivered.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Check if the stream is finished and will deliver nothing further.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(ready_state: ReadyState) -> StreamEvent {
        StreamEvent::TransportError {
            ready_state,
            reason: "connection reset".into(),
        }
    }

    fn message(data: &str) -> StreamEvent {
        StreamEvent::Message { data: data.into() }
    }

    #[test]
    fn starts_init() {
        assert_eq!(StreamStatus::new(), StreamStatus::Init);
    }

    #[test]
    fn connect_request_dials() {
        let (status, actions) = StreamStatus::Init.on_event(StreamEvent::ConnectRequested);
        assert_eq!(status, StreamStatus::Connecting);
        assert_eq!(actions, vec![StreamAction::Dial]);
    }

    #[test]
    fn opened_transitions_to_open() {
        let (status, actions) = StreamStatus::Connecting.on_event(StreamEvent::Opened);
        assert!(status.is_open());
        assert!(actions
            .iter()
            .any(|a| matches!(a, StreamAction::Notify(StreamNotice::Opened))));
    }

    #[test]
    fn message_while_open_is_delivered() {
        let (status, actions) = StreamStatus::Open.on_event(message("{}"));
        assert_eq!(status, StreamStatus::Open);
        assert_eq!(actions, vec![StreamAction::Deliver { data: "{}".into() }]);
    }

    #[test]
    fn message_while_not_open_is_dropped() {
        for status in [
            StreamStatus::Init,
            StreamStatus::Connecting,
            StreamStatus::Error,
            StreamStatus::Closed,
        ] {
            let (next, actions) = status.on_event(message("{}"));
            assert_eq!(next, status);
            assert!(actions.is_empty(), "{:?} must not deliver", status);
        }
    }

    #[test]
    fn error_with_closed_readiness_is_graceful_end() {
        let (status, actions) = StreamStatus::Open.on_event(error(ReadyState::Closed));
        assert!(status.is_closed());
        assert!(actions.contains(&StreamAction::Release));
        let notice = actions.iter().find_map(|a| match a {
            StreamAction::Notify(n) => Some(n.clone()),
            _ => None,
        });
        assert_eq!(notice, Some(StreamNotice::Ended));
        assert!(!StreamNotice::Ended.is_user_facing());
    }

    #[test]
    fn error_with_connecting_readiness_is_reconnect() {
        let (status, actions) = StreamStatus::Open.on_event(error(ReadyState::Connecting));
        assert_eq!(status, StreamStatus::Connecting);
        assert_eq!(
            actions,
            vec![StreamAction::Notify(StreamNotice::Reconnecting)]
        );
        assert!(!StreamNotice::Reconnecting.is_user_facing());
    }

    #[test]
    fn error_with_open_readiness_is_failure() {
        let (status, actions) = StreamStatus::Open.on_event(error(ReadyState::Open));
        assert_eq!(status, StreamStatus::Error);
        match &actions[..] {
            [StreamAction::Notify(notice @ StreamNotice::Failed { reason })] => {
                assert_eq!(reason, "connection reset");
                assert!(notice.is_user_facing());
            }
            other => panic!("expected failure notice, got {:?}", other),
        }
    }

    #[test]
    fn repeated_failure_while_errored_is_silent() {
        let (status, actions) = StreamStatus::Error.on_event(error(ReadyState::Open));
        assert_eq!(status, StreamStatus::Error);
        assert!(actions.is_empty());
    }

    #[test]
    fn error_recovers_through_reconnection() {
        let (status, _) = StreamStatus::Error.on_event(error(ReadyState::Connecting));
        assert_eq!(status, StreamStatus::Connecting);
        let (status, _) = status.on_event(StreamEvent::Opened);
        assert!(status.is_open());
    }

    #[test]
    fn error_recovers_directly_on_open() {
        let (status, _) = StreamStatus::Error.on_event(StreamEvent::Opened);
        assert!(status.is_open());
    }

    #[test]
    fn full_reconnection_flow() {
        let status = StreamStatus::new();
        let (status, _) = status.on_event(StreamEvent::ConnectRequested);
        let (status, _) = status.on_event(StreamEvent::Opened);
        let (status, _) = status.on_event(error(ReadyState::Connecting));
        assert_eq!(status, StreamStatus::Connecting);
        let (status, _) = status.on_event(StreamEvent::Opened);
        assert!(status.is_open());
    }

    #[test]
    fn close_releases_once() {
        let (status, actions) = StreamStatus::Open.on_event(StreamEvent::CloseRequested);
        assert!(status.is_closed());
        assert_eq!(actions, vec![StreamAction::Release]);

        // Idempotent
        let (status, actions) = status.on_event(StreamEvent::CloseRequested);
        assert!(status.is_closed());
        assert!(actions.is_empty());
    }

    #[test]
    fn close_before_connect_has_nothing_to_release() {
        let (status, actions) = StreamStatus::Init.on_event(StreamEvent::CloseRequested);
        assert!(status.is_closed());
        assert!(actions.is_empty());
    }

    #[test]
    fn closed_ignores_everything() {
        for event in [
            StreamEvent::ConnectRequested,
            StreamEvent::Opened,
            message("{}"),
            error(ReadyState::Open),
            error(ReadyState::Connecting),
        ] {
            let (status, actions) = StreamStatus::Closed.on_event(event);
            assert!(status.is_closed());
            assert!(actions.is_empty());
        }
    }

    #[test]
    fn open_ignores_duplicate_opened() {
        let (status, actions) = StreamStatus::Open.on_event(StreamEvent::Opened);
        assert!(status.is_open());
        assert!(actions.is_empty());
    }
}
