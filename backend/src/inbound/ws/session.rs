//! Per-connection WebSocket handler.
//!
//! Each session registers with the channel registry on start, forwards
//! queued listing events to the socket, and handles `subscribe` and
//! `unsubscribe` frames. The public contract pings every 5s and closes a
//! connection after 10s without client traffic; tests shorten both. The
//! registry entry is dropped when the session ends, whatever the reason.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, info, warn};

use crate::domain::ports::{ChannelMembership, ConnectionId};
use crate::domain::{BusinessEvent, BusinessId, ChannelId, TraceId, UserId};
use crate::inbound::ws::messages::{ClientMessage, ServerMessage};

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    channels: Arc<dyn ChannelMembership>,
    user: UserId,
    session: Session,
    stream: MessageStream,
) {
    let handle = channels.connect();
    let trace_id = TraceId::current_or_generate();
    info!(connection = %handle.id, user = %user, %trace_id, "WebSocket connection opened");
    let ws = WsSession {
        channels,
        connection: handle.id,
    };
    ws.run(session, stream, handle.events).await;
    ws.channels.disconnect(ws.connection);
    info!(connection = %ws.connection, %trace_id, "WebSocket connection closed");
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Unregistered,
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    channels: Arc<dyn ChannelMembership>,
    connection: ConnectionId,
}

impl WsSession {
    async fn run(
        &self,
        mut session: Session,
        mut stream: MessageStream,
        mut events: mpsc::Receiver<BusinessEvent>,
    ) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    Self::handle_heartbeat_tick(&mut session, last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
                event = events.recv() => {
                    Self::forward_event(&mut session, event).await
                }
            };

            if let Err(error) = result {
                Self::log_shutdown_reason(&error);
                let close_action = Self::close_action_for(&error);
                Self::close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        session: &mut Session,
        last_heartbeat: Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn forward_event(
        session: &mut Session,
        event: Option<BusinessEvent>,
    ) -> Result<(), SessionError> {
        let Some(event) = event else {
            return Err(SessionError::Unregistered);
        };
        send_json(session, &ServerMessage::from(event))
            .await
            .map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(frame) => self.handle_message(session, last_heartbeat, frame).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                let reply = self.handle_text_message(text.as_ref());
                send_json(session, &reply)
                    .await
                    .map_err(SessionError::Network)
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    fn handle_text_message(&self, text: &str) -> ServerMessage {
        let request = match serde_json::from_str::<ClientMessage>(text) {
            Ok(request) => request,
            Err(error) => {
                warn!(connection = %self.connection, error = %error, "rejected malformed WebSocket payload");
                return ServerMessage::invalid_request("Malformed message");
            }
        };

        match request {
            ClientMessage::Subscribe { business_id } => match channel_for(&business_id) {
                Some(channel) => {
                    self.channels.join(self.connection, channel);
                    debug!(connection = %self.connection, %channel, "joined channel");
                    ServerMessage::Subscribed { channel }
                }
                None => invalid_business_id(),
            },
            ClientMessage::Unsubscribe { business_id } => match channel_for(&business_id) {
                Some(channel) => {
                    self.channels.leave(self.connection, channel);
                    debug!(connection = %self.connection, %channel, "left channel");
                    ServerMessage::Unsubscribed { channel }
                }
                None => invalid_business_id(),
            },
        }
    }

    fn log_shutdown_reason(error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::Unregistered => {
                warn!("connection dropped from channel registry; closing");
            }
            SessionError::ClientClosed(_) | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::Unregistered => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Away,
                description: Some("connection unregistered".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "Failed to close WebSocket session");
            }
        }
    }
}

fn channel_for(raw: &str) -> Option<ChannelId> {
    BusinessId::new(raw).ok().map(ChannelId::for_business)
}

fn invalid_business_id() -> ServerMessage {
    ServerMessage::invalid_request("businessId must be a valid UUID")
}

async fn send_json(session: &mut Session, payload: &ServerMessage) -> Result<(), Closed> {
    match serde_json::to_string(payload) {
        Ok(body) => session.text(body).await,
        Err(error) => {
            warn!(error = %error, "Failed to serialize WebSocket payload");
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
