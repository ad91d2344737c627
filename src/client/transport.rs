//! Transport boundary of the streaming client.
//!
//! The state machine only sees these traits; the reqwest-backed
//! implementations talk to the assistant endpoint. Keeping the traits
//! narrow is what lets the state machine be tested against scripted
//! transports with no network or timers.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::message::{MessageRole, StreamMessage};
use super::protocol::{AssistantEvent, SseLineBuffer};

/// One rolled-up turn of history for the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
}

impl ChatTurn {
    /// Rolls up the terminal messages of a conversation for the wire.
    pub fn history_of(messages: &[StreamMessage]) -> Vec<ChatTurn> {
        messages
            .iter()
            .filter(|m| !m.content.is_empty())
            .map(|m| ChatTurn {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }
}

/// Transport-level failures: the conditions the retry loop reacts to.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The attempt exceeded its wall-clock timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection could not be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The endpoint answered with a non-2xx status.
    #[error("Unexpected status {0}")]
    Status(u16),

    /// The connection broke mid-stream.
    #[error("Stream failed: {0}")]
    Stream(String),
}

/// A live event stream for one request attempt.
pub type EventStream = BoxStream<'static, Result<AssistantEvent, TransportError>>;

/// Opens token-streaming requests against the assistant endpoint.
#[async_trait]
pub trait StreamingTransport: Send + Sync {
    /// Opens a fresh connection for the given history.
    async fn open(&self, history: &[ChatTurn]) -> Result<EventStream, TransportError>;
}

/// Reply of the non-streaming fallback endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FallbackReply {
    /// Plain assistant content, with an optional tool result.
    Content {
        content: String,
        #[serde(default)]
        tool_result: Option<serde_json::Value>,
    },
    /// A proposed mutation awaits confirmation.
    ConfirmationRequired {
        content: String,
        pending_call_id: String,
        tool_name: String,
        #[serde(default)]
        preview: Option<serde_json::Value>,
    },
    /// The dispatcher failed.
    Error { content: String },
}

/// The single-shot fallback path used after streaming retries are
/// exhausted.
#[async_trait]
pub trait FallbackTransport: Send + Sync {
    /// Sends the full rolled-up history and returns one reply.
    async fn send(&self, history: &[ChatTurn]) -> Result<FallbackReply, TransportError>;
}

/// Configuration for the HTTP transports.
#[derive(Clone)]
pub struct AssistantEndpointConfig {
    /// Base URL of the assistant API.
    pub base_url: String,
    /// Bearer token attached to every request.
    token: Secret<String>,
    /// Per-request timeout for connection establishment.
    pub connect_timeout: Duration,
}

impl AssistantEndpointConfig {
    /// Creates a config with the default connect timeout.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: Secret::new(token.into()),
            connect_timeout: Duration::from_secs(10),
        }
    }

    fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

/// Reqwest-backed implementation of both transport traits.
pub struct HttpAssistantTransport {
    config: AssistantEndpointConfig,
    client: reqwest::Client,
}

impl HttpAssistantTransport {
    /// Creates a transport.
    ///
    /// The client carries only a connect timeout; the per-attempt
    /// wall-clock timeout is enforced by the state machine so a slow
    /// but live stream is not cut mid-token by the HTTP layer.
    pub fn new(config: AssistantEndpointConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn stream_url(&self) -> String {
        format!("{}/api/assistant/stream", self.config.base_url)
    }

    fn fallback_url(&self) -> String {
        format!("{}/api/assistant/fallback", self.config.base_url)
    }
}

#[async_trait]
impl StreamingTransport for HttpAssistantTransport {
    async fn open(&self, history: &[ChatTurn]) -> Result<EventStream, TransportError> {
        let response = self
            .client
            .post(self.stream_url())
            .bearer_auth(self.config.token())
            .json(&serde_json::json!({ "messages": history }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Connect(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let mut buffer = SseLineBuffer::new();
        let stream = response
            .bytes_stream()
            .map(move |chunk| match chunk {
                Ok(bytes) => {
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    buffer
                        .feed(&text)
                        .into_iter()
                        .map(Ok)
                        .collect::<Vec<Result<AssistantEvent, TransportError>>>()
                }
                Err(e) => vec![Err(TransportError::Stream(e.to_string()))],
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(stream))
    }
}

#[async_trait]
impl FallbackTransport for HttpAssistantTransport {
    async fn send(&self, history: &[ChatTurn]) -> Result<FallbackReply, TransportError> {
        let response = self
            .client
            .post(self.fallback_url())
            .bearer_auth(self.config.token())
            .json(&serde_json::json!({ "messages": history }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Connect(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Stream(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::message::MessageStatus;

    #[test]
    fn history_rolls_up_non_empty_messages() {
        let mut placeholder = StreamMessage::assistant_placeholder();
        let messages = vec![
            StreamMessage::user("add a guest"),
            placeholder.clone(),
        ];

        let history = ChatTurn::history_of(&messages);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, MessageRole::User);

        placeholder.content = "Done".into();
        placeholder.status = MessageStatus::Success;
        let messages = vec![StreamMessage::user("add a guest"), placeholder];
        assert_eq!(ChatTurn::history_of(&messages).len(), 2);
    }

    #[test]
    fn fallback_reply_deserializes_by_tag() {
        let content: FallbackReply =
            serde_json::from_str(r#"{"type":"content","content":"Done"}"#).unwrap();
        assert!(matches!(content, FallbackReply::Content { .. }));

        let confirmation: FallbackReply = serde_json::from_str(
            r#"{"type":"confirmation_required","content":"Confirm?","pending_call_id":"p-1","tool_name":"add_guest"}"#,
        )
        .unwrap();
        match confirmation {
            FallbackReply::ConfirmationRequired {
                pending_call_id,
                tool_name,
                ..
            } => {
                assert_eq!(pending_call_id, "p-1");
                assert_eq!(tool_name, "add_guest");
            }
            other => panic!("expected ConfirmationRequired, got {:?}", other),
        }

        let error: FallbackReply =
            serde_json::from_str(r#"{"type":"error","content":"boom"}"#).unwrap();
        assert!(matches!(error, FallbackReply::Error { .. }));
    }

    #[test]
    fn transport_errors_display_their_condition() {
        assert_eq!(TransportError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            TransportError::Status(503).to_string(),
            "Unexpected status 503"
        );
    }
}
