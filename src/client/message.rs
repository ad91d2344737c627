//! Client-side conversation messages.
//!
//! A message is mutated in place while tokens stream in; its terminal
//! status is success or error. The assistant placeholder keeps its id
//! across retries so the UI never re-anchors mid-request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::Timestamp;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// Delivery status of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Placeholder created, nothing received yet.
    Pending,
    /// Tokens are arriving.
    Streaming,
    /// Terminal: completed normally.
    Success,
    /// Terminal: failed after the fallback path was also exhausted.
    Error,
}

impl MessageStatus {
    /// True for success or error.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

/// A confirmation affordance attached to an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    /// Id of the parked call to confirm or cancel.
    pub pending_call_id: String,
    /// The tool awaiting confirmation.
    pub tool_name: String,
    /// Preview payload to render, when the server sent one.
    pub preview: Option<serde_json::Value>,
}

/// One message in the client conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamMessage {
    /// Stable id, preserved across retries.
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: Timestamp,
    pub status: MessageStatus,
    /// Result payload of a tool the assistant ran, if any.
    pub tool_result: Option<serde_json::Value>,
    /// Confirmation affordance, when a proposed call needs one.
    pub pending_confirmation: Option<PendingConfirmation>,
}

impl StreamMessage {
    /// Creates a completed user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: Timestamp::now(),
            status: MessageStatus::Success,
            tool_result: None,
            pending_confirmation: None,
        }
    }

    /// Creates the assistant placeholder a streaming request fills in.
    pub fn assistant_placeholder() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::Assistant,
            content: String::new(),
            timestamp: Timestamp::now(),
            status: MessageStatus::Pending,
            tool_result: None,
            pending_confirmation: None,
        }
    }
}
