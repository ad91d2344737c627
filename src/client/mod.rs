//! Client-side streaming transport.
//!
//! Feeds user text into the pipeline over the token-streaming endpoint
//! and degrades gracefully: bounded retries with a fixed schedule, then
//! a single non-streaming fallback call.

mod message;
mod protocol;
mod retry;
mod stream;
mod transport;

pub use message::{MessageRole, MessageStatus, PendingConfirmation, StreamMessage};
pub use protocol::{parse_event, AssistantEvent, SseLineBuffer};
pub use retry::RetrySchedule;
pub use stream::{
    CancelHandle, ChatSession, ProposedToolCall, SendError, SendReport, StreamState,
    DEFAULT_ATTEMPT_TIMEOUT,
};
pub use transport::{
    AssistantEndpointConfig, ChatTurn, EventStream, FallbackReply, FallbackTransport,
    HttpAssistantTransport, StreamingTransport, TransportError,
};
