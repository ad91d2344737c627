//! Wire protocol of the assistant streaming endpoint.
//!
//! The stream is line-delimited server-sent events. Each `data:` line
//! carries one JSON event of `{type: content|tool_call|done|error}`;
//! a literal `[DONE]` sentinel ends the stream.

use serde::Deserialize;

/// One protocol event from the streaming endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantEvent {
    /// Incremental assistant text.
    Content { text: String },
    /// The model proposed a tool call.
    ToolCall {
        id: String,
        name: String,
        /// JSON-encoded argument object, as sent on the wire.
        arguments: String,
        requires_confirmation: bool,
    },
    /// Normal end of the response.
    Done,
    /// The upstream reported a fatal error for this response.
    Error { message: String },
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
    #[serde(default)]
    requires_confirmation: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

/// Parses one SSE `data:` payload into an event.
///
/// Returns `None` for payloads that are not events (malformed JSON or
/// unknown types are skipped, matching the tolerant read side of the
/// protocol).
pub fn parse_event(data: &str) -> Option<AssistantEvent> {
    if data == "[DONE]" {
        return Some(AssistantEvent::Done);
    }

    let wire: WireEvent = serde_json::from_str(data).ok()?;
    match wire.event_type.as_str() {
        "content" => Some(AssistantEvent::Content {
            text: wire.content.unwrap_or_default(),
        }),
        "tool_call" => Some(AssistantEvent::ToolCall {
            id: wire.id.unwrap_or_default(),
            name: wire.name.unwrap_or_default(),
            arguments: wire.arguments.unwrap_or_else(|| "{}".to_string()),
            requires_confirmation: wire.requires_confirmation.unwrap_or(false),
        }),
        "done" => Some(AssistantEvent::Done),
        "error" => Some(AssistantEvent::Error {
            message: wire.message.unwrap_or_else(|| "Stream error".to_string()),
        }),
        _ => None,
    }
}

/// Accumulates raw bytes and yields complete SSE data payloads.
///
/// Network chunks split lines arbitrarily; the buffer holds the
/// incomplete tail until its newline arrives.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buffer: String,
}

impl SseLineBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns the events completed by it.
    pub fn feed(&mut self, chunk: &str) -> Vec<AssistantEvent> {
        self.buffer.push_str(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end();
            if let Some(data) = line.strip_prefix("data: ") {
                if let Some(event) = parse_event(data) {
                    events.push(event);
                }
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_content_event() {
        let event = parse_event(r#"{"type":"content","content":"Hello"}"#).unwrap();
        assert_eq!(event, AssistantEvent::Content { text: "Hello".into() });
    }

    #[test]
    fn parse_tool_call_event() {
        let data = r#"{"type":"tool_call","id":"tc-1","name":"add_guest","arguments":"{\"firstName\":\"Ana\"}","requires_confirmation":true}"#;
        let event = parse_event(data).unwrap();
        match event {
            AssistantEvent::ToolCall {
                id,
                name,
                arguments,
                requires_confirmation,
            } => {
                assert_eq!(id, "tc-1");
                assert_eq!(name, "add_guest");
                assert!(arguments.contains("Ana"));
                assert!(requires_confirmation);
            }
            other => panic!("expected ToolCall, got {:?}", other),
        }
    }

    #[test]
    fn parse_done_sentinel() {
        assert_eq!(parse_event("[DONE]"), Some(AssistantEvent::Done));
        assert_eq!(
            parse_event(r#"{"type":"done"}"#),
            Some(AssistantEvent::Done)
        );
    }

    #[test]
    fn parse_error_event() {
        let event = parse_event(r#"{"type":"error","message":"overloaded"}"#).unwrap();
        assert_eq!(
            event,
            AssistantEvent::Error {
                message: "overloaded".into()
            }
        );
    }

    #[test]
    fn malformed_payloads_are_skipped() {
        assert_eq!(parse_event("not json"), None);
        assert_eq!(parse_event(r#"{"type":"pong"}"#), None);
    }

    #[test]
    fn line_buffer_handles_split_chunks() {
        let mut buffer = SseLineBuffer::new();

        let events = buffer.feed("data: {\"type\":\"content\",");
        assert!(events.is_empty());

        let events = buffer.feed("\"content\":\"Hi\"}\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], AssistantEvent::Content { text: "Hi".into() });
    }

    #[test]
    fn line_buffer_yields_multiple_events_per_chunk() {
        let mut buffer = SseLineBuffer::new();
        let chunk = "data: {\"type\":\"content\",\"content\":\"a\"}\ndata: {\"type\":\"content\",\"content\":\"b\"}\ndata: [DONE]\n";

        let events = buffer.feed(chunk);
        assert_eq!(events.len(), 3);
        assert_eq!(events[2], AssistantEvent::Done);
    }

    #[test]
    fn line_buffer_ignores_non_data_lines() {
        let mut buffer = SseLineBuffer::new();
        let events = buffer.feed("event: ping\n\ndata: [DONE]\n");
        assert_eq!(events, vec![AssistantEvent::Done]);
    }
}
