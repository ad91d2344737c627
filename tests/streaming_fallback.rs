//! Integration tests for the streaming transport state machine.
//!
//! Drives `ChatSession` against scripted transports with a zero-delay
//! retry schedule, so state transitions are observable without real
//! timers or a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use planwright::client::{
    AssistantEvent, ChatSession, ChatTurn, EventStream, FallbackReply, FallbackTransport,
    MessageRole, MessageStatus, RetrySchedule, StreamState, StreamingTransport, TransportError,
};

// =============================================================================
// Scripted transports
// =============================================================================

enum Attempt {
    OpenError(TransportError),
    Events(Vec<Result<AssistantEvent, TransportError>>),
    Hang,
}

struct Streaming {
    attempts: Mutex<VecDeque<Attempt>>,
    opened: AtomicUsize,
}

impl Streaming {
    fn new(attempts: Vec<Attempt>) -> Arc<Self> {
        Arc::new(Self {
            attempts: Mutex::new(attempts.into()),
            opened: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl StreamingTransport for Streaming {
    async fn open(&self, _history: &[ChatTurn]) -> Result<EventStream, TransportError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let attempt = self.attempts.lock().unwrap().pop_front().unwrap_or(Attempt::Hang);
        match attempt {
            Attempt::OpenError(err) => Err(err),
            Attempt::Events(events) => Ok(Box::pin(futures::stream::iter(events))),
            Attempt::Hang => {
                futures::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

struct Fallback {
    reply: Mutex<Option<Result<FallbackReply, TransportError>>>,
    calls: AtomicUsize,
    seen_history: Mutex<Vec<ChatTurn>>,
}

impl Fallback {
    fn new(reply: Result<FallbackReply, TransportError>) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Some(reply)),
            calls: AtomicUsize::new(0),
            seen_history: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl FallbackTransport for Fallback {
    async fn send(&self, history: &[ChatTurn]) -> Result<FallbackReply, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_history.lock().unwrap() = history.to_vec();
        self.reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(TransportError::Connect("unscripted".into())))
    }
}

// =============================================================================
// Handoff properties
// =============================================================================

#[tokio::test]
async fn timeouts_exhaust_retries_then_hand_off_to_fallback() {
    let streaming = Streaming::new(vec![Attempt::Hang, Attempt::Hang, Attempt::Hang, Attempt::Hang]);
    let fallback = Fallback::new(Ok(FallbackReply::Content {
        content: "I added Ana to the guest list.".into(),
        tool_result: Some(serde_json::json!({"guestId": "g-1"})),
    }));
    let (mut session, _cancel) = ChatSession::with_policy(
        streaming.clone(),
        fallback.clone(),
        RetrySchedule::immediate(3),
        Duration::from_millis(25),
    );

    let report = session.send_message("add Ana as a guest").await.unwrap();

    // Exactly 1 + max_retries streaming attempts, then one fallback call.
    assert_eq!(streaming.opened.load(Ordering::SeqCst), 4);
    assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);

    let assistant = session
        .messages()
        .iter()
        .find(|m| m.role == MessageRole::Assistant)
        .unwrap();
    assert_eq!(assistant.id, report.message_id);
    assert_eq!(assistant.status, MessageStatus::Success);
    assert_eq!(assistant.content, "I added Ana to the guest list.");
    assert!(assistant.tool_result.is_some());
    assert_eq!(session.state(), StreamState::Idle);
}

#[tokio::test]
async fn fallback_receives_the_full_rolled_up_history() {
    let streaming = Streaming::new(vec![
        Attempt::Events(vec![
            Ok(AssistantEvent::Content { text: "Hello!".into() }),
            Ok(AssistantEvent::Done),
        ]),
        // Second send: streaming is down.
        Attempt::OpenError(TransportError::Connect("down".into())),
        Attempt::OpenError(TransportError::Connect("down".into())),
    ]);
    let fallback = Fallback::new(Ok(FallbackReply::Content {
        content: "Recovered.".into(),
        tool_result: None,
    }));
    let (mut session, _cancel) = ChatSession::with_policy(
        streaming,
        fallback.clone(),
        RetrySchedule::immediate(1),
        Duration::from_millis(100),
    );

    session.send_message("hi").await.unwrap();
    session.send_message("add a guest").await.unwrap();

    let history = fallback.seen_history.lock().unwrap().clone();
    // user "hi", assistant "Hello!", user "add a guest"; the empty
    // placeholder is excluded.
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].role, MessageRole::User);
    assert_eq!(history[1].content, "Hello!");
    assert_eq!(history[2].content, "add a guest");
}

#[tokio::test]
async fn placeholder_never_ends_pending_or_streaming() {
    // Worst case: every streaming attempt dies mid-stream, fallback
    // reports a dispatcher error.
    let streaming = Streaming::new(vec![
        Attempt::Events(vec![
            Ok(AssistantEvent::Content { text: "par".into() }),
            Err(TransportError::Stream("reset".into())),
        ]),
        Attempt::OpenError(TransportError::Status(502)),
    ]);
    let fallback = Fallback::new(Ok(FallbackReply::Error {
        content: "The assistant is unavailable.".into(),
    }));
    let (mut session, _cancel) = ChatSession::with_policy(
        streaming,
        fallback,
        RetrySchedule::immediate(1),
        Duration::from_millis(100),
    );

    let err = session.send_message("hi").await.unwrap_err();

    let assistant = session
        .messages()
        .iter()
        .find(|m| m.role == MessageRole::Assistant)
        .unwrap();
    assert!(assistant.status.is_terminal());
    assert_eq!(assistant.status, MessageStatus::Error);
    assert_eq!(session.state(), StreamState::Error);
    assert!(err.to_string().contains("unavailable"));
}

#[tokio::test]
async fn confirmation_required_fallback_reaches_the_conversation() {
    let streaming = Streaming::new(vec![
        Attempt::OpenError(TransportError::Connect("down".into())),
        Attempt::OpenError(TransportError::Connect("down".into())),
    ]);
    let fallback = Fallback::new(Ok(FallbackReply::ConfirmationRequired {
        content: "Shall I add Ana to the guest list?".into(),
        pending_call_id: "5e57a2ce-5cf9-4741-ae97-3f3f1e8f1e44".into(),
        tool_name: "add_guest".into(),
        preview: Some(serde_json::json!({"actionLabel": "Add Guest"})),
    }));
    let (mut session, _cancel) = ChatSession::with_policy(
        streaming,
        fallback,
        RetrySchedule::immediate(1),
        Duration::from_millis(100),
    );

    let report = session.send_message("add Ana").await.unwrap();

    assert_eq!(report.proposed_calls.len(), 1);
    assert!(report.proposed_calls[0].requires_confirmation);

    let assistant = session
        .messages()
        .iter()
        .find(|m| m.role == MessageRole::Assistant)
        .unwrap();
    let confirmation = assistant.pending_confirmation.as_ref().unwrap();
    assert_eq!(confirmation.tool_name, "add_guest");
    assert_eq!(assistant.status, MessageStatus::Success);
}
