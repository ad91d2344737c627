//! Streaming transport state machine.
//!
//! Turns user text into a streaming request, renders tokens into the
//! assistant placeholder as they arrive, retries transport failures on
//! a fixed schedule, and falls back to the non-streaming endpoint when
//! the retry budget is exhausted. Only total failure of both paths
//! surfaces an error in the conversation.
//!
//! States: `Idle → Connecting → Streaming → Idle` on the success path,
//! `Connecting|Streaming → Reconnecting → Connecting` while retrying,
//! and `→ Error` once both paths have failed. An explicit user
//! cancellation aborts the in-flight connection and returns to `Idle`
//! without marking the placeholder as errored. Dropping the in-flight
//! future (unmount) likewise aborts the connection.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use super::message::{MessageStatus, PendingConfirmation, StreamMessage};
use super::protocol::AssistantEvent;
use super::retry::RetrySchedule;
use super::transport::{
    ChatTurn, FallbackReply, FallbackTransport, StreamingTransport, TransportError,
};

/// Default wall-clock timeout per streaming attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Connecting,
    Streaming,
    Reconnecting,
    Error,
}

/// A tool call the model proposed during a response.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposedToolCall {
    pub id: String,
    pub name: String,
    /// JSON-encoded argument object, as sent on the wire.
    pub arguments: String,
    pub requires_confirmation: bool,
}

/// What a completed send produced.
#[derive(Debug, Clone)]
pub struct SendReport {
    /// Id of the assistant message that was filled in.
    pub message_id: String,
    /// Tool calls the model proposed.
    pub proposed_calls: Vec<ProposedToolCall>,
    /// True when the user cancelled mid-flight.
    pub cancelled: bool,
}

/// Terminal failures of a send.
#[derive(Debug, Clone, Error)]
pub enum SendError {
    /// The upstream reported an error event for this response.
    #[error("Assistant error: {0}")]
    Protocol(String),

    /// Streaming retries and the fallback both failed.
    #[error("Request failed: {0}")]
    Failed(String),
}

/// Cancels the in-flight request of the session it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<u64>>,
}

impl CancelHandle {
    /// Aborts the in-flight connection, if any.
    pub fn cancel(&self) {
        self.tx.send_modify(|generation| *generation += 1);
    }
}

enum AttemptOutcome {
    Completed(Vec<ProposedToolCall>),
    Cancelled,
    TransportFailed(TransportError),
    ProtocolError(String),
}

/// One client conversation with the assistant.
///
/// Single-flight per session: `send_message` takes `&mut self`, so a
/// caller cannot start a second send while one is in flight.
pub struct ChatSession {
    streaming: Arc<dyn StreamingTransport>,
    fallback: Arc<dyn FallbackTransport>,
    schedule: RetrySchedule,
    attempt_timeout: Duration,
    state: StreamState,
    messages: Vec<StreamMessage>,
    cancel_rx: watch::Receiver<u64>,
}

impl ChatSession {
    /// Creates a session and the handle that can cancel its in-flight
    /// request.
    pub fn new(
        streaming: Arc<dyn StreamingTransport>,
        fallback: Arc<dyn FallbackTransport>,
    ) -> (Self, CancelHandle) {
        Self::with_policy(streaming, fallback, RetrySchedule::default(), DEFAULT_ATTEMPT_TIMEOUT)
    }

    /// Creates a session with an explicit retry schedule and timeout.
    pub fn with_policy(
        streaming: Arc<dyn StreamingTransport>,
        fallback: Arc<dyn FallbackTransport>,
        schedule: RetrySchedule,
        attempt_timeout: Duration,
    ) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(0u64);
        let session = Self {
            streaming,
            fallback,
            schedule,
            attempt_timeout,
            state: StreamState::Idle,
            messages: Vec::new(),
            cancel_rx: rx,
        };
        (session, CancelHandle { tx: Arc::new(tx) })
    }

    /// Current connection state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// The conversation messages.
    pub fn messages(&self) -> &[StreamMessage] {
        &self.messages
    }

    /// Sends user text and drives the request to a terminal outcome.
    ///
    /// Appends the user message and an assistant placeholder, then:
    /// streams tokens into the placeholder; retries transport failures
    /// per the schedule with a fresh connection and timeout, keeping
    /// the placeholder id; after exhausting retries, makes one
    /// non-streaming fallback call; and only if that also fails,
    /// finalizes the placeholder as errored.
    pub async fn send_message(&mut self, text: &str) -> Result<SendReport, SendError> {
        self.messages.push(StreamMessage::user(text));
        let placeholder = StreamMessage::assistant_placeholder();
        let message_id = placeholder.id.clone();
        self.messages.push(placeholder);

        let history = ChatTurn::history_of(&self.messages);
        let mut cancel_rx = self.cancel_rx.clone();
        cancel_rx.borrow_and_update();

        let mut last_failure = TransportError::Connect("no attempts made".into());
        for attempt in 0..=self.schedule.max_retries() {
            if attempt > 0 {
                self.state = StreamState::Reconnecting;
                // The schedule has a delay for every retry by construction.
                let delay = self
                    .schedule
                    .delay_for(attempt - 1)
                    .unwrap_or(Duration::ZERO);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel_rx.changed() => return Ok(self.finish_cancelled(&message_id)),
                }
            }

            self.reset_placeholder(&message_id);
            self.state = StreamState::Connecting;

            let outcome = self.run_attempt(&history, &message_id, &mut cancel_rx).await;
            match outcome {
                AttemptOutcome::Completed(proposed_calls) => {
                    self.set_status(&message_id, MessageStatus::Success);
                    self.state = StreamState::Idle;
                    return Ok(SendReport {
                        message_id,
                        proposed_calls,
                        cancelled: false,
                    });
                }
                AttemptOutcome::Cancelled => return Ok(self.finish_cancelled(&message_id)),
                AttemptOutcome::ProtocolError(message) => {
                    self.set_status(&message_id, MessageStatus::Error);
                    self.state = StreamState::Error;
                    return Err(SendError::Protocol(message));
                }
                AttemptOutcome::TransportFailed(err) => {
                    debug!(attempt, error = %err, "streaming attempt failed");
                    last_failure = err;
                }
            }
        }

        self.run_fallback(&history, &message_id, last_failure).await
    }

    async fn run_attempt(
        &mut self,
        history: &[ChatTurn],
        message_id: &str,
        cancel_rx: &mut watch::Receiver<u64>,
    ) -> AttemptOutcome {
        let deadline = tokio::time::sleep(self.attempt_timeout);
        tokio::pin!(deadline);

        let transport = Arc::clone(&self.streaming);
        let mut stream = {
            let open = transport.open(history);
            tokio::pin!(open);
            tokio::select! {
                _ = &mut deadline => return AttemptOutcome::TransportFailed(TransportError::Timeout),
                _ = cancel_rx.changed() => return AttemptOutcome::Cancelled,
                opened = &mut open => match opened {
                    Ok(stream) => stream,
                    Err(err) => return AttemptOutcome::TransportFailed(err),
                },
            }
        };

        let mut proposed_calls = Vec::new();
        loop {
            tokio::select! {
                _ = &mut deadline => return AttemptOutcome::TransportFailed(TransportError::Timeout),
                _ = cancel_rx.changed() => return AttemptOutcome::Cancelled,
                item = stream.next() => match item {
                    None => {
                        return AttemptOutcome::TransportFailed(TransportError::Stream(
                            "connection closed before done".into(),
                        ))
                    }
                    Some(Err(err)) => return AttemptOutcome::TransportFailed(err),
                    Some(Ok(event)) => {
                        self.state = StreamState::Streaming;
                        match event {
                            AssistantEvent::Content { text } => {
                                self.append_content(message_id, &text);
                            }
                            AssistantEvent::ToolCall {
                                id,
                                name,
                                arguments,
                                requires_confirmation,
                            } => {
                                if requires_confirmation {
                                    self.set_pending_confirmation(
                                        message_id,
                                        PendingConfirmation {
                                            pending_call_id: id.clone(),
                                            tool_name: name.clone(),
                                            preview: None,
                                        },
                                    );
                                }
                                proposed_calls.push(ProposedToolCall {
                                    id,
                                    name,
                                    arguments,
                                    requires_confirmation,
                                });
                            }
                            AssistantEvent::Done => {
                                return AttemptOutcome::Completed(proposed_calls)
                            }
                            AssistantEvent::Error { message } => {
                                return AttemptOutcome::ProtocolError(message)
                            }
                        }
                    }
                }
            }
        }
    }

    async fn run_fallback(
        &mut self,
        history: &[ChatTurn],
        message_id: &str,
        streaming_failure: TransportError,
    ) -> Result<SendReport, SendError> {
        debug!(error = %streaming_failure, "streaming exhausted, using fallback");
        self.reset_placeholder(message_id);

        let fallback = Arc::clone(&self.fallback);
        let reply = fallback.send(history).await;
        match reply {
            Ok(FallbackReply::Content {
                content,
                tool_result,
            }) => {
                if let Some(message) = self.message_mut(message_id) {
                    message.content = content;
                    message.tool_result = tool_result;
                    message.status = MessageStatus::Success;
                }
                self.state = StreamState::Idle;
                Ok(SendReport {
                    message_id: message_id.to_string(),
                    proposed_calls: Vec::new(),
                    cancelled: false,
                })
            }
            Ok(FallbackReply::ConfirmationRequired {
                content,
                pending_call_id,
                tool_name,
                preview,
            }) => {
                let proposed = ProposedToolCall {
                    id: pending_call_id.clone(),
                    name: tool_name.clone(),
                    arguments: String::new(),
                    requires_confirmation: true,
                };
                if let Some(message) = self.message_mut(message_id) {
                    message.content = content;
                    message.status = MessageStatus::Success;
                    message.pending_confirmation = Some(PendingConfirmation {
                        pending_call_id,
                        tool_name,
                        preview,
                    });
                }
                self.state = StreamState::Idle;
                Ok(SendReport {
                    message_id: message_id.to_string(),
                    proposed_calls: vec![proposed],
                    cancelled: false,
                })
            }
            Ok(FallbackReply::Error { content }) => {
                if let Some(message) = self.message_mut(message_id) {
                    message.content = content.clone();
                    message.status = MessageStatus::Error;
                }
                self.state = StreamState::Error;
                Err(SendError::Failed(content))
            }
            Err(err) => {
                self.set_status(message_id, MessageStatus::Error);
                self.state = StreamState::Error;
                Err(SendError::Failed(format!(
                    "streaming failed ({}), fallback failed ({})",
                    streaming_failure, err
                )))
            }
        }
    }

    fn finish_cancelled(&mut self, message_id: &str) -> SendReport {
        self.state = StreamState::Idle;
        SendReport {
            message_id: message_id.to_string(),
            proposed_calls: Vec::new(),
            cancelled: true,
        }
    }

    fn message_mut(&mut self, id: &str) -> Option<&mut StreamMessage> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    fn reset_placeholder(&mut self, id: &str) {
        if let Some(message) = self.message_mut(id) {
            message.content.clear();
            message.tool_result = None;
            message.pending_confirmation = None;
            message.status = MessageStatus::Pending;
        }
    }

    fn append_content(&mut self, id: &str, text: &str) {
        if let Some(message) = self.message_mut(id) {
            message.content.push_str(text);
            message.status = MessageStatus::Streaming;
        }
    }

    fn set_status(&mut self, id: &str, status: MessageStatus) {
        if let Some(message) = self.message_mut(id) {
            message.status = status;
        }
    }

    fn set_pending_confirmation(&mut self, id: &str, confirmation: PendingConfirmation) {
        if let Some(message) = self.message_mut(id) {
            message.pending_confirmation = Some(confirmation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::client::transport::EventStream;

    enum ScriptedAttempt {
        OpenError(TransportError),
        Events(Vec<Result<AssistantEvent, TransportError>>),
        Hang,
    }

    struct ScriptedStreaming {
        attempts: Mutex<VecDeque<ScriptedAttempt>>,
        opened: AtomicUsize,
    }

    impl ScriptedStreaming {
        fn new(attempts: Vec<ScriptedAttempt>) -> Arc<Self> {
            Arc::new(Self {
                attempts: Mutex::new(attempts.into()),
                opened: AtomicUsize::new(0),
            })
        }

        fn attempt_count(&self) -> usize {
            self.opened.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StreamingTransport for ScriptedStreaming {
        async fn open(&self, _history: &[ChatTurn]) -> Result<EventStream, TransportError> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            let attempt = self
                .attempts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(ScriptedAttempt::Hang);
            match attempt {
                ScriptedAttempt::OpenError(err) => Err(err),
                ScriptedAttempt::Events(events) => {
                    Ok(Box::pin(futures::stream::iter(events)))
                }
                ScriptedAttempt::Hang => {
                    futures::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }

    struct ScriptedFallback {
        reply: Mutex<Option<Result<FallbackReply, TransportError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedFallback {
        fn new(reply: Result<FallbackReply, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                calls: AtomicUsize::new(0),
            })
        }

        fn unused() -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(None),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FallbackTransport for ScriptedFallback {
        async fn send(&self, _history: &[ChatTurn]) -> Result<FallbackReply, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(TransportError::Connect("unscripted".into())))
        }
    }

    fn content(text: &str) -> Result<AssistantEvent, TransportError> {
        Ok(AssistantEvent::Content { text: text.into() })
    }

    fn done() -> Result<AssistantEvent, TransportError> {
        Ok(AssistantEvent::Done)
    }

    fn session(
        streaming: Arc<ScriptedStreaming>,
        fallback: Arc<ScriptedFallback>,
    ) -> (ChatSession, CancelHandle) {
        ChatSession::with_policy(
            streaming,
            fallback,
            RetrySchedule::immediate(3),
            Duration::from_millis(200),
        )
    }

    fn assistant_message(session: &ChatSession) -> &StreamMessage {
        session
            .messages()
            .iter()
            .find(|m| m.role == crate::client::message::MessageRole::Assistant)
            .expect("assistant placeholder exists")
    }

    #[tokio::test]
    async fn success_path_streams_content_into_placeholder() {
        let streaming = ScriptedStreaming::new(vec![ScriptedAttempt::Events(vec![
            content("Hel"),
            content("lo"),
            done(),
        ])]);
        let fallback = ScriptedFallback::unused();
        let (mut session, _cancel) = session(streaming.clone(), fallback.clone());

        let report = session.send_message("hi").await.unwrap();

        assert!(!report.cancelled);
        assert_eq!(session.state(), StreamState::Idle);
        let message = assistant_message(&session);
        assert_eq!(message.content, "Hello");
        assert_eq!(message.status, MessageStatus::Success);
        assert_eq!(streaming.attempt_count(), 1);
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test]
    async fn tool_call_event_surfaces_and_marks_confirmation() {
        let streaming = ScriptedStreaming::new(vec![ScriptedAttempt::Events(vec![
            content("Proposing"),
            Ok(AssistantEvent::ToolCall {
                id: "p-1".into(),
                name: "add_guest".into(),
                arguments: r#"{"firstName":"Ana"}"#.into(),
                requires_confirmation: true,
            }),
            done(),
        ])]);
        let (mut session, _cancel) = session(streaming, ScriptedFallback::unused());

        let report = session.send_message("add ana").await.unwrap();

        assert_eq!(report.proposed_calls.len(), 1);
        assert_eq!(report.proposed_calls[0].name, "add_guest");
        let message = assistant_message(&session);
        let confirmation = message.pending_confirmation.as_ref().unwrap();
        assert_eq!(confirmation.pending_call_id, "p-1");
    }

    #[tokio::test]
    async fn transient_failure_retries_with_same_placeholder() {
        let streaming = ScriptedStreaming::new(vec![
            ScriptedAttempt::OpenError(TransportError::Status(503)),
            ScriptedAttempt::Events(vec![content("ok"), done()]),
        ]);
        let (mut session, _cancel) = session(streaming.clone(), ScriptedFallback::unused());

        let report = session.send_message("hi").await.unwrap();

        assert_eq!(streaming.attempt_count(), 2);
        let message = assistant_message(&session);
        assert_eq!(message.id, report.message_id);
        assert_eq!(message.content, "ok");
        assert_eq!(message.status, MessageStatus::Success);
    }

    #[tokio::test]
    async fn mid_stream_failure_discards_partial_content_on_retry() {
        let streaming = ScriptedStreaming::new(vec![
            ScriptedAttempt::Events(vec![
                content("par"),
                Err(TransportError::Stream("reset".into())),
            ]),
            ScriptedAttempt::Events(vec![content("full"), done()]),
        ]);
        let (mut session, _cancel) = session(streaming, ScriptedFallback::unused());

        session.send_message("hi").await.unwrap();

        assert_eq!(assistant_message(&session).content, "full");
    }

    #[tokio::test]
    async fn always_timing_out_runs_all_attempts_then_one_fallback() {
        let streaming = ScriptedStreaming::new(vec![
            ScriptedAttempt::Hang,
            ScriptedAttempt::Hang,
            ScriptedAttempt::Hang,
            ScriptedAttempt::Hang,
        ]);
        let fallback = ScriptedFallback::new(Ok(FallbackReply::Content {
            content: "recovered".into(),
            tool_result: None,
        }));
        let (mut session, _cancel) = ChatSession::with_policy(
            streaming.clone(),
            fallback.clone(),
            RetrySchedule::immediate(3),
            Duration::from_millis(30),
        );

        let report = session.send_message("hi").await.unwrap();

        // 1 + max_retries streaming attempts, then exactly one fallback.
        assert_eq!(streaming.attempt_count(), 4);
        assert_eq!(fallback.call_count(), 1);
        assert!(!report.cancelled);
        let message = assistant_message(&session);
        assert_eq!(message.content, "recovered");
        assert_eq!(message.status, MessageStatus::Success);
        assert_eq!(session.state(), StreamState::Idle);
    }

    #[tokio::test]
    async fn fallback_confirmation_reply_sets_affordance_in_one_shot() {
        let streaming = ScriptedStreaming::new(vec![
            ScriptedAttempt::OpenError(TransportError::Connect("down".into())),
            ScriptedAttempt::OpenError(TransportError::Connect("down".into())),
            ScriptedAttempt::OpenError(TransportError::Connect("down".into())),
            ScriptedAttempt::OpenError(TransportError::Connect("down".into())),
        ]);
        let fallback = ScriptedFallback::new(Ok(FallbackReply::ConfirmationRequired {
            content: "Confirm adding Ana?".into(),
            pending_call_id: "p-9".into(),
            tool_name: "add_guest".into(),
            preview: Some(serde_json::json!({"actionLabel": "Add Guest"})),
        }));
        let (mut session, _cancel) = session(streaming, fallback);

        let report = session.send_message("add ana").await.unwrap();

        assert_eq!(report.proposed_calls.len(), 1);
        let message = assistant_message(&session);
        assert_eq!(message.status, MessageStatus::Success);
        let confirmation = message.pending_confirmation.as_ref().unwrap();
        assert_eq!(confirmation.pending_call_id, "p-9");
        assert!(confirmation.preview.is_some());
    }

    #[tokio::test]
    async fn both_paths_failing_finalizes_error() {
        let streaming = ScriptedStreaming::new(vec![
            ScriptedAttempt::OpenError(TransportError::Connect("down".into())),
            ScriptedAttempt::OpenError(TransportError::Connect("down".into())),
            ScriptedAttempt::OpenError(TransportError::Connect("down".into())),
            ScriptedAttempt::OpenError(TransportError::Connect("down".into())),
        ]);
        let fallback = ScriptedFallback::new(Err(TransportError::Status(500)));
        let (mut session, _cancel) = session(streaming, fallback.clone());

        let err = session.send_message("hi").await.unwrap_err();

        assert!(matches!(err, SendError::Failed(_)));
        assert_eq!(fallback.call_count(), 1);
        let message = assistant_message(&session);
        assert_eq!(message.status, MessageStatus::Error);
        assert_eq!(session.state(), StreamState::Error);
    }

    #[tokio::test]
    async fn protocol_error_event_is_terminal_without_fallback() {
        let streaming = ScriptedStreaming::new(vec![ScriptedAttempt::Events(vec![Ok(
            AssistantEvent::Error {
                message: "overloaded".into(),
            },
        )])]);
        let fallback = ScriptedFallback::unused();
        let (mut session, _cancel) = session(streaming, fallback.clone());

        let err = session.send_message("hi").await.unwrap_err();

        assert!(matches!(err, SendError::Protocol(_)));
        assert_eq!(fallback.call_count(), 0);
        assert_eq!(assistant_message(&session).status, MessageStatus::Error);
        assert_eq!(session.state(), StreamState::Error);
    }

    #[tokio::test]
    async fn cancel_aborts_without_erroring_the_placeholder() {
        let streaming = ScriptedStreaming::new(vec![ScriptedAttempt::Hang]);
        let (mut session, cancel) = ChatSession::with_policy(
            streaming,
            ScriptedFallback::unused(),
            RetrySchedule::immediate(3),
            Duration::from_secs(30),
        );

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let report = session.send_message("hi").await.unwrap();
        canceller.await.unwrap();

        assert!(report.cancelled);
        assert_eq!(session.state(), StreamState::Idle);
        assert_ne!(assistant_message(&session).status, MessageStatus::Error);
    }

    #[tokio::test]
    async fn final_status_is_always_terminal_after_send() {
        // Streaming always times out, fallback errors: the worst case.
        let streaming = ScriptedStreaming::new(vec![]);
        let fallback = ScriptedFallback::new(Ok(FallbackReply::Error {
            content: "nope".into(),
        }));
        let (mut session, _cancel) = ChatSession::with_policy(
            streaming,
            fallback,
            RetrySchedule::immediate(1),
            Duration::from_millis(20),
        );

        let _ = session.send_message("hi").await;

        let message = assistant_message(&session);
        assert!(message.status.is_terminal(), "status {:?}", message.status);
    }
}
