//! The chat controller: session state machine, typing indicator ownership,
//! and the chat request queue.
//!
//! Every operation is split into a synchronous `begin_*` step that validates
//! input, updates the transcript and returns the [`Request`] to issue, and a
//! synchronous [`ChatWidget::complete`] step that applies the reply. The
//! terminal loop runs the network call in between on a background task;
//! [`ChatWidget::start_session`] and [`ChatWidget::send`] chain the three
//! steps for callers that can simply await.
//!
//! Session phases:
//!
//! ```text
//! Idle ──start──▶ Starting ──ok / degraded──▶ Active
//!                   │  ▲
//!          failure  ▼  │ start (retry)
//!                  Failed
//! ```
//!
//! A start issued while `Starting` supersedes the pending one; the superseded
//! reply is dropped when it arrives.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, error, info, warn};

use crate::api::{ApiError, ApiReply, ChatBackend, ChatResponse, StartSessionResponse};
use crate::core::log::{ChatLog, NodeId};
use crate::core::message::{fallback, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    StartSession {
        id: RequestId,
        user_id: String,
    },
    Chat {
        id: RequestId,
        user_id: String,
        message: String,
    },
}

impl Request {
    pub fn id(&self) -> RequestId {
        match self {
            Request::StartSession { id, .. } | Request::Chat { id, .. } => *id,
        }
    }

    pub fn is_start_session(&self) -> bool {
        matches!(self, Request::StartSession { .. })
    }
}

#[derive(Debug)]
pub enum Reply {
    StartSession(Result<ApiReply<StartSessionResponse>, ApiError>),
    Chat(Result<ApiReply<ChatResponse>, ApiError>),
}

#[derive(Debug)]
pub struct Completion {
    pub id: RequestId,
    pub reply: Reply,
}

/// How a chat request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The server answered with a usable response.
    Answered,
    /// The server replied, but with an error status or no response text.
    NoResponse,
    /// The request never got a decodable reply.
    Failed,
}

impl ChatOutcome {
    pub fn of(result: &Result<ApiReply<ChatResponse>, ApiError>) -> Self {
        match result {
            Ok(reply) if reply.is_ok() && reply.body.usable_response().is_some() => {
                ChatOutcome::Answered
            }
            Ok(_) => ChatOutcome::NoResponse,
            Err(_) => ChatOutcome::Failed,
        }
    }
}

impl Completion {
    /// `None` for session starts.
    pub fn chat_outcome(&self) -> Option<ChatOutcome> {
        match &self.reply {
            Reply::Chat(result) => Some(ChatOutcome::of(result)),
            Reply::StartSession(_) => None,
        }
    }
}

/// Issue `request` against `backend` and package the outcome.
pub async fn perform<B: ChatBackend + ?Sized>(backend: &B, request: Request) -> Completion {
    match request {
        Request::StartSession { id, user_id } => Completion {
            id,
            reply: Reply::StartSession(backend.start_session(&user_id).await),
        },
        Request::Chat {
            id,
            user_id,
            message,
        } => Completion {
            id,
            reply: Reply::Chat(backend.chat(&user_id, &message).await),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Starting { request: RequestId, user_id: String },
    Active,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TypingSlot {
    owner: RequestId,
    node: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetState {
    current_user: Option<String>,
    thread_id: Option<String>,
    phase: SessionPhase,
    typing: Option<TypingSlot>,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            current_user: None,
            thread_id: None,
            phase: SessionPhase::Idle,
            typing: None,
        }
    }
}

impl WidgetState {
    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_active(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn typing_owner(&self) -> Option<RequestId> {
        self.typing.map(|slot| slot.owner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartRejected {
    EmptyUserId,
    AlreadyActive { user_id: String },
}

impl fmt::Display for StartRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartRejected::EmptyUserId => f.write_str(fallback::NAME_REQUIRED),
            StartRejected::AlreadyActive { user_id } => {
                write!(f, "A session is already active for {user_id}.")
            }
        }
    }
}

impl std::error::Error for StartRejected {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty text or no active session; nothing changed.
    Ignored,
    /// Issue this request now.
    Dispatch(Request),
    /// Rendered and queued behind the chat request already in flight.
    Queued,
}

impl SendOutcome {
    pub fn accepted(&self) -> bool {
        !matches!(self, SendOutcome::Ignored)
    }
}

#[derive(Debug, Default)]
pub struct ChatWidget {
    state: WidgetState,
    log: ChatLog,
    last_request: u64,
    chat_in_flight: Option<RequestId>,
    chat_queue: VecDeque<Request>,
}

impl ChatWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ChatLog {
        &mut self.log
    }

    pub fn queued_chats(&self) -> usize {
        self.chat_queue.len()
    }

    pub fn is_busy(&self) -> bool {
        self.state.typing.is_some_and(|slot| self.log.contains(slot.node))
    }

    pub fn add_message(&mut self, role: Role, text: &str) -> NodeId {
        debug!(role = role.as_str(), chars = text.chars().count(), "message added");
        self.log.push_message(role, text)
    }

    /// Make `request` the owner of the typing indicator. An attached
    /// indicator moves to the end of the log; otherwise a new one is attached.
    pub fn show_typing(&mut self, request: RequestId) {
        match self.state.typing {
            Some(slot) if self.log.contains(slot.node) => {
                self.log.move_to_end(slot.node);
                self.state.typing = Some(TypingSlot {
                    owner: request,
                    node: slot.node,
                });
            }
            _ => {
                let node = self.log.attach_typing();
                self.state.typing = Some(TypingSlot {
                    owner: request,
                    node,
                });
            }
        }
    }

    /// Remove the indicator if `request` owns it. Returns whether the slot
    /// was released.
    pub fn hide_typing(&mut self, request: RequestId) -> bool {
        let Some(slot) = self.state.typing else {
            return false;
        };
        if slot.owner != request {
            return false;
        }
        self.state.typing = None;
        if self.log.contains(slot.node) {
            self.log.remove(slot.node);
        }
        true
    }

    pub fn begin_start_session(&mut self, user_id: &str) -> Result<Request, StartRejected> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(StartRejected::EmptyUserId);
        }
        if let Some(active) = &self.state.current_user {
            return Err(StartRejected::AlreadyActive {
                user_id: active.clone(),
            });
        }

        let id = self.next_request_id();
        if let SessionPhase::Starting { request, .. } = &self.state.phase {
            debug!(superseded = %request, by = %id, "session start superseded");
        }
        self.state.phase = SessionPhase::Starting {
            request: id,
            user_id: user_id.to_string(),
        };
        self.show_typing(id);
        info!(request = %id, user_id, "starting session");

        Ok(Request::StartSession {
            id,
            user_id: user_id.to_string(),
        })
    }

    pub fn begin_send(&mut self, text: &str) -> SendOutcome {
        let message = text.trim();
        if message.is_empty() {
            return SendOutcome::Ignored;
        }
        let Some(user_id) = self.state.current_user.clone() else {
            return SendOutcome::Ignored;
        };

        self.add_message(Role::User, message);
        let id = self.next_request_id();
        self.show_typing(id);

        let request = Request::Chat {
            id,
            user_id,
            message: message.to_string(),
        };

        if self.chat_in_flight.is_some() {
            debug!(request = %id, queued = self.chat_queue.len() + 1, "chat request queued");
            self.chat_queue.push_back(request);
            SendOutcome::Queued
        } else {
            self.chat_in_flight = Some(id);
            SendOutcome::Dispatch(request)
        }
    }

    /// Apply a finished request. Returns the next queued chat request, if
    /// this completion freed the chat slot.
    pub fn complete(&mut self, completion: Completion) -> Option<Request> {
        let Completion { id, reply } = completion;
        match reply {
            Reply::StartSession(result) => {
                self.complete_start_session(id, result);
                None
            }
            Reply::Chat(result) => self.complete_chat(id, result),
        }
    }

    fn complete_start_session(
        &mut self,
        id: RequestId,
        result: Result<ApiReply<StartSessionResponse>, ApiError>,
    ) {
        let user_id = match &self.state.phase {
            SessionPhase::Starting { request, user_id } if *request == id => user_id.clone(),
            _ => {
                debug!(request = %id, "dropping stale session start reply");
                return;
            }
        };

        self.hide_typing(id);

        match result {
            Ok(reply) => {
                if reply.is_ok() {
                    if let Some(greeting) = reply.body.usable_message() {
                        let greeting = greeting.to_string();
                        self.log.clear();
                        self.activate(user_id, reply.body.thread_id.clone());
                        self.add_message(Role::Assistant, &greeting);
                        return;
                    }
                }
                warn!(
                    request = %id,
                    status = reply.status.as_u16(),
                    payload = %reply.raw,
                    "session start reply has no usable message"
                );
                self.add_message(Role::Assistant, fallback::WELCOME);
                self.activate(user_id, reply.body.thread_id.clone());
            }
            Err(err) => {
                error!(request = %id, error = %err, "session start failed");
                self.state.phase = SessionPhase::Failed;
                self.add_message(Role::Assistant, fallback::START_FAILED);
            }
        }
    }

    fn activate(&mut self, user_id: String, thread_id: Option<String>) {
        info!(user_id = %user_id, thread_id = thread_id.as_deref().unwrap_or("-"), "session active");
        self.state.current_user = Some(user_id);
        self.state.thread_id = thread_id;
        self.state.phase = SessionPhase::Active;
    }

    fn complete_chat(
        &mut self,
        id: RequestId,
        result: Result<ApiReply<ChatResponse>, ApiError>,
    ) -> Option<Request> {
        if self.chat_in_flight != Some(id) {
            warn!(request = %id, "ignoring reply for a chat request that is not in flight");
            return None;
        }
        self.chat_in_flight = None;
        self.hide_typing(id);

        match result {
            Ok(reply) => match reply.body.usable_response().filter(|_| reply.is_ok()) {
                Some(answer) => {
                    let answer = answer.to_string();
                    self.add_message(Role::Assistant, &answer);
                }
                None => {
                    warn!(
                        request = %id,
                        status = reply.status.as_u16(),
                        payload = %reply.raw,
                        "chat reply has no usable response"
                    );
                    self.add_message(Role::Assistant, fallback::NO_RESPONSE);
                }
            },
            Err(err) => {
                error!(request = %id, error = %err, "chat request failed");
                self.add_message(Role::Assistant, fallback::NETWORK_ERROR);
            }
        }

        let next = self.chat_queue.pop_front()?;
        self.chat_in_flight = Some(next.id());
        Some(next)
    }

    /// Start a session and wait for the reply.
    pub async fn start_session<B: ChatBackend + ?Sized>(
        &mut self,
        backend: &B,
        user_id: &str,
    ) -> Result<(), StartRejected> {
        let request = self.begin_start_session(user_id)?;
        let completion = perform(backend, request).await;
        self.complete(completion);
        Ok(())
    }

    /// Send a message and wait for the reply. Returns false when the text
    /// was ignored.
    pub async fn send<B: ChatBackend + ?Sized>(&mut self, backend: &B, text: &str) -> bool {
        let outcome = self.begin_send(text);
        let mut next = match &outcome {
            SendOutcome::Dispatch(request) => Some(request.clone()),
            SendOutcome::Queued | SendOutcome::Ignored => None,
        };
        while let Some(request) = next {
            let completion = perform(backend, request).await;
            next = self.complete(completion);
        }
        outcome.accepted()
    }

    fn next_request_id(&mut self) -> RequestId {
        self.last_request += 1;
        RequestId(self.last_request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_server::closed_base_url;
    use crate::api::{HttpBackend, MemoriesResponse};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    type StartResult = Result<ApiReply<StartSessionResponse>, ApiError>;
    type ChatResult = Result<ApiReply<ChatResponse>, ApiError>;

    #[derive(Default)]
    struct FakeBackend {
        starts: Mutex<VecDeque<StartResult>>,
        chats: Mutex<VecDeque<ChatResult>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn with_start(self, result: StartResult) -> Self {
            self.starts.lock().unwrap().push_back(result);
            self
        }

        fn with_chat(self, result: ChatResult) -> Self {
            self.chats.lock().unwrap().push_back(result);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for FakeBackend {
        async fn start_session(&self, user_id: &str) -> StartResult {
            self.calls.lock().unwrap().push(format!("start:{user_id}"));
            self.starts
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected start_session call")
        }

        async fn chat(&self, user_id: &str, message: &str) -> ChatResult {
            self.calls
                .lock()
                .unwrap()
                .push(format!("chat:{user_id}:{message}"));
            self.chats
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected chat call")
        }

        async fn memories(&self, _user_id: &str) -> Result<ApiReply<MemoriesResponse>, ApiError> {
            unreachable!("widget never lists memories")
        }
    }

    fn ok<T: serde::de::DeserializeOwned + Default>(json: &str) -> Result<ApiReply<T>, ApiError> {
        ApiReply::decode(StatusCode::OK, json)
    }

    fn not_json<T: serde::de::DeserializeOwned + Default>() -> Result<ApiReply<T>, ApiError> {
        ApiReply::decode(StatusCode::OK, "<html>oops</html>")
    }

    fn messages(widget: &ChatWidget) -> Vec<(Role, String)> {
        widget
            .log()
            .messages()
            .map(|(role, text)| (role, text.to_string()))
            .collect()
    }

    async fn active_widget(user: &str) -> ChatWidget {
        let backend = FakeBackend::default().with_start(ok(r#"{"message":"Hi"}"#));
        let mut widget = ChatWidget::new();
        widget.start_session(&backend, user).await.expect("start");
        widget
    }

    #[test]
    fn show_typing_twice_attaches_one_indicator() {
        let mut widget = ChatWidget::new();
        widget.show_typing(RequestId(1));
        widget.show_typing(RequestId(1));
        assert_eq!(widget.log().typing_count(), 1);
        assert_eq!(widget.log().len(), 1);
    }

    #[test]
    fn hide_typing_without_indicator_is_a_no_op() {
        let mut widget = ChatWidget::new();
        widget.add_message(Role::User, "hello");
        let before = widget.log().entries().to_vec();

        assert!(!widget.hide_typing(RequestId(7)));
        assert_eq!(widget.log().entries(), before.as_slice());
    }

    #[test]
    fn hide_typing_after_log_was_cleared_releases_slot() {
        let mut widget = ChatWidget::new();
        widget.show_typing(RequestId(1));
        widget.log_mut().clear();

        assert!(widget.hide_typing(RequestId(1)));
        assert!(widget.state().typing_owner().is_none());
        assert!(widget.log().is_empty());
    }

    #[test]
    fn show_typing_reattaches_when_indicator_was_detached() {
        let mut widget = ChatWidget::new();
        widget.show_typing(RequestId(1));
        widget.log_mut().clear();
        widget.show_typing(RequestId(2));

        assert_eq!(widget.log().typing_count(), 1);
        assert_eq!(widget.state().typing_owner(), Some(RequestId(2)));
    }

    #[test]
    fn only_the_owner_can_hide_typing() {
        let mut widget = ChatWidget::new();
        widget.show_typing(RequestId(1));
        widget.show_typing(RequestId(2));

        assert!(!widget.hide_typing(RequestId(1)));
        assert_eq!(widget.log().typing_count(), 1);
        assert!(widget.hide_typing(RequestId(2)));
        assert_eq!(widget.log().typing_count(), 0);
    }

    #[tokio::test]
    async fn empty_user_id_is_rejected_without_network() {
        let backend = FakeBackend::default();
        let mut widget = ChatWidget::new();

        let err = widget
            .start_session(&backend, "   ")
            .await
            .expect_err("should reject");

        assert_eq!(err, StartRejected::EmptyUserId);
        assert_eq!(err.to_string(), fallback::NAME_REQUIRED);
        assert!(backend.calls().is_empty());
        assert_eq!(widget.state().phase(), &SessionPhase::Idle);
        assert!(widget.log().is_empty());
    }

    #[tokio::test]
    async fn successful_start_clears_log_and_greets() {
        let backend = FakeBackend::default()
            .with_start(ok(r#"{"message":"Hi","thread_id":"th_9"}"#));
        let mut widget = ChatWidget::new();
        widget.add_message(Role::Assistant, "earlier noise");

        widget.start_session(&backend, "  ana ").await.expect("start");

        assert_eq!(messages(&widget), vec![(Role::Assistant, "Hi".to_string())]);
        assert_eq!(widget.log().len(), 1);
        assert_eq!(widget.state().current_user(), Some("ana"));
        assert_eq!(widget.state().thread_id(), Some("th_9"));
        assert_eq!(widget.state().phase(), &SessionPhase::Active);
        assert_eq!(backend.calls(), vec!["start:ana".to_string()]);
    }

    #[tokio::test]
    async fn start_without_message_activates_with_fallback_welcome() {
        let backend = FakeBackend::default().with_start(ok("{}"));
        let mut widget = ChatWidget::new();

        widget.start_session(&backend, "ana").await.expect("start");

        assert_eq!(widget.state().current_user(), Some("ana"));
        assert_eq!(
            messages(&widget),
            vec![(Role::Assistant, fallback::WELCOME.to_string())]
        );
        assert_eq!(widget.log().typing_count(), 0);
    }

    #[tokio::test]
    async fn start_with_error_status_and_json_body_is_degraded() {
        let backend = FakeBackend::default().with_start(ApiReply::decode(
            StatusCode::BAD_REQUEST,
            r#"{"message":"nope"}"#,
        ));
        let mut widget = ChatWidget::new();

        widget.start_session(&backend, "ana").await.expect("start");

        assert!(widget.state().is_active());
        assert_eq!(
            messages(&widget),
            vec![(Role::Assistant, fallback::WELCOME.to_string())]
        );
    }

    #[tokio::test]
    async fn failed_start_leaves_session_unset_and_allows_retry() {
        let backend = FakeBackend::default()
            .with_start(not_json())
            .with_start(ok(r#"{"message":"Welcome back"}"#));
        let mut widget = ChatWidget::new();

        widget.start_session(&backend, "ana").await.expect("start");
        assert_eq!(widget.state().phase(), &SessionPhase::Failed);
        assert!(widget.state().current_user().is_none());
        assert_eq!(
            messages(&widget),
            vec![(Role::Assistant, fallback::START_FAILED.to_string())]
        );
        assert_eq!(widget.log().typing_count(), 0);

        widget.start_session(&backend, "ana").await.expect("retry");
        assert_eq!(widget.state().current_user(), Some("ana"));
        assert_eq!(
            messages(&widget),
            vec![(Role::Assistant, "Welcome back".to_string())]
        );
    }

    #[tokio::test]
    async fn second_start_after_activation_is_rejected() {
        let mut widget = active_widget("ana").await;
        let backend = FakeBackend::default();

        let err = widget
            .start_session(&backend, "bob")
            .await
            .expect_err("should reject");

        assert_eq!(
            err,
            StartRejected::AlreadyActive {
                user_id: "ana".to_string()
            }
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn send_without_session_does_nothing() {
        let backend = FakeBackend::default();
        let mut widget = ChatWidget::new();

        assert!(!widget.send(&backend, "hello").await);
        assert!(backend.calls().is_empty());
        assert!(widget.log().is_empty());
    }

    #[tokio::test]
    async fn send_blank_text_does_nothing() {
        let mut widget = active_widget("ana").await;
        let backend = FakeBackend::default();
        let before = widget.log().len();

        assert!(!widget.send(&backend, " \n ").await);
        assert!(backend.calls().is_empty());
        assert_eq!(widget.log().len(), before);
    }

    #[tokio::test]
    async fn send_renders_user_message_then_answer() {
        let mut widget = active_widget("ana").await;
        let backend = FakeBackend::default().with_chat(ok(r#"{"response":"Hello"}"#));

        assert!(widget.send(&backend, "hi there").await);

        assert_eq!(
            messages(&widget),
            vec![
                (Role::Assistant, "Hi".to_string()),
                (Role::User, "hi there".to_string()),
                (Role::Assistant, "Hello".to_string()),
            ]
        );
        assert_eq!(backend.calls(), vec!["chat:ana:hi there".to_string()]);
        assert_eq!(widget.log().typing_count(), 0);
    }

    #[tokio::test]
    async fn send_with_empty_response_shows_fallback() {
        let mut widget = active_widget("ana").await;
        let backend = FakeBackend::default().with_chat(ok(r#"{"response":""}"#));

        widget.send(&backend, "hi").await;

        let last = messages(&widget).pop().expect("message");
        assert_eq!(last, (Role::Assistant, fallback::NO_RESPONSE.to_string()));
    }

    #[tokio::test]
    async fn send_with_non_json_reply_shows_network_error() {
        let mut widget = active_widget("ana").await;
        let backend = FakeBackend::default().with_chat(not_json());

        widget.send(&backend, "hi").await;

        let last = messages(&widget).pop().expect("message");
        assert_eq!(last, (Role::Assistant, fallback::NETWORK_ERROR.to_string()));
    }

    #[tokio::test]
    async fn transport_failure_during_chat_clears_indicator() {
        let mut widget = active_widget("ana").await;
        let backend = HttpBackend::new(closed_base_url().await, None).expect("client");

        assert!(widget.send(&backend, "anyone there?").await);

        let all = messages(&widget);
        assert_eq!(
            &all[1..],
            &[
                (Role::User, "anyone there?".to_string()),
                (Role::Assistant, fallback::NETWORK_ERROR.to_string()),
            ]
        );
        assert_eq!(widget.log().typing_count(), 0);
        assert!(!widget.is_busy());
    }

    #[tokio::test]
    async fn overlapping_sends_are_queued_and_answered_in_order() {
        let mut widget = active_widget("ana").await;

        let first = match widget.begin_send("first") {
            SendOutcome::Dispatch(request) => request,
            other => panic!("expected dispatch, got {other:?}"),
        };
        assert_eq!(widget.begin_send("second"), SendOutcome::Queued);
        assert_eq!(widget.queued_chats(), 1);
        assert_eq!(widget.log().typing_count(), 1);

        let next = widget
            .complete(Completion {
                id: first.id(),
                reply: Reply::Chat(ok(r#"{"response":"one"}"#)),
            })
            .expect("queued request should be released");
        assert!(matches!(&next, Request::Chat { message, .. } if message == "second"));
        // The indicator belongs to the latest request and stays up.
        assert_eq!(widget.log().typing_count(), 1);
        assert!(widget.is_busy());

        let after = widget.complete(Completion {
            id: next.id(),
            reply: Reply::Chat(ok(r#"{"response":"two"}"#)),
        });
        assert!(after.is_none());
        assert_eq!(widget.log().typing_count(), 0);

        let texts: Vec<String> = messages(&widget).into_iter().map(|(_, t)| t).collect();
        assert_eq!(texts, vec!["Hi", "first", "second", "one", "two"]);
    }

    #[test]
    fn superseded_start_reply_is_dropped() {
        let mut widget = ChatWidget::new();
        let stale = widget.begin_start_session("ana").expect("first start");
        let current = widget.begin_start_session("bob").expect("second start");
        assert_eq!(widget.log().typing_count(), 1);

        let released = widget.complete(Completion {
            id: stale.id(),
            reply: Reply::StartSession(ok(r#"{"message":"Hi ana"}"#)),
        });
        assert!(released.is_none());
        assert!(widget.state().current_user().is_none());
        assert_eq!(widget.log().typing_count(), 1);

        widget.complete(Completion {
            id: current.id(),
            reply: Reply::StartSession(ok(r#"{"message":"Hi bob"}"#)),
        });
        assert_eq!(widget.state().current_user(), Some("bob"));
        assert_eq!(messages(&widget), vec![(Role::Assistant, "Hi bob".to_string())]);
    }

    #[test]
    fn chat_outcome_follows_status_and_body() {
        let completion = |reply: Result<ApiReply<ChatResponse>, ApiError>| Completion {
            id: RequestId(1),
            reply: Reply::Chat(reply),
        };

        assert_eq!(
            completion(ok(r#"{"response":"Hello"}"#)).chat_outcome(),
            Some(ChatOutcome::Answered)
        );
        assert_eq!(
            completion(ok(r#"{"response":"  "}"#)).chat_outcome(),
            Some(ChatOutcome::NoResponse)
        );
        assert_eq!(
            completion(ApiReply::decode(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"response":"Hello"}"#
            ))
            .chat_outcome(),
            Some(ChatOutcome::NoResponse)
        );
        assert_eq!(
            completion(ApiReply::decode(StatusCode::OK, "<html>")).chat_outcome(),
            Some(ChatOutcome::Failed)
        );
    }
}
