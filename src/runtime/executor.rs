//! Conversation controller
//!
//! Drives the pure state machine: applies each transition under the session
//! lock, records messages, and performs the requested network call with the
//! lock released so a second submission is refused instead of queued.

use super::traits::ProxyBackend;
use crate::conversation::{
    transition, ConvContext, ConvState, Effect, Event, FailureReason, Message, PendingClarification,
    Phase, TransitionError,
};
use crate::i18n::Language;
use crate::proxy::ProxyError;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Point-in-time view of a conversation
#[derive(Debug, Clone, Serialize)]
pub struct ConversationView {
    pub id: String,
    pub language: Language,
    pub phase: Phase,
    pub awaiting_reply: bool,
    pub pending_clarification: Option<PendingClarification>,
    /// Result of the last connection check, if one ran
    pub connected: Option<bool>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Default)]
struct Session {
    state: ConvState,
    messages: Vec<Message>,
    last_turn: u64,
    /// Cancels the outstanding call
    in_flight: Option<CancellationToken>,
    connected: Option<bool>,
}

/// Network call requested by a transition
#[derive(Debug)]
enum Request {
    Clarify { turn: u64, message: String },
    Chat { turn: u64, message: String },
}

impl Request {
    fn turn(&self) -> u64 {
        match self {
            Request::Clarify { turn, .. } | Request::Chat { turn, .. } => *turn,
        }
    }
}

/// Owns one conversation and executes its effects against a backend
pub struct ConversationController<B: ProxyBackend + 'static> {
    context: ConvContext,
    backend: Arc<B>,
    request_timeout: Option<Duration>,
    session: Mutex<Session>,
}

impl<B: ProxyBackend + 'static> ConversationController<B> {
    pub fn new(context: ConvContext, backend: Arc<B>, request_timeout: Option<Duration>) -> Self {
        Self {
            context,
            backend,
            request_timeout,
            session: Mutex::new(Session::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.context.conversation_id
    }

    pub fn language(&self) -> Language {
        self.context.language
    }

    pub async fn state(&self) -> ConvState {
        self.session.lock().await.state.clone()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.session.lock().await.messages.clone()
    }

    pub async fn view(&self) -> ConversationView {
        let session = self.session.lock().await;
        ConversationView {
            id: self.context.conversation_id.clone(),
            language: self.context.language,
            phase: session.state.phase(),
            awaiting_reply: session.state.is_awaiting_reply(),
            pending_clarification: session.state.pending_clarification().cloned(),
            connected: session.connected,
            messages: session.messages.clone(),
        }
    }

    /// Submit user text and wait for the turn to settle.
    ///
    /// Empty text and submissions made while a reply is outstanding are
    /// refused without touching the conversation. The turn runs on its own
    /// task, so it still settles (reply, failure, timeout or cancel) if the
    /// caller stops waiting.
    pub async fn submit(
        self: &Arc<Self>,
        text: impl Into<String>,
    ) -> Result<ConversationView, TransitionError> {
        let turn = {
            let mut session = self.session.lock().await;
            session.last_turn += 1;
            session.last_turn
        };

        let controller = Arc::clone(self);
        let event = Event::UserSubmit {
            text: text.into(),
            turn,
        };
        let task = tokio::spawn(async move { controller.dispatch(event).await });

        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(conv_id = %self.context.conversation_id, error = %e, "Submission ignored");
                return Err(e);
            }
            Err(e) => {
                tracing::error!(conv_id = %self.context.conversation_id, error = %e, "Turn task failed");
            }
        }
        Ok(self.view().await)
    }

    /// Drop all messages and any pending clarification, aborting an outstanding call
    pub async fn reset(&self) -> ConversationView {
        if let Err(e) = self.dispatch(Event::Reset).await {
            tracing::warn!(conv_id = %self.context.conversation_id, error = %e, "Reset failed");
        }
        self.view().await
    }

    /// Abort the outstanding call, if any. The turn ends with a cancellation notice.
    pub async fn cancel(&self) -> bool {
        let session = self.session.lock().await;
        match &session.in_flight {
            Some(token) => {
                tracing::info!(conv_id = %self.context.conversation_id, "Cancelling outstanding request");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Check the backend and remember whether it answered
    pub async fn check_connection(&self) -> bool {
        let connected = match self.bounded(self.backend.health()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    conv_id = %self.context.conversation_id,
                    error = %e,
                    "Backend health check failed"
                );
                false
            }
        };
        self.session.lock().await.connected = Some(connected);
        connected
    }

    /// Feed `event` through the state machine, following up with the replies
    /// of any calls it requests.
    async fn dispatch(&self, event: Event) -> Result<(), TransitionError> {
        let mut request = self.apply(event).await?;

        while let Some((pending, cancel)) = request.take() {
            let reply = self.perform(pending, cancel).await;
            match self.apply(reply).await {
                Ok(next) => request = next,
                Err(e) => {
                    // The conversation moved on (reset) while the call was out
                    tracing::debug!(
                        conv_id = %self.context.conversation_id,
                        error = %e,
                        "Discarding reply"
                    );
                }
            }
        }

        Ok(())
    }

    /// Run one transition under the lock and return the call it requests, if any
    async fn apply(
        &self,
        event: Event,
    ) -> Result<Option<(Request, CancellationToken)>, TransitionError> {
        let mut session = self.session.lock().await;
        let result = transition(&session.state, &self.context, event)?;
        session.state = result.new_state;

        let mut request = None;
        for effect in result.effects {
            match effect {
                Effect::RecordMessage { role, content } => {
                    session.messages.push(Message::new(role, content));
                }
                Effect::ClearMessages => session.messages.clear(),
                Effect::CancelInFlight => {
                    if let Some(token) = session.in_flight.take() {
                        token.cancel();
                    }
                }
                Effect::RequestClarification { turn, message } => {
                    request = Some(Request::Clarify { turn, message });
                }
                Effect::RequestChat { turn, message } => {
                    request = Some(Request::Chat { turn, message });
                }
            }
        }

        if !session.state.is_awaiting_reply() {
            session.in_flight = None;
        }

        Ok(request.map(|request| {
            let token = CancellationToken::new();
            session.in_flight = Some(token.clone());
            (request, token)
        }))
    }

    /// Perform a call and translate its outcome into the next event
    async fn perform(&self, request: Request, cancel: CancellationToken) -> Event {
        let turn = request.turn();
        let backend = &self.backend;
        let call = async move {
            match request {
                Request::Clarify { turn, message } => backend
                    .clarify(&message)
                    .await
                    .map(|reply| Event::ClarifyReply { turn, reply }),
                Request::Chat { turn, message } => backend
                    .chat(&message)
                    .await
                    .map(|reply| Event::ChatReply { turn, reply }),
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::info!(conv_id = %self.context.conversation_id, turn, "Request cancelled");
                Event::RequestFailed { turn, reason: FailureReason::Cancelled }
            }
            result = self.bounded(call) => match result {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!(
                        conv_id = %self.context.conversation_id,
                        turn,
                        kind = ?e.kind,
                        error = %e.message,
                        "Backend request failed"
                    );
                    let reason = if e.kind.is_timeout() {
                        FailureReason::TimedOut
                    } else {
                        FailureReason::Upstream
                    };
                    Event::RequestFailed { turn, reason }
                }
            }
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, ProxyError>>,
    ) -> Result<T, ProxyError> {
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                Err(ProxyError::timeout(format!(
                    "No reply within {}ms",
                    limit.as_millis()
                )))
            }),
            None => call.await,
        }
    }
}
