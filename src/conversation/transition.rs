//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! result; all I/O is expressed as effects.

use super::{ConvContext, ConvState, Effect, Event, FailureReason, PendingClarification};
use thiserror::Error;

/// Assistant text used when the chat reply has no `response`
pub const EMPTY_REPLY_PLACEHOLDER: &str = "(empty)";

const CLARIFICATION_SEPARATOR: &str = "\n[User clarification]: ";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Waiting for a reply, cannot accept another message")]
    Busy,
    #[error("Reply does not belong to the outstanding request")]
    StaleReply,
}

/// Message sent to chat when the user answers a clarification question
pub fn combine_clarification(original_message: &str, answer: &str) -> String {
    format!("{original_message}{CLARIFICATION_SEPARATOR}{answer}")
}

/// Pure transition function
pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // User submissions
        // ============================================================
        (_, Event::UserSubmit { text, .. }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyMessage)
        }

        (ConvState::Clarifying { .. } | ConvState::Generating { .. }, Event::UserSubmit { .. }) => {
            Err(TransitionError::Busy)
        }

        // Idle + submit -> ask whether the request needs clarifying first
        (ConvState::Idle, Event::UserSubmit { text, turn }) => {
            let message = text.trim().to_string();
            Ok(TransitionResult::new(ConvState::Clarifying {
                turn,
                message: message.clone(),
            })
            .with_effect(Effect::record_user(message.clone()))
            .with_effect(Effect::RequestClarification { turn, message }))
        }

        // AwaitingClarification + submit -> chat with the combined request
        (ConvState::AwaitingClarification { pending }, Event::UserSubmit { text, turn }) => {
            let answer = text.trim();
            let message = combine_clarification(&pending.original_message, answer);
            Ok(TransitionResult::new(ConvState::Generating {
                turn,
                answering: Some(pending.clone()),
            })
            .with_effect(Effect::record_user(answer))
            .with_effect(Effect::RequestChat { turn, message }))
        }

        // ============================================================
        // Backend replies
        // ============================================================
        (
            ConvState::Clarifying { turn, message },
            Event::ClarifyReply {
                turn: reply_turn,
                reply,
            },
        ) if *turn == reply_turn => {
            if !reply.clarification_needed {
                return Ok(TransitionResult::new(ConvState::Generating {
                    turn: *turn,
                    answering: None,
                })
                .with_effect(Effect::RequestChat {
                    turn: *turn,
                    message: message.clone(),
                }));
            }

            // A blank question is shown but leaves nothing to answer
            if reply.clarification.trim().is_empty() {
                return Ok(TransitionResult::new(ConvState::Idle)
                    .with_effect(Effect::record_assistant(reply.clarification)));
            }

            let pending = PendingClarification {
                question: reply.clarification.clone(),
                original_message: message.clone(),
            };
            Ok(
                TransitionResult::new(ConvState::AwaitingClarification { pending })
                    .with_effect(Effect::record_assistant(reply.clarification)),
            )
        }

        (
            ConvState::Generating { turn, .. },
            Event::ChatReply {
                turn: reply_turn,
                reply,
            },
        ) if *turn == reply_turn => {
            let content = reply
                .response
                .unwrap_or_else(|| EMPTY_REPLY_PLACEHOLDER.to_string());
            Ok(TransitionResult::new(ConvState::Idle).with_effect(Effect::record_assistant(content)))
        }

        // Any failure ends the turn and drops a pending clarification
        (
            ConvState::Clarifying { turn, .. } | ConvState::Generating { turn, .. },
            Event::RequestFailed {
                turn: failed_turn,
                reason,
            },
        ) if *turn == failed_turn => {
            let notice = match reason {
                FailureReason::Cancelled => &context.cancelled_notice,
                FailureReason::Upstream | FailureReason::TimedOut => &context.server_error_notice,
            };
            Ok(TransitionResult::new(ConvState::Idle)
                .with_effect(Effect::record_assistant(notice.clone())))
        }

        (
            _,
            Event::ClarifyReply { .. } | Event::ChatReply { .. } | Event::RequestFailed { .. },
        ) => Err(TransitionError::StaleReply),

        // ============================================================
        // Reset
        // ============================================================
        (state, Event::Reset) => {
            let mut result = TransitionResult::new(ConvState::Idle).with_effect(Effect::ClearMessages);
            if state.is_awaiting_reply() {
                result = result.with_effect(Effect::CancelInFlight);
            }
            Ok(result)
        }
    }
}
