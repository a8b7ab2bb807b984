//! Property-based tests for the conversation state machine
//!
//! These tests verify key invariants hold across arbitrary event sequences.

use super::*;
use crate::i18n::Language;
use crate::proxy::{ChatReply, ClarifyReply};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> ConvContext {
    ConvContext {
        conversation_id: "test-conv".to_string(),
        language: Language::En,
        server_error_notice: "server error".to_string(),
        cancelled_notice: "cancelled".to_string(),
    }
}

/// Replay `events`, returning every (state, result) pair that was accepted
fn run(events: Vec<Event>) -> Vec<(ConvState, Vec<Effect>)> {
    let ctx = test_context();
    let mut state = ConvState::Idle;
    let mut accepted = Vec::new();
    for event in events {
        if let Ok(result) = transition(&state, &ctx, event) {
            state = result.new_state;
            accepted.push((state.clone(), result.effects));
        }
    }
    accepted
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-zA-Z0-9 ,.]{1,30}",
        1 => "[ \t\n]{0,3}",
    ]
}

fn arb_failure_reason() -> impl Strategy<Value = FailureReason> {
    prop_oneof![
        Just(FailureReason::Upstream),
        Just(FailureReason::TimedOut),
        Just(FailureReason::Cancelled),
    ]
}

fn arb_clarify_reply() -> impl Strategy<Value = ClarifyReply> {
    (any::<bool>(), "[a-zA-Z? ]{0,20}").prop_map(|(clarification_needed, clarification)| {
        ClarifyReply {
            clarification_needed,
            clarification,
        }
    })
}

fn arb_chat_reply() -> impl Strategy<Value = ChatReply> {
    proptest::option::of("[a-zA-Z ]{0,20}").prop_map(|response| ChatReply { response })
}

fn arb_event() -> impl Strategy<Value = Event> {
    let turn = 0u64..4;
    prop_oneof![
        4 => (arb_text(), turn.clone()).prop_map(|(text, turn)| Event::UserSubmit { text, turn }),
        3 => (turn.clone(), arb_clarify_reply()).prop_map(|(turn, reply)| Event::ClarifyReply { turn, reply }),
        3 => (turn.clone(), arb_chat_reply()).prop_map(|(turn, reply)| Event::ChatReply { turn, reply }),
        2 => (turn, arb_failure_reason()).prop_map(|(turn, reason)| Event::RequestFailed { turn, reason }),
        1 => Just(Event::Reset),
    ]
}

fn arb_busy_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![
        (0u64..4, "[a-z ]{1,10}").prop_map(|(turn, message)| ConvState::Clarifying { turn, message }),
        (0u64..4, proptest::option::of(("[a-z?]{1,10}", "[a-z ]{1,10}"))).prop_map(
            |(turn, answering)| ConvState::Generating {
                turn,
                answering: answering.map(|(question, original_message)| PendingClarification {
                    question,
                    original_message,
                }),
            }
        ),
    ]
}

// ============================================================================
// Invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // The phase is AWAITING_CLARIFICATION exactly when a pending clarification exists.
    // Blank questions end the turn in Idle, so a pending question is never blank
    #[test]
    fn prop_pending_clarification_is_paired(events in proptest::collection::vec(arb_event(), 0..30)) {
        for (state, _) in run(events) {
            match state.pending_clarification() {
                Some(pending) => {
                    prop_assert_eq!(state.phase(), Phase::AwaitingClarification);
                    prop_assert!(!pending.question.trim().is_empty());
                    prop_assert!(!pending.original_message.trim().is_empty());
                }
                None => {
                    prop_assert_eq!(state.phase(), Phase::Idle);
                }
            }
        }
    }

    // A request effect is only issued when the new state awaits that exact request
    #[test]
    fn prop_requests_match_in_flight_state(events in proptest::collection::vec(arb_event(), 0..30)) {
        for (state, effects) in run(events) {
            let requests: Vec<&Effect> = effects.iter().filter(|e| e.is_request()).collect();
            prop_assert!(requests.len() <= 1);
            if let Some(request) = requests.first() {
                let turn = match request {
                    Effect::RequestClarification { turn, .. } => {
                        prop_assert!(matches!(state, ConvState::Clarifying { .. }), "state {:?}", state);
                        *turn
                    }
                    Effect::RequestChat { turn, .. } => {
                        prop_assert!(matches!(state, ConvState::Generating { .. }), "state {:?}", state);
                        *turn
                    }
                    _ => unreachable!(),
                };
                prop_assert_eq!(state.in_flight_turn(), Some(turn));
            }
        }
    }

    // Every accepted event appends at most one message
    #[test]
    fn prop_at_most_one_message_per_step(events in proptest::collection::vec(arb_event(), 0..30)) {
        for (_, effects) in run(events) {
            let recorded = effects
                .iter()
                .filter(|e| matches!(e, Effect::RecordMessage { .. }))
                .count();
            prop_assert!(recorded <= 1);
        }
    }

    // Submitting while a call is outstanding never changes anything
    #[test]
    fn prop_busy_rejects_submissions(state in arb_busy_state(), text in arb_text(), turn in 0u64..8) {
        let result = transition(&state, &test_context(), Event::UserSubmit { text, turn });
        prop_assert!(matches!(
            result,
            Err(TransitionError::Busy | TransitionError::EmptyMessage)
        ));
    }

    // Failures always land in Idle with one assistant notice and nothing pending
    #[test]
    fn prop_failure_returns_to_idle(state in arb_busy_state(), reason in arb_failure_reason()) {
        let turn = state.in_flight_turn().unwrap_or_default();
        let result = transition(&state, &test_context(), Event::RequestFailed { turn, reason }).unwrap();
        prop_assert_eq!(&result.new_state, &ConvState::Idle);
        prop_assert_eq!(result.effects.len(), 1);
        let is_assistant_notice = matches!(
            &result.effects[0],
            Effect::RecordMessage { role: Role::Assistant, .. }
        );
        prop_assert!(is_assistant_notice);
    }

    // A reply asking for clarification never leads to a chat call
    #[test]
    fn prop_clarification_needed_never_chats(message in "[a-z ]{1,20}", question in "[a-zA-Z? \t]{0,20}", turn in 0u64..4) {
        let state = ConvState::Clarifying { turn, message };
        let event = Event::ClarifyReply { turn, reply: ClarifyReply::needed(question.clone()) };
        let result = transition(&state, &test_context(), event).unwrap();

        prop_assert!(!result.effects.iter().any(Effect::is_request));
        prop_assert_eq!(result.effects, vec![Effect::record_assistant(question)]);
        prop_assert!(!result.new_state.is_awaiting_reply());
    }

    // Answering a clarification sends the original request and the trimmed answer, in that order
    #[test]
    fn prop_answer_follows_original_request(original in "[^\n]{1,40}", answer in "[a-z][a-z ,]{0,30}", turn in 0u64..8) {
        let state = ConvState::AwaitingClarification {
            pending: PendingClarification {
                question: "How many questions?".to_string(),
                original_message: original.clone(),
            },
        };
        let result = transition(&state, &test_context(), Event::UserSubmit { text: format!(" {answer} "), turn }).unwrap();

        let sent = result.effects.iter().find_map(|e| match e {
            Effect::RequestChat { message, .. } => Some(message.clone()),
            _ => None,
        });
        let sent = sent.expect("answer must be sent to chat");
        let parts: Vec<&str> = sent.splitn(2, "\n[User clarification]: ").collect();
        prop_assert_eq!(parts, vec![original.as_str(), answer.trim()]);
        prop_assert_eq!(result.effects[0].clone(), Effect::record_user(answer.trim()));
    }
}
