//! Conversation state machine
//!
//! Pure transitions in the Elm style: `transition(state, context, event)`
//! yields the next state plus the effects the runtime must carry out.

mod effect;
pub mod event;
mod message;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Event, FailureReason};
pub use message::{Message, Role};
pub use state::{ConvContext, ConvState, PendingClarification, Phase};
pub use transition::{
    combine_clarification, transition, TransitionError, TransitionResult, EMPTY_REPLY_PLACEHOLDER,
};
