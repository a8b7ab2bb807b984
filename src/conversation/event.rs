//! Events that drive the conversation

use crate::proxy::{ChatReply, ClarifyReply};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserSubmit { text: String, turn: u64 },
    Reset,

    // Backend events
    ClarifyReply { turn: u64, reply: ClarifyReply },
    ChatReply { turn: u64, reply: ChatReply },
    RequestFailed { turn: u64, reason: FailureReason },
}

/// Why an outbound call produced no usable reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Unreachable, non-2xx or malformed reply
    Upstream,
    TimedOut,
    Cancelled,
}
