//! Session-level orchestration of the conversation.

use std::fmt;

pub mod conversation;


pub use conversation::{ControllerOptions, ConversationController};

/// Lifecycle of one session. While a reply is being generated the command
/// holds the controller mutably, so no other state is observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loaded,
    Cleared,
}

/// A command was issued while no session was open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    NotStarted,
    Cleared,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotStarted => write!(f, "no session has been started"),
            SessionError::Cleared => {
                write!(f, "the conversation was cleared; start a new session first")
            }
        }
    }
}

impl std::error::Error for SessionError {}
