//! Device session events.

use alloc::string::String;
use core::fmt;

use axerrno::AxError;

use crate::device::SessionId;

/// Why a session ended abnormally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    /// Failure category.
    pub kind: AxError,
    /// Human readable detail supplied by the device.
    pub message: String,
}

impl SessionFailure {
    /// Creates a new failure cause.
    pub fn new(kind: AxError, message: &str) -> Self {
        Self {
            kind,
            message: String::from(message),
        }
    }
}

impl From<AxError> for SessionFailure {
    fn from(kind: AxError) -> Self {
        Self {
            kind,
            message: String::new(),
        }
    }
}

impl fmt::Display for SessionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{:?}: {}", self.kind, self.message)
        }
    }
}

/// The two events a device reports about its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session became usable.
    Opened,
    /// The session ended. `Some` carries the failure cause.
    Closed(Option<SessionFailure>),
}

/// An event waiting in the channel together with the session it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEvent {
    /// The session that emitted the event.
    pub session: SessionId,
    /// Sequence number assigned by the channel (for ordering).
    pub sequence: u64,
    /// The event itself.
    pub event: SessionEvent,
}
