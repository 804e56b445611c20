//! Session notifier handed to devices.
//!
//! A device never talks to the scheduler directly. When its session starts it
//! receives a `SessionNotifier` bound to that session's id and reports
//! progress through it; the events land in the scheduler's [`EventChannel`].

use alloc::sync::Arc;

use crate::device::SessionId;

use super::channel::EventChannel;
use super::event::{SessionEvent, SessionFailure};

/// Sender side of the session event channel.
///
/// Cheap to clone, `Send + Sync`, and safe to use from the device's own
/// threads. Events sent after the session has already been closed are
/// discarded by the scheduler.
#[derive(Clone)]
pub struct SessionNotifier {
    /// The session this notifier belongs to.
    session: SessionId,

    /// Reference to the scheduler's event channel.
    channel: Arc<EventChannel>,
}

impl SessionNotifier {
    /// Creates a new notifier.
    ///
    /// # Arguments
    ///
    /// * `session` - The session id events will be tagged with.
    /// * `channel` - The channel the scheduler drains.
    pub fn new(session: SessionId, channel: Arc<EventChannel>) -> Self {
        Self { session, channel }
    }

    /// Gets the session id for this notifier.
    pub fn session_id(&self) -> SessionId {
        self.session
    }

    /// Sends an arbitrary session event.
    pub fn notify(&self, event: SessionEvent) {
        self.channel.push(self.session, event);
    }

    /// Reports that the session is open and usable.
    pub fn opened(&self) {
        self.notify(SessionEvent::Opened);
    }

    /// Reports that the session ended, with an optional failure cause.
    pub fn closed(&self, failure: Option<SessionFailure>) {
        self.notify(SessionEvent::Closed(failure));
    }
}

impl core::fmt::Debug for SessionNotifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionNotifier")
            .field("session", &self.session)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axerrno::AxError;

    #[test]
    fn test_notifier_tags_events() {
        let channel = Arc::new(EventChannel::new());
        let notifier = SessionNotifier::new(SessionId(3), Arc::clone(&channel));
        assert_eq!(notifier.session_id(), SessionId(3));

        notifier.opened();
        notifier
            .clone()
            .closed(Some(SessionFailure::new(AxError::BadState, "device gone")));

        let opened = channel.pop().unwrap();
        let closed = channel.pop().unwrap();
        assert!(channel.is_empty());
        assert_eq!(opened.session, SessionId(3));
        assert_eq!(closed.session, SessionId(3));
        assert_eq!(opened.event, SessionEvent::Opened);
        assert_eq!(
            closed.event,
            SessionEvent::Closed(Some(SessionFailure::new(AxError::BadState, "device gone")))
        );
    }
}
