//! Session event channel.
//!
//! Devices push events from whatever thread their driver runs on; the
//! scheduler drains them on the host's dispatch context. The channel only
//! ever holds its own lock, so pushing never contends with queue or
//! listener operations.

use alloc::collections::VecDeque;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

use spin::Mutex;

use crate::device::SessionId;

use super::event::{PendingEvent, SessionEvent};

/// FIFO of device events awaiting dispatch.
pub struct EventChannel {
    /// Pending events in arrival order.
    queue: Mutex<VecDeque<PendingEvent>>,

    /// Sequence counter for arrival ordering.
    sequence: AtomicU64,

    /// Invoked after every push, outside the queue lock.
    waker: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl EventChannel {
    /// Creates an empty channel with no waker.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            sequence: AtomicU64::new(0),
            waker: None,
        }
    }

    /// Sets a function that is called whenever an event arrives.
    ///
    /// Hosts use this to schedule a dispatch pass on their serialized
    /// context instead of polling.
    pub fn with_waker<F>(mut self, waker: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.waker = Some(Arc::new(waker));
        self
    }

    /// Appends an event for `session`.
    pub fn push(&self, session: SessionId, event: SessionEvent) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        trace!(
            "Session {:?} pushed event #{}: {:?}",
            session, sequence, event
        );
        self.queue.lock().push_back(PendingEvent {
            session,
            sequence,
            event,
        });

        if let Some(ref waker) = self.waker {
            waker();
        }
    }

    /// Pops the oldest pending event.
    pub fn pop(&self) -> Option<PendingEvent> {
        self.queue.lock().pop_front()
    }

    /// Gets the number of pending events.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Checks if no events are pending.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Drops every pending event.
    pub fn clear(&self) {
        self.queue.lock().clear();
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::SessionFailure;
    use axerrno::AxError;
    use core::sync::atomic::AtomicUsize;

    #[test]
    fn test_channel_fifo() {
        let channel = EventChannel::new();
        channel.push(SessionId(1), SessionEvent::Opened);
        channel.push(SessionId(1), SessionEvent::Closed(None));
        channel.push(SessionId(2), SessionEvent::Opened);
        assert_eq!(channel.len(), 3);

        let first = channel.pop().unwrap();
        assert_eq!(first.session, SessionId(1));
        assert_eq!(first.event, SessionEvent::Opened);

        let second = channel.pop().unwrap();
        assert_eq!(second.event, SessionEvent::Closed(None));
        assert!(second.sequence > first.sequence);

        assert_eq!(channel.pop().unwrap().session, SessionId(2));
        assert!(channel.pop().is_none());
        assert!(channel.is_empty());
    }

    #[test]
    fn test_channel_clear() {
        let channel = EventChannel::new();
        for id in 0..5 {
            channel.push(SessionId(id), SessionEvent::Opened);
        }
        assert_eq!(channel.len(), 5);

        channel.clear();
        assert!(channel.is_empty());

        // Sequence numbers keep increasing after a clear
        channel.push(SessionId(9), SessionEvent::Opened);
        assert_eq!(channel.pop().unwrap().sequence, 5);
    }

    #[test]
    fn test_channel_waker() {
        let woken = Arc::new(AtomicUsize::new(0));
        let woken_clone = Arc::clone(&woken);
        let channel = EventChannel::new().with_waker(move || {
            woken_clone.fetch_add(1, Ordering::SeqCst);
        });

        channel.push(SessionId(7), SessionEvent::Opened);
        channel.push(
            SessionId(7),
            SessionEvent::Closed(Some(SessionFailure::new(AxError::Io, "unplugged"))),
        );

        assert_eq!(woken.load(Ordering::SeqCst), 2);
        assert_eq!(channel.len(), 2);
    }
}
