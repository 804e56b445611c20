//! FIFO of pending session requests.
//!
//! Requests are served strictly in insertion order: there is no priority,
//! no deduplication and no way to cancel a request once it is queued.

use alloc::collections::VecDeque;
use alloc::sync::Arc;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use spin::Mutex;

use crate::device::SessionDevice;

/// A request to run one session on `device` with `config`.
///
/// Immutable once queued. The queue owns it until it is dequeued, after which
/// it lives in the scheduler's active slot until its close is processed.
pub struct SessionRequest<C> {
    /// Position in arrival order.
    seq: u64,
    /// The device to open.
    device: Arc<dyn SessionDevice<C>>,
    /// The configuration to open it with.
    config: Arc<C>,
}

impl<C> SessionRequest<C> {
    /// Gets the arrival sequence number.
    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Gets the device handle.
    #[inline]
    pub fn device(&self) -> &Arc<dyn SessionDevice<C>> {
        &self.device
    }

    /// Gets the session configuration.
    #[inline]
    pub fn config(&self) -> &Arc<C> {
        &self.config
    }
}

impl<C: fmt::Debug> fmt::Debug for SessionRequest<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRequest")
            .field("seq", &self.seq)
            .field("device", &self.device.name())
            .field("config", &self.config)
            .finish()
    }
}

/// Lock-protected FIFO of [`SessionRequest`]s.
pub struct RequestQueue<C> {
    /// Pending requests, head first.
    queue: Mutex<VecDeque<SessionRequest<C>>>,
    /// Counter for arrival sequence numbers.
    next_seq: AtomicU64,
}

impl<C> RequestQueue<C> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Appends a request to the tail and returns its sequence number.
    pub fn enqueue(&self, device: Arc<dyn SessionDevice<C>>, config: C) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let request = SessionRequest {
            seq,
            device,
            config: Arc::new(config),
        };

        let mut queue = self.queue.lock();
        queue.push_back(request);
        debug!("Queueing request #{} ({} pending)", seq, queue.len());
        seq
    }

    /// Removes and returns the head of the queue.
    pub fn dequeue(&self) -> Option<SessionRequest<C>> {
        self.queue.lock().pop_front()
    }

    /// Gets the number of pending requests.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Checks if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Drops every pending request.
    pub fn clear(&self) {
        self.queue.lock().clear();
    }
}

impl<C> Default for RequestQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::SessionNotifier;
    use axerrno::AxResult;

    struct NamedDevice(&'static str);

    impl SessionDevice<u32> for NamedDevice {
        fn name(&self) -> &str {
            self.0
        }

        fn open(&self, _config: &u32, _notifier: SessionNotifier) -> AxResult {
            Ok(())
        }

        fn close(&self) -> AxResult {
            Ok(())
        }
    }

    #[test]
    fn test_queue_fifo_order() {
        let queue: RequestQueue<u32> = RequestQueue::new();
        let device_a: Arc<dyn SessionDevice<u32>> = Arc::new(NamedDevice("a"));
        let a = queue.enqueue(Arc::clone(&device_a), 1);
        let b = queue.enqueue(Arc::new(NamedDevice("b")), 2);
        let c = queue.enqueue(Arc::clone(&device_a), 3);
        assert!(a < b && b < c);
        assert_eq!(queue.len(), 3);

        let first = queue.dequeue().unwrap();
        assert_eq!(first.device().name(), "a");
        assert_eq!(**first.config(), 1);
        assert_eq!(first.seq(), a);

        let second = queue.dequeue().unwrap();
        assert_eq!(second.device().name(), "b");

        // Same device queued twice is kept twice
        let third = queue.dequeue().unwrap();
        assert_eq!(third.device().name(), "a");
        assert_eq!(**third.config(), 3);

        assert!(queue.dequeue().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_clear() {
        let queue: RequestQueue<u32> = RequestQueue::new();
        queue.enqueue(Arc::new(NamedDevice("a")), 1);
        queue.enqueue(Arc::new(NamedDevice("b")), 2);

        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.dequeue().is_none());

        // Sequence numbers keep increasing after a clear
        let seq = queue.enqueue(Arc::new(NamedDevice("c")), 3);
        assert_eq!(seq, 3);
    }
}
