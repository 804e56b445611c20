//! Host collaborators.
//!
//! The scheduler does not know how the host keeps its process alive, how it
//! holds the device awake or how it tells the rest of the system about
//! attached devices. Those mechanisms are injected at construction through
//! the traits below.

use axerrno::AxResult;

/// The host's background-execution / keep-alive mechanism.
pub trait HostContext: Send + Sync {
    /// Asks the host to start the service that owns the scheduler.
    ///
    /// Called by `start_with_device` when the scheduler is idle.
    fn request_start(&self) -> AxResult;

    /// Enters the keep-alive context for a starting session.
    fn begin_keep_alive(&self) -> AxResult;

    /// Leaves the keep-alive context once a session ended.
    fn end_keep_alive(&self) -> AxResult;

    /// Asks the host to stop the service; the queue has drained.
    fn request_stop(&self);

    /// A device event arrived and `dispatch_events` should be scheduled on
    /// the host's serialized context.
    fn schedule_dispatch(&self) {}
}

/// The platform wake-lock service.
pub trait WakeLock: Send + Sync {
    /// Acquires the lock for at most `timeout_ms` milliseconds.
    fn acquire(&self, tag: &str, timeout_ms: u64) -> AxResult;

    /// Releases a previously acquired lock.
    fn release(&self) -> AxResult;
}

/// Broadcasts attach/detach announcements to the wider application.
pub trait DeviceAnnouncer: Send + Sync {
    /// A device finished opening. Sent by device adapters, not by the scheduler.
    fn device_attached(&self, name: &str, supported_commands: &[u32]) -> AxResult;

    /// A device's session was closed.
    fn device_detached(&self, name: &str) -> AxResult;
}
