use axerrno::AxResult;

use crate::notify::SessionNotifier;

/// Unique identifier for one started session.
///
/// Ids are handed out by the scheduler in increasing order and are never
/// reused, so an event tagged with an old id can always be told apart from
/// one belonging to the active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

/// A device that can host one session at a time.
///
/// The scheduler only drives the device through this boundary; the device
/// itself performs the actual open/close and reports progress through the
/// [`SessionNotifier`] it receives in [`open`](SessionDevice::open).
///
/// # Contract
///
/// - `open` must not block on device I/O. Completion is reported later with
///   [`SessionNotifier::opened`].
/// - Every `open` that returns `Ok(())` must eventually be followed by exactly
///   one [`SessionNotifier::closed`], whether the session ended cleanly or not.
/// - If `open` returns an error, the scheduler considers the session finished
///   and will not wait for a close event.
pub trait SessionDevice<C>: Send + Sync {
    /// Identity reported in attach/detach announcements. Must not be empty.
    fn name(&self) -> &str;

    /// Starts opening the device with `config`.
    fn open(&self, config: &C, notifier: SessionNotifier) -> AxResult;

    /// Asks the device to end its session.
    ///
    /// The session is only considered over once the device sends its close
    /// event.
    fn close(&self) -> AxResult;
}
