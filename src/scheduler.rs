//! Exclusive device-session scheduler.
//!
//! At most one session is active at any time. Further requests wait in a
//! FIFO and are started one after another as sessions close.
//!
//! # Threading
//!
//! Requests may be queued from any thread and devices may report events from
//! their own threads, but the state-transition entry points
//! ([`start_with_device`], [`close_service`] and [`dispatch_events`]) must be
//! serialized by the host, typically on a single dispatch task.
//!
//! The scheduler uses four independent locks (request queue, listeners,
//! active slot, event channel). None is held while another is taken, and no
//! collaborator is called with any of them held, except for observer
//! callbacks, which run under the listener lock.
//!
//! [`start_with_device`]: SessionScheduler::start_with_device
//! [`close_service`]: SessionScheduler::close_service
//! [`dispatch_events`]: SessionScheduler::dispatch_events

use alloc::string::String;
use alloc::sync::Arc;
use core::fmt::Debug;
use core::sync::atomic::{AtomicU64, Ordering};

use axerrno::{ax_err, AxResult};
use spin::Mutex;

use crate::cleanup::{CleanupReport, CleanupStep};
use crate::config::SchedulerConfig;
use crate::device::{SessionDevice, SessionId};
use crate::host::{DeviceAnnouncer, HostContext, WakeLock};
use crate::lifecycle::SystemState;
use crate::listener::{ListenerRegistry, ObserverId, StatusObserver};
use crate::notify::{EventChannel, SessionEvent, SessionFailure, SessionNotifier};
use crate::queue::{RequestQueue, SessionRequest};
use crate::stats::SchedulerStats;

/// The session occupying the active slot.
struct ActiveSession<C> {
    id: SessionId,
    request: SessionRequest<C>,
    wake_lock_held: bool,
}

/// Snapshot of the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Session id.
    pub id: SessionId,
    /// Name of the device the session runs on.
    pub device_name: String,
    /// Arrival sequence number of the originating request.
    pub request_seq: u64,
}

#[derive(Default)]
struct Diagnostics {
    last_failure: Option<SessionFailure>,
    last_cleanup: Option<CleanupReport>,
}

/// Serializes device sessions so that at most one is active at a time.
pub struct SessionScheduler<C> {
    config: SchedulerConfig,
    queue: RequestQueue<C>,
    slot: Mutex<Option<ActiveSession<C>>>,
    listeners: ListenerRegistry,
    events: Arc<EventChannel>,
    host: Arc<dyn HostContext>,
    wake_lock: Arc<dyn WakeLock>,
    announcer: Arc<dyn DeviceAnnouncer>,
    next_session: AtomicU64,
    diagnostics: Mutex<Diagnostics>,
    stats: SchedulerStats,
}

impl<C: Debug + Send + Sync + 'static> SessionScheduler<C> {
    /// Creates an idle scheduler bound to the host's collaborators.
    pub fn new(
        config: SchedulerConfig,
        host: Arc<dyn HostContext>,
        wake_lock: Arc<dyn WakeLock>,
        announcer: Arc<dyn DeviceAnnouncer>,
    ) -> Self {
        let waker_host = Arc::clone(&host);
        let events = EventChannel::new().with_waker(move || waker_host.schedule_dispatch());

        Self {
            config,
            queue: RequestQueue::new(),
            slot: Mutex::new(None),
            listeners: ListenerRegistry::new(),
            events: Arc::new(events),
            host,
            wake_lock,
            announcer,
            next_session: AtomicU64::new(1),
            diagnostics: Mutex::new(Diagnostics::default()),
            stats: SchedulerStats::new(),
        }
    }

    /// Queues a session on `device` with `config`.
    ///
    /// If the scheduler is idle the host is asked to start and the request is
    /// started right away. While a session is running the request only waits
    /// in the queue; the active session is never interrupted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the device reports an empty name.
    pub fn start_with_device(&self, device: Arc<dyn SessionDevice<C>>, config: C) -> AxResult {
        if device.name().is_empty() {
            return ax_err!(InvalidInput, "session device has no name");
        }

        self.queue.enqueue(device, config);
        self.stats.record_enqueued();

        if self.is_running() {
            return Ok(());
        }

        if let Err(err) = self.host.request_start() {
            warn!("Host refused to start: {:?}", err);
        }
        self.advance();
        Ok(())
    }

    /// Asks the active device to close. Does nothing while idle.
    ///
    /// The state only changes once the device's close event is dispatched.
    pub fn close_service(&self) -> AxResult {
        let device = match self.slot.lock().as_ref() {
            Some(active) => Arc::clone(active.request.device()),
            None => {
                debug!("Close requested while idle");
                return Ok(());
            }
        };

        info!("Closing device {}", device.name());
        device.close()
    }

    /// Processes every pending device event. Returns the number handled.
    ///
    /// Events pushed while dispatching (for example a device that closes
    /// synchronously) are handled in the same call.
    pub fn dispatch_events(&self) -> usize {
        let mut handled = 0;
        while let Some(pending) = self.events.pop() {
            trace!(
                "Dispatching event #{} for session {:?}",
                pending.sequence, pending.session
            );
            match pending.event {
                SessionEvent::Opened => self.on_opened(pending.session),
                SessionEvent::Closed(failure) => self.on_closed(pending.session, failure),
            }
            handled += 1;
        }
        handled
    }

    /// Adds a status observer and immediately tells it the current state.
    pub fn register_status_observer(&self, observer: Arc<dyn StatusObserver>) -> ObserverId {
        self.listeners.register(observer)
    }

    /// Removes a status observer. Returns `false` if it was not registered.
    pub fn unregister_status_observer(&self, id: ObserverId) -> bool {
        self.listeners.unregister(id)
    }

    /// Gets the number of registered status observers.
    pub fn observer_count(&self) -> usize {
        self.listeners.len()
    }

    /// Point-in-time check whether a session is active.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.listeners.is_running()
    }

    /// Gets the current scheduler state.
    #[inline]
    pub fn state(&self) -> SystemState {
        self.listeners.state()
    }

    /// Gets a snapshot of the active session, if any.
    pub fn active_session(&self) -> Option<SessionInfo> {
        self.slot.lock().as_ref().map(|active| SessionInfo {
            id: active.id,
            device_name: String::from(active.request.device().name()),
            request_seq: active.request.seq(),
        })
    }

    /// Gets the number of requests waiting behind the active session.
    pub fn pending_requests(&self) -> usize {
        self.queue.len()
    }

    /// Gets the failure cause of the most recent abnormal close.
    pub fn last_failure(&self) -> Option<SessionFailure> {
        self.diagnostics.lock().last_failure.clone()
    }

    /// Gets the cleanup report of the most recently finished session.
    pub fn last_cleanup(&self) -> Option<CleanupReport> {
        self.diagnostics.lock().last_cleanup.clone()
    }

    /// Gets the scheduler statistics.
    #[inline]
    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Gets the scheduler configuration.
    #[inline]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn next_session_id(&self) -> SessionId {
        SessionId(self.next_session.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the active device if `id` names the active session.
    fn active_device(&self, id: SessionId) -> Option<Arc<dyn SessionDevice<C>>> {
        match self.slot.lock().as_ref() {
            Some(active) if active.id == id => Some(Arc::clone(active.request.device())),
            _ => None,
        }
    }

    /// Starts queued requests until one opens or the queue is empty.
    fn advance(&self) {
        while let Some(request) = self.queue.dequeue() {
            let id = self.next_session_id();
            let device = Arc::clone(request.device());
            let config = Arc::clone(request.config());

            if self.is_running() {
                info!("Restarting");
            }
            info!(
                "Starting session {:?} with device {} (request #{})",
                id,
                device.name(),
                request.seq()
            );
            debug!("Arguments {:?}", config);

            *self.slot.lock() = Some(ActiveSession {
                id,
                request,
                wake_lock_held: false,
            });
            self.stats.record_started();
            self.listeners.publish(SystemState::Running);

            let notifier = SessionNotifier::new(id, Arc::clone(&self.events));
            let opened = device.open(&config, notifier);

            if let Err(err) = self.host.begin_keep_alive() {
                warn!("Failed to enter keep-alive context: {:?}", err);
            }

            match opened {
                Ok(()) => return,
                Err(err) => {
                    error!("Failed to open device {}: {:?}", device.name(), err);
                    self.finish_session(id, &device, Some(SessionFailure::new(err, "open failed")));
                }
            }
        }

        self.enter_idle();
    }

    fn enter_idle(&self) {
        info!("Closing service");
        self.listeners.publish(SystemState::Idle);
        self.listeners.clear();
        self.host.request_stop();
    }

    fn on_opened(&self, id: SessionId) {
        let Some(device) = self.active_device(id) else {
            warn!("Dropping open event for stale session {:?}", id);
            self.stats.record_stale_event();
            return;
        };

        info!(
            "Session {:?} on device {} is open and ready to accept clients",
            id,
            device.name()
        );

        if !self.config.acquire_wake_lock {
            return;
        }

        match self
            .wake_lock
            .acquire(&self.config.wake_lock_tag, self.config.wake_lock_timeout_ms)
        {
            Ok(()) => {
                if let Some(active) = self.slot.lock().as_mut().filter(|a| a.id == id) {
                    active.wake_lock_held = true;
                }
                debug!("Acquired wake lock {}", self.config.wake_lock_tag);
            }
            Err(err) => warn!("Failed to acquire wake lock: {:?}", err),
        }
    }

    fn on_closed(&self, id: SessionId, failure: Option<SessionFailure>) {
        let Some(device) = self.active_device(id) else {
            warn!("Dropping close event for stale session {:?}", id);
            self.stats.record_stale_event();
            return;
        };

        self.finish_session(id, &device, failure);
        self.advance();
    }

    /// Runs the close sequence for the active session `id`.
    ///
    /// Order: detach announcement, keep-alive teardown, slot release, wake
    /// lock release. Each step runs even if an earlier one failed.
    fn finish_session(
        &self,
        id: SessionId,
        device: &Arc<dyn SessionDevice<C>>,
        failure: Option<SessionFailure>,
    ) {
        match &failure {
            None => info!("Session {:?} closed successfully", id),
            Some(cause) => warn!("Session {:?} closed due to {}", id, cause),
        }
        self.stats.record_closed(failure.is_some());

        let mut report = CleanupReport::new(id);
        report.run(CleanupStep::AnnounceDetached, || {
            self.announcer.device_detached(device.name())
        });
        report.run(CleanupStep::EndKeepAlive, || self.host.end_keep_alive());

        let released = self.slot.lock().take();
        let wake_lock_held = released.is_some_and(|active| active.wake_lock_held);

        if wake_lock_held && report.run(CleanupStep::ReleaseWakeLock, || self.wake_lock.release()) {
            debug!("Wake lock released");
        }

        self.stats.record_cleanup_errors(report.failures().len());

        let mut diagnostics = self.diagnostics.lock();
        if failure.is_some() {
            diagnostics.last_failure = failure;
        }
        diagnostics.last_cleanup = Some(report);
    }
}

impl<C> Drop for SessionScheduler<C> {
    fn drop(&mut self) {
        if let Some(active) = self.slot.get_mut() {
            warn!(
                "Dropping scheduler while session {:?} on device {} is active",
                active.id,
                active.request.device().name()
            );
        }

        let pending = self.queue.len();
        if pending > 0 {
            warn!("Discarding {} pending requests", pending);
        }
        self.queue.clear();

        // Devices may still hold notifiers for the channel
        self.events.clear();
    }
}

impl<C> core::fmt::Debug for SessionScheduler<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionScheduler")
            .field("state", &self.listeners.state())
            .field("pending_requests", &self.queue.len())
            .field("observers", &self.listeners.len())
            .finish()
    }
}
