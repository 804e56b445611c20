//! Status observer registry.
//!
//! The registry owns the last published [`SystemState`]. Registering an
//! observer and publishing a new state both happen under the same lock, so an
//! observer is synced exactly once with the state current at registration and
//! then sees every later publish, never a duplicate and never a gap.
//!
//! "Running" is announced for every session that starts, including a direct
//! handoff from one session to the next. "Not running" is announced only when
//! the state actually drops to Idle.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicUsize, Ordering};

use spin::Mutex;

use crate::lifecycle::{StateCell, SystemState};

/// Party interested in running / not-running transitions.
///
/// Callbacks run while the registry lock is held, which is a non-reentrant
/// spin lock. They may call `is_running()` and `state()`, which only read an
/// atomic. They must not call anything else that touches the observer set:
/// `register_status_observer()`, `unregister_status_observer()`,
/// `observer_count()` or the scheduler's `Debug` impl would spin forever.
pub trait StatusObserver: Send + Sync {
    /// The scheduler has an active session.
    fn on_server_running(&self);
    /// The scheduler went idle.
    fn on_server_not_running(&self);
}

/// Handle returned by [`ListenerRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(pub usize);

/// Set of observers plus the state they were last told about.
pub struct ListenerRegistry {
    /// Registered observers, keyed by registration id.
    observers: Mutex<BTreeMap<ObserverId, Arc<dyn StatusObserver>>>,

    /// Last published state. Written only while `observers` is locked.
    state: StateCell,

    /// Counter for generating observer ids.
    next_id: AtomicUsize,
}

fn same_observer(a: &Arc<dyn StatusObserver>, b: &Arc<dyn StatusObserver>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

fn sync_observer(observer: &dyn StatusObserver, state: SystemState) {
    match state {
        SystemState::Running => observer.on_server_running(),
        SystemState::Idle => observer.on_server_not_running(),
    }
}

impl ListenerRegistry {
    /// Creates an empty registry in the Idle state.
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(BTreeMap::new()),
            state: StateCell::new(),
            next_id: AtomicUsize::new(1),
        }
    }

    /// Adds `observer` and immediately tells it the current state.
    ///
    /// Registering an observer that is already present keeps the existing
    /// entry and returns its id; the observer is still synced once.
    pub fn register(&self, observer: Arc<dyn StatusObserver>) -> ObserverId {
        let mut observers = self.observers.lock();

        let existing = observers
            .iter()
            .find(|(_, registered)| same_observer(registered, &observer))
            .map(|(id, _)| *id);

        let id = match existing {
            Some(id) => id,
            None => {
                let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
                observers.insert(id, Arc::clone(&observer));
                id
            }
        };

        debug!(
            "Registered status observer {:?} ({} total)",
            id,
            observers.len()
        );
        sync_observer(observer.as_ref(), self.state.get());
        id
    }

    /// Removes one observer. Returns `false` if `id` was not registered.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let removed = self.observers.lock().remove(&id).is_some();
        if removed {
            debug!("Unregistered status observer {:?}", id);
        }
        removed
    }

    /// Records `state` and broadcasts it to every observer.
    ///
    /// Running is always broadcast, so observers hear about each new session.
    /// Idle is broadcast only if the last published state was Running.
    /// Returns whether the state changed.
    pub(crate) fn publish(&self, state: SystemState) -> bool {
        let observers = self.observers.lock();
        let changed = self.state.replace(state) != state;
        if !changed && !state.is_running() {
            return false;
        }

        trace!(
            "Broadcasting {:?} to {} observers",
            state,
            observers.len()
        );
        for observer in observers.values() {
            sync_observer(observer.as_ref(), state);
        }
        changed
    }

    /// Removes every observer.
    pub fn clear(&self) {
        let mut observers = self.observers.lock();
        debug!("Clearing {} status observers", observers.len());
        observers.clear();
    }

    /// Gets the last published state.
    #[inline]
    pub fn state(&self) -> SystemState {
        self.state.get()
    }

    /// Lock-free check of the last published state.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.get().is_running()
    }

    /// Gets the number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.lock().len()
    }

    /// Checks if no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.observers.lock().is_empty()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<bool>>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<bool> {
            self.calls.lock().clone()
        }
    }

    impl StatusObserver for Recorder {
        fn on_server_running(&self) {
            self.calls.lock().push(true);
        }

        fn on_server_not_running(&self) {
            self.calls.lock().push(false);
        }
    }

    #[test]
    fn test_register_syncs_idle_state() {
        let registry = ListenerRegistry::new();
        let recorder = Arc::new(Recorder::default());

        registry.register(recorder.clone());
        assert_eq!(recorder.calls(), [false]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_syncs_running_state() {
        let registry = ListenerRegistry::new();
        assert!(registry.publish(SystemState::Running));

        let recorder = Arc::new(Recorder::default());
        registry.register(recorder.clone());
        assert_eq!(recorder.calls(), [true]);
    }

    #[test]
    fn test_publish_repeats_running_only() {
        let registry = ListenerRegistry::new();
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        registry.register(a.clone());
        registry.register(b.clone());

        // Idle while idle is silent
        assert!(!registry.publish(SystemState::Idle));
        assert!(registry.publish(SystemState::Running));
        // A second session is announced again, but is not a transition
        assert!(!registry.publish(SystemState::Running));
        assert!(registry.publish(SystemState::Idle));
        assert!(!registry.publish(SystemState::Idle));

        assert_eq!(a.calls(), [false, true, true, false]);
        assert_eq!(b.calls(), [false, true, true, false]);
        assert!(!registry.is_running());
    }

    #[test]
    fn test_callback_may_read_state() {
        struct StateReader {
            registry: Arc<ListenerRegistry>,
            seen: Mutex<Vec<(bool, bool)>>,
        }

        impl StatusObserver for StateReader {
            fn on_server_running(&self) {
                self.seen.lock().push((true, self.registry.is_running()));
            }

            fn on_server_not_running(&self) {
                self.seen.lock().push((false, self.registry.is_running()));
            }
        }

        let registry = Arc::new(ListenerRegistry::new());
        let reader = Arc::new(StateReader {
            registry: Arc::clone(&registry),
            seen: Mutex::new(Vec::new()),
        });
        registry.register(reader.clone());
        registry.publish(SystemState::Running);
        registry.publish(SystemState::Idle);

        // The published state is visible from inside the callback
        assert_eq!(
            *reader.seen.lock(),
            [(false, false), (true, true), (false, false)]
        );
        registry.clear();
    }

    #[test]
    fn test_register_same_observer_twice() {
        let registry = ListenerRegistry::new();
        let recorder = Arc::new(Recorder::default());

        let first = registry.register(recorder.clone());
        let second = registry.register(recorder.clone());
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);

        // Synced on each registration, but broadcast to one entry
        registry.publish(SystemState::Running);
        assert_eq!(recorder.calls(), [false, false, true]);
    }

    #[test]
    fn test_unregister_stops_callbacks() {
        let registry = ListenerRegistry::new();
        let recorder = Arc::new(Recorder::default());
        let id = registry.register(recorder.clone());
        assert_eq!(Arc::strong_count(&recorder), 2);

        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert_eq!(Arc::strong_count(&recorder), 1);

        registry.publish(SystemState::Running);
        assert_eq!(recorder.calls(), [false]);
    }

    #[test]
    fn test_clear_drops_observers() {
        let registry = ListenerRegistry::new();
        let recorder = Arc::new(Recorder::default());
        registry.register(recorder.clone());
        registry.register(Arc::new(Recorder::default()));

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(Arc::strong_count(&recorder), 1);
    }
}
