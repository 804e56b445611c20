//! Scheduler lifecycle state.
//!
//! The published state is kept in a single `AtomicU8` so that point-in-time
//! queries (`is_running()`) never need to take a lock. Only the listener
//! registry writes it, and only while holding its own lock, which keeps the
//! stored state and the observers' view of it in step.
//!
//! # State Transitions
//!
//! ```text
//! ┌──────┐  session started       ┌─────────┐
//! │ Idle │ ─────────────────────> │ Running │ ──┐ close processed,
//! └──────┘                        └─────────┘ <─┘ next request popped
//!    ^                                 │
//!    └──── close processed, queue empty┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Scheduler states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SystemState {
    /// No session is active.
    #[default]
    Idle = 0,
    /// Exactly one session occupies the active slot.
    Running = 1,
}

impl SystemState {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => SystemState::Running,
            _ => SystemState::Idle,
        }
    }

    /// Returns `true` for [`SystemState::Running`].
    #[inline]
    pub const fn is_running(self) -> bool {
        matches!(self, SystemState::Running)
    }
}

/// Atomic holder for a [`SystemState`].
pub struct StateCell(AtomicU8);

impl StateCell {
    /// Creates a new cell in the Idle state.
    pub const fn new() -> Self {
        Self(AtomicU8::new(SystemState::Idle as u8))
    }

    /// Gets the current state.
    #[inline]
    pub fn get(&self) -> SystemState {
        SystemState::from_raw(self.0.load(Ordering::Acquire))
    }

    /// Stores `state`, returning the previous one.
    #[inline]
    pub fn replace(&self, state: SystemState) -> SystemState {
        SystemState::from_raw(self.0.swap(state as u8, Ordering::AcqRel))
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for StateCell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("StateCell").field(&self.get()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_cell_initial_state() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), SystemState::Idle);
        assert!(!cell.get().is_running());
    }

    #[test]
    fn test_state_cell_replace() {
        let cell = StateCell::new();

        assert_eq!(cell.replace(SystemState::Running), SystemState::Idle);
        assert_eq!(cell.get(), SystemState::Running);

        // Re-publishing the same state reports it as the previous one
        assert_eq!(cell.replace(SystemState::Running), SystemState::Running);

        assert_eq!(cell.replace(SystemState::Idle), SystemState::Running);
        assert_eq!(cell.get(), SystemState::Idle);
    }
}
