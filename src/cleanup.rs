//! Best-effort cleanup with error aggregation.
//!
//! Every step of the close sequence runs regardless of how the previous ones
//! went. Failures are logged, collected into a [`CleanupReport`] and never
//! propagated to the caller.

use alloc::vec::Vec;

use axerrno::{AxError, AxResult};

use crate::device::SessionId;

/// One step of the session close sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStep {
    /// Detach announcement for the closed device.
    AnnounceDetached,
    /// Leaving the host keep-alive context.
    EndKeepAlive,
    /// Releasing the wake lock.
    ReleaseWakeLock,
}

/// Outcome of one session's close sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    session: SessionId,
    attempted: Vec<CleanupStep>,
    failures: Vec<(CleanupStep, AxError)>,
}

impl CleanupReport {
    /// Creates an empty report for `session`.
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            attempted: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Runs `step`, recording and logging its error instead of returning it.
    ///
    /// Returns whether the step succeeded.
    pub fn run<F>(&mut self, step: CleanupStep, f: F) -> bool
    where
        F: FnOnce() -> AxResult,
    {
        self.attempted.push(step);
        match f() {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "Session {:?}: cleanup step {:?} failed: {:?}",
                    self.session, step, err
                );
                self.failures.push((step, err));
                false
            }
        }
    }

    /// Gets the session this report belongs to.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Gets the steps that were attempted, in order.
    pub fn attempted(&self) -> &[CleanupStep] {
        &self.attempted
    }

    /// Gets the steps that failed together with their errors.
    pub fn failures(&self) -> &[(CleanupStep, AxError)] {
        &self.failures
    }

    /// Returns `true` if every attempted step succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
