#![no_std]

//! # Exclusive Device Session Scheduling
//!
//! This crate arbitrates a single hardware device session between
//! overlapping client requests. It is designed for `no_std` environments and
//! uses the `alloc` crate for dynamic memory allocation.
//!
//! ## Architecture
//!
//! ### Core Infrastructure
//! - [`RequestQueue`]: Insertion-ordered FIFO of pending [`SessionRequest`]s
//! - [`ListenerRegistry`]: Status observers plus the last published [`SystemState`]
//! - [`EventChannel`] / [`SessionNotifier`]: Message passing from devices to the scheduler
//! - [`CleanupReport`]: Best-effort close sequence with error aggregation
//!
//! ### High-Level API
//! - [`SessionScheduler`]: The Idle/Running state machine
//! - [`SchedulerConfig`]: Wake-lock tag and timeout
//! - [`SessionDevice`]: Boundary implemented by device drivers
//! - [`HostContext`], [`WakeLock`], [`DeviceAnnouncer`]: Host collaborators
//!
//! ## Guarantees
//!
//! - **Exclusivity**: At most one session occupies the active slot
//! - **Ordering**: Queued requests start strictly in arrival order
//! - **Observer sync**: A new observer is told the current state immediately
//! - **Cleanup**: Every close step runs even if an earlier one failed
//!
//! ## Examples
//!
//! ```rust,ignore
//! use axsession::{SchedulerConfig, SessionScheduler};
//!
//! let scheduler = Arc::new(SessionScheduler::new(
//!     SchedulerConfig::default(),
//!     host,
//!     wake_lock,
//!     announcer,
//! ));
//!
//! scheduler.register_status_observer(ui_observer);
//!
//! // Starts immediately while idle, queues otherwise
//! scheduler.start_with_device(dongle, TcpArguments::parse("-a 0.0.0.0 -p 1234")?)?;
//!
//! // On the host's dispatch task, whenever `HostContext::schedule_dispatch` fires
//! scheduler.dispatch_events();
//!
//! // Ends the active session; the next queued request starts once the
//! // device reports its close
//! scheduler.close_service()?;
//! ```

extern crate alloc;
#[macro_use]
extern crate log;

mod cleanup;
mod config;
mod device;
mod host;
mod lifecycle;
mod listener;
mod notify;
mod queue;
mod scheduler;
mod stats;

pub use cleanup::{CleanupReport, CleanupStep};
pub use config::{DEFAULT_WAKE_LOCK_TAG, DEFAULT_WAKE_LOCK_TIMEOUT_MS, SchedulerConfig};
pub use device::{SessionDevice, SessionId};
pub use host::{DeviceAnnouncer, HostContext, WakeLock};
pub use lifecycle::{StateCell, SystemState};
pub use listener::{ListenerRegistry, ObserverId, StatusObserver};
pub use queue::{RequestQueue, SessionRequest};
pub use scheduler::{SessionInfo, SessionScheduler};
pub use stats::SchedulerStats;

pub use notify::{EventChannel, PendingEvent, SessionEvent, SessionFailure, SessionNotifier};

// Re-export the error types used throughout the public API
pub use axerrno::{AxError, AxResult};
