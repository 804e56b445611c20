//! Device session event channel.
//!
//! This module replaces per-device status callbacks with explicit message
//! passing between the device driver and the scheduler.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Device    │ Receives a `SessionNotifier` in `open()`
//! └──────┬──────┘
//!        │ opened() / closed(cause)
//!        ▼
//! ┌─────────────────────┐
//! │ EventChannel        │ FIFO, tagged with `SessionId`
//! └──────┬──────────────┘
//!        │ dispatch_events()
//!        ▼
//! ┌─────────────────────┐
//! │ SessionScheduler    │ Runs on the host's serialized context
//! └─────────────────────┘
//! ```
//!
//! Only two event kinds exist: [`SessionEvent::Opened`] and
//! [`SessionEvent::Closed`]. Events whose session id does not match the
//! active session are dropped by the scheduler, which is what makes a late
//! or duplicated close harmless.

mod channel;
mod event;
mod notifier;

pub use channel::EventChannel;
pub use event::{PendingEvent, SessionEvent, SessionFailure};
pub use notifier::SessionNotifier;
