//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom handlers into a task
//! group's lifecycle notifications (logging, metrics, test recorders).
//!
//! ## Contract
//! - Called synchronously from inside the scheduling tick that produced the
//!   notification; keep handlers short and non-blocking.
//! - A panicking handler is isolated: the panic is caught, reported through
//!   `tracing` and to the remaining subscribers, and the group carries on.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use cotask::{LifecycleEvent, LifecycleKind, Subscribe};
//!
//! #[derive(Default)]
//! struct FailureCounter(AtomicUsize);
//!
//! impl Subscribe for FailureCounter {
//!     fn on_event(&self, ev: &LifecycleEvent) {
//!         if ev.kind == LifecycleKind::TaskFailed {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use crate::lifecycle::LifecycleEvent;

/// Contract for lifecycle subscribers.
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single notification.
    fn on_event(&self, event: &LifecycleEvent);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
