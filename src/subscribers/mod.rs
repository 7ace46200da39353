//! # Lifecycle subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] that
//! a [`TaskGroup`](crate::TaskGroup) uses to publish lifecycle notifications.
//!
//! ## Architecture
//! ```text
//! TaskGroup tick ── emit(LifecycleEvent) ──► SubscriberSet
//!                                               │
//!                                   ┌───────────┼───────────┐
//!                                   ▼           ▼           ▼
//!                               LogWriter    Metrics     Custom ...
//! ```
//!
//! ## Optional features
//! - `logging`: exports the built-in [`LogWriter`] _(demo/reference only)_.

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
