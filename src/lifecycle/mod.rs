//! Lifecycle notifications emitted by task groups.
//!
//! Groups report what they do (runs starting and ending, tasks being added,
//! started, finished or failing, events arriving) as [`LifecycleEvent`]s. The
//! group hands each notification to its [`SubscriberSet`](crate::SubscriberSet)
//! synchronously, inside the tick that produced it.
//!
//! ## Contents
//! - [`LifecycleKind`], [`LifecycleEvent`] classification and payload metadata

mod event;

pub use event::{LifecycleEvent, LifecycleKind};
