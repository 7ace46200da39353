//! Event sources: where a task group gets its next event from.
//!
//! A [`TaskGroup`](crate::TaskGroup) blocks on exactly one source call per tick;
//! that call is the only suspension point of the scheduler. Sources are
//! injected at construction instead of read from process-wide state, so several
//! independent groups can be fed with their own event sequences.
//!
//! ## Contents
//! - [`Event`], [`Value`] event payload
//! - [`EventSource`] the pull contract
//! - [`ScriptedSource`] fixed event queue (tests, replays)
//! - [`ChannelSource`], [`EventSender`] bridge from other tasks/threads
//! - [`shutdown`] OS signal → termination event
//!
//! [`TaskContext`](crate::TaskContext) also implements [`EventSource`]; that is
//! how nested groups pull their events from the outer group.

mod channel;
mod event;
mod scripted;
pub mod shutdown;

use async_trait::async_trait;

pub use channel::{ChannelSource, EventSender, event_channel};
pub use event::{Event, TERMINATE_TAG, Value};
pub use scripted::ScriptedSource;

/// Blocking provider of the next environment event.
///
/// Returning `None` means the source is exhausted; a running group treats that
/// as [`GroupError::SourceClosed`](crate::GroupError::SourceClosed).
/// A source used by a long-lived host must produce the termination event
/// when the process is asked to shut down.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use cotask::{Event, EventSource};
///
/// struct Ticks(u32);
///
/// #[async_trait(?Send)]
/// impl EventSource for Ticks {
///     async fn next_event(&mut self) -> Option<Event> {
///         self.0 += 1;
///         Some(Event::new("timer").with_value(self.0))
///     }
/// }
/// ```
#[async_trait(?Send)]
pub trait EventSource {
    /// Waits for the next event.
    async fn next_event(&mut self) -> Option<Event>;
}

#[async_trait(?Send)]
impl<S: EventSource + ?Sized> EventSource for Box<S> {
    async fn next_event(&mut self) -> Option<Event> {
        (**self).next_event().await
    }
}
