//! # Task context and the wait futures tasks suspend on.
//!
//! Every task gets a [`TaskContext`] on its first resume. The context shares a
//! small mailbox ([`Slot`]) with the group:
//!
//! ```text
//!   task body                         group (scheduler)
//!   ─────────                         ─────────────────
//!   ctx.wait_for("timer").await
//!     Wait::poll ── Idle → Waiting(Some("timer")) ──► Pending
//!                                     resume() sees Waiting → Suspended(filter)
//!                                     ... event "timer" arrives ...
//!                                     slot.fill(ev); poll task again
//!     Wait::poll ── Ready(ev) → Idle ──► Ready(ev)
//! ```
//!
//! ## Rules
//! - A wait registers its filter on first poll and completes only after the
//!   group has filled the slot.
//! - A task future that is `Pending` while its slot is `Idle` did not suspend
//!   through the context; the group reports that as
//!   [`TaskError::Unscheduled`](crate::TaskError::Unscheduled).

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;

use crate::source::{Event, EventSource};
use crate::tasks::TaskId;

/// Tag filter declared by a suspended task; `None` accepts any event.
pub type Filter = Option<Arc<str>>;

#[derive(Debug, Default)]
enum SlotState {
    #[default]
    Idle,
    Waiting(Filter),
    Ready(Event),
}

/// Mailbox shared between one task and its group.
#[derive(Debug, Default)]
pub(crate) struct Slot {
    state: RefCell<SlotState>,
}

impl Slot {
    /// The filter of a pending wait, or `None` if the task is not waiting.
    pub(crate) fn waiting_filter(&self) -> Option<Filter> {
        match &*self.state.borrow() {
            SlotState::Waiting(filter) => Some(filter.clone()),
            _ => None,
        }
    }

    /// Hands an event to the waiting task.
    pub(crate) fn fill(&self, ev: Event) {
        *self.state.borrow_mut() = SlotState::Ready(ev);
    }

    /// Drops any registration or undelivered event.
    pub(crate) fn reset(&self) {
        *self.state.borrow_mut() = SlotState::Idle;
    }
}

/// Handle given to a task body; the only way for it to suspend.
#[derive(Clone)]
pub struct TaskContext {
    id: TaskId,
    name: Arc<str>,
    slot: Rc<Slot>,
}

impl TaskContext {
    pub(crate) fn new(id: TaskId, name: Arc<str>, slot: Rc<Slot>) -> Self {
        Self { id, name, slot }
    }

    /// Id of the task within its group.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Name the task was registered with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Suspends until an event tagged `tag` is delivered.
    pub fn wait_for(&self, tag: impl Into<Arc<str>>) -> Wait {
        self.wait(Some(tag.into()))
    }

    /// Suspends until the next event, whatever its tag.
    pub fn wait_any(&self) -> Wait {
        self.wait(None)
    }

    /// Suspends with an explicit filter (`None` = any event).
    pub fn wait(&self, filter: Filter) -> Wait {
        Wait {
            slot: Rc::clone(&self.slot),
            filter: Some(filter),
        }
    }
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// A task context used as the event source of a nested group: every event the
/// outer group delivers to this task is forwarded.
#[async_trait(?Send)]
impl EventSource for TaskContext {
    async fn next_event(&mut self) -> Option<Event> {
        Some(self.wait_any().await)
    }
}

/// Future returned by [`TaskContext::wait_for`] and friends.
#[must_use = "a wait does nothing unless awaited"]
#[derive(Debug)]
pub struct Wait {
    slot: Rc<Slot>,
    // `Some` until the filter has been registered with the slot.
    filter: Option<Filter>,
}

impl Future for Wait {
    type Output = Event;

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Event> {
        let this = &mut *self;
        let mut state = this.slot.state.borrow_mut();
        match std::mem::take(&mut *state) {
            SlotState::Ready(ev) if this.filter.is_none() => Poll::Ready(ev),
            SlotState::Idle => {
                let filter = this.filter.take().flatten();
                *state = SlotState::Waiting(filter);
                Poll::Pending
            }
            other => {
                *state = other;
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::task::noop_waker_ref;

    fn ctx() -> (TaskContext, Rc<Slot>) {
        let slot = Rc::new(Slot::default());
        (TaskContext::new(TaskId::new(1), "t".into(), Rc::clone(&slot)), slot)
    }

    #[test]
    fn test_wait_registers_filter_then_completes() {
        let (ctx, slot) = ctx();
        let mut cx = Context::from_waker(noop_waker_ref());
        let mut wait = Box::pin(ctx.wait_for("timer"));

        assert!(slot.waiting_filter().is_none());
        assert!(wait.as_mut().poll(&mut cx).is_pending());
        assert_eq!(slot.waiting_filter(), Some(Some(Arc::from("timer"))));

        slot.fill(Event::new("timer").with_value(7));
        match wait.as_mut().poll(&mut cx) {
            Poll::Ready(ev) => assert_eq!(ev.value(0).and_then(|v| v.as_int()), Some(7)),
            Poll::Pending => panic!("wait should complete once filled"),
        }
        assert!(slot.waiting_filter().is_none());
    }

    #[test]
    fn test_spurious_poll_keeps_registration() {
        let (ctx, slot) = ctx();
        let mut cx = Context::from_waker(noop_waker_ref());
        let mut wait = Box::pin(ctx.wait_any());

        assert!(wait.as_mut().poll(&mut cx).is_pending());
        assert!(wait.as_mut().poll(&mut cx).is_pending());
        assert_eq!(slot.waiting_filter(), Some(None));
    }

    #[test]
    fn test_fresh_wait_does_not_steal_undelivered_event() {
        let (ctx, slot) = ctx();
        let mut cx = Context::from_waker(noop_waker_ref());
        slot.fill(Event::new("stale"));

        let mut wait = Box::pin(ctx.wait_any());
        assert!(wait.as_mut().poll(&mut cx).is_pending());

        slot.reset();
        assert!(wait.as_mut().poll(&mut cx).is_pending());
        assert_eq!(slot.waiting_filter(), Some(None));
    }
}
