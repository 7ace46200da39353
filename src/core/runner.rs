//! # Resume a single task.
//!
//! [`TaskCell`] wraps one registered task and exposes the single operation the
//! scheduler needs: resume it and learn what happened.
//!
//! ## Resume flow
//!
//! ```text
//! start():    task.spawn(ctx, args) → poll once
//! deliver():  slot.fill(event)       → poll once
//!
//! poll outcome:
//!   Ready(Ok)                    → Resume::Finished
//!   Ready(Err(e))                → Resume::Failed(e)
//!   panic                        → Resume::Failed(Panicked)
//!   Pending + slot Waiting(f)    → Resume::Suspended(f)   (filter stored on the cell)
//!   Pending + no wait registered → Resume::Failed(Unscheduled)
//! ```
//!
//! ## Rules
//! - Futures are polled with a no-op waker: the group, not the waker, decides
//!   when a task runs again.
//! - A cell that finished or failed is inert; further resumes report `Finished`.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::task::noop_waker_ref;

use crate::error::TaskError;
use crate::source::{Event, Value};
use crate::subscribers::panic_message;
use crate::tasks::{BoxTaskFuture, Filter, Slot, TaskContext, TaskId, TaskRef};

/// Outcome of one resume.
#[derive(Debug)]
pub(crate) enum Resume {
    /// The task ran to completion.
    Finished,
    /// The task is waiting again, for events matching the filter.
    Suspended(Filter),
    /// The task failed; the group must abort.
    Failed(TaskError),
}

enum Stage {
    Pending { task: TaskRef, args: Vec<Value> },
    Running(BoxTaskFuture),
    Done,
}

/// One registered task with its resumable state.
pub(crate) struct TaskCell {
    id: TaskId,
    name: Arc<str>,
    slot: Rc<Slot>,
    filter: Filter,
    stage: Stage,
}

impl TaskCell {
    pub(crate) fn new(id: TaskId, task: TaskRef, args: Vec<Value>) -> Self {
        Self {
            id,
            name: Arc::from(task.name()),
            slot: Rc::new(Slot::default()),
            filter: None,
            stage: Stage::Pending { task, args },
        }
    }

    pub(crate) fn id(&self) -> TaskId {
        self.id
    }

    pub(crate) fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub(crate) fn filter(&self) -> &Filter {
        &self.filter
    }

    /// True if an event tagged `tag` should resume this task.
    pub(crate) fn accepts(&self, tag: &str) -> bool {
        self.filter.as_deref().is_none_or(|f| f == tag)
    }

    /// First resume: builds the task future from its stored arguments.
    pub(crate) fn start(&mut self) -> Resume {
        match std::mem::replace(&mut self.stage, Stage::Done) {
            Stage::Pending { task, args } => {
                let ctx = TaskContext::new(self.id, Arc::clone(&self.name), Rc::clone(&self.slot));
                match catch_unwind(AssertUnwindSafe(|| task.spawn(ctx, args))) {
                    Ok(fut) => {
                        self.stage = Stage::Running(fut);
                        self.poll()
                    }
                    Err(payload) => Resume::Failed(TaskError::Panicked {
                        error: panic_message(payload.as_ref()),
                    }),
                }
            }
            other => {
                self.stage = other;
                self.poll()
            }
        }
    }

    /// Resumes the task with an incoming event.
    pub(crate) fn deliver(&mut self, ev: &Event) -> Resume {
        self.slot.fill(ev.clone());
        self.poll()
    }

    fn poll(&mut self) -> Resume {
        let Stage::Running(fut) = &mut self.stage else {
            return Resume::Finished;
        };

        let mut cx = Context::from_waker(noop_waker_ref());
        let polled = catch_unwind(AssertUnwindSafe(|| fut.as_mut().poll(&mut cx)));

        match polled {
            Ok(Poll::Pending) => match self.slot.waiting_filter() {
                Some(filter) => {
                    self.filter = filter.clone();
                    Resume::Suspended(filter)
                }
                None => {
                    self.finish();
                    Resume::Failed(TaskError::Unscheduled)
                }
            },
            Ok(Poll::Ready(Ok(()))) => {
                self.finish();
                Resume::Finished
            }
            Ok(Poll::Ready(Err(err))) => {
                self.finish();
                Resume::Failed(err)
            }
            Err(payload) => {
                self.finish();
                Resume::Failed(TaskError::Panicked {
                    error: panic_message(payload.as_ref()),
                })
            }
        }
    }

    fn finish(&mut self) {
        self.stage = Stage::Done;
        self.slot.reset();
    }
}

impl std::fmt::Debug for TaskCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self.stage {
            Stage::Pending { .. } => "pending",
            Stage::Running(_) => "running",
            Stage::Done => "done",
        };
        f.debug_struct("TaskCell")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("filter", &self.filter)
            .field("stage", &stage)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskFn;

    fn cell<F, Fut>(f: F) -> TaskCell
    where
        F: FnOnce(TaskContext, Vec<Value>) -> Fut + 'static,
        Fut: std::future::Future<Output = Result<(), TaskError>> + 'static,
    {
        TaskCell::new(TaskId::new(0), TaskFn::boxed("t", f), vec![Value::Int(5)])
    }

    #[test]
    fn test_start_passes_args_and_reports_filter() {
        let mut c = cell(|ctx, args| async move {
            assert_eq!(args, vec![Value::Int(5)]);
            ctx.wait_for("timer").await;
            Ok::<(), TaskError>(())
        });

        match c.start() {
            Resume::Suspended(Some(tag)) => assert_eq!(&*tag, "timer"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(c.accepts("timer"));
        assert!(!c.accepts("key"));

        assert!(matches!(c.deliver(&Event::new("timer")), Resume::Finished));
        assert!(matches!(c.deliver(&Event::new("timer")), Resume::Finished));
    }

    #[test]
    fn test_filter_changes_between_resumes() {
        let mut c = cell(|ctx, _| async move {
            ctx.wait_any().await;
            ctx.wait_for("char").await;
            Ok::<(), TaskError>(())
        });

        assert!(matches!(c.start(), Resume::Suspended(None)));
        assert!(c.accepts("anything"));
        assert!(matches!(c.deliver(&Event::new("key")), Resume::Suspended(Some(_))));
        assert_eq!(c.filter().as_deref(), Some("char"));
    }

    #[test]
    fn test_panic_becomes_failure() {
        let mut c = cell(|ctx, _| async move {
            ctx.wait_any().await;
            if ctx.id().get() == 0 {
                panic!("kaboom");
            }
            Ok::<(), TaskError>(())
        });

        assert!(matches!(c.start(), Resume::Suspended(None)));
        match c.deliver(&Event::new("x")) {
            Resume::Failed(TaskError::Panicked { error }) => assert_eq!(error, "kaboom"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_foreign_pending_is_unscheduled() {
        let mut c = cell(|_ctx, _| async move {
            futures::future::pending::<()>().await;
            Ok::<(), TaskError>(())
        });

        assert!(matches!(c.start(), Resume::Failed(TaskError::Unscheduled)));
    }
}
