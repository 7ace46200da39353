//! # TaskGroup: cooperative scheduler driving tasks against incoming events.
//!
//! A [`TaskGroup`] owns a pending and a running sequence of tasks and an event
//! source. Each tick of its loop:
//!
//! ```text
//! loop {
//!   ├─► stopped?                         → exit Ok(true)
//!   ├─► phase 1: start pending tasks     (registration order)
//!   │       ├─ Finished   → drop
//!   │       ├─ Suspended  → append to running with its filter
//!   │       └─ Failed     → abort Err(TaskFailed{phase: Start})
//!   ├─► nothing pending or running?      → exit Ok(true)
//!   ├─► stopped?                         → exit Ok(true)
//!   ├─► phase 2: ev = source.next_event().await   (the only suspension point)
//!   │       ├─ None       → abort Err(SourceClosed)
//!   │       └─ stopped meanwhile → drop ev, exit Ok(true)
//!   ├─► phase 3: for each running task whose filter is None or == ev.tag
//!   │       ├─ Finished   → remove (neighbours neither skipped nor revisited)
//!   │       ├─ Suspended  → store new filter
//!   │       └─ Failed     → abort Err(TaskFailed{phase: Deliver})
//!   └─► ev.tag == terminate_tag?        → abort Err(Terminated)
//! }
//! ```
//!
//! ## Rules
//! - `run()` on a running group returns `Ok(false)` and does nothing.
//! - `stop()` takes effect at the next tick boundary, or when a pending event
//!   wait returns: nothing is delivered after it. Suspended tasks stay
//!   registered and a later `run()` resumes them.
//! - Every exit path clears the running flag (drop guard), so a supervisor that
//!   caught a failure can run the group again.
//! - A fatal exit discards all pending and running tasks.
//! - Groups are single-threaded (`!Send`); clones share the same group.
//!
//! ## Nesting
//! [`TaskGroup::add_group`] registers another group as a task of this one. The
//! inner loop pulls its events through the task's [`TaskContext`], so it
//! suspends exactly like a leaf task waiting for any event.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::core::config::GroupConfig;
use crate::core::registry::{Registry, TaskInfo};
use crate::core::runner::{Resume, TaskCell};
use crate::error::{GroupError, Phase, TaskError};
use crate::lifecycle::{LifecycleEvent, LifecycleKind};
use crate::source::{Event, EventSource, Value};
use crate::subscribers::SubscriberSet;
use crate::tasks::{Task, TaskContext, TaskFn, TaskId, TaskRef};

use super::builder::TaskGroupBuilder;

/// Why a run ended without error.
#[derive(Clone, Copy, Debug)]
enum Exit {
    Drained,
    Stopped,
}

impl Exit {
    fn as_str(self) -> &'static str {
        match self {
            Exit::Drained => "drained",
            Exit::Stopped => "stopped",
        }
    }
}

pub(crate) struct Inner {
    cfg: GroupConfig,
    name: Arc<str>,
    /// Cleared by `stop()`.
    running: Cell<bool>,
    /// True while a loop is executing, even after `stop()`.
    active: Cell<bool>,
    registry: Registry,
    source: RefCell<Option<Box<dyn EventSource>>>,
    subs: SubscriberSet,
}

impl Inner {
    fn notify(&self, build: impl FnOnce() -> LifecycleEvent) {
        if self.subs.is_empty() {
            return;
        }
        self.subs.emit(&build().with_group(Arc::clone(&self.name)));
    }

    fn register(&self, make: impl FnOnce(TaskId) -> TaskRef, args: Vec<Value>) -> TaskId {
        let id = self.registry.next_id();
        let cell = TaskCell::new(id, make(id), args);
        tracing::trace!(group = %self.name, task = %cell.name(), id = %id, "task added");
        self.notify(|| {
            LifecycleEvent::new(LifecycleKind::TaskAdded)
                .with_task(Arc::clone(cell.name()))
                .with_task_id(id)
        });
        self.registry.push_pending(cell);
        id
    }

    fn stop(&self) -> bool {
        if !self.running.replace(false) {
            return false;
        }
        tracing::debug!(group = %self.name, "stop requested");
        self.notify(|| LifecycleEvent::new(LifecycleKind::StopRequested));
        true
    }
}

/// Clears the run flags however the loop is left (return, error, or the run
/// future being dropped mid-wait).
struct RunGuard<'a>(&'a Inner);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.running.set(false);
        self.0.active.set(false);
    }
}

/// Borrows the injected source for one run and puts it back afterwards.
struct SourceLease<'a> {
    inner: &'a Inner,
    source: Option<Box<dyn EventSource>>,
}

impl<'a> SourceLease<'a> {
    fn take(inner: &'a Inner) -> Self {
        let source = inner.source.borrow_mut().take();
        Self { inner, source }
    }
}

impl Drop for SourceLease<'_> {
    fn drop(&mut self) {
        if let Some(source) = self.source.take() {
            *self.inner.source.borrow_mut() = Some(source);
        }
    }
}

/// Cooperative scheduler for a set of tasks fed by one event source.
///
/// Cloning is cheap and yields another handle to the same group.
///
/// # Example
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use cotask::{Event, ScriptedSource, TaskError, TaskGroup};
///
/// # futures::executor::block_on(async {
/// let source = ScriptedSource::new([Event::new("key").with_value(30), Event::new("timer")]);
/// let group = TaskGroup::new(source);
/// let log = Rc::new(RefCell::new(Vec::new()));
///
/// let l = log.clone();
/// group.add(move |ctx, _args| async move {
///     let ev = ctx.wait_for("timer").await;
///     l.borrow_mut().push(ev.tag().to_owned());
///     Ok::<(), TaskError>(())
/// }, vec![]);
///
/// assert!(group.run().await.unwrap());
/// assert_eq!(*log.borrow(), ["timer"]);
/// # });
/// ```
#[derive(Clone)]
pub struct TaskGroup {
    inner: Rc<Inner>,
}

impl TaskGroup {
    /// Creates a builder for a group with the given configuration.
    pub fn builder(cfg: GroupConfig) -> TaskGroupBuilder {
        TaskGroupBuilder::new(cfg)
    }

    /// Creates a group with default configuration reading from `source`.
    pub fn new(source: impl EventSource + 'static) -> Self {
        TaskGroupBuilder::new(GroupConfig::default())
            .with_source(source)
            .build()
    }

    pub(crate) fn from_parts(
        cfg: GroupConfig,
        source: Option<Box<dyn EventSource>>,
        subs: SubscriberSet,
    ) -> Self {
        let name: Arc<str> = Arc::from(cfg.name.as_ref());
        Self {
            inner: Rc::new(Inner {
                cfg,
                name,
                running: Cell::new(false),
                active: Cell::new(false),
                registry: Registry::default(),
                source: RefCell::new(source),
                subs,
            }),
        }
    }

    /// Group name from its configuration.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The group's configuration.
    pub fn config(&self) -> &GroupConfig {
        &self.inner.cfg
    }

    /// Weak handle for use inside task bodies (no ownership cycle).
    pub fn handle(&self) -> GroupHandle {
        GroupHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // ---- registration ----

    /// Registers a function-backed task named `task-<id>`.
    ///
    /// Legal at any time, including from inside a running task; the task is
    /// started at the next phase 1 with `args`.
    pub fn add<F, Fut>(&self, f: F, args: Vec<Value>) -> TaskId
    where
        F: FnOnce(TaskContext, Vec<Value>) -> Fut + 'static,
        Fut: Future<Output = Result<(), TaskError>> + 'static,
    {
        self.inner
            .register(|id| TaskFn::boxed(format!("task-{id}"), f), args)
    }

    /// Registers a function-backed task with an explicit name.
    pub fn add_named<F, Fut>(&self, name: impl Into<String>, f: F, args: Vec<Value>) -> TaskId
    where
        F: FnOnce(TaskContext, Vec<Value>) -> Fut + 'static,
        Fut: Future<Output = Result<(), TaskError>> + 'static,
    {
        let name = name.into();
        self.inner.register(|_| TaskFn::boxed(name, f), args)
    }

    /// Registers a custom [`Task`] implementation.
    pub fn add_task(&self, task: impl Task, args: Vec<Value>) -> TaskId {
        self.inner.register(|_| Box::new(task), args)
    }

    /// Registers another group as a task of this one.
    ///
    /// The inner group receives every event delivered to that task and ends
    /// the task when its own loop exits. An inner abort surfaces here as
    /// [`TaskError::Group`].
    pub fn add_group(&self, group: TaskGroup) -> TaskId {
        let name = format!("group:{}", group.name());
        self.add_named(
            name,
            move |mut ctx, _args| async move {
                group.run_with(&mut ctx).await?;
                Ok::<(), TaskError>(())
            },
            Vec::new(),
        )
    }

    // ---- lifecycle ----

    /// True between a successful `run` and `stop`/loop exit.
    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Requests the loop to exit at the next tick boundary.
    ///
    /// Returns `false` if the group was not running.
    pub fn stop(&self) -> bool {
        self.inner.stop()
    }

    /// Runs the scheduling loop on the source given at construction.
    ///
    /// Returns `Ok(false)` if the group is already running, `Ok(true)` once
    /// every task finished or the group was stopped.
    ///
    /// # Errors
    /// - [`GroupError::TaskFailed`] a task failed or panicked;
    /// - [`GroupError::Terminated`] the termination event arrived;
    /// - [`GroupError::SourceClosed`] the source ran dry;
    /// - [`GroupError::NoSource`] the group was built without a source.
    pub async fn run(&self) -> Result<bool, GroupError> {
        if self.inner.running.get() || self.inner.active.get() {
            return Ok(false);
        }
        let mut lease = SourceLease::take(&self.inner);
        let Some(source) = lease.source.as_deref_mut() else {
            return Err(GroupError::NoSource {
                group: self.name().to_owned(),
            });
        };
        self.run_with(source).await
    }

    /// Runs the scheduling loop pulling events from `source`.
    ///
    /// Same contract as [`run`](Self::run); the injected source is left untouched.
    pub async fn run_with(&self, source: &mut dyn EventSource) -> Result<bool, GroupError> {
        let inner = &*self.inner;
        if inner.running.get() || inner.active.get() {
            return Ok(false);
        }
        inner.running.set(true);
        inner.active.set(true);
        let _guard = RunGuard(inner);

        tracing::debug!(group = %inner.name, tasks = inner.registry.len(), "run started");
        inner.notify(|| LifecycleEvent::new(LifecycleKind::RunStarted));

        match self.drive(source).await {
            Ok(exit) => {
                tracing::debug!(group = %inner.name, exit = exit.as_str(), "run finished");
                inner.notify(|| {
                    LifecycleEvent::new(LifecycleKind::RunFinished).with_reason(exit.as_str())
                });
                Ok(true)
            }
            Err(err) => {
                tracing::debug!(group = %inner.name, error = %err, "run aborted");
                inner.registry.clear();
                Err(err)
            }
        }
    }

    async fn drive(&self, source: &mut dyn EventSource) -> Result<Exit, GroupError> {
        let inner = &*self.inner;
        loop {
            if !inner.running.get() {
                return Ok(Exit::Stopped);
            }

            self.start_pending()?;

            if inner.registry.is_empty() {
                return Ok(Exit::Drained);
            }
            if !inner.running.get() {
                return Ok(Exit::Stopped);
            }

            let Some(ev) = source.next_event().await else {
                return Err(GroupError::SourceClosed {
                    group: self.name().to_owned(),
                });
            };
            // Stopped while suspended (sibling task of an outer group, or a
            // source fed from elsewhere): the event is dropped undelivered.
            if !inner.running.get() {
                tracing::trace!(group = %inner.name, tag = ev.tag(), "event dropped after stop");
                return Ok(Exit::Stopped);
            }
            tracing::trace!(group = %inner.name, tag = ev.tag(), "event received");
            inner.notify(|| {
                LifecycleEvent::new(LifecycleKind::EventReceived).with_tag(Arc::clone(ev.tag_arc()))
            });

            self.deliver(&ev)?;

            if ev.is_tagged(&inner.cfg.terminate_tag) {
                let abandoned = inner.registry.len();
                tracing::debug!(group = %inner.name, abandoned, "termination event");
                inner.notify(|| {
                    LifecycleEvent::new(LifecycleKind::Terminated)
                        .with_tag(Arc::clone(ev.tag_arc()))
                });
                return Err(GroupError::Terminated {
                    group: self.name().to_owned(),
                    tag: Arc::clone(ev.tag_arc()),
                    abandoned,
                });
            }
        }
    }

    /// Phase 1: first resume of every task registered since the last tick.
    fn start_pending(&self) -> Result<(), GroupError> {
        let inner = &*self.inner;
        for mut cell in inner.registry.take_pending() {
            match cell.start() {
                Resume::Finished => self.finished(&cell),
                Resume::Suspended(filter) => {
                    inner.notify(|| {
                        let ev = LifecycleEvent::new(LifecycleKind::TaskStarted)
                            .with_task(Arc::clone(cell.name()))
                            .with_task_id(cell.id());
                        match filter {
                            Some(tag) => ev.with_tag(tag),
                            None => ev,
                        }
                    });
                    inner.registry.promote(cell);
                }
                Resume::Failed(error) => return Err(self.failed(&cell, Phase::Start, error)),
            }
        }
        Ok(())
    }

    /// Phase 3: resume every running task whose filter accepts `ev`.
    fn deliver(&self, ev: &Event) -> Result<(), GroupError> {
        let inner = &*self.inner;
        let mut running = inner.registry.take_running();
        let mut idx = 0;
        while idx < running.len() {
            if !running[idx].accepts(ev.tag()) {
                idx += 1;
                continue;
            }
            match running[idx].deliver(ev) {
                Resume::Suspended(_) => idx += 1,
                Resume::Finished => {
                    let done = running.remove(idx);
                    self.finished(&done);
                }
                Resume::Failed(error) => {
                    let cell = running.remove(idx);
                    return Err(self.failed(&cell, Phase::Deliver, error));
                }
            }
        }
        inner.registry.restore_running(running);
        Ok(())
    }

    fn finished(&self, cell: &TaskCell) {
        tracing::trace!(group = %self.inner.name, task = %cell.name(), "task finished");
        self.inner.notify(|| {
            LifecycleEvent::new(LifecycleKind::TaskFinished)
                .with_task(Arc::clone(cell.name()))
                .with_task_id(cell.id())
        });
    }

    fn failed(&self, cell: &TaskCell, phase: Phase, error: TaskError) -> GroupError {
        tracing::debug!(
            group = %self.inner.name,
            task = %cell.name(),
            phase = %phase,
            error = %error,
            "task failed"
        );
        self.inner.notify(|| {
            LifecycleEvent::new(LifecycleKind::TaskFailed)
                .with_task(Arc::clone(cell.name()))
                .with_task_id(cell.id())
                .with_reason(error.to_string())
        });
        GroupError::TaskFailed {
            group: self.name().to_owned(),
            task: Arc::clone(cell.name()),
            id: cell.id(),
            phase,
            error,
        }
    }

    // ---- introspection ----

    /// Number of tasks registered but not started yet.
    pub fn pending_count(&self) -> usize {
        self.inner.registry.pending_len()
    }

    /// Number of started, suspended tasks.
    ///
    /// Inside a task body during event delivery (phase 3) this reads 0: the
    /// running sequence is moved out of the group for the pass.
    pub fn running_count(&self) -> usize {
        self.inner.registry.running_len()
    }

    /// Pending plus running tasks.
    ///
    /// Inside a task body during event delivery only the pending part is
    /// counted; see [`running_count`](Self::running_count).
    pub fn task_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Running tasks and the tags they wait for, in delivery order.
    ///
    /// Empty when called from a task body during event delivery; during
    /// phase 1 it lists the tasks promoted so far.
    pub fn running_tasks(&self) -> Vec<TaskInfo> {
        self.inner.registry.running_snapshot()
    }
}

impl std::fmt::Debug for TaskGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGroup")
            .field("name", &self.inner.name)
            .field("running", &self.inner.running.get())
            .field("pending", &self.pending_count())
            .field("running_tasks", &self.running_count())
            .finish()
    }
}

/// Weak handle to a [`TaskGroup`].
///
/// Task bodies capture this instead of a `TaskGroup` clone so that a group
/// holding the task does not keep itself alive. Operations on a dropped group
/// are no-ops.
#[derive(Clone, Debug)]
pub struct GroupHandle {
    inner: Weak<Inner>,
}

impl GroupHandle {
    /// Registers a function-backed task; `None` if the group is gone.
    pub fn add<F, Fut>(&self, f: F, args: Vec<Value>) -> Option<TaskId>
    where
        F: FnOnce(TaskContext, Vec<Value>) -> Fut + 'static,
        Fut: Future<Output = Result<(), TaskError>> + 'static,
    {
        let inner = self.inner.upgrade()?;
        Some(inner.register(|id| TaskFn::boxed(format!("task-{id}"), f), args))
    }

    /// Registers a named function-backed task; `None` if the group is gone.
    pub fn add_named<F, Fut>(
        &self,
        name: impl Into<String>,
        f: F,
        args: Vec<Value>,
    ) -> Option<TaskId>
    where
        F: FnOnce(TaskContext, Vec<Value>) -> Fut + 'static,
        Fut: Future<Output = Result<(), TaskError>> + 'static,
    {
        let inner = self.inner.upgrade()?;
        let name = name.into();
        Some(inner.register(|_| TaskFn::boxed(name, f), args))
    }

    /// Requests the group to stop; `false` if it is not running or gone.
    pub fn stop(&self) -> bool {
        self.inner.upgrade().is_some_and(|inner| inner.stop())
    }

    /// True if the group exists and is running.
    pub fn is_running(&self) -> bool {
        self.inner.upgrade().is_some_and(|inner| inner.running.get())
    }

    /// Strong handle, if the group is still alive.
    pub fn upgrade(&self) -> Option<TaskGroup> {
        self.inner.upgrade().map(|inner| TaskGroup { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptedSource;
    use futures::executor::block_on;

    fn group(events: Vec<Event>) -> TaskGroup {
        TaskGroup::new(ScriptedSource::new(events))
    }

    #[test]
    fn test_empty_group_returns_without_waiting() {
        // An exhausted source would fail the run if it were polled.
        let g = group(vec![]);
        assert!(block_on(g.run()).unwrap());
        assert!(!g.is_running());
    }

    #[test]
    fn test_missing_source_is_reported() {
        let g = TaskGroup::builder(GroupConfig::named("bare")).build();
        let err = block_on(g.run()).unwrap_err();
        assert_eq!(err.as_label(), "group_no_source");
    }

    #[test]
    fn test_immediate_task_never_enters_running() {
        let g = group(vec![]);
        g.add(|_ctx, _args| async { Ok::<(), TaskError>(()) }, vec![]);
        assert_eq!(g.pending_count(), 1);
        assert!(block_on(g.run()).unwrap());
        assert_eq!(g.task_count(), 0);
    }

    #[test]
    fn test_source_closed_is_fatal_and_clears_tasks() {
        let g = group(vec![Event::new("a")]);
        g.add(
            |ctx, _| async move {
                while ctx.wait_any().await.tag() != "never" {}
                Ok::<(), TaskError>(())
            },
            vec![],
        );
        let err = block_on(g.run()).unwrap_err();
        assert!(matches!(err, GroupError::SourceClosed { .. }));
        assert_eq!(g.task_count(), 0);
        assert!(!g.is_running());
    }

    #[test]
    fn test_stop_when_idle_is_false() {
        let g = group(vec![]);
        assert!(!g.stop());
        assert!(!g.handle().stop());
    }

    #[test]
    fn test_handle_outlives_group() {
        let g = group(vec![]);
        let h = g.handle();
        drop(g);
        assert!(h.upgrade().is_none());
        assert!(h.add(|_, _| async { Ok::<(), TaskError>(()) }, vec![]).is_none());
        assert!(!h.is_running());
    }

    #[test]
    fn test_running_snapshot_reports_names_and_filters() {
        let g = group(vec![]);
        g.add(
            |ctx, _| async move {
                ctx.wait_for("later").await;
                Ok::<(), TaskError>(())
            },
            vec![],
        );
        g.add_named(
            "watcher",
            |ctx, _| async move {
                ctx.wait_any().await;
                Ok::<(), TaskError>(())
            },
            vec![],
        );

        g.start_pending().unwrap();

        let infos = g.running_tasks();
        assert_eq!(infos.len(), 2);
        assert_eq!(&*infos[0].name, "task-0");
        assert_eq!(infos[0].filter.as_deref(), Some("later"));
        assert_eq!(&*infos[1].name, "watcher");
        assert_eq!(infos[1].filter, None);
        assert_eq!(g.pending_count(), 0);
    }
}
