//! # Task abstraction.
//!
//! This module defines the [`Task`] trait: a named unit of work that is turned
//! into a future exactly once, on its first resume. The common handle type is
//! [`TaskRef`], a boxed `dyn Task` owned by the group that registered it.
//!
//! A task receives a [`TaskContext`] and suspends only by awaiting one of the
//! context's wait futures; that is what tells the group which event tag the
//! task wants next.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::TaskError;
use crate::source::Value;
use crate::tasks::TaskContext;

/// Boxed task future produced by [`Task::spawn`].
///
/// Not `Send`: tasks live on the thread that runs their group.
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>>>>;

/// # Owned handle to a task object.
pub type TaskRef = Box<dyn Task>;

/// Identifier of a task, unique within its group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// # Cooperative, resumable unit.
///
/// A `Task` has a human-readable [`name`](Task::name) and a one-shot
/// [`spawn`](Task::spawn) that builds its future from the context and the
/// arguments it was registered with.
///
/// # Example
/// ```
/// use cotask::{BoxTaskFuture, Task, TaskContext, TaskError, Value};
///
/// struct Echo;
///
/// impl Task for Echo {
///     fn name(&self) -> &str { "echo" }
///
///     fn spawn(self: Box<Self>, ctx: TaskContext, _args: Vec<Value>) -> BoxTaskFuture {
///         Box::pin(async move {
///             let ev = ctx.wait_for("char").await;
///             println!("got {ev}");
///             Ok::<(), TaskError>(())
///         })
///     }
/// }
/// ```
pub trait Task: 'static {
    /// Returns a human-readable task name.
    fn name(&self) -> &str;

    /// Builds the task future. Called once, on the task's first resume.
    fn spawn(self: Box<Self>, ctx: TaskContext, args: Vec<Value>) -> BoxTaskFuture;
}
