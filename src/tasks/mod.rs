//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Task`] - trait for implementing resumable tasks
//! - [`TaskFn`] - function-backed task implementation
//! - [`TaskRef`] - owned handle to a task (`Box<dyn Task>`)
//! - [`TaskContext`] - per-task handle used to suspend until an event arrives
//! - [`Wait`] - the future returned by the context's wait methods

mod context;
mod task;
mod task_fn;

pub(crate) use context::Slot;
pub use context::{Filter, TaskContext, Wait};
pub use task::{BoxTaskFuture, Task, TaskId, TaskRef};
pub use task_fn::TaskFn;
