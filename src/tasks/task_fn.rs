//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: FnOnce(TaskContext, Vec<Value>) -> Fut`. The
//! closure is called once, on the first resume, with the arguments the task was
//! registered with; the future it returns is then driven event by event.
//!
//! ## Example
//! ```rust
//! use cotask::{TaskFn, TaskRef, TaskContext, TaskError, Value};
//!
//! let t: TaskRef = TaskFn::boxed("greeter", |ctx: TaskContext, args: Vec<Value>| async move {
//!     let who = args.first().and_then(Value::as_str).unwrap_or("world").to_owned();
//!     let _ = ctx.wait_any().await;
//!     println!("hello {who}");
//!     Ok::<_, TaskError>(())
//! });
//!
//! assert_eq!(t.name(), "greeter");
//! ```

use std::borrow::Cow;
use std::future::Future;

use crate::error::TaskError;
use crate::source::Value;
use crate::tasks::TaskContext;
use crate::tasks::task::{BoxTaskFuture, Task, TaskRef};

/// Function-backed task implementation.
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::boxed`] when you immediately need a [`TaskRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the task and returns it as an owned handle (`Box<dyn Task>`).
    pub fn boxed<Fut>(name: impl Into<Cow<'static, str>>, f: F) -> TaskRef
    where
        F: FnOnce(TaskContext, Vec<Value>) -> Fut + 'static,
        Fut: Future<Output = Result<(), TaskError>> + 'static,
    {
        Box::new(Self::new(name, f))
    }
}

impl<F> std::fmt::Debug for TaskFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskFn").field("name", &self.name).finish()
    }
}

impl<F, Fut> Task for TaskFn<F>
where
    F: FnOnce(TaskContext, Vec<Value>) -> Fut + 'static,
    Fut: Future<Output = Result<(), TaskError>> + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(self: Box<Self>, ctx: TaskContext, args: Vec<Value>) -> BoxTaskFuture {
        let fut = (self.f)(ctx, args);
        Box::pin(fut)
    }
}
