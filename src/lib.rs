//! # cotask
//!
//! **cotask** is a cooperative, event-driven task runtime for Rust.
//!
//! Client code registers independently written task functions with a
//! [`TaskGroup`]. Tasks run interleaved on one thread: each suspends by waiting
//! for an event tag through its [`TaskContext`], and the group resumes it when
//! a matching event arrives from the group's [`EventSource`]. The first
//! unrecovered task failure aborts the group and surfaces to the caller.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  task fn #1  │   │  task fn #2  │   │ inner group  │
//!     │ wait_for(..) │   │ wait_any()   │   │ (add_group)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  TaskGroup (scheduler)                                            │
//! │  - Registry (pending: registration order, running: promotion)     │
//! │  - TaskCell::start / deliver → Resume{Finished|Suspended|Failed}  │
//! │  - SubscriberSet (lifecycle notifications)                        │
//! └──────┬───────────────────────────────────────────────────▲────────┘
//!        │ next_event().await (one per tick)                 │
//!        ▼                                                   │
//! ┌──────────────────────────────┐          ┌────────────────┴───────┐
//! │ EventSource                  │          │ Subscribe              │
//! │ - ScriptedSource             │          │ - LogWriter (feature)  │
//! │ - ChannelSource ◄ EventSender│          │ - custom               │
//! │ - TaskContext (nesting)      │          └────────────────────────┘
//! └──────────────────────────────┘
//! ```
//!
//! ### Tick
//! ```text
//! phase 1: start pending tasks      (first resume with their args)
//! phase 2: wait for one event       (the only suspension point)
//! phase 3: deliver to running tasks (filter None or == tag; remove finished)
//! then:    termination tag?         → Err(GroupError::Terminated)
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                         |
//! |-------------------|----------------------------------------------------------|--------------------------------------------|
//! | **Scheduling**    | Register tasks, run/stop the loop, nest groups.          | [`TaskGroup`], [`GroupHandle`]             |
//! | **Tasks**         | Define tasks as functions or trait objects.              | [`Task`], [`TaskFn`], [`TaskContext`]      |
//! | **Events**        | Event payloads and pluggable sources.                    | [`Event`], [`Value`], [`EventSource`]      |
//! | **Host bridge**   | Feed events from other threads, OS signals → terminate.  | [`event_channel`], [`EventSender`]         |
//! | **Subscriber API**| Observe group lifecycle (logging, metrics).              | [`Subscribe`], [`LifecycleEvent`]          |
//! | **Errors**        | Typed errors for group runs and task bodies.             | [`GroupError`], [`TaskError`]              |
//! | **Configuration** | Group name and termination tag.                          | [`GroupConfig`]                            |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use cotask::{Event, ScriptedSource, TaskError, TaskGroup, Value};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = ScriptedSource::new([
//!         Event::new("timer").with_value(1),
//!         Event::new("char").with_value("q"),
//!     ]);
//!     let group = TaskGroup::new(source);
//!
//!     // Waits for a key press, then exits.
//!     group.add(|ctx, args| async move {
//!         let prompt = args.first().and_then(Value::as_str).unwrap_or(">").to_owned();
//!         let ev = ctx.wait_for("char").await;
//!         println!("{prompt} {ev}");
//!         Ok::<(), TaskError>(())
//!     }, vec!["input".into()]);
//!
//!     // Finishes right away: never enters the running set.
//!     group.add(|_ctx, _args| async { Ok::<(), TaskError>(()) }, vec![]);
//!
//!     assert!(group.run().await?);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod lifecycle;
mod source;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{GroupConfig, GroupHandle, TaskGroup, TaskGroupBuilder, TaskInfo};
pub use error::{GroupError, Phase, TaskError};
pub use lifecycle::{LifecycleEvent, LifecycleKind};
pub use source::{
    ChannelSource, Event, EventSender, EventSource, ScriptedSource, TERMINATE_TAG, Value,
    event_channel, shutdown,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{BoxTaskFuture, Filter, Task, TaskContext, TaskFn, TaskId, TaskRef, Wait};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
