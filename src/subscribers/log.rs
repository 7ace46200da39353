//! # LogWriter — simple notification printer
//!
//! A minimal subscriber that prints incoming [`LifecycleEvent`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [run-started] group="main"
//! [task-added] group="main" task="clock" id=0
//! [task-started] group="main" task="clock" filter="timer"
//! [event] group="main" tag="timer"
//! [task-finished] group="main" task="clock"
//! [task-failed] group="main" task="reader" err="execution failed: eof"
//! [terminated] group="main" tag="terminate"
//! [run-finished] group="main" reason="drained"
//! ```

use crate::lifecycle::{LifecycleEvent, LifecycleKind};
use crate::subscribers::Subscribe;

/// Notification writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &LifecycleEvent) {
        let group = e.group.as_deref().unwrap_or("?");
        match e.kind {
            LifecycleKind::RunStarted => println!("[run-started] group={group:?}"),
            LifecycleKind::RunFinished => {
                println!("[run-finished] group={group:?} reason={:?}", e.reason);
            }
            LifecycleKind::StopRequested => println!("[stop-requested] group={group:?}"),
            LifecycleKind::Terminated => {
                println!("[terminated] group={group:?} tag={:?}", e.tag);
            }
            LifecycleKind::TaskAdded => {
                println!(
                    "[task-added] group={group:?} task={:?} id={:?}",
                    e.task, e.task_id
                );
            }
            LifecycleKind::TaskStarted => {
                println!(
                    "[task-started] group={group:?} task={:?} filter={:?}",
                    e.task, e.tag
                );
            }
            LifecycleKind::TaskFinished => {
                println!("[task-finished] group={group:?} task={:?}", e.task);
            }
            LifecycleKind::TaskFailed => {
                println!(
                    "[task-failed] group={group:?} task={:?} err={:?}",
                    e.task, e.reason
                );
            }
            LifecycleKind::EventReceived => {
                println!("[event] group={group:?} tag={:?}", e.tag);
            }
            LifecycleKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={} info={}",
                    e.task.as_deref().unwrap_or("unknown"),
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
