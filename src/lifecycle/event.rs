//! # Lifecycle notifications emitted by task groups.
//!
//! The [`LifecycleKind`] enum classifies notifications across three categories:
//! - **Run events**: a group's loop starting, ending, being stopped or terminated
//! - **Task events**: registration, first resume, completion, failure
//! - **Delivery events**: an environment event pulled from the source
//!
//! The [`LifecycleEvent`] struct carries metadata such as timestamps, group and
//! task names, the event tag and a reason.
//!
//! ## Ordering guarantees
//! Each notification has a globally unique sequence number (`seq`) that
//! increases monotonically across all groups of the process.
//!
//! ## Example
//! ```rust
//! use cotask::{LifecycleEvent, LifecycleKind};
//!
//! let ev = LifecycleEvent::new(LifecycleKind::TaskFailed)
//!     .with_group("main")
//!     .with_task("reader")
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, LifecycleKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("reader"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::tasks::TaskId;

/// Global sequence counter for notification ordering.
static LIFECYCLE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleKind {
    // === Run events ===
    /// A group entered its scheduling loop.
    ///
    /// Sets: `group`
    RunStarted,

    /// A group left its scheduling loop normally (no tasks left, or stopped).
    ///
    /// Sets: `group`, `reason` (`"drained"` or `"stopped"`)
    RunFinished,

    /// `stop()` was called on a running group.
    ///
    /// Sets: `group`
    StopRequested,

    /// The reserved termination event ended the run.
    ///
    /// Sets: `group`, `tag`
    Terminated,

    // === Task events ===
    /// A task was registered.
    ///
    /// Sets: `group`, `task`, `task_id`
    TaskAdded,

    /// A task was resumed for the first time and suspended.
    ///
    /// Sets: `group`, `task`, `task_id`, `tag` (its filter, if any)
    TaskStarted,

    /// A task ran to completion and was dropped.
    ///
    /// Sets: `group`, `task`, `task_id`
    TaskFinished,

    /// A task failed; the run aborts right after this notification.
    ///
    /// Sets: `group`, `task`, `task_id`, `reason`
    TaskFailed,

    // === Delivery events ===
    /// An event was pulled from the source.
    ///
    /// Sets: `group`, `tag`
    EventReceived,

    // === Subscriber events ===
    /// A subscriber panicked while handling a notification.
    ///
    /// Sets: `task` (subscriber name), `reason`
    SubscriberPanicked,
}

impl LifecycleKind {
    /// Returns a short stable label (kebab-case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            LifecycleKind::RunStarted => "run-started",
            LifecycleKind::RunFinished => "run-finished",
            LifecycleKind::StopRequested => "stop-requested",
            LifecycleKind::Terminated => "terminated",
            LifecycleKind::TaskAdded => "task-added",
            LifecycleKind::TaskStarted => "task-started",
            LifecycleKind::TaskFinished => "task-finished",
            LifecycleKind::TaskFailed => "task-failed",
            LifecycleKind::EventReceived => "event-received",
            LifecycleKind::SubscriberPanicked => "subscriber-panicked",
        }
    }
}

/// Lifecycle notification with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`LifecycleKind`]
#[derive(Clone, Debug)]
pub struct LifecycleEvent {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Notification classification.
    pub kind: LifecycleKind,
    /// Name of the emitting group.
    pub group: Option<Arc<str>>,
    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Id of the task, if applicable.
    pub task_id: Option<TaskId>,
    /// Event tag (received event, task filter, termination tag).
    pub tag: Option<Arc<str>>,
    /// Human-readable reason (errors, exit cause).
    pub reason: Option<Arc<str>>,
}

impl LifecycleEvent {
    /// Creates a notification of the given kind with current timestamp and next sequence number.
    pub fn new(kind: LifecycleKind) -> Self {
        Self {
            seq: LIFECYCLE_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            group: None,
            task: None,
            task_id: None,
            tag: None,
            reason: None,
        }
    }

    /// Attaches the emitting group's name.
    #[inline]
    pub fn with_group(mut self, group: impl Into<Arc<str>>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a task id.
    #[inline]
    pub fn with_task_id(mut self, id: TaskId) -> Self {
        self.task_id = Some(id);
        self
    }

    /// Attaches an event tag.
    #[inline]
    pub fn with_tag(mut self, tag: impl Into<Arc<str>>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber panic notification.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        LifecycleEvent::new(LifecycleKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, LifecycleKind::SubscriberPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = LifecycleEvent::new(LifecycleKind::RunStarted);
        let b = LifecycleEvent::new(LifecycleKind::RunFinished);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_subscriber_panic_constructor() {
        let ev = LifecycleEvent::subscriber_panicked("audit", "oops".into());
        assert!(ev.is_subscriber_panic());
        assert_eq!(ev.task.as_deref(), Some("audit"));
        assert_eq!(ev.kind.as_label(), "subscriber-panicked");
    }
}
