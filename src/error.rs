//! Error types used by task groups and the tasks they drive.
//!
//! This module defines two main error enums:
//!
//! - [`GroupError`] — errors that abort a [`TaskGroup`](crate::TaskGroup) run.
//! - [`TaskError`] — errors raised by individual task bodies.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! Usage mistakes (starting a group twice, stopping an idle group) are not errors:
//! those operations report a plain `bool`.

use std::sync::Arc;

use thiserror::Error;

use crate::tasks::TaskId;

/// Scheduling phase in which a task failure was observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// First resume of a freshly added task.
    Start,
    /// Resume with an incoming event.
    Deliver,
}

impl Phase {
    /// Returns a short stable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::Deliver => "deliver",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # Errors that abort a task group run.
///
/// Every variant is fatal for the run that produced it: the group discards its
/// pending and running tasks and clears its running flag before returning.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum GroupError {
    /// A task failed while being resumed.
    #[error("group {group:?}: task {task:?} (#{id}) failed during {phase}: {error}")]
    TaskFailed {
        /// Name of the group that was running the task.
        group: String,
        /// Name of the failing task.
        task: Arc<str>,
        /// Id of the failing task.
        id: TaskId,
        /// Phase in which the failure surfaced.
        phase: Phase,
        /// The failure itself.
        #[source]
        error: TaskError,
    },

    /// The reserved termination event was received.
    #[error("group {group:?}: terminated by {tag:?} event; {abandoned} task(s) abandoned")]
    Terminated {
        /// Name of the group.
        group: String,
        /// The termination tag that was observed.
        tag: Arc<str>,
        /// Number of tasks still pending or running when the loop ended.
        abandoned: usize,
    },

    /// The event source has no more events to deliver.
    #[error("group {group:?}: event source closed")]
    SourceClosed {
        /// Name of the group.
        group: String,
    },

    /// `run()` was called on a group built without an event source.
    #[error("group {group:?}: no event source configured")]
    NoSource {
        /// Name of the group.
        group: String,
    },
}

impl GroupError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use cotask::GroupError;
    ///
    /// let err = GroupError::SourceClosed { group: "main".into() };
    /// assert_eq!(err.as_label(), "group_source_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            GroupError::TaskFailed { .. } => "group_task_failed",
            GroupError::Terminated { .. } => "group_terminated",
            GroupError::SourceClosed { .. } => "group_source_closed",
            GroupError::NoSource { .. } => "group_no_source",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            GroupError::TaskFailed {
                task, phase, error, ..
            } => format!("task={task} phase={phase} {}", error.as_message()),
            GroupError::Terminated { tag, abandoned, .. } => {
                format!("terminated by {tag:?}; abandoned={abandoned}")
            }
            GroupError::SourceClosed { .. } => "event source closed".to_string(),
            GroupError::NoSource { .. } => "no event source".to_string(),
        }
    }

    /// True when the run ended because of a termination event, either in this
    /// group or in a nested group whose failure surfaced here.
    ///
    /// # Example
    /// ```
    /// use cotask::GroupError;
    ///
    /// let err = GroupError::Terminated { group: "g".into(), tag: "terminate".into(), abandoned: 0 };
    /// assert!(err.is_terminated());
    /// ```
    pub fn is_terminated(&self) -> bool {
        match self {
            GroupError::Terminated { .. } => true,
            GroupError::TaskFailed {
                error: TaskError::Group(inner),
                ..
            } => inner.is_terminated(),
            _ => false,
        }
    }
}

/// # Errors produced by task bodies.
///
/// Any of these, returned from a task or caught while resuming it, aborts the
/// whole group: sibling tasks are not isolated from each other.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task body failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task body hit a condition it marks as unrecoverable.
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Task body panicked while being resumed.
    #[error("panicked: {error}")]
    Panicked {
        /// The panic payload, if it was a string.
        error: String,
    },

    /// Task future returned `Pending` without waiting on its context.
    #[error("suspended outside of an event wait")]
    Unscheduled,

    /// A nested group driven by this task aborted.
    #[error("nested group aborted: {0}")]
    Group(Box<GroupError>),
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use cotask::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.to_string(), "execution failed: boom");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Unscheduled => "task_unscheduled",
            TaskError::Group(_) => "task_group_aborted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Fatal { error } => format!("fatal: {error}"),
            TaskError::Panicked { error } => format!("panic: {error}"),
            TaskError::Unscheduled => "suspended outside of an event wait".to_string(),
            TaskError::Group(inner) => format!("nested: {}", inner.as_message()),
        }
    }
}

impl From<GroupError> for TaskError {
    fn from(err: GroupError) -> Self {
        TaskError::Group(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_failed_message_names_task_and_phase() {
        let err = GroupError::TaskFailed {
            group: "main".into(),
            task: "reader".into(),
            id: TaskId::new(3),
            phase: Phase::Deliver,
            error: TaskError::fail("bad frame"),
        };
        let text = err.to_string();
        assert!(text.contains("reader"), "{text}");
        assert!(text.contains("#3"), "{text}");
        assert!(text.contains("deliver"), "{text}");
        assert!(text.contains("bad frame"), "{text}");
        assert_eq!(err.as_label(), "group_task_failed");
    }

    #[test]
    fn test_nested_termination_is_detected() {
        let inner = GroupError::Terminated {
            group: "inner".into(),
            tag: "terminate".into(),
            abandoned: 2,
        };
        let outer = GroupError::TaskFailed {
            group: "outer".into(),
            task: "group:inner".into(),
            id: TaskId::new(0),
            phase: Phase::Deliver,
            error: inner.into(),
        };
        assert!(outer.is_terminated());

        let plain = GroupError::TaskFailed {
            group: "outer".into(),
            task: "t".into(),
            id: TaskId::new(1),
            phase: Phase::Start,
            error: TaskError::fail("x"),
        };
        assert!(!plain.is_terminated());
    }

    #[test]
    fn test_task_error_labels() {
        assert_eq!(TaskError::Unscheduled.as_label(), "task_unscheduled");
        assert_eq!(
            TaskError::Panicked { error: "p".into() }.as_message(),
            "panic: p"
        );
        let nested: TaskError = GroupError::SourceClosed { group: "g".into() }.into();
        assert_eq!(nested.as_label(), "task_group_aborted");
    }
}
