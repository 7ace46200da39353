//! # Task registry - pending and running sequences of one group.
//!
//! ```text
//! add() ──► pending ──(phase 1: take_pending, start)──► running
//!                                                         │
//!                 phase 3: take_running, deliver, restore ◄┘
//! ```
//!
//! ## Rules
//! - Pending order is registration order; running order is promotion order.
//! - Sequences are moved out while a phase resumes tasks, so a task body that
//!   calls back into its group (add, counts) never meets an outstanding borrow.
//! - Tasks added while running land in `pending` only.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use crate::core::runner::TaskCell;
use crate::tasks::{Filter, TaskId};

/// Snapshot of one running task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskInfo {
    /// Task id within its group.
    pub id: TaskId,
    /// Registered name.
    pub name: Arc<str>,
    /// Tag the task waits for (`None` = any event).
    pub filter: Filter,
}

/// Pending and running tasks of one group.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    pending: RefCell<Vec<TaskCell>>,
    running: RefCell<Vec<TaskCell>>,
    next_id: Cell<u64>,
}

impl Registry {
    /// Allocates the next task id.
    pub(crate) fn next_id(&self) -> TaskId {
        let raw = self.next_id.get();
        self.next_id.set(raw + 1);
        TaskId::new(raw)
    }

    pub(crate) fn push_pending(&self, cell: TaskCell) {
        self.pending.borrow_mut().push(cell);
    }

    /// Swaps the pending sequence for an empty one.
    pub(crate) fn take_pending(&self) -> Vec<TaskCell> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    pub(crate) fn promote(&self, cell: TaskCell) {
        self.running.borrow_mut().push(cell);
    }

    /// Moves the running sequence out for a delivery pass.
    pub(crate) fn take_running(&self) -> Vec<TaskCell> {
        std::mem::take(&mut *self.running.borrow_mut())
    }

    /// Puts a delivery pass's survivors back.
    ///
    /// Only phase 1 promotes, and a group never re-enters its own loop, so the
    /// running sequence is still empty here.
    pub(crate) fn restore_running(&self, survivors: Vec<TaskCell>) {
        let mut running = self.running.borrow_mut();
        debug_assert!(running.is_empty(), "task promoted during a delivery pass");
        *running = survivors;
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub(crate) fn running_len(&self) -> usize {
        self.running.borrow().len()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending_len() + self.running_len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Running tasks with their filters, in delivery order.
    pub(crate) fn running_snapshot(&self) -> Vec<TaskInfo> {
        self.running
            .borrow()
            .iter()
            .map(|c| TaskInfo {
                id: c.id(),
                name: Arc::clone(c.name()),
                filter: c.filter().clone(),
            })
            .collect()
    }

    /// Drops every pending and running task.
    pub(crate) fn clear(&self) {
        let pending = self.take_pending();
        let running = self.take_running();
        drop((pending, running));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::TaskFn;

    fn idle(reg: &Registry, name: &'static str) -> TaskCell {
        TaskCell::new(
            reg.next_id(),
            TaskFn::boxed(name, |_ctx, _args| async { Ok::<(), TaskError>(()) }),
            Vec::new(),
        )
    }

    #[test]
    fn test_ids_are_sequential() {
        let reg = Registry::default();
        assert_eq!(reg.next_id().get(), 0);
        assert_eq!(reg.next_id().get(), 1);
    }

    #[test]
    fn test_take_and_restore_running_keeps_order() {
        let reg = Registry::default();
        reg.promote(idle(&reg, "a"));
        reg.promote(idle(&reg, "b"));
        reg.push_pending(idle(&reg, "c"));

        let survivors = reg.take_running();
        assert_eq!(reg.running_len(), 0);
        assert_eq!(reg.len(), 1);
        reg.restore_running(survivors);

        let names: Vec<String> = reg
            .running_snapshot()
            .into_iter()
            .map(|info| info.name.to_string())
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn test_take_pending_preserves_order_and_empties() {
        let reg = Registry::default();
        reg.push_pending(idle(&reg, "x"));
        reg.push_pending(idle(&reg, "y"));

        let batch = reg.take_pending();
        let names: Vec<&str> = batch.iter().map(|c| &**c.name()).collect();
        assert_eq!(names, ["x", "y"]);
        assert!(reg.is_empty());
    }
}
