use std::sync::Arc;

use crate::core::config::GroupConfig;
use crate::source::EventSource;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::group::TaskGroup;

/// Builder for constructing a [`TaskGroup`] with optional parts.
pub struct TaskGroupBuilder {
    cfg: GroupConfig,
    source: Option<Box<dyn EventSource>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl TaskGroupBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: GroupConfig) -> Self {
        Self {
            cfg,
            source: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the event source used by [`TaskGroup::run`].
    ///
    /// Groups meant to be nested with [`TaskGroup::add_group`] need none: they
    /// pull from the outer group instead.
    pub fn with_source(mut self, source: impl EventSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Sets lifecycle subscribers for observability.
    ///
    /// Subscribers receive notifications (runs, task lifecycle, failures)
    /// synchronously from the scheduling loop.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the group. It starts empty and idle.
    pub fn build(self) -> TaskGroup {
        TaskGroup::from_parts(self.cfg, self.source, SubscriberSet::new(self.subscribers))
    }
}

impl std::fmt::Debug for TaskGroupBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGroupBuilder")
            .field("cfg", &self.cfg)
            .field("has_source", &self.source.is_some())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
