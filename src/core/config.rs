//! # Task group configuration.
//!
//! Provides [`GroupConfig`], the settings of one [`TaskGroup`](crate::TaskGroup).
//!
//! Config is used at group creation: `TaskGroup::builder(config)`.

use std::borrow::Cow;
use std::sync::Arc;

use crate::source::TERMINATE_TAG;

/// Configuration of a task group.
///
/// ## Field semantics
/// - `name`: label used in errors, lifecycle notifications and nested task names
/// - `terminate_tag`: reserved event tag that ends the run with
///   [`GroupError::Terminated`](crate::GroupError::Terminated)
///
/// ## Notes
/// All fields are public for flexibility.
#[derive(Clone, Debug)]
pub struct GroupConfig {
    /// Human-readable group name.
    pub name: Cow<'static, str>,

    /// Tag of the termination event.
    ///
    /// The event is still delivered to matching tasks before the run aborts.
    pub terminate_tag: Arc<str>,
}

impl GroupConfig {
    /// Default configuration with the given name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns a config with a different termination tag.
    pub fn with_terminate_tag(mut self, tag: impl Into<Arc<str>>) -> Self {
        self.terminate_tag = tag.into();
        self
    }
}

impl Default for GroupConfig {
    /// Default configuration:
    ///
    /// - `name = "group"`
    /// - `terminate_tag = "terminate"`
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("group"),
            terminate_tag: Arc::from(TERMINATE_TAG),
        }
    }
}
