//! Scheduler core: task groups and their tick loop.
//!
//! The public API from this module is [`TaskGroup`] (with its builder, config
//! and weak handle), which drives registered tasks against incoming events.
//!
//! Internal modules:
//! - [`runner`]: resumes one task and classifies the outcome;
//! - [`registry`]: pending and running task sequences;
//! - [`group`]: the scheduling loop, run/stop lifecycle, nesting;
//! - [`builder`]: group construction;
//! - [`config`]: group settings.

mod builder;
mod config;
mod group;
mod registry;
mod runner;

pub use builder::TaskGroupBuilder;
pub use config::GroupConfig;
pub use group::{GroupHandle, TaskGroup};
pub use registry::TaskInfo;
