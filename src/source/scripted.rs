//! # ScriptedSource — a fixed queue of events.
//!
//! Yields queued events in order and then reports exhaustion. Handy for tests
//! and for replaying a recorded session against a group.

use std::collections::VecDeque;

use async_trait::async_trait;

use super::{Event, EventSource};

/// Event source backed by an in-memory queue.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    queue: VecDeque<Event>,
    served: usize,
}

impl ScriptedSource {
    /// Creates a source that will yield `events` in order.
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            queue: events.into_iter().collect(),
            served: 0,
        }
    }

    /// Appends one more event at the end of the queue.
    pub fn push(&mut self, ev: Event) {
        self.queue.push_back(ev);
    }

    /// Number of events not yet served.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Number of events served so far.
    pub fn served(&self) -> usize {
        self.served
    }
}

impl From<Vec<Event>> for ScriptedSource {
    fn from(events: Vec<Event>) -> Self {
        Self::new(events)
    }
}

#[async_trait(?Send)]
impl EventSource for ScriptedSource {
    async fn next_event(&mut self) -> Option<Event> {
        let ev = self.queue.pop_front()?;
        self.served += 1;
        Some(ev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yields_in_order_then_exhausts() {
        let mut src = ScriptedSource::new([Event::new("a"), Event::new("b")]);
        futures::executor::block_on(async {
            assert_eq!(src.next_event().await.map(|e| e.tag().to_owned()), Some("a".into()));
            assert_eq!(src.next_event().await.map(|e| e.tag().to_owned()), Some("b".into()));
            assert!(src.next_event().await.is_none());
        });
        assert_eq!(src.served(), 2);
        assert_eq!(src.remaining(), 0);
    }
}
