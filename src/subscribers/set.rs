//! # SubscriberSet: fan-out over multiple subscribers
//!
//! [`SubscriberSet`] hands each [`LifecycleEvent`] to every subscriber, in
//! registration order.
//!
//! ## What it guarantees
//! - Per-subscriber delivery order equals emission order.
//! - Panics inside subscribers are caught and logged (isolation); the other
//!   subscribers receive a [`LifecycleKind::SubscriberPanicked`] notification.
//!
//! ## Diagram
//! ```text
//!    emit(&LifecycleEvent)
//!        │
//!        ├──► S1.on_event() ── panic? ──► tracing::warn! + SubscriberPanicked to others
//!        ├──► S2.on_event()
//!        └──► SN.on_event()
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::lifecycle::{LifecycleEvent, LifecycleKind};

use super::Subscribe;

/// Composite fan-out over subscribers.
#[derive(Clone, Default)]
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a new set.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Delivers one notification to all subscribers.
    pub fn emit(&self, event: &LifecycleEvent) {
        for (idx, sub) in self.subs.iter().enumerate() {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| sub.on_event(event))) {
                let info = panic_message(payload.as_ref());
                tracing::warn!(subscriber = sub.name(), info = %info, "subscriber panicked");

                // Never report a panic about a panic notification.
                if !event.is_subscriber_panic() {
                    let report = LifecycleEvent::subscriber_panicked(sub.name(), info);
                    self.emit_except(idx, &report);
                }
            }
        }
    }

    fn emit_except(&self, skip: usize, event: &LifecycleEvent) {
        debug_assert_eq!(event.kind, LifecycleKind::SubscriberPanicked);
        for (idx, sub) in self.subs.iter().enumerate() {
            if idx == skip {
                continue;
            }
            if catch_unwind(AssertUnwindSafe(|| sub.on_event(event))).is_err() {
                tracing::warn!(subscriber = sub.name(), "subscriber panicked on panic report");
            }
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subs.len()
    }
}

impl std::fmt::Debug for SubscriberSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.subs.iter().map(|s| s.name()).collect();
        f.debug_struct("SubscriberSet").field("subs", &names).finish()
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<LifecycleKind>>);

    impl Subscribe for Recorder {
        fn on_event(&self, ev: &LifecycleEvent) {
            self.0.lock().unwrap().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Boom;

    impl Subscribe for Boom {
        fn on_event(&self, _ev: &LifecycleEvent) {
            panic!("boom");
        }
        fn name(&self) -> &'static str {
            "boom"
        }
    }

    #[test]
    fn test_panicking_subscriber_is_isolated() {
        let rec = Arc::new(Recorder::default());
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Boom), rec.clone()];
        let set = SubscriberSet::new(subs);

        set.emit(&LifecycleEvent::new(LifecycleKind::TaskAdded));

        let seen = rec.0.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![LifecycleKind::SubscriberPanicked, LifecycleKind::TaskAdded]
        );
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bad"));
        assert_eq!(panic_message(payload.as_ref()), "bad");
        let payload: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
