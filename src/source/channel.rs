//! # Channel-backed event source.
//!
//! [`event_channel`] returns an [`EventSender`] / [`ChannelSource`] pair around a
//! tokio unbounded mpsc channel. The sender is `Send + Clone`, so host code on
//! any thread (input readers, timers, network handlers) can feed the group.
//!
//! ```text
//!   host thread A ──┐
//!   host thread B ──┼── EventSender::send ──► [mpsc] ──► ChannelSource ──► TaskGroup tick
//!   shutdown hook ──┘                                        ▲
//!                                     CancellationToken ─────┘ (optional, yields terminate)
//! ```
//!
//! ## Rules
//! - Events are delivered in send order.
//! - The source reports exhaustion once every sender is dropped and the queue is drained.
//! - With a shutdown token attached, cancellation yields exactly one termination
//!   event, after any events already queued.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{Event, EventSource, TERMINATE_TAG, Value, shutdown};

/// Creates a connected sender/source pair.
///
/// ## Example
/// ```rust
/// use cotask::{Event, EventSource, event_channel};
///
/// # futures::executor::block_on(async {
/// let (tx, mut rx) = event_channel();
/// assert!(tx.send_tag("redstone"));
/// drop(tx);
///
/// assert_eq!(rx.next_event().await.map(|e| e.tag().to_owned()), Some("redstone".to_owned()));
/// assert!(rx.next_event().await.is_none());
/// # });
/// ```
pub fn event_channel() -> (EventSender, ChannelSource) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        EventSender { tx },
        ChannelSource {
            rx,
            shutdown: None,
            terminate_tag: Arc::from(TERMINATE_TAG),
        },
    )
}

/// Sending half: clone it freely and hand it to event producers.
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSender {
    /// Queues one event. Returns `false` if the source was dropped.
    pub fn send(&self, ev: Event) -> bool {
        self.tx.send(ev).is_ok()
    }

    /// Queues an event with the given tag and no values.
    pub fn send_tag(&self, tag: impl Into<Arc<str>>) -> bool {
        self.send(Event::new(tag))
    }

    /// Queues an event with the given tag and values.
    pub fn send_values(&self, tag: impl Into<Arc<str>>, values: Vec<Value>) -> bool {
        self.send(Event::with_values(tag, values))
    }

    /// Queues the host's termination event.
    pub fn terminate(&self) -> bool {
        self.send(Event::terminate())
    }

    /// True once the receiving source has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Spawns a listener that turns the first OS termination signal into a
    /// termination event on this channel.
    ///
    /// Must be called from within a tokio runtime.
    pub fn forward_shutdown_signals(&self) -> JoinHandle<()> {
        let tx = self.clone();
        tokio::spawn(async move {
            match shutdown::wait_for_shutdown_signal().await {
                Ok(signal) => {
                    tracing::debug!(signal, "shutdown signal received; queueing termination event");
                    tx.terminate();
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to register shutdown signal handlers");
                }
            }
        })
    }
}

/// Receiving half; plug it into a group with
/// [`TaskGroupBuilder::with_source`](crate::TaskGroupBuilder::with_source).
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<Event>,
    shutdown: Option<CancellationToken>,
    terminate_tag: Arc<str>,
}

impl ChannelSource {
    /// Attaches a token whose cancellation yields one termination event.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Overrides the tag used for the termination event produced on cancellation.
    ///
    /// Match it to [`GroupConfig::terminate_tag`](crate::GroupConfig::terminate_tag).
    pub fn with_terminate_tag(mut self, tag: impl Into<Arc<str>>) -> Self {
        self.terminate_tag = tag.into();
        self
    }
}

#[async_trait(?Send)]
impl EventSource for ChannelSource {
    async fn next_event(&mut self) -> Option<Event> {
        let Some(token) = self.shutdown.clone() else {
            return self.rx.recv().await;
        };

        tokio::select! {
            biased;
            ev = self.rx.recv() => ev,
            _ = token.cancelled() => {
                // One-shot: afterwards behave like a plain channel.
                self.shutdown = None;
                Some(Event::new(Arc::clone(&self.terminate_tag)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancellation_yields_single_terminate() {
        let (tx, rx) = event_channel();
        let token = CancellationToken::new();
        let mut rx = rx.with_shutdown(token.clone()).with_terminate_tag("quit");

        tx.send_tag("first");
        assert_eq!(rx.next_event().await.map(|e| e.tag().to_owned()), Some("first".into()));

        token.cancel();
        let ev = rx.next_event().await.expect("terminate event");
        assert!(ev.is_tagged("quit"));

        tx.send_tag("after");
        assert_eq!(rx.next_event().await.map(|e| e.tag().to_owned()), Some("after".into()));
    }

    #[tokio::test]
    async fn test_send_reports_dropped_source() {
        let (tx, rx) = event_channel();
        drop(rx);
        assert!(tx.is_closed());
        assert!(!tx.send_values("x", vec![Value::Int(1)]));
    }
}
