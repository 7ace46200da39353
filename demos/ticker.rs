//! # Example: ticker
//!
//! Feeds a task group from a producer task and a Ctrl-C handler.
//!
//! Shows how to:
//! - Bridge host events into a group with [`event_channel`].
//! - Route events by tag with `wait_for` / `wait_any`.
//! - Nest a group with [`TaskGroup::add_group`].
//! - Stop the group from inside a task via [`GroupHandle`](cotask::GroupHandle).
//! - Attach the built-in [`LogWriter`] subscriber.
//!
//! ## Flow
//! ```text
//! producer ──timer×5, char "q"──► EventSender ──► ChannelSource ──► TaskGroup "main"
//! Ctrl-C   ──terminate──────────► EventSender       ├─► clock   (timer)
//!                                                   ├─► keys    (char → stop)
//!                                                   └─► group:ui
//!                                                         └─► banner (first timer)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example ticker --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use cotask::{
    GroupConfig, LogWriter, Subscribe, TaskError, TaskGroup, Value, event_channel,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = event_channel();
    let _signals = tx.forward_shutdown_signals();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let group = TaskGroup::builder(GroupConfig::named("main"))
        .with_source(rx)
        .with_subscribers(subs.clone())
        .build();
    let handle = group.handle();

    group.add_named(
        "clock",
        |ctx, args| async move {
            let limit = args.first().and_then(Value::as_int).unwrap_or(3);
            for _ in 0..limit {
                let ev = ctx.wait_for("timer").await;
                println!("[clock] {ev}");
            }
            Ok::<(), TaskError>(())
        },
        vec![Value::Int(5)],
    );

    group.add_named(
        "keys",
        move |ctx, _| async move {
            loop {
                let ev = ctx.wait_for("char").await;
                let key = ev.value(0).and_then(Value::as_str).unwrap_or_default();
                println!("[keys] pressed {key:?}");
                if key == "q" {
                    handle.stop();
                    break;
                }
            }
            Ok::<(), TaskError>(())
        },
        vec![],
    );

    let ui = TaskGroup::builder(GroupConfig::named("ui"))
        .with_subscribers(subs)
        .build();
    ui.add_named(
        "banner",
        |ctx, _| async move {
            ctx.wait_for("timer").await;
            println!("[banner] first tick seen");
            Ok::<(), TaskError>(())
        },
        vec![],
    );
    group.add_group(ui);

    let producer = tx.clone();
    tokio::spawn(async move {
        for n in 1..=5 {
            tokio::time::sleep(Duration::from_millis(200)).await;
            producer.send_values("timer", vec![Value::Int(n)]);
        }
        producer.send_values("char", vec![Value::from("q")]);
    });

    match group.run().await {
        Ok(_) => println!("[main] done"),
        Err(err) if err.is_terminated() => println!("[main] interrupted"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
