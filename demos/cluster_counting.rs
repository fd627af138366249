//! End-to-end scenario 6: a small cluster. Five identical child machines each
//! start in `Running` and fan their state-change announcements into one
//! parent's `in` channel (no central coordinator, just five `out` senders
//! sharing one `in` receiver, per spec §4.6). The parent counts `Running`
//! versus `Stopped` deltas and flips `Degraded` -> `Healthy` once all five
//! are up, and back on the first one that stops.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use efsm_runtime::transition::goto;
use efsm_runtime::{channel, EfsmBuilder};

const CLUSTER_SIZE: i32 = 5;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let count = Arc::new(AtomicI32::new(0));

    let (parent_in_tx, parent_in_rx) = channel::bounded(32);
    let (parent_out_tx, mut parent_out_rx) = channel::bounded(32);

    let mut parent_builder = EfsmBuilder::<()>::new();
    {
        let count = count.clone();
        parent_builder
            .declare_state("Degraded")
            .on_events(&["Running"], move |_s, _e| {
                if count.fetch_add(1, Ordering::SeqCst) + 1 >= CLUSTER_SIZE {
                    Some(goto("Healthy"))
                } else {
                    None
                }
            })
            .unwrap();
    }
    {
        let count = count.clone();
        parent_builder
            .declare_state("Degraded")
            .on_events(&["Stopped"], move |_s, _e| {
                count.fetch_sub(1, Ordering::SeqCst);
                None
            })
            .unwrap();
    }
    {
        let count = count.clone();
        parent_builder
            .declare_state("Healthy")
            .on_events(&["Stopped"], move |_s, _e| {
                count.fetch_sub(1, Ordering::SeqCst);
                Some(goto("Degraded"))
            })
            .unwrap();
    }

    let parent = parent_builder.build("parent", parent_in_tx.clone(), parent_in_rx, parent_out_tx);

    let mut child_senders = Vec::new();
    let mut child_handles = Vec::new();

    for i in 0..CLUSTER_SIZE {
        let mut child_builder = EfsmBuilder::<()>::new();
        child_builder
            .declare_state("Running")
            .on_events(&["stop"], |_s, _e| Some(goto("Stopped")))
            .unwrap();
        child_builder
            .declare_state("Stopped")
            .on_events(&["start"], |_s, _e| Some(goto("Running")))
            .unwrap();

        let (child_in_tx, child_in_rx) = channel::bounded(8);
        let child = child_builder.build(
            format!("child-{i}"),
            child_in_tx.clone(),
            child_in_rx,
            parent_in_tx.clone(),
        );
        child_senders.push(child_in_tx);
        child_handles.push(tokio::spawn(async move { child.run("Running").await }));
    }

    let reporter = tokio::spawn(async move {
        while let Some(event) = parent_out_rx.recv().await {
            println!("parent -- {}", event.name);
        }
    });

    let parent_handle = tokio::spawn(async move { parent.run("Degraded").await });

    tokio::time::sleep(Duration::from_millis(200)).await;

    // Stop one child; the parent should drop back to Degraded.
    child_senders[0]
        .send(efsm_runtime::Event::new("stop", "demo"))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    drop(parent_in_tx);
    for tx in child_senders {
        drop(tx);
    }
    for handle in child_handles {
        handle.await.unwrap().unwrap();
    }
    parent_handle.await.unwrap().unwrap();
    reporter.await.unwrap();
}
