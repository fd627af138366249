//! End-to-end scenario 3: hierarchical composition (HFSM).
//!
//! The slave's `out` channel is wired directly into the master's `in`
//! channel, so the master observes every state-change announcement the
//! slave emits and reacts to them as ordinary events.

use std::time::Duration;

use efsm_runtime::transition::goto;
use efsm_runtime::{channel, EfsmBuilder};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // --- slave ---
    let mut slave_builder = EfsmBuilder::<()>::new();
    slave_builder
        .declare_state("Running")
        .on_events(&["stop"], |_s, _e| Some(goto("Stopped")))
        .unwrap();
    slave_builder
        .declare_state("Stopped")
        .on_events(&["start"], |_s, _e| Some(goto("Running")))
        .unwrap();

    // --- master: shares its `in` with the slave's `out` ---
    let (master_in_tx, master_in_rx) = channel::bounded(8);
    let (master_out_tx, mut master_out_rx) = channel::bounded(8);

    let mut master_builder = EfsmBuilder::<()>::new();
    master_builder
        .declare_state("Running")
        .on_events(&["Stopped"], |_s, _e| Some(goto("Failed")))
        .unwrap();
    master_builder
        .declare_state("Failed")
        .on_events(&["Running"], |_s, _e| Some(goto("Running")))
        .unwrap();

    let master = master_builder.build("master", master_in_tx.clone(), master_in_rx, master_out_tx);

    let (slave_in_tx, slave_in_rx) = channel::bounded(8);
    // The slave's announcements become the master's input events.
    let slave = slave_builder.build("slave", slave_in_tx.clone(), slave_in_rx, master_in_tx.clone());

    let reporter = tokio::spawn(async move {
        while let Some(event) = master_out_rx.recv().await {
            println!("master -- {}", event.name);
        }
    });

    let master_handle = tokio::spawn(async move { master.run("Running").await });
    let slave_handle = tokio::spawn(async move { slave.run("Running").await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    slave_in_tx.send(efsm_runtime::Event::new("stop", "demo")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    slave_in_tx.send(efsm_runtime::Event::new("start", "demo")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    drop(slave_in_tx);
    drop(master_in_tx);
    slave_handle.await.unwrap().unwrap();
    master_handle.await.unwrap().unwrap();
    reporter.await.unwrap();
}
