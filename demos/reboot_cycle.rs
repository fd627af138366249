//! End-to-end scenario 1 from the design notes: reboot, timeout, reset.
//!
//! `Running` --reboot--> `Rebooting` (armed with a boot timeout)
//! `Rebooting` --booted--> `Running`
//! `Rebooting` --boot_timeout--> `Failed`  (fired by the timer if `booted` never arrives)
//! `Failed` --reset--> `Rebooting`

use std::time::Duration;

use efsm_runtime::transition::goto;
use efsm_runtime::{channel, EfsmBuilder};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut builder = EfsmBuilder::<()>::new();

    builder
        .declare_state("Running")
        .on_events(&["reboot"], |_s, _e| Some(goto("Rebooting")))
        .unwrap();

    builder
        .declare_state("Rebooting")
        .with_timeout(Duration::from_secs(5), "boot_timeout")
        .on_events(&["booted"], |_s, _e| Some(goto("Running")))
        .unwrap()
        .on_events(&["boot_timeout"], |_s, _e| Some(goto("Failed")))
        .unwrap();

    builder
        .declare_state("Failed")
        .on_events(&["reset"], |_s, _e| Some(goto("Rebooting")))
        .unwrap();

    let (in_tx, in_rx) = channel::bounded(8);
    let (out_tx, mut out_rx) = channel::bounded(8);
    let machine = builder.build("boiler", in_tx.clone(), in_rx, out_tx);

    let reporter = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            println!("-- {}", event.name);
        }
    });

    let run_handle = tokio::spawn(async move { machine.run("Running").await });

    in_tx.send(efsm_runtime::Event::new("reboot", "demo")).await.unwrap();
    // No `booted` event arrives: the Rebooting timeout fires on its own and
    // drives the machine to Failed.
    tokio::time::sleep(Duration::from_secs(6)).await;
    in_tx.send(efsm_runtime::Event::new("reset", "demo")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    drop(in_tx);
    run_handle.await.unwrap().unwrap();
    reporter.await.unwrap();
}
