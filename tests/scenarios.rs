//! End-to-end scenarios, one per spec §8 case: wire up real channels, drive
//! a [`Machine`] with [`Machine::run`], and observe what lands on `out`.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use efsm_runtime::transition::goto;
use efsm_runtime::{channel, EfsmBuilder, EfsmError, Event};

fn reboot_machine() -> (
    efsm_runtime::Machine<()>,
    tokio::sync::mpsc::Sender<Event<()>>,
    tokio::sync::mpsc::Receiver<Event<()>>,
) {
    let mut builder = EfsmBuilder::<()>::new();
    builder
        .declare_state("Running")
        .on_events(&["reboot"], |_s, _e| Some(goto("Rebooting")))
        .unwrap();
    builder
        .declare_state("Rebooting")
        .with_timeout(Duration::from_millis(60), "Rebooting-timeout")
        .on_events(&["booted"], |_s, _e| Some(goto("Running")))
        .unwrap()
        .on_events(&["Rebooting-timeout"], |_s, _e| Some(goto("Failed")))
        .unwrap();
    builder
        .declare_state("Failed")
        .on_events(&["reset"], |_s, _e| Some(goto("Rebooting")))
        .unwrap();

    let (in_tx, in_rx) = channel::bounded(8);
    let (out_tx, out_rx) = channel::bounded(8);
    let machine = builder.build("boiler", in_tx.clone(), in_rx, out_tx);
    (machine, in_tx, out_rx)
}

// Scenario 1: reboot, unanswered boot timeout, reset back into Rebooting.
#[tokio::test]
async fn reboot_then_timeout_then_reset() {
    let (machine, in_tx, mut out_rx) = reboot_machine();
    let handle = tokio::spawn(async move { machine.run("Running").await });

    assert_eq!(out_rx.recv().await.unwrap().name, "Running");

    in_tx.send(Event::new("reboot", "test")).await.unwrap();
    assert_eq!(out_rx.recv().await.unwrap().name, "Rebooting");

    // No `booted` ever arrives: the declared timeout fires on its own.
    assert_eq!(out_rx.recv().await.unwrap().name, "Failed");

    in_tx.send(Event::new("reset", "test")).await.unwrap();
    assert_eq!(out_rx.recv().await.unwrap().name, "Rebooting");

    drop(in_tx);
    handle.await.unwrap().unwrap();
}

// Scenario 2: an event with no handler on the current state is dropped,
// the machine stays put, and no announcement is emitted for it.
#[tokio::test]
async fn ignored_event_is_dropped_silently() {
    let (machine, in_tx, mut out_rx) = reboot_machine();
    let handle = tokio::spawn(async move { machine.run("Running").await });

    assert_eq!(out_rx.recv().await.unwrap().name, "Running");

    // "booted" has no handler on Running.
    in_tx.send(Event::new("booted", "test")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert!(out_rx.try_recv().is_err());

    drop(in_tx);
    handle.await.unwrap().unwrap();
}

// Scenario 3: hierarchical composition. The slave's `out` feeds the
// master's `in`; the master reacts to the slave's state names as events.
#[tokio::test]
async fn hierarchical_master_observes_slave_state_changes() {
    let mut slave_builder = EfsmBuilder::<()>::new();
    slave_builder
        .declare_state("Running")
        .on_events(&["stop"], |_s, _e| Some(goto("Stopped")))
        .unwrap();
    slave_builder
        .declare_state("Stopped")
        .on_events(&["start"], |_s, _e| Some(goto("Running")))
        .unwrap();

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
    let slave = slave_builder.build("slave", slave_in_tx.clone(), slave_in_rx, master_in_tx.clone());

    let master_handle = tokio::spawn(async move { master.run("Running").await });
    let slave_handle = tokio::spawn(async move { slave.run("Running").await });

    // Master's own initial announcement.
    assert_eq!(master_out_rx.recv().await.unwrap().name, "Running");

    slave_in_tx.send(Event::new("stop", "test")).await.unwrap();
    assert_eq!(master_out_rx.recv().await.unwrap().name, "Failed");

    slave_in_tx.send(Event::new("start", "test")).await.unwrap();
    assert_eq!(master_out_rx.recv().await.unwrap().name, "Running");

    drop(slave_in_tx);
    drop(master_in_tx);
    slave_handle.await.unwrap().unwrap();
    master_handle.await.unwrap().unwrap();
}

// Scenario 4: re-entering a state rearms its timer instead of leaking a
// second one racing the first.
#[tokio::test]
async fn reentry_resets_timer_without_leaking() {
    let mut builder = EfsmBuilder::<()>::new();
    builder
        .declare_state("A")
        .with_timeout(Duration::from_millis(50), "A-timeout")
        .on_events(&["A-timeout"], |_s, _e| Some(goto("A")))
        .unwrap();

    let (in_tx, in_rx) = channel::bounded(8);
    let (out_tx, mut out_rx) = channel::bounded(8);
    let machine = builder.build("reentrant", in_tx.clone(), in_rx, out_tx);
    let handle = tokio::spawn(async move { machine.run("A").await });

    // Initial install, then three timeout-driven re-entries.
    for _ in 0..4 {
        assert_eq!(out_rx.recv().await.unwrap().name, "A");
    }

    // A leaked second timer from an earlier cycle would have fired a
    // duplicate announcement well ahead of the next 50ms cycle.
    let extra = tokio::time::timeout(Duration::from_millis(15), out_rx.recv()).await;
    assert!(extra.is_err(), "unexpected early announcement: timer may have leaked");

    drop(in_tx);
    handle.await.unwrap().unwrap();
}

// Scenario 5: a transition's own timeout overrides the state's declared
// default for that single installation.
#[tokio::test]
async fn transition_intent_timeout_overrides_declared_default() {
    let mut builder = EfsmBuilder::<()>::new();
    builder
        .declare_state("Start")
        .on_events(&["go"], |_s, _e| {
            Some(goto("A").with_timeout(Duration::from_millis(20), "fast-timeout"))
        })
        .unwrap();
    builder
        .declare_state("A")
        .with_timeout(Duration::from_millis(300), "slow-timeout")
        .on_events(&["fast-timeout"], |_s, _e| Some(goto("Done")))
        .unwrap();
    builder.declare_state("Done");

    let (in_tx, in_rx) = channel::bounded(4);
    let (out_tx, mut out_rx) = channel::bounded(4);
    let machine = builder.build("override", in_tx.clone(), in_rx, out_tx);
    let handle = tokio::spawn(async move { machine.run("Start").await });

    assert_eq!(out_rx.recv().await.unwrap().name, "Start");
    in_tx.send(Event::new("go", "test")).await.unwrap();
    assert_eq!(out_rx.recv().await.unwrap().name, "A");

    let announcement = tokio::time::timeout(Duration::from_millis(150), out_rx.recv())
        .await
        .expect("override timeout should fire well before the declared default")
        .unwrap();
    assert_eq!(announcement.name, "Done");

    drop(in_tx);
    handle.await.unwrap().unwrap();
}

// A duplicate on_events registration is rejected before build, and the
// first handler installed stays the one that actually runs.
#[tokio::test]
async fn duplicate_registration_keeps_first_handler_active() {
    let mut builder = EfsmBuilder::<()>::new();
    builder
        .declare_state("S")
        .on_events(&["x"], |_s, _e| Some(goto("T1")))
        .unwrap();
    builder.declare_state("T1");
    builder.declare_state("T2");

    let err = builder
        .declare_state("S")
        .on_events(&["x"], |_s, _e| Some(goto("T2")))
        .unwrap_err();
    assert!(matches!(err, EfsmError::DuplicateRegistration { .. }));

    let (in_tx, in_rx) = channel::bounded(4);
    let (out_tx, mut out_rx) = channel::bounded(4);
    let machine = builder.build("dup", in_tx.clone(), in_rx, out_tx);
    let handle = tokio::spawn(async move { machine.run("S").await });

    assert_eq!(out_rx.recv().await.unwrap().name, "S");
    in_tx.send(Event::new("x", "test")).await.unwrap();
    assert_eq!(out_rx.recv().await.unwrap().name, "T1");

    drop(in_tx);
    handle.await.unwrap().unwrap();
}

// Scenario 6: a five-member cluster fanning into one parent, counted via
// an externally-owned collaborator rather than any context the engine
// itself provides.
#[tokio::test]
async fn cluster_counting_tracks_running_children() {
    const CLUSTER_SIZE: i32 = 5;
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
            .declare_state("Healthy")
            .on_events(&["Stopped"], move |_s, _e| {
                count.fetch_sub(1, Ordering::SeqCst);
                Some(goto("Degraded"))
            })
            .unwrap();
    }

    let parent = parent_builder.build("parent", parent_in_tx.clone(), parent_in_rx, parent_out_tx);
    let parent_handle = tokio::spawn(async move { parent.run("Degraded").await });

    assert_eq!(parent_out_rx.recv().await.unwrap().name, "Degraded");

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

    // The fifth child's initial "Running" announcement tips the parent over.
    assert_eq!(parent_out_rx.recv().await.unwrap().name, "Healthy");

    child_senders[0].send(Event::new("stop", "test")).await.unwrap();
    assert_eq!(parent_out_rx.recv().await.unwrap().name, "Degraded");

    drop(parent_in_tx);
    for tx in child_senders {
        drop(tx);
    }
    for handle in child_handles {
        handle.await.unwrap().unwrap();
    }
    parent_handle.await.unwrap().unwrap();
}
