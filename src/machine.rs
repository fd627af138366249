//! The top-level aggregate and its event loop: identity, current state,
//! transition table, channels, and run lifecycle (spec §4.2, §4.3).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::{Receiver, Sender, WeakSender};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::EfsmError;
use crate::event::Event;
use crate::state::{StateName, StateSpec};
use crate::transition::TransitionIntent;

#[cfg(feature = "history")]
use crate::history::TransitionRecord;
#[cfg(feature = "metrics")]
use crate::metrics::Metrics;

/// The dynamic part of a machine: everything the dispatcher mutates while
/// running. Kept apart from the declarative [`StateSpec`] table so the
/// table itself can stay immutable during execution (spec invariant 5).
struct RunState<P> {
    current_state: Option<StateName>,
    current_timer: Option<CancellationToken>,
    state_data: HashMap<StateName, Option<P>>,
    in_rx: Receiver<Event<P>>,
}

/// `{ id, currentState, states, in, out, runGuard }` from spec §3.
pub struct Machine<P> {
    id: String,
    states: HashMap<StateName, StateSpec<P>>,
    // A *weak* handle: if this were a strong `Sender`, the machine would
    // permanently hold a reference to its own `in` channel and that channel
    // could never observe "all senders dropped" purely from the caller's
    // side, so `Run` would never see `in` close. The timer subsystem
    // upgrades this only for the instant it needs to post a synthetic event.
    in_tx: WeakSender<Event<P>>,
    out_tx: Sender<Event<P>>,
    running: AtomicBool,
    run_state: Mutex<RunState<P>>,
    #[cfg(feature = "history")]
    history: Mutex<Vec<TransitionRecord>>,
    #[cfg(feature = "metrics")]
    metrics: Mutex<Metrics>,
}

impl<P> Machine<P>
where
    P: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        id: String,
        states: HashMap<StateName, StateSpec<P>>,
        in_tx: Sender<Event<P>>,
        in_rx: Receiver<Event<P>>,
        out_tx: Sender<Event<P>>,
    ) -> Self {
        let state_data = states
            .iter()
            .map(|(name, spec)| (name.clone(), spec.default_data.clone()))
            .collect();

        Machine {
            id,
            states,
            in_tx: in_tx.downgrade(),
            out_tx,
            running: AtomicBool::new(false),
            run_state: Mutex::new(RunState {
                current_state: None,
                current_timer: None,
                state_data,
                in_rx,
            }),
            #[cfg(feature = "history")]
            history: Mutex::new(Vec::new()),
            #[cfg(feature = "metrics")]
            metrics: Mutex::new(Metrics::default()),
        }
    }

    /// Immutable after construction (spec §5).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Drive the event loop until `in` is closed.
    ///
    /// Acquires the run guard first (`AlreadyRunning` if one is already in
    /// flight), installs `initial` (emitting its state-change announcement),
    /// then processes events from `in` in FIFO order until the channel
    /// closes. See spec §4.2.
    pub async fn run(&self, initial: impl Into<StateName>) -> Result<(), EfsmError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EfsmError::AlreadyRunning);
        }
        let result = self.run_inner(initial.into()).await;
        self.running.store(false, Ordering::Release);
        result
    }

    async fn run_inner(&self, initial: StateName) -> Result<(), EfsmError> {
        if !self.states.contains_key(&initial) {
            return Err(EfsmError::UnknownInitialState(initial));
        }

        let mut rs = self.run_state.lock().await;
        tracing::debug!(machine = %self.id, state = %initial, "starting dispatcher");
        self.install_state(&mut rs, TransitionIntent::goto(initial), None)
            .await?;

        loop {
            let event = match rs.in_rx.recv().await {
                Some(event) => event,
                None => {
                    tracing::debug!(machine = %self.id, "input channel closed, exiting");
                    break;
                }
            };
            self.handle_event(&mut rs, event).await?;
        }
        Ok(())
    }

    async fn handle_event(&self, rs: &mut RunState<P>, event: Event<P>) -> Result<(), EfsmError> {
        let current = rs
            .current_state
            .clone()
            .expect("currentState is set before any event is processed");
        let spec = self
            .states
            .get(&current)
            .expect("invariant: states[currentState] always exists");

        let handler = match spec.transitions.get(&event.name) {
            Some(handler) => handler.clone(),
            None => {
                tracing::debug!(
                    machine = %self.id,
                    state = %current,
                    event = %event.name,
                    "ignoring event: no handler registered for this (state, event) pair"
                );
                #[cfg(feature = "metrics")]
                self.metrics.lock().await.record_ignored();
                return Ok(());
            }
        };

        #[cfg(feature = "metrics")]
        if spec.timeout.as_ref().is_some_and(|t| t.event_name == event.name) {
            self.metrics.lock().await.record_timeout();
        }

        let Some(intent) = handler(&current, &event) else {
            // Handler returned `None`: remain in the current state, timer
            // (if any) keeps running untouched.
            return Ok(());
        };

        // Cancel the outgoing state's timer before installing the new one
        // (spec invariant 4).
        if let Some(token) = rs.current_timer.take() {
            token.cancel();
        }

        self.install_state(rs, intent, Some(event.name.clone()))
            .await
    }

    async fn install_state(
        &self,
        rs: &mut RunState<P>,
        intent: TransitionIntent<P>,
        triggering_event: Option<String>,
    ) -> Result<(), EfsmError> {
        let target = intent.target.clone();
        if !self.states.contains_key(&target) {
            return Err(EfsmError::InvalidState(target));
        }

        // Defensive: covers re-entry of the currently-installing record in
        // case a caller reaches this path without going through
        // `handle_event`'s cancellation first.
        if let Some(token) = rs.current_timer.take() {
            token.cancel();
        }

        let previous = rs.current_state.replace(target.clone());

        if let Some(data) = intent.data {
            rs.state_data.insert(target.clone(), Some(data));
        }

        let spec = &self.states[&target];
        let effective_timeout = intent.timeout.or_else(|| spec.timeout.clone());

        if let Some(timeout_spec) = effective_timeout {
            let token = CancellationToken::new();
            let child = token.clone();
            let in_tx = self.in_tx.clone();
            let event_name = timeout_spec.event_name.clone();
            let duration = timeout_spec.duration;
            let scope = self.id.clone();
            let log_state = target.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(duration) => {
                        tracing::debug!(state = %log_state, event = %event_name, "state timeout fired");
                        // The callback never touches machine state; it only
                        // posts the synthetic event back onto `in` (spec §4.3).
                        // If `in` is already fully closed there is nothing
                        // left to deliver to.
                        if let Some(in_tx) = in_tx.upgrade() {
                            let _ = in_tx.send(Event::new(event_name, scope)).await;
                        }
                    }
                    _ = child.cancelled() => {
                        tracing::trace!(state = %log_state, "timer cancelled before firing");
                    }
                }
            });
            rs.current_timer = Some(token);
        }

        #[cfg(feature = "metrics")]
        self.metrics.lock().await.record_install(&target);

        #[cfg(feature = "history")]
        {
            self.history.lock().await.push(TransitionRecord {
                from: previous,
                to: target.clone(),
                event: triggering_event,
                at: std::time::Instant::now(),
            });
        }
        #[cfg(not(feature = "history"))]
        let _ = (previous, triggering_event);

        let data_snapshot = rs.state_data.get(&target).cloned().flatten();
        tracing::debug!(machine = %self.id, state = %target, "state installed");
        self.out_tx
            .send(Event {
                name: target.clone(),
                scope: self.id.clone(),
                data: data_snapshot,
            })
            .await
            .map_err(|_| EfsmError::OutputClosed)?;

        Ok(())
    }

    /// Snapshot of recorded transitions (`history` feature).
    #[cfg(feature = "history")]
    pub async fn history(&self) -> Vec<TransitionRecord> {
        self.history.lock().await.clone()
    }

    /// Export the observed transition graph so far as Graphviz DOT
    /// (`visualization` feature).
    #[cfg(feature = "visualization")]
    pub async fn to_dot(&self) -> String {
        crate::visualization::to_dot(&self.history.lock().await)
    }

    /// Export the observed transition graph so far as PlantUML
    /// (`visualization` feature).
    #[cfg(feature = "visualization")]
    pub async fn to_plantuml(&self) -> String {
        crate::visualization::to_plantuml(&self.history.lock().await)
    }

    /// Snapshot of runtime counters (`metrics` feature).
    #[cfg(feature = "metrics")]
    pub async fn metrics(&self) -> Metrics {
        self.metrics.lock().await.clone()
    }
}
