//! Fluent declaration of states, timeouts, and per-event handlers.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::{Receiver, Sender};

use crate::error::EfsmError;
use crate::event::Event;
use crate::machine::Machine;
use crate::state::{HandlerFn, StateName, StateSpec, TimeoutSpec};
use crate::transition::TransitionIntent;

/// Builds the declarative transition table for one machine. Declaration is
/// append-only and must complete before `build` hands the table to a
/// [`Machine`] (spec invariant 5).
pub struct EfsmBuilder<P> {
    states: HashMap<StateName, StateSpec<P>>,
}

impl<P> EfsmBuilder<P> {
    pub fn new() -> Self {
        EfsmBuilder {
            states: HashMap::new(),
        }
    }

    /// Idempotent: returns a handle to the existing record if `name` was
    /// already declared (directly or as a transition target), else creates
    /// an empty one. Different declarations may reference the same state by
    /// name before its own `on_events` block is reached.
    pub fn declare_state(&mut self, name: impl Into<StateName>) -> StateHandle<'_, P> {
        let name = name.into();
        self.states.entry(name.clone()).or_insert_with(StateSpec::empty);
        StateHandle {
            builder: self,
            name,
        }
    }
}

impl<P> EfsmBuilder<P>
where
    P: Clone + Send + Sync + 'static,
{
    /// Finalize the table into a running [`Machine`]. The caller owns both
    /// halves of the `in` channel (it needs `in_tx` to drive the machine and
    /// the timer subsystem needs its own clone) and the `out` sender that
    /// carries state-change announcements onward.
    pub fn build(
        self,
        id: impl Into<String>,
        in_tx: Sender<Event<P>>,
        in_rx: Receiver<Event<P>>,
        out_tx: Sender<Event<P>>,
    ) -> Machine<P> {
        Machine::new(id.into(), self.states, in_tx, in_rx, out_tx)
    }
}

impl<P> Default for EfsmBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// A fluent handle onto one state's declaration, borrowed from the builder.
/// Each method mutates through `self.builder` and hands the handle back so
/// calls can chain.
pub struct StateHandle<'a, P> {
    builder: &'a mut EfsmBuilder<P>,
    name: StateName,
}

impl<'a, P> StateHandle<'a, P> {
    /// Set the default payload carried into this state whenever a
    /// transition installs it without an explicit `with_data` override.
    pub fn with_data(self, payload: P) -> Self {
        self.builder
            .states
            .entry(self.name.clone())
            .or_insert_with(StateSpec::empty)
            .default_data = Some(payload);
        self
    }

    /// Record (or overwrite) this state's timeout specification.
    pub fn with_timeout(self, duration: Duration, event_name: impl Into<String>) -> Self {
        self.builder
            .states
            .entry(self.name.clone())
            .or_insert_with(StateSpec::empty)
            .timeout = Some(TimeoutSpec::new(duration, event_name));
        self
    }

    /// Register `handler` under each name in `events`. Fails atomically:
    /// if any name already has a handler on this state, nothing in this
    /// call is installed and the first collision is reported.
    pub fn on_events<F>(self, events: &[&str], handler: F) -> Result<Self, EfsmError>
    where
        F: Fn(&StateName, &Event<P>) -> Option<TransitionIntent<P>> + Send + Sync + 'static,
    {
        let spec = self
            .builder
            .states
            .entry(self.name.clone())
            .or_insert_with(StateSpec::empty);

        for event in events {
            if spec.transitions.contains_key(*event) {
                return Err(EfsmError::DuplicateRegistration {
                    state: self.name.clone(),
                    event: (*event).to_string(),
                });
            }
        }

        let handler: HandlerFn<P> = std::sync::Arc::new(handler);
        for event in events {
            spec.transitions.insert((*event).to_string(), handler.clone());
        }

        Ok(self)
    }

    /// Step back up to the builder to declare another state.
    pub fn done(self) -> &'a mut EfsmBuilder<P> {
        self.builder
    }
}
