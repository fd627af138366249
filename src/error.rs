//! Error surface for the declaration API and the dispatcher.

use thiserror::Error;

use crate::state::StateName;

/// Everything that can go wrong building or running a [`crate::Machine`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EfsmError {
    /// `OnEvents` tried to install an event name that already has a handler
    /// on that state. None of the names in the offending call were
    /// installed.
    #[error("event {event:?} already has a handler registered on state {state:?}")]
    DuplicateRegistration { state: StateName, event: String },

    /// `Run` was called with a state name that was never declared.
    #[error("initial state {0:?} was never declared")]
    UnknownInitialState(StateName),

    /// A handler returned `Goto` to a state that was never declared.
    #[error("transition handler returned undeclared state {0:?}")]
    InvalidState(StateName),

    /// A second `Run` was attempted while one was already in flight.
    #[error("this machine is already running")]
    AlreadyRunning,

    /// The `out` channel's receiver was dropped; a state-change
    /// announcement could not be delivered.
    #[error("output channel closed while emitting a state-change announcement")]
    OutputClosed,
}
