//! The event envelope that crosses machine boundaries.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `{ name, scope, data }`. The only thing the dispatcher looks at is
/// `name`; `scope` identifies the originating machine for observability and
/// cross-machine disambiguation, and `data` is opaque to the engine.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event<P> {
    /// Dispatch key: looked up in the current state's transition table.
    pub name: String,
    /// Id of the machine that produced this event.
    pub scope: String,
    /// Payload reserved for handlers; never inspected by the engine.
    pub data: Option<P>,
}

impl<P> Event<P> {
    /// Build an event with no payload.
    pub fn new(name: impl Into<String>, scope: impl Into<String>) -> Self {
        Event {
            name: name.into(),
            scope: scope.into(),
            data: None,
        }
    }

    /// Build an event carrying a payload.
    pub fn with_data(name: impl Into<String>, scope: impl Into<String>, data: P) -> Self {
        Event {
            name: name.into(),
            scope: scope.into(),
            data: Some(data),
        }
    }
}

impl<P> fmt::Display for Event<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.scope)
    }
}
