//! The declarative transition table built by [`crate::EfsmBuilder`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::event::Event;
use crate::transition::TransitionIntent;

/// A state identifier, unique within one machine.
pub type StateName = String;

/// A per-state timeout specification: fire `event_name` if the machine
/// stays in this state longer than `duration`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeoutSpec {
    pub event_name: String,
    pub duration: Duration,
}

impl TimeoutSpec {
    pub fn new(duration: Duration, event_name: impl Into<String>) -> Self {
        TimeoutSpec {
            event_name: event_name.into(),
            duration,
        }
    }
}

/// A transition handler: `(current state, event) -> Option<TransitionIntent>`.
/// `None` means "stay put, don't re-arm anything" (spec §3, TransitionHandler).
pub type HandlerFn<P> =
    Arc<dyn Fn(&StateName, &Event<P>) -> Option<TransitionIntent<P>> + Send + Sync>;

/// The declarative, immutable-once-built record for one state. Per-instance
/// runtime data (the live `data` value, the armed timer) is not kept here;
/// it lives in the dispatcher's `RunState` so that `StateSpec` can stay a
/// plain, cheaply shared declaration (spec invariant 5: the transition table
/// is immutable during execution).
pub struct StateSpec<P> {
    pub(crate) default_data: Option<P>,
    pub(crate) timeout: Option<TimeoutSpec>,
    pub(crate) transitions: HashMap<String, HandlerFn<P>>,
}

impl<P> StateSpec<P> {
    pub(crate) fn empty() -> Self {
        StateSpec {
            default_data: None,
            timeout: None,
            transitions: HashMap::new(),
        }
    }
}
