//! The transient value a handler returns to request a transition.

use std::time::Duration;

use crate::state::{StateName, TimeoutSpec};

/// What `Goto(name).with_data(...).with_timeout(...)` produces. The
/// dispatcher consumes this when installing the new state; it never
/// mutates the target state's declared defaults directly (spec §4.1).
#[derive(Clone, Debug)]
pub struct TransitionIntent<P> {
    pub(crate) target: StateName,
    pub(crate) data: Option<P>,
    pub(crate) timeout: Option<TimeoutSpec>,
}

impl<P> TransitionIntent<P> {
    /// Request a transition to `name`, with no data or timeout overrides:
    /// the dispatcher falls back to the target state's declared defaults.
    pub fn goto(name: impl Into<StateName>) -> Self {
        TransitionIntent {
            target: name.into(),
            data: None,
            timeout: None,
        }
    }

    /// Override the data carried into the target state.
    pub fn with_data(mut self, data: P) -> Self {
        self.data = Some(data);
        self
    }

    /// Override the target state's declared timeout for this entry only.
    pub fn with_timeout(mut self, duration: Duration, event_name: impl Into<String>) -> Self {
        self.timeout = Some(TimeoutSpec::new(duration, event_name));
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Convenience free function mirroring the handler-side `Goto` API in spec
/// §6: `Goto(name) -> TransitionIntent`.
pub fn goto<P>(name: impl Into<StateName>) -> TransitionIntent<P> {
    TransitionIntent::goto(name)
}
