//! Transition history tracking (optional `history` feature).

use std::time::Instant;

use crate::state::StateName;

/// One recorded state-change announcement. `from` is `None` only for the
/// very first record, which documents entry into the initial state rather
/// than a transition between two declared states.
#[derive(Debug, Clone)]
pub struct TransitionRecord {
    pub from: Option<StateName>,
    pub to: StateName,
    /// The event name that triggered the transition, or `None` for the
    /// initial-state installation, which has no triggering event.
    pub event: Option<String>,
    pub at: Instant,
}
