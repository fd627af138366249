//! Convenience constructor for the bounded channels machines are wired with.

use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::event::Event;

/// A bounded `(Sender, Receiver)` pair of [`Event`]s. The engine never
/// creates its own channels (spec §6: the caller supplies `in`/`out`); this
/// is only a thin wrapper so call sites wiring machines together don't need
/// a direct `tokio` dependency just to build one.
pub fn bounded<P>(capacity: usize) -> (Sender<Event<P>>, Receiver<Event<P>>) {
    mpsc::channel(capacity)
}
