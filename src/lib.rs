//! An event-driven finite state machine (EFSM) runtime.
//!
//! A machine is declared with [`EfsmBuilder`]: states, per-state timeouts,
//! and per-event transition handlers keyed by state. It is then handed a
//! bounded `in` channel and a bounded `out` channel and driven by
//! [`Machine::run`], a long-running async event loop that consumes input
//! events, dispatches to a handler, installs the returned state, and emits
//! a state-change announcement on `out`. Wiring one machine's `out` into
//! another's `in` composes them into hierarchies and meshes with no central
//! coordinator (spec §4.6).
//!
//! # Features
//!
//! - `history` (default): records every state-change announcement.
//! - `metrics` (default): transition/ignored-event/timeout counters.
//! - `visualization`: export the observed transition graph as DOT or
//!   PlantUML (implies `history`).
//! - `serde`: `Serialize`/`Deserialize` for [`Event`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use efsm_runtime::{channel, transition::goto, EfsmBuilder};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut builder = EfsmBuilder::<()>::new();
//!
//! builder
//!     .declare_state("Running")
//!     .on_events(&["reboot"], |_s, _e| Some(goto("Rebooting")))
//!     .unwrap();
//!
//! builder
//!     .declare_state("Rebooting")
//!     .with_timeout(Duration::from_millis(50), "boot_timeout")
//!     .on_events(&["booted"], |_s, _e| Some(goto("Running")))
//!     .unwrap()
//!     .on_events(&["boot_timeout"], |_s, _e| Some(goto("Failed")))
//!     .unwrap();
//!
//! builder
//!     .declare_state("Failed")
//!     .on_events(&["reset"], |_s, _e| Some(goto("Rebooting")))
//!     .unwrap();
//!
//! let (in_tx, in_rx) = channel::bounded(8);
//! let (out_tx, mut out_rx) = channel::bounded(8);
//! let machine = builder.build("boiler", in_tx.clone(), in_rx, out_tx);
//!
//! tokio::spawn(async move { machine.run("Running").await.unwrap(); });
//!
//! assert_eq!(out_rx.recv().await.unwrap().name, "Running");
//! in_tx.send(efsm_runtime::Event::new("reboot", "test")).await.unwrap();
//! assert_eq!(out_rx.recv().await.unwrap().name, "Rebooting");
//! # }
//! ```

pub mod builder;
pub mod channel;
pub mod error;
pub mod event;
pub mod machine;
pub mod state;
pub mod transition;

#[cfg(feature = "history")]
pub mod history;
#[cfg(feature = "metrics")]
pub mod metrics;
#[cfg(feature = "visualization")]
pub mod visualization;

pub use builder::{EfsmBuilder, StateHandle};
pub use error::EfsmError;
pub use event::Event;
pub use machine::Machine;
pub use state::{StateName, TimeoutSpec};
pub use transition::{goto, TransitionIntent};
