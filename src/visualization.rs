//! Export the *observed* transition graph (optional `visualization` feature,
//! requires `history`).
//!
//! Handlers in this engine compute their target state at runtime rather than
//! declaring it statically, so there is no literal `(from, event) -> to`
//! table built at declaration time to walk. Instead this walks the recorded
//! [`crate::history`] log of transitions that actually happened.

use crate::history::TransitionRecord;

/// Render the recorded transitions as a Graphviz DOT digraph.
pub fn to_dot(history: &[TransitionRecord]) -> String {
    let mut dot = String::from("digraph StateMachine {\n  rankdir=LR;\n  node [shape=box];\n\n");
    for record in history {
        let from = record.from.as_deref().unwrap_or("<start>");
        let label = record.event.as_deref().unwrap_or("<initial>");
        dot.push_str(&format!(
            "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
            from, record.to, label
        ));
    }
    dot.push_str("}\n");
    dot
}

/// Render the recorded transitions as a PlantUML state diagram.
pub fn to_plantuml(history: &[TransitionRecord]) -> String {
    let mut uml = String::from("@startuml\n");
    for record in history {
        let from = record.from.as_deref().unwrap_or("[*]");
        let label = record.event.as_deref().unwrap_or("start");
        uml.push_str(&format!("{} --> {} : {}\n", from, record.to, label));
    }
    uml.push_str("@enduml\n");
    uml
}
