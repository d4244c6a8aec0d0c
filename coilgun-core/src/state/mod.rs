//! Sequencer state machine
//!
//! The state machine is explicit, finite, and deterministic. The sequencer
//! feeds it events; it never touches hardware itself.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::State;
