//! Hardware abstraction traits
//!
//! These traits define the interface between the sequencer and the
//! board-specific implementations in `coilgun-drivers`.

pub mod abort;
pub mod clock;
pub mod coil;
pub mod gate;

pub use abort::{AbortSignal, NeverAbort};
pub use clock::Clock;
pub use coil::{CoilBank, CoilChannel};
pub use gate::{GateBank, GateChannel, SensorError};
