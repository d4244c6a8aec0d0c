//! Board-agnostic core logic for the coilgun controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (clock, coils, photogates, abort)
//! - Configuration types and validation
//! - Velocity estimation and stage time budgets
//! - Stage controller (one coil, one bounded window)
//! - State machine and the firing sequencer that drives it
//! - Coil and gate diagnostics
//! - Trace events for logging
//!
//! The crate never prints. Everything observable goes through
//! [`trace::EventSink`].

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod diagnostics;
pub mod safety;
pub mod sequencer;
pub mod stage;
pub mod state;
pub mod trace;
pub mod traits;
pub mod velocity;

#[cfg(test)]
pub(crate) mod sim;
