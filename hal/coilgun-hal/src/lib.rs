//! Coilgun Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific code (the RP2040 firmware, host test rigs). This keeps
//! the coil and gate drivers free of any particular HAL.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  coilgun-core (sequencer, traits)       │
//! └─────────────────────────────────────────┘
//!                     ▲
//!                     │
//! ┌─────────────────────────────────────────┐
//! │  coilgun-drivers (relays, photogates)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  coilgun-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     ▲
//!                     │
//! ┌─────────────────────────────────────────┐
//! │  coilgun-hal-rp2040 (embassy-rp impls)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital outputs driving coil relays
//! - [`adc::AnalogBank`] - Multi-channel ADC sampling for photogates

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use adc::{AdcError, AnalogBank};
pub use gpio::OutputPin;
