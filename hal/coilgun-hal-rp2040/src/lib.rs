//! RP2040-specific HAL for the coilgun controller
//!
//! This crate provides RP2040 implementations of the shared `coilgun-hal`
//! traits:
//!
//! - Config-driven GPIO allocation for the coil relays
//! - Blocking multi-channel ADC for the photogates

#![no_std]

pub mod adc;
pub mod pins;

pub use adc::{AdcPins, GateAdc};
pub use pins::{split, BoardPeripherals, PinBank, PinError};
