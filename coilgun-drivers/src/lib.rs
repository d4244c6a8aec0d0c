//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in coilgun-core on top of the board HAL:
//!
//! - Relay bank driving the stage coils
//! - Photogate bank sampling the optical gates through a shared ADC
//! - Adapter from `embedded-hal` 1.0 output pins to the HAL pin trait
//! - Serial link helpers: abort polling and reply lines over `embedded-io`

#![no_std]
#![deny(unsafe_code)]

pub mod gate;
pub mod pin;
pub mod relay;
pub mod serial;

pub use gate::PhotoGateBank;
pub use pin::EmbeddedHalPin;
pub use relay::{Polarity, Relay, RelayBank};
pub use serial::{ReplyQueue, SerialAbort};
