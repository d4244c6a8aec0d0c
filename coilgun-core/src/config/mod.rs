//! Configuration types
//!
//! Board-agnostic configuration structures. The firmware fills these from
//! `coilgun.toml` at build time; `Default` matches the reference wiring.

pub mod types;

pub use types::*;
