//! Coilgun Host Link Protocol
//!
//! This crate defines the serial protocol between a host terminal and the
//! coil controller. The link is deliberately tiny: the host sends single
//! command bytes and the controller answers with newline-terminated ASCII
//! status lines.
//!
//! # Protocol Overview
//!
//! ```text
//! host → controller          controller → host
//! ┌──────┬───────────┐       ┌──────────────────────────────┐
//! │ 0x20 │ fire      │       │ "Coil 1 fired. 40 ms sensor" │
//! │ 'c'  │ reset     │       │ "Firing complete, cooling…"  │
//! │ 'd'  │ diagnose  │       │ "Invalid Command"            │
//! └──────┴───────────┘       └──────────────────────────────┘
//! ```
//!
//! CR and LF are treated as terminal noise and skipped, so the link works
//! from a line-buffered serial monitor as well as a raw terminal.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod reply;

pub use command::{Command, CommandDecoder, BYTE_DIAGNOSE, BYTE_FIRE, BYTE_RESET};
pub use reply::{GateVerdict, Reply, ReplyLine, MAX_REPLY_LEN};
