//! Build-time configuration
//!
//! `build.rs` validates `coilgun.toml` and renders it into the constants
//! included here. Changing the config means rebuilding the firmware.

use coilgun_core::config::{DiagnosticsConfig, GateConfig, SequencerConfig, StageConfig};
use coilgun_core::traits::{CoilChannel, GateChannel};

include!(concat!(env!("OUT_DIR"), "/coilgun_config.rs"));
