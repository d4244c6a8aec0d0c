//! Status lines sent back to the host
//!
//! Replies are rendered as plain ASCII lines. The wording follows the
//! long-standing serial monitor output so existing operator habits and
//! scripts keep working.

use core::fmt::{self, Write};

use heapless::String;

/// Longest rendered reply line (without the trailing newline)
pub const MAX_REPLY_LEN: usize = 72;

/// A rendered reply line
pub type ReplyLine = String<MAX_REPLY_LEN>;

/// Outcome of checking one photogate against its threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateVerdict {
    /// Resting reading is within tolerance of the threshold
    WithinRange,
    /// Resting reading drifted; threshold needs recalibration
    NeedsCalibration,
    /// The ADC could not be read
    ReadFailed,
}

/// Replies sent to the host terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// Controller finished booting
    Online,
    /// A coil was de-energized at the end of its window
    CoilFired {
        stage: u8,
        elapsed_ms: u32,
        cause: &'static str,
    },
    /// Velocity prediction failed; the stage runs on its maximum duration
    TimingFallback { stage: u8, budget_ms: u32 },
    /// Sequence completed and the cooldown lockout started
    CoolingDown { cooldown_ms: u32 },
    /// Cooldown elapsed
    Ready,
    /// Sequence aborted by a reset
    Aborted { stage: u8 },
    /// Reset command accepted
    ResetComplete,
    /// Command rejected because a run or cooldown is in progress
    Busy,
    /// Unrecognised command byte
    InvalidCommand,
    /// Diagnostics started
    DiagnosticsStarted,
    /// One coil completed its test pulse
    CoilTested { stage: u8, channel: u8 },
    /// One photogate was checked against its threshold
    GateChecked {
        gate: u8,
        channel: u8,
        reading: u16,
        verdict: GateVerdict,
    },
    /// Diagnostics finished
    DiagnosticsComplete,
    /// Diagnostics cut short by a reset
    DiagnosticsAborted { stage: u8 },
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Reply::Online => f.write_str("Coilgun Controller - ONLINE"),
            Reply::CoilFired {
                stage,
                elapsed_ms,
                cause,
            } => write!(f, "Coil {} fired. {} ms ({})", stage, elapsed_ms, cause),
            Reply::TimingFallback { stage, budget_ms } => write!(
                f,
                "Coil {} timing unavailable, using {} ms limit",
                stage, budget_ms
            ),
            Reply::CoolingDown { cooldown_ms } => {
                write!(f, "Firing complete, cooling down for {} ms.", cooldown_ms)
            }
            Reply::Ready => f.write_str("Cool Down Complete. System Ready"),
            Reply::Aborted { stage } => write!(f, "Sequence aborted during coil {}.", stage),
            Reply::ResetComplete => f.write_str("Relays off. Reset sequence complete."),
            Reply::Busy => f.write_str("Busy"),
            Reply::InvalidCommand => f.write_str("Invalid Command"),
            Reply::DiagnosticsStarted => f.write_str("Debugging process initiated."),
            Reply::CoilTested { stage, channel } => {
                write!(f, "Coil: {} tested. at {}", stage, channel)
            }
            Reply::GateChecked {
                gate,
                channel,
                reading,
                verdict,
            } => match verdict {
                GateVerdict::WithinRange => write!(
                    f,
                    "Light sensor {} within accepted range. - {} {}",
                    gate, reading, channel
                ),
                GateVerdict::NeedsCalibration => write!(
                    f,
                    "WARNING: Light sensor {} requires calibration! - {} {}",
                    gate, reading, channel
                ),
                GateVerdict::ReadFailed => {
                    write!(f, "WARNING: Light sensor {} read failed - {}", gate, channel)
                }
            },
            Reply::DiagnosticsComplete => f.write_str("Debug sequence complete."),
            Reply::DiagnosticsAborted { stage } => {
                write!(f, "Debug sequence aborted at coil {}.", stage)
            }
        }
    }
}

impl Reply {
    /// Render this reply into a fixed-capacity line
    pub fn render(&self) -> ReplyLine {
        let mut line = ReplyLine::new();
        // Every variant fits MAX_REPLY_LEN; a failed write only truncates.
        let _ = write!(line, "{}", self);
        line
    }
}
