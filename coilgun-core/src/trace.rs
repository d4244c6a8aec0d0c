//! Trace events
//!
//! The core reports everything observable as [`TraceEvent`]s handed to an
//! [`EventSink`]. The firmware logs them over defmt and echoes the
//! operator-facing ones on the serial link via [`TraceEvent::to_reply`].

use coilgun_protocol::{Command, Reply};

use crate::diagnostics::{CoilCheck, GateCheck};
use crate::safety::StageBudget;
use crate::sequencer::CommandError;
use crate::stage::StageResult;
use crate::state::State;
use crate::traits::CoilChannel;
use crate::velocity::VelocityError;

/// Everything the sequencer reports
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TraceEvent {
    /// State machine moved
    Transition { from: State, to: State },
    /// A stage window closed
    StageFired {
        stage: u8,
        coil: CoilChannel,
        result: StageResult,
        budget: StageBudget,
    },
    /// Velocity measured over a completed stage
    VelocityMeasured { stage: u8, velocity: f32 },
    /// Prediction failed; `stage` runs on its maximum duration
    BudgetFallback {
        stage: u8,
        error: VelocityError,
        budget_ms: u32,
    },
    /// Sequence completed, lockout started
    CooldownStarted { cooldown_ms: u32 },
    /// Lockout expired
    Ready,
    /// Reset arrived while `stage` was active
    SequenceAborted { stage: u8 },
    /// Reset handled, all coils off
    ResetComplete,
    /// Command refused without any state change
    CommandRejected { command: Command, error: CommandError },
    DiagnosticsStarted,
    CoilTested(CoilCheck),
    GateChecked(GateCheck),
    DiagnosticsComplete { passed: bool },
    /// Reset arrived while diagnostics was testing `stage`'s coil
    DiagnosticsAborted { stage: u8 },
}

impl TraceEvent {
    /// Operator-facing status line for this event, if it has one
    pub fn to_reply(&self) -> Option<Reply> {
        let reply = match *self {
            TraceEvent::StageFired { stage, result, .. } => Reply::CoilFired {
                stage,
                elapsed_ms: result.elapsed_ms,
                cause: result.cause.as_str(),
            },
            TraceEvent::BudgetFallback {
                stage, budget_ms, ..
            } => Reply::TimingFallback { stage, budget_ms },
            TraceEvent::CooldownStarted { cooldown_ms } => Reply::CoolingDown { cooldown_ms },
            TraceEvent::Ready => Reply::Ready,
            TraceEvent::SequenceAborted { stage } => Reply::Aborted { stage },
            TraceEvent::ResetComplete => Reply::ResetComplete,
            TraceEvent::CommandRejected { error, .. } => match error {
                CommandError::Busy => Reply::Busy,
                CommandError::InvalidCommand => Reply::InvalidCommand,
            },
            TraceEvent::DiagnosticsStarted => Reply::DiagnosticsStarted,
            TraceEvent::CoilTested(check) => Reply::CoilTested {
                stage: check.stage,
                channel: check.channel.0,
            },
            TraceEvent::GateChecked(check) => Reply::GateChecked {
                gate: check.gate,
                channel: check.channel.0,
                reading: check.reading.unwrap_or(0),
                verdict: check.verdict,
            },
            TraceEvent::DiagnosticsComplete { .. } => Reply::DiagnosticsComplete,
            TraceEvent::DiagnosticsAborted { stage } => Reply::DiagnosticsAborted { stage },
            TraceEvent::Transition { .. } | TraceEvent::VelocityMeasured { .. } => return None,
        };
        Some(reply)
    }
}

/// Destination for trace events
pub trait EventSink {
    fn emit(&mut self, event: TraceEvent);
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: TraceEvent) {
        (**self).emit(event)
    }
}
