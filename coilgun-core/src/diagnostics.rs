//! Coil and gate diagnostics
//!
//! Pulses each coil in firing order, then compares every gate's resting
//! reading with its trip threshold. Waits are busy loops on the clock that
//! poll the abort signal. Only run from `Idle`; the sequencer enforces that
//! by owning the hardware.

use heapless::Vec;

pub use coilgun_protocol::GateVerdict;

use crate::config::{DiagnosticsConfig, SequencerConfig, NUM_STAGES};
use crate::trace::{EventSink, TraceEvent};
use crate::traits::clock::elapsed_ms;
use crate::traits::{AbortSignal, Clock, CoilBank, CoilChannel, GateBank, GateChannel};

/// One coil completed its test pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoilCheck {
    /// 1-based stage number
    pub stage: u8,
    pub channel: CoilChannel,
}

/// Resting reading of one gate compared against its threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GateCheck {
    /// 0-based gate index in firing order
    pub gate: u8,
    /// 1-based stage the gate belongs to
    pub stage: u8,
    pub channel: GateChannel,
    pub threshold: u16,
    /// `None` when the read failed
    pub reading: Option<u16>,
    pub verdict: GateVerdict,
}

/// Results of a diagnostics pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiagnosticsReport {
    pub coils: Vec<CoilCheck, NUM_STAGES>,
    pub gates: Vec<GateCheck, NUM_STAGES>,
    /// Pass was cut short by an abort request
    pub aborted: bool,
}

impl DiagnosticsReport {
    /// True when the pass completed and every gate sits within tolerance
    pub fn all_passed(&self) -> bool {
        !self.aborted
            && self
                .gates
                .iter()
                .all(|g| g.verdict == GateVerdict::WithinRange)
    }
}

/// Classify a resting gate reading
pub fn classify(reading: u16, threshold: u16, tolerance: u16) -> GateVerdict {
    if reading.abs_diff(threshold) <= tolerance {
        GateVerdict::WithinRange
    } else {
        GateVerdict::NeedsCalibration
    }
}

/// Wait `ms` on the clock; returns false if an abort arrived first
fn busy_wait<C: Clock, A: AbortSignal>(clock: &C, abort: &mut A, ms: u32) -> bool {
    let start = clock.now_ms();
    while elapsed_ms(clock.now_ms(), start) < ms {
        if abort.abort_requested() {
            return false;
        }
    }
    true
}

/// Run the coil pulse test and the gate calibration check
///
/// An abort during any wait releases every coil and skips the rest of the
/// pass. Every coil is released before this returns.
pub fn run_diagnostics<C, K, G, L, A>(
    config: &SequencerConfig,
    clock: &C,
    coils: &mut K,
    gates: &mut G,
    sink: &mut L,
    abort: &mut A,
) -> DiagnosticsReport
where
    C: Clock,
    K: CoilBank,
    G: GateBank,
    L: EventSink,
    A: AbortSignal,
{
    let DiagnosticsConfig {
        pulse_ms,
        settle_ms,
        tolerance,
    } = config.diagnostics;
    let mut report = DiagnosticsReport::default();

    sink.emit(TraceEvent::DiagnosticsStarted);
    coils.all_off();

    for (index, stage) in config.stages.iter().enumerate() {
        coils.energize(stage.coil);
        let pulsed = busy_wait(clock, abort, pulse_ms);
        coils.release(stage.coil);
        if !pulsed || !busy_wait(clock, abort, settle_ms) {
            coils.all_off();
            report.aborted = true;
            sink.emit(TraceEvent::DiagnosticsAborted {
                stage: (index + 1) as u8,
            });
            return report;
        }

        let check = CoilCheck {
            stage: (index + 1) as u8,
            channel: stage.coil,
        };
        // Capacity equals the stage count
        let _ = report.coils.push(check);
        sink.emit(TraceEvent::CoilTested(check));
    }

    let gated = config
        .stages
        .iter()
        .enumerate()
        .filter_map(|(index, stage)| stage.gate.map(|gate| (index, gate)));

    for (gate_index, (stage_index, gate)) in gated.enumerate() {
        let reading = gates.read(gate.channel).ok();
        let verdict = match reading {
            Some(value) => classify(value, gate.threshold, tolerance),
            None => GateVerdict::ReadFailed,
        };

        let check = GateCheck {
            gate: gate_index as u8,
            stage: (stage_index + 1) as u8,
            channel: gate.channel,
            threshold: gate.threshold,
            reading,
            verdict,
        };
        let _ = report.gates.push(check);
        sink.emit(TraceEvent::GateChecked(check));
    }

    coils.all_off();
    sink.emit(TraceEvent::DiagnosticsComplete {
        passed: report.all_passed(),
    });
    report
}
