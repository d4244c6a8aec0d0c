//! Stage controller
//!
//! Drives one coil through ON → (abort | timeout | gate trip) → OFF.
//! The loop never sleeps: each iteration is a single [`StageController::poll`]
//! that returns a tagged outcome, and the coil is released on every
//! terminal outcome before `poll` returns.

use crate::config::StageConfig;
use crate::safety::clamp_budget;
use crate::traits::clock::elapsed_ms;
use crate::traits::{AbortSignal, Clock, CoilBank, GateBank};

/// Why a stage window ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerCause {
    /// Gate reading dropped below threshold
    SensorTrip,
    /// Window budget or maximum duration reached
    Timeout,
    /// External abort request
    Aborted,
    /// Open-loop stage completed its window
    OpenLoop,
}

impl TriggerCause {
    /// Short name used in status lines
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerCause::SensorTrip => "sensor",
            TriggerCause::Timeout => "timeout",
            TriggerCause::Aborted => "aborted",
            TriggerCause::OpenLoop => "open-loop",
        }
    }
}

/// Outcome of a completed stage window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StageResult {
    /// Time the coil was energized, never above the stage maximum
    pub elapsed_ms: u32,
    pub cause: TriggerCause,
}

/// Result of a single poll step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// Window still open, coil energized
    Pending,
    /// Window closed, coil released
    Done(StageResult),
}

/// One in-progress stage window
#[derive(Debug)]
pub struct StageController<'a> {
    stage: &'a StageConfig,
    window_ms: u32,
    started_ms: u32,
}

impl<'a> StageController<'a> {
    /// Record the start time and energize the stage's coil
    ///
    /// The window is `budget_ms` clamped to the stage's maximum duration.
    pub fn start<C: Clock, K: CoilBank>(
        stage: &'a StageConfig,
        budget_ms: u32,
        clock: &C,
        coils: &mut K,
    ) -> Self {
        let started_ms = clock.now_ms();
        coils.energize(stage.coil);
        Self {
            stage,
            window_ms: clamp_budget(budget_ms, stage.max_duration_ms),
            started_ms,
        }
    }

    /// Effective window length in ms
    pub fn window_ms(&self) -> u32 {
        self.window_ms
    }

    /// Timestamp the coil was energized at
    pub fn started_ms(&self) -> u32 {
        self.started_ms
    }

    /// Evaluate one iteration
    ///
    /// Checks abort, then the window deadline, then the gate (stages without
    /// a gate only watch the clock). A failed gate read counts as no trip;
    /// the deadline still bounds the window.
    pub fn poll<C, K, G, A>(
        &mut self,
        clock: &C,
        coils: &mut K,
        gates: &mut G,
        abort: &mut A,
    ) -> PollOutcome
    where
        C: Clock,
        K: CoilBank,
        G: GateBank,
        A: AbortSignal,
    {
        let elapsed = elapsed_ms(clock.now_ms(), self.started_ms);

        if abort.abort_requested() {
            return self.finish(coils, elapsed, TriggerCause::Aborted);
        }

        if elapsed >= self.window_ms {
            let cause = if self.stage.gate.is_some() {
                TriggerCause::Timeout
            } else {
                TriggerCause::OpenLoop
            };
            return self.finish(coils, elapsed, cause);
        }

        if let Some(gate) = self.stage.gate {
            if let Ok(reading) = gates.read(gate.channel) {
                if reading < gate.threshold {
                    return self.finish(coils, elapsed, TriggerCause::SensorTrip);
                }
            }
        }

        PollOutcome::Pending
    }

    fn finish<K: CoilBank>(&self, coils: &mut K, elapsed: u32, cause: TriggerCause) -> PollOutcome {
        coils.release(self.stage.coil);
        PollOutcome::Done(StageResult {
            elapsed_ms: elapsed.min(self.stage.max_duration_ms),
            cause,
        })
    }
}

/// Run one stage window to completion
pub fn run_stage<C, K, G, A>(
    stage: &StageConfig,
    budget_ms: u32,
    clock: &C,
    coils: &mut K,
    gates: &mut G,
    abort: &mut A,
) -> StageResult
where
    C: Clock,
    K: CoilBank,
    G: GateBank,
    A: AbortSignal,
{
    let mut controller = StageController::start(stage, budget_ms, clock, coils);
    loop {
        if let PollOutcome::Done(result) = controller.poll(clock, coils, gates, abort) {
            return result;
        }
    }
}
