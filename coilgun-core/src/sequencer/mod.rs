//! Firing sequencer
//!
//! Owns the hardware, the configuration and the state machine. A fire
//! command runs all three stages back to back on the caller's thread:
//! stage 1 gets its full maximum duration, each later stage gets a window
//! predicted from the velocity measured over the stage before it. After a
//! completed run the sequencer sits in `Cooldown` until [`Sequencer::tick`]
//! sees the lockout expire.
//!
//! ```text
//! Idle ──fire──▶ Stage1 ──▶ Stage2 ──▶ Stage3 ──▶ Cooldown ──elapsed──▶ Idle
//!                  │          │          │           │
//!                  └──abort───┴──────────┴─▶ Aborted └──reset──▶ Idle
//!                                              │
//!                                              └──coils off──▶ Idle
//! ```

pub mod run;

use core::fmt;

use coilgun_protocol::Command;

pub use run::{RunSummary, SequenceRun, StageRecord};

use crate::config::{ConfigError, SequencerConfig, NUM_STAGES};
use crate::diagnostics::{run_diagnostics, DiagnosticsReport};
use crate::safety::{plan_next_budget, StageBudget};
use crate::stage::{PollOutcome, StageController, TriggerCause};
use crate::state::{Event, State};
use crate::trace::{EventSink, TraceEvent};
use crate::traits::clock::elapsed_ms;
use crate::traits::{AbortSignal, Clock, CoilBank, GateBank};

/// Reasons a command is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// A run or cooldown is in progress
    Busy,
    /// Command byte not recognised
    InvalidCommand,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Busy => f.write_str("busy"),
            CommandError::InvalidCommand => f.write_str("invalid command"),
        }
    }
}

/// Result of an accepted command
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// All three stages ran; cooldown started
    Fired(RunSummary),
    /// Reset arrived mid-run; all coils off, cooldown skipped
    AbortedMidRun(RunSummary),
    /// Reset handled
    ResetComplete,
    /// Diagnostics pass finished
    Diagnostics(DiagnosticsReport),
}

/// The firing sequencer
pub struct Sequencer<C, K, G, L> {
    config: SequencerConfig,
    clock: C,
    coils: K,
    gates: G,
    sink: L,
    state: State,
    run: Option<SequenceRun>,
    cooldown_started_ms: u32,
}

impl<C, K, G, L> Sequencer<C, K, G, L>
where
    C: Clock,
    K: CoilBank,
    G: GateBank,
    L: EventSink,
{
    /// Validate the configuration and take ownership of the hardware
    ///
    /// All coils are released before the sequencer is returned.
    pub fn new(
        config: SequencerConfig,
        clock: C,
        mut coils: K,
        gates: G,
        sink: L,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        coils.all_off();

        Ok(Self {
            config,
            clock,
            coils,
            gates,
            sink,
            state: State::Idle,
            run: None,
            cooldown_started_ms: 0,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn sink(&self) -> &L {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut L {
        &mut self.sink
    }

    /// Check if a run is in progress
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Milliseconds left in the cooldown lockout, if in cooldown
    pub fn cooldown_remaining_ms(&self) -> Option<u32> {
        (self.state == State::Cooldown).then(|| {
            let elapsed = elapsed_ms(self.clock.now_ms(), self.cooldown_started_ms);
            self.config.cooldown_ms.saturating_sub(elapsed)
        })
    }

    /// Dispatch one host command
    ///
    /// `abort` is polled on every stage-controller iteration while a fire
    /// command runs.
    pub fn handle<A: AbortSignal>(
        &mut self,
        command: Command,
        abort: &mut A,
    ) -> Result<Response, CommandError> {
        match command {
            Command::Fire => {
                self.ensure_idle(command)?;
                Ok(self.fire(abort))
            }
            Command::Reset => Ok(self.reset()),
            Command::Diagnose => {
                self.ensure_idle(command)?;
                Ok(Response::Diagnostics(self.diagnose(abort)))
            }
            Command::Unknown(_) => Err(self.reject(command, CommandError::InvalidCommand)),
        }
    }

    /// Advance time-driven transitions
    ///
    /// Returns true when the cooldown lockout just ended.
    pub fn tick(&mut self) -> bool {
        if self.state != State::Cooldown {
            return false;
        }

        let elapsed = elapsed_ms(self.clock.now_ms(), self.cooldown_started_ms);
        if elapsed < self.config.cooldown_ms {
            return false;
        }

        self.apply(Event::CooldownElapsed);
        self.sink.emit(TraceEvent::Ready);
        true
    }

    /// Force every coil off and return to `Idle` from any state
    pub fn reset(&mut self) -> Response {
        self.coils.all_off();

        if self.state.is_active() {
            self.apply(Event::Abort);
        }
        if self.state == State::Aborted {
            self.apply(Event::ActuatorsSafe);
        }
        self.apply(Event::Reset);
        self.run = None;

        self.sink.emit(TraceEvent::ResetComplete);
        Response::ResetComplete
    }

    /// Answer a command that arrived while a run held the link
    ///
    /// Nothing is executed: unknown bytes are reported as invalid, anything
    /// else as busy.
    pub fn reject_deferred(&mut self, command: Command) -> CommandError {
        let error = match command {
            Command::Unknown(_) => CommandError::InvalidCommand,
            _ => CommandError::Busy,
        };
        self.reject(command, error)
    }

    fn ensure_idle(&mut self, command: Command) -> Result<(), CommandError> {
        if self.state.accepts_commands() {
            Ok(())
        } else {
            Err(self.reject(command, CommandError::Busy))
        }
    }

    fn reject(&mut self, command: Command, error: CommandError) -> CommandError {
        self.sink
            .emit(TraceEvent::CommandRejected { command, error });
        error
    }

    fn apply(&mut self, event: Event) {
        let next = self.state.transition(event);
        if next != self.state {
            self.sink.emit(TraceEvent::Transition {
                from: self.state,
                to: next,
            });
            self.state = next;
        }
    }

    fn fire<A: AbortSignal>(&mut self, abort: &mut A) -> Response {
        self.run = Some(SequenceRun::new(self.clock.now_ms()));
        self.apply(Event::Fire);

        let mut budget = StageBudget::configured(&self.config.stages[0]);

        for index in 0..NUM_STAGES {
            let stage = self.config.stages[index];
            let ordinal = (index + 1) as u8;

            let mut controller = StageController::start(&stage, budget.ms, &self.clock, &mut self.coils);
            if let Some(run) = self.run.as_mut() {
                run.begin_stage(index, controller.started_ms());
            }

            let result = loop {
                if let PollOutcome::Done(result) =
                    controller.poll(&self.clock, &mut self.coils, &mut self.gates, abort)
                {
                    break result;
                }
            };

            let record = StageRecord {
                stage: ordinal,
                result,
                budget,
            };
            if let Some(run) = self.run.as_mut() {
                run.record(record);
            }
            self.sink.emit(TraceEvent::StageFired {
                stage: ordinal,
                coil: stage.coil,
                result,
                budget,
            });

            if result.cause == TriggerCause::Aborted {
                return Response::AbortedMidRun(self.abort_run(ordinal));
            }

            if let Some(next) = self.config.stages.get(index + 1) {
                let plan = plan_next_budget(&stage, result.elapsed_ms, next);
                if let Some(velocity) = plan.velocity {
                    if let Some(run) = self.run.as_mut() {
                        run.set_velocity(velocity);
                    }
                    self.sink.emit(TraceEvent::VelocityMeasured {
                        stage: ordinal,
                        velocity,
                    });
                }
                if let Some(error) = plan.error {
                    self.sink.emit(TraceEvent::BudgetFallback {
                        stage: ordinal + 1,
                        error,
                        budget_ms: plan.budget.ms,
                    });
                }
                budget = plan.budget;
            }

            self.apply(Event::StageComplete);
        }

        self.cooldown_started_ms = self.clock.now_ms();
        self.sink.emit(TraceEvent::CooldownStarted {
            cooldown_ms: self.config.cooldown_ms,
        });

        Response::Fired(self.take_summary())
    }

    fn abort_run(&mut self, stage: u8) -> RunSummary {
        self.apply(Event::Abort);
        self.coils.all_off();
        self.apply(Event::ActuatorsSafe);

        if let Some(run) = self.run.as_mut() {
            run.mark_aborted();
        }
        self.sink.emit(TraceEvent::SequenceAborted { stage });
        self.take_summary()
    }

    fn take_summary(&mut self) -> RunSummary {
        self.run
            .take()
            .map(SequenceRun::finish)
            .unwrap_or_default()
    }

    fn diagnose<A: AbortSignal>(&mut self, abort: &mut A) -> DiagnosticsReport {
        let report = run_diagnostics(
            &self.config,
            &self.clock,
            &mut self.coils,
            &mut self.gates,
            &mut self.sink,
            abort,
        );
        // The abort was a reset request; honour it now that the coils are off
        if report.aborted {
            self.reset();
        }
        report
    }
}
