//! Host link and logging glue
//!
//! Trace events from the sequencer are logged over defmt and, when they
//! have an operator-facing line, queued for the serial link. The queue is
//! drained by the main loop once a command has returned, so no UART write
//! ever sits between two coil windows.

use coilgun_core::diagnostics::GateVerdict;
use coilgun_core::trace::{EventSink, TraceEvent};
use coilgun_core::traits::Clock;
use coilgun_drivers::ReplyQueue;
use coilgun_protocol::Reply;
use defmt::{debug, info, warn};
use embassy_time::Instant;
use embedded_io::Write;

/// Millisecond clock on the embassy time driver
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u32 {
        // Wraps after ~49 days; the core compares with wrapping arithmetic
        Instant::now().as_millis() as u32
    }
}

/// Event sink: defmt log plus queued serial replies
pub struct LinkSink<W> {
    replies: ReplyQueue<W>,
}

impl<W: Write> LinkSink<W> {
    pub fn new(tx: W) -> Self {
        Self {
            replies: ReplyQueue::new(tx),
        }
    }

    /// Send a reply that does not come from a trace event
    pub fn send(&mut self, reply: Reply) {
        self.replies.push(reply);
        self.drain();
    }

    /// Write out everything queued since the last drain
    pub fn drain(&mut self) {
        let queued = self.replies.pending().len();
        if self.replies.drain().is_err() {
            warn!(
                "serial write failed, {} of {} replies pending",
                self.replies.pending().len(),
                queued
            );
        }
        let dropped = self.replies.take_dropped();
        if dropped > 0 {
            warn!("{} replies dropped, queue full", dropped);
        }
    }
}

fn log_event(event: &TraceEvent) {
    match event {
        TraceEvent::Transition { from, to } => debug!("state {} -> {}", from, to),
        TraceEvent::StageFired {
            stage,
            coil,
            result,
            budget,
        } => info!(
            "stage {} coil {} off after {} ms ({}), budget {} ms ({})",
            stage,
            coil.0,
            result.elapsed_ms,
            result.cause,
            budget.ms,
            budget.source
        ),
        TraceEvent::BudgetFallback {
            stage,
            error,
            budget_ms,
        } => warn!(
            "stage {} prediction failed ({}), using {} ms",
            stage, error, budget_ms
        ),
        TraceEvent::CommandRejected { command, error } => {
            warn!("{} rejected: {}", command, error)
        }
        TraceEvent::GateChecked(check) if check.verdict != GateVerdict::WithinRange => {
            warn!("gate check failed: {}", check)
        }
        TraceEvent::DiagnosticsAborted { stage } => {
            warn!("diagnostics aborted at coil {}", stage)
        }
        other => info!("{}", other),
    }
}

impl<W: Write> EventSink for LinkSink<W> {
    fn emit(&mut self, event: TraceEvent) {
        log_event(&event);
        self.replies.emit(event);
    }
}
