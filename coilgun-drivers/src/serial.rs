//! Serial link helpers
//!
//! The host link is a byte stream. While a sequence runs the sequencer owns
//! the thread, so the receive buffer is drained from inside the stage loop
//! through [`SerialAbort`]. Replies are queued in a [`ReplyQueue`] and only
//! written once the command has returned.

use coilgun_core::trace::{EventSink, TraceEvent};
use coilgun_core::traits::AbortSignal;
use coilgun_protocol::{Command, CommandDecoder, Reply};
use embedded_io::{Read, ReadReady, Write};
use heapless::Vec;

/// Commands kept from a single run before further bytes are dropped
pub const MAX_DEFERRED: usize = 8;

/// Abort signal backed by a serial receiver
///
/// Reset bytes request an abort. Anything else that arrives mid-run is kept
/// so the caller can answer it once the run returns.
pub struct SerialAbort<'a, R> {
    rx: &'a mut R,
    decoder: CommandDecoder,
    deferred: Vec<Command, MAX_DEFERRED>,
    dropped: u32,
    requested: bool,
}

impl<'a, R> SerialAbort<'a, R>
where
    R: Read + ReadReady,
{
    pub fn new(rx: &'a mut R) -> Self {
        Self {
            rx,
            decoder: CommandDecoder::new(),
            deferred: Vec::new(),
            dropped: 0,
            requested: false,
        }
    }

    /// Commands received while the run held the link
    pub fn deferred(&self) -> &[Command] {
        &self.deferred
    }

    /// Commands that did not fit in the deferred queue
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    fn drain(&mut self) {
        let mut byte = [0u8; 1];
        while !self.requested && matches!(self.rx.read_ready(), Ok(true)) {
            match self.rx.read(&mut byte) {
                Ok(1) => {}
                _ => break,
            }

            match self.decoder.feed(byte[0]) {
                Some(command) if command.is_abort() => self.requested = true,
                Some(command) => {
                    if self.deferred.push(command).is_err() {
                        self.dropped = self.dropped.wrapping_add(1);
                    }
                }
                None => {}
            }
        }
    }
}

impl<R> AbortSignal for SerialAbort<'_, R>
where
    R: Read + ReadReady,
{
    fn abort_requested(&mut self) -> bool {
        self.drain();
        self.requested
    }
}

/// Replies held back from a single command before further ones are dropped
pub const MAX_QUEUED_REPLIES: usize = 24;

/// Reply lines queued while the sequencer holds the thread
///
/// Trace events are emitted between one coil releasing and the next one
/// energizing, so nothing here may touch the transmitter until the command
/// has returned. [`ReplyQueue::drain`] writes everything out afterwards.
pub struct ReplyQueue<W> {
    tx: W,
    pending: Vec<Reply, MAX_QUEUED_REPLIES>,
    dropped: u32,
}

impl<W: Write> ReplyQueue<W> {
    pub fn new(tx: W) -> Self {
        Self {
            tx,
            pending: Vec::new(),
            dropped: 0,
        }
    }

    /// Queue a reply without writing anything
    pub fn push(&mut self, reply: Reply) {
        if self.pending.push(reply).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
        }
    }

    /// Replies waiting to be written
    pub fn pending(&self) -> &[Reply] {
        &self.pending
    }

    /// Replies lost to a full queue since the last call
    pub fn take_dropped(&mut self) -> u32 {
        core::mem::take(&mut self.dropped)
    }

    /// Write every queued reply as a CRLF-terminated line, then flush once
    ///
    /// On error the queue is left holding the lines not yet written.
    pub fn drain(&mut self) -> Result<(), W::Error> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let mut written = 0;
        let mut result = Ok(());
        for reply in self.pending.iter() {
            if let Err(e) = write_line(&mut self.tx, reply) {
                result = Err(e);
                break;
            }
            written += 1;
        }

        if written == self.pending.len() {
            self.pending.clear();
        } else {
            // A subslice always fits the same capacity
            self.pending = Vec::from_slice(&self.pending[written..]).unwrap_or_default();
        }
        result?;
        self.tx.flush()
    }

    pub fn into_inner(self) -> W {
        self.tx
    }
}

fn write_line<W: Write>(tx: &mut W, reply: &Reply) -> Result<(), W::Error> {
    let line = reply.render();
    tx.write_all(line.as_bytes())?;
    tx.write_all(b"\r\n")
}

impl<W: Write> EventSink for ReplyQueue<W> {
    fn emit(&mut self, event: TraceEvent) {
        if let Some(reply) = event.to_reply() {
            self.push(reply);
        }
    }
}
