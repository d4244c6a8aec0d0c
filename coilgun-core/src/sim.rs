//! Simulated test rig
//!
//! A single-threaded world shared through `Cell`s. The clock advances one
//! millisecond per read, so every busy loop in the crate makes progress.
//! A gate linked to a coil goes dark once that coil has been energized for
//! its configured delay, which lets tests script exact trip times.

use core::cell::Cell;

use heapless::Vec;

use crate::trace::{EventSink, TraceEvent};
use crate::traits::{AbortSignal, Clock, CoilBank, CoilChannel, GateBank, GateChannel, SensorError};

/// Resting reading of an unobstructed gate
pub const AMBIENT: u16 = 4095;
/// Reading while the projectile shadows a gate
pub const SHADOWED: u16 = 900;

const CHANNELS: usize = 8;

#[derive(Debug, Clone, Copy)]
struct Shadow {
    coil: CoilChannel,
    delay_ms: u32,
}

pub struct SimWorld {
    now: Cell<u32>,
    coil_on: [Cell<bool>; CHANNELS],
    on_since: [Cell<u32>; CHANNELS],
    last_pulse: [Cell<u32>; CHANNELS],
    toggles: Cell<u32>,
    shadows: [Cell<Option<Shadow>>; CHANNELS],
    resting: [Cell<u16>; CHANNELS],
    failing: [Cell<bool>; CHANNELS],
}

impl SimWorld {
    pub fn new() -> Self {
        Self {
            now: Cell::new(1_000),
            coil_on: Default::default(),
            on_since: Default::default(),
            last_pulse: Default::default(),
            toggles: Cell::new(0),
            shadows: Default::default(),
            resting: core::array::from_fn(|_| Cell::new(AMBIENT)),
            failing: Default::default(),
        }
    }

    pub fn rig(&self) -> (SimClock<'_>, SimCoils<'_>, SimGates<'_>) {
        (
            SimClock { world: self },
            SimCoils { world: self },
            SimGates { world: self },
        )
    }

    /// Gate `gate` reads dark once `coil` has been on for `delay_ms`
    pub fn shadow_gate(&self, gate: u8, coil: CoilChannel, delay_ms: u32) {
        self.shadows[gate as usize].set(Some(Shadow { coil, delay_ms }));
    }

    pub fn set_resting(&self, gate: u8, reading: u16) {
        self.resting[gate as usize].set(reading);
    }

    pub fn fail_gate(&self, gate: u8) {
        self.failing[gate as usize].set(true);
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    pub fn coil_on(&self, coil: CoilChannel) -> bool {
        self.coil_on[coil.0 as usize].get()
    }

    pub fn any_coil_on(&self) -> bool {
        self.coil_on.iter().any(Cell::get)
    }

    /// Length of the most recent completed pulse on `coil`
    pub fn last_pulse_ms(&self, coil: CoilChannel) -> u32 {
        self.last_pulse[coil.0 as usize].get()
    }

    /// Number of on/off changes across all coils
    pub fn toggles(&self) -> u32 {
        self.toggles.get()
    }

    pub fn abort_after(&self, coil: CoilChannel, after_ms: u32) -> SimAbort<'_> {
        SimAbort {
            world: self,
            trigger: Some((coil, after_ms)),
        }
    }

    pub fn no_abort(&self) -> SimAbort<'_> {
        SimAbort {
            world: self,
            trigger: None,
        }
    }

    fn on_for(&self, coil: CoilChannel) -> Option<u32> {
        let index = coil.0 as usize;
        self.coil_on[index]
            .get()
            .then(|| self.now.get().wrapping_sub(self.on_since[index].get()))
    }
}

pub struct SimClock<'a> {
    world: &'a SimWorld,
}

impl Clock for SimClock<'_> {
    fn now_ms(&self) -> u32 {
        let t = self.world.now.get();
        self.world.now.set(t.wrapping_add(1));
        t
    }
}

pub struct SimCoils<'a> {
    world: &'a SimWorld,
}

impl CoilBank for SimCoils<'_> {
    fn set(&mut self, channel: CoilChannel, energized: bool) {
        let index = channel.0 as usize;
        let world = self.world;
        if world.coil_on[index].get() == energized {
            return;
        }

        world.toggles.set(world.toggles.get() + 1);
        world.coil_on[index].set(energized);
        if energized {
            world.on_since[index].set(world.now.get());
        } else {
            let pulse = world.now.get().wrapping_sub(world.on_since[index].get());
            world.last_pulse[index].set(pulse);
        }
    }

    fn is_energized(&self, channel: CoilChannel) -> bool {
        self.world.coil_on(channel)
    }

    fn all_off(&mut self) {
        for index in 0..CHANNELS {
            self.set(CoilChannel(index as u8), false);
        }
    }
}

pub struct SimGates<'a> {
    world: &'a SimWorld,
}

impl GateBank for SimGates<'_> {
    fn read(&mut self, channel: GateChannel) -> Result<u16, SensorError> {
        let index = channel.0 as usize;
        let world = self.world;
        if index >= CHANNELS {
            return Err(SensorError::UnknownChannel);
        }
        if world.failing[index].get() {
            return Err(SensorError::ConversionError);
        }

        let shadowed = world.shadows[index]
            .get()
            .and_then(|shadow| {
                world
                    .on_for(shadow.coil)
                    .map(|on_ms| on_ms >= shadow.delay_ms)
            })
            .unwrap_or(false);

        Ok(if shadowed {
            SHADOWED
        } else {
            world.resting[index].get()
        })
    }
}

pub struct SimAbort<'a> {
    world: &'a SimWorld,
    trigger: Option<(CoilChannel, u32)>,
}

impl AbortSignal for SimAbort<'_> {
    fn abort_requested(&mut self) -> bool {
        match self.trigger {
            Some((coil, after_ms)) => self
                .world
                .on_for(coil)
                .map(|on_ms| on_ms >= after_ms)
                .unwrap_or(false),
            None => false,
        }
    }
}

/// Sink that keeps every event for inspection
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<TraceEvent, 64>,
}

impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&TraceEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(*e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: TraceEvent) {
        let _ = self.events.push(event);
    }
}
