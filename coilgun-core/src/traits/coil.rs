//! Coil (actuator) output trait

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Output channel a coil relay is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoilChannel(pub u8);

/// Bank of coil drivers
///
/// Switching must take effect immediately (sub-millisecond); the stage
/// controller relies on the coil being de-energized as soon as `set`
/// returns.
pub trait CoilBank {
    /// Energize or release one coil
    fn set(&mut self, channel: CoilChannel, energized: bool);

    /// Last commanded state of a coil
    fn is_energized(&self, channel: CoilChannel) -> bool;

    /// Release every coil in the bank
    fn all_off(&mut self);

    /// Energize one coil
    fn energize(&mut self, channel: CoilChannel) {
        self.set(channel, true);
    }

    /// Release one coil
    fn release(&mut self, channel: CoilChannel) {
        self.set(channel, false);
    }
}
