//! Coil relay bank
//!
//! Each stage coil is switched by a relay on a GPIO. Relays may be wired
//! active-high or active-low.

use coilgun_core::traits::{CoilBank, CoilChannel};
use coilgun_hal::OutputPin;

/// Pin level that energizes the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    #[default]
    ActiveHigh,
    ActiveLow,
}

/// One relay bound to a coil channel
pub struct Relay<P> {
    channel: CoilChannel,
    pin: P,
    polarity: Polarity,
    energized: bool,
}

impl<P: OutputPin> Relay<P> {
    /// Create a relay and force it off
    pub fn new(channel: CoilChannel, pin: P, polarity: Polarity) -> Self {
        let mut relay = Self {
            channel,
            pin,
            polarity,
            energized: true,
        };
        relay.set(false);
        relay
    }

    fn set(&mut self, on: bool) {
        self.energized = on;
        // ActiveHigh: on → high; ActiveLow: on → low
        self.pin
            .set_state(on == (self.polarity == Polarity::ActiveHigh));
    }
}

/// Fixed set of relays addressed by coil channel
pub struct RelayBank<P, const N: usize> {
    relays: [Relay<P>; N],
}

impl<P: OutputPin, const N: usize> RelayBank<P, N> {
    /// Create a bank; every relay is already off
    pub fn new(relays: [Relay<P>; N]) -> Self {
        Self { relays }
    }

    fn find(&mut self, channel: CoilChannel) -> Option<&mut Relay<P>> {
        self.relays.iter_mut().find(|r| r.channel == channel)
    }

    /// Check if a channel is wired in this bank
    pub fn contains(&self, channel: CoilChannel) -> bool {
        self.relays.iter().any(|r| r.channel == channel)
    }
}

impl<P: OutputPin, const N: usize> CoilBank for RelayBank<P, N> {
    fn set(&mut self, channel: CoilChannel, energized: bool) {
        // Unwired channels are rejected by config validation on the firmware
        // side; switching one here is a no-op.
        if let Some(relay) = self.find(channel) {
            relay.set(energized);
        }
    }

    fn is_energized(&self, channel: CoilChannel) -> bool {
        self.relays
            .iter()
            .any(|r| r.channel == channel && r.energized)
    }

    fn all_off(&mut self) {
        for relay in self.relays.iter_mut() {
            relay.set(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock GPIO pin for testing
    struct MockPin {
        high: bool,
    }

    impl MockPin {
        fn new() -> Self {
            Self { high: false }
        }
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    fn bank(polarity: Polarity) -> RelayBank<MockPin, 3> {
        RelayBank::new([
            Relay::new(CoilChannel(2), MockPin::new(), polarity),
            Relay::new(CoilChannel(3), MockPin::new(), polarity),
            Relay::new(CoilChannel(4), MockPin::new(), polarity),
        ])
    }

    #[test]
    fn test_active_high_relays() {
        let mut bank = bank(Polarity::ActiveHigh);
        assert!(bank.relays.iter().all(|r| !r.pin.high));

        bank.energize(CoilChannel(3));
        assert!(bank.is_energized(CoilChannel(3)));
        assert!(bank.relays[1].pin.high);
        assert!(!bank.relays[0].pin.high);

        bank.release(CoilChannel(3));
        assert!(!bank.relays[1].pin.high);
    }

    #[test]
    fn test_active_low_relays() {
        let mut bank = bank(Polarity::ActiveLow);
        // Off means pin high
        assert!(bank.relays.iter().all(|r| r.pin.high));

        bank.energize(CoilChannel(2));
        assert!(!bank.relays[0].pin.high);
        assert!(bank.is_energized(CoilChannel(2)));
    }

    #[test]
    fn test_all_off() {
        let mut bank = bank(Polarity::ActiveHigh);
        bank.energize(CoilChannel(2));
        bank.energize(CoilChannel(4));

        bank.all_off();
        for channel in [2, 3, 4] {
            assert!(!bank.is_energized(CoilChannel(channel)));
        }
        assert!(bank.relays.iter().all(|r| !r.pin.high));
    }

    #[test]
    fn test_unknown_channel_ignored() {
        let mut bank = bank(Polarity::ActiveHigh);
        bank.energize(CoilChannel(9));
        assert!(!bank.contains(CoilChannel(9)));
        assert!(!bank.is_energized(CoilChannel(9)));
        assert!(bank.relays.iter().all(|r| !r.pin.high));
    }
}
