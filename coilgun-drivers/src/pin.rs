//! `embedded-hal` pin adapter
//!
//! Board crates hand out `embedded_hal::digital::OutputPin` implementors.
//! The coil relays need infallible switching and a readable latched state,
//! so only pins whose error type is `Infallible` are accepted and the
//! commanded level is tracked here.

use core::convert::Infallible;

use coilgun_hal::OutputPin;
use embedded_hal::digital::OutputPin as HalOutputPin;

/// Wraps an infallible `embedded-hal` output pin
pub struct EmbeddedHalPin<P> {
    pin: P,
    high: bool,
}

impl<P> EmbeddedHalPin<P>
where
    P: HalOutputPin<Error = Infallible>,
{
    /// Wrap a pin that is currently driven to `high`
    ///
    /// Nothing is written; board code creates the pin at its idle level so
    /// an active-low relay never sees a glitch.
    pub fn new(pin: P, high: bool) -> Self {
        Self { pin, high }
    }

    /// Release the underlying pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> OutputPin for EmbeddedHalPin<P>
where
    P: HalOutputPin<Error = Infallible>,
{
    fn set_high(&mut self) {
        if let Err(never) = self.pin.set_high() {
            match never {}
        }
        self.high = true;
    }

    fn set_low(&mut self) {
        if let Err(never) = self.pin.set_low() {
            match never {}
        }
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::ErrorType;

    /// Mock pin counting writes
    struct MockPin {
        level: bool,
        writes: u32,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl HalOutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.level = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.level = true;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_new_does_not_write() {
        let pin = EmbeddedHalPin::new(
            MockPin {
                level: true,
                writes: 0,
            },
            true,
        );
        assert!(pin.is_set_high());

        let inner = pin.into_inner();
        assert!(inner.level);
        assert_eq!(inner.writes, 0);
    }

    #[test]
    fn test_tracks_level() {
        let mut pin = EmbeddedHalPin::new(
            MockPin {
                level: false,
                writes: 0,
            },
            false,
        );

        pin.set_high();
        assert!(pin.is_set_high());
        pin.set_state(false);
        assert!(pin.is_set_low());
        assert_eq!(pin.into_inner().writes, 2);
    }
}
