//! Config-driven GPIO allocation
//!
//! Relay pins come from `coilgun.toml`, so they are taken from a bank by
//! number at startup. Pins with a fixed role (UART0 on GPIO0/1, the ADC
//! inputs on GPIO26-29) are split out first and are never handed out by
//! number.

use embassy_rp::gpio::AnyPin;
use embassy_rp::peripherals::{ADC, PIN_0, PIN_1, UART0};
use embassy_rp::{Peri, Peripherals};

use crate::adc::AdcPins;

/// GPIO count on RP2040
pub const GPIO_COUNT: usize = 30;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin,
    /// Pin already taken
    AlreadyTaken,
    /// Pin reserved for UART or ADC
    Reserved,
}

/// Check if a GPIO has a fixed role on this board
pub fn is_reserved(pin: u8) -> bool {
    matches!(pin, 0 | 1 | 26..=29)
}

/// General-purpose pins that can be taken by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl PinBank {
    /// Take a pin by number
    pub fn take(&mut self, pin: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        if pin as usize >= GPIO_COUNT {
            return Err(PinError::InvalidPin);
        }
        if is_reserved(pin) {
            return Err(PinError::Reserved);
        }
        self.pins[pin as usize]
            .take()
            .ok_or(PinError::AlreadyTaken)
    }
}

/// Peripherals with a fixed role
pub struct BoardPeripherals {
    pub uart0: Peri<'static, UART0>,
    pub uart_tx: Peri<'static, PIN_0>,
    pub uart_rx: Peri<'static, PIN_1>,
    pub adc: Peri<'static, ADC>,
    pub adc_pins: AdcPins,
}

/// Split the peripherals into the numbered pin bank and fixed-role parts
pub fn split(p: Peripherals) -> (PinBank, BoardPeripherals) {
    let bank = PinBank {
        pins: [
            None,
            None,
            Some(p.PIN_2.into()),
            Some(p.PIN_3.into()),
            Some(p.PIN_4.into()),
            Some(p.PIN_5.into()),
            Some(p.PIN_6.into()),
            Some(p.PIN_7.into()),
            Some(p.PIN_8.into()),
            Some(p.PIN_9.into()),
            Some(p.PIN_10.into()),
            Some(p.PIN_11.into()),
            Some(p.PIN_12.into()),
            Some(p.PIN_13.into()),
            Some(p.PIN_14.into()),
            Some(p.PIN_15.into()),
            Some(p.PIN_16.into()),
            Some(p.PIN_17.into()),
            Some(p.PIN_18.into()),
            Some(p.PIN_19.into()),
            Some(p.PIN_20.into()),
            Some(p.PIN_21.into()),
            Some(p.PIN_22.into()),
            Some(p.PIN_23.into()),
            Some(p.PIN_24.into()),
            Some(p.PIN_25.into()),
            None,
            None,
            None,
            None,
        ],
    };

    let board = BoardPeripherals {
        uart0: p.UART0,
        uart_tx: p.PIN_0,
        uart_rx: p.PIN_1,
        adc: p.ADC,
        adc_pins: AdcPins {
            pin26: p.PIN_26,
            pin27: p.PIN_27,
            pin28: p.PIN_28,
            pin29: p.PIN_29,
        },
    };

    (bank, board)
}
