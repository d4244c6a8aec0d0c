//! ADC channel management
//!
//! RP2040 has a single ADC with four external channels:
//! - ADC0: GPIO26
//! - ADC1: GPIO27
//! - ADC2: GPIO28
//! - ADC3: GPIO29
//!
//! Gate reads happen inside the firing loop, so the ADC runs in blocking
//! mode: one conversion takes about 2 µs.

use coilgun_hal::{AdcError, AnalogBank};
use embassy_rp::adc::{Adc, Blocking, Channel, Config};
use embassy_rp::gpio::Pull;
use embassy_rp::peripherals::{ADC, PIN_26, PIN_27, PIN_28, PIN_29};
use embassy_rp::Peri;

/// Number of external ADC channels
pub const ADC_CHANNELS: usize = 4;

/// 12-bit full scale
pub const FULL_SCALE: u16 = 4095;

/// The four ADC-capable pins
pub struct AdcPins {
    pub pin26: Peri<'static, PIN_26>,
    pub pin27: Peri<'static, PIN_27>,
    pub pin28: Peri<'static, PIN_28>,
    pub pin29: Peri<'static, PIN_29>,
}

/// Blocking ADC with every external channel configured
///
/// Photogates idle near full scale, so the pins are left floating
/// (no pull) to avoid biasing the divider.
pub struct GateAdc {
    adc: Adc<'static, Blocking>,
    channels: [Channel<'static>; ADC_CHANNELS],
}

impl GateAdc {
    pub fn new(adc: Peri<'static, ADC>, pins: AdcPins) -> Self {
        Self {
            adc: Adc::new_blocking(adc, Config::default()),
            channels: [
                Channel::new_pin(pins.pin26, Pull::None),
                Channel::new_pin(pins.pin27, Pull::None),
                Channel::new_pin(pins.pin28, Pull::None),
                Channel::new_pin(pins.pin29, Pull::None),
            ],
        }
    }
}

impl AnalogBank for GateAdc {
    fn full_scale(&self) -> u16 {
        FULL_SCALE
    }

    fn read_channel(&mut self, channel: u8) -> Result<u16, AdcError> {
        let ch = self
            .channels
            .get_mut(channel as usize)
            .ok_or(AdcError::UnknownChannel(channel))?;
        self.adc.blocking_read(ch).map_err(|_| AdcError::Conversion)
    }
}
