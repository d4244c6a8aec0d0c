//! Board bring-up
//!
//! Turns the RP2040 peripherals into the coil and gate banks the sequencer
//! drives, using the wiring from the build-time config.

use coilgun_core::config::{SequencerConfig, StageConfig, NUM_STAGES};
use coilgun_drivers::{EmbeddedHalPin, PhotoGateBank, Polarity, Relay, RelayBank};
use coilgun_hal_rp2040::{AdcPins, GateAdc, PinBank, PinError};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::ADC;
use embassy_rp::Peri;

pub type CoilRelay = Relay<EmbeddedHalPin<Output<'static>>>;
pub type Coils = RelayBank<EmbeddedHalPin<Output<'static>>, NUM_STAGES>;
pub type Gates = PhotoGateBank<GateAdc>;

/// Claim the relay pins named in `config`, every relay released
pub fn coils(
    pins: &mut PinBank,
    config: &SequencerConfig,
    active_low: bool,
) -> Result<Coils, PinError> {
    let polarity = if active_low {
        Polarity::ActiveLow
    } else {
        Polarity::ActiveHigh
    };
    // Create each pin at the level that keeps its coil off
    let idle_high = active_low;
    let idle_level = if idle_high { Level::High } else { Level::Low };

    let mut relay = |stage: &StageConfig| -> Result<CoilRelay, PinError> {
        let pin = pins.take(stage.coil.0)?;
        let output = Output::new(pin, idle_level);
        Ok(Relay::new(
            stage.coil,
            EmbeddedHalPin::new(output, idle_high),
            polarity,
        ))
    };

    Ok(RelayBank::new([
        relay(&config.stages[0])?,
        relay(&config.stages[1])?,
        relay(&config.stages[2])?,
    ]))
}

/// Photogates on the ADC inputs
pub fn gates(adc: Peri<'static, ADC>, pins: AdcPins) -> Gates {
    PhotoGateBank::new(GateAdc::new(adc, pins))
}
