//! Photogate bank
//!
//! All gates share one multi-channel ADC. A gate reading is the raw
//! conversion; the sequencer compares it against the configured threshold.

use coilgun_core::traits::{GateBank, GateChannel, SensorError};
use coilgun_hal::{AdcError, AnalogBank};

/// Photogates sampled through an [`AnalogBank`]
pub struct PhotoGateBank<A> {
    adc: A,
}

impl<A: AnalogBank> PhotoGateBank<A> {
    pub fn new(adc: A) -> Self {
        Self { adc }
    }
}

impl<A: AnalogBank> GateBank for PhotoGateBank<A> {
    fn read(&mut self, channel: GateChannel) -> Result<u16, SensorError> {
        let reading = self.adc.read_channel(channel.0).map_err(|e| match e {
            AdcError::UnknownChannel(_) => SensorError::UnknownChannel,
            AdcError::Conversion => SensorError::ConversionError,
        })?;

        // Anything above full scale is a corrupted conversion
        if reading > self.adc.full_scale() {
            return Err(SensorError::ConversionError);
        }
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock ADC with fixed per-channel readings
    struct MockAdc {
        readings: [Option<u16>; 2],
    }

    impl AnalogBank for MockAdc {
        fn full_scale(&self) -> u16 {
            4095
        }

        fn read_channel(&mut self, channel: u8) -> Result<u16, AdcError> {
            match self.readings.get(channel as usize) {
                Some(Some(value)) => Ok(*value),
                Some(None) => Err(AdcError::Conversion),
                None => Err(AdcError::UnknownChannel(channel)),
            }
        }
    }

    #[test]
    fn test_reads_channel() {
        let mut gates = PhotoGateBank::new(MockAdc {
            readings: [Some(4010), Some(900)],
        });
        assert_eq!(gates.read(GateChannel(0)), Ok(4010));
        assert_eq!(gates.read(GateChannel(1)), Ok(900));
    }

    #[test]
    fn test_maps_errors() {
        let mut gates = PhotoGateBank::new(MockAdc {
            readings: [None, Some(5000)],
        });
        assert_eq!(
            gates.read(GateChannel(0)),
            Err(SensorError::ConversionError)
        );
        assert_eq!(
            gates.read(GateChannel(1)),
            Err(SensorError::ConversionError)
        );
        assert_eq!(gates.read(GateChannel(7)), Err(SensorError::UnknownChannel));
    }
}
