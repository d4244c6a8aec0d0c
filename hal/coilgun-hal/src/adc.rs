//! Analog input abstractions
//!
//! Photogates are sampled through a single multi-channel ADC, so the trait
//! is addressed by channel number rather than one object per pin.

/// Errors reported by an ADC conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Channel number is not wired on this board
    UnknownChannel(u8),
    /// Conversion did not complete or reported a hardware fault
    Conversion,
}

impl core::fmt::Display for AdcError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AdcError::UnknownChannel(ch) => write!(f, "unknown ADC channel {}", ch),
            AdcError::Conversion => f.write_str("ADC conversion failed"),
        }
    }
}

/// Multi-channel analog input
///
/// `read_channel` performs a blocking single-shot conversion. It is called
/// from inside the firing loop, so implementations must not wait on
/// anything slower than the conversion itself.
pub trait AnalogBank {
    /// Full-scale value of a conversion (e.g. 4095 for 12-bit)
    fn full_scale(&self) -> u16;

    /// Read one sample from the given channel
    fn read_channel(&mut self, channel: u8) -> Result<u16, AdcError>;
}
