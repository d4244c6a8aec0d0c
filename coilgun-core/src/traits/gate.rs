//! Photogate input trait

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Analog input channel a photogate is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GateChannel(pub u8);

/// Errors that can occur reading a photogate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Channel not wired on this board
    UnknownChannel,
    /// ADC conversion error
    ConversionError,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::UnknownChannel => f.write_str("unknown gate channel"),
            SensorError::ConversionError => f.write_str("gate conversion failed"),
        }
    }
}

/// Bank of photogates
///
/// Readings are raw light intensity. A projectile shadowing the gate
/// pulls the reading below the configured threshold.
pub trait GateBank {
    /// Read the current intensity of one gate
    ///
    /// Takes `&mut self` because ADC reads require mutable access.
    fn read(&mut self, channel: GateChannel) -> Result<u16, SensorError>;
}
