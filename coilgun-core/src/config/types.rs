//! Configuration type definitions

use core::fmt;

use crate::traits::{CoilChannel, GateChannel};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of stages in the launcher
pub const NUM_STAGES: usize = 3;

/// Default hard limit on a coil's energized window
pub const DEFAULT_MAX_DURATION_MS: u32 = 75;

/// Default lockout after a completed sequence
pub const DEFAULT_COOLDOWN_MS: u32 = 3000;

/// Photogate bound to a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GateConfig {
    /// ADC channel
    pub channel: GateChannel,
    /// Readings strictly below this value count as a projectile transit
    pub threshold: u16,
}

/// One stage of the launcher
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StageConfig {
    /// Relay channel driving this stage's coil
    pub coil: CoilChannel,
    /// Gate that ends this stage's window; `None` for the open-loop stage
    pub gate: Option<GateConfig>,
    /// Hard upper bound on the energized window (ms)
    pub max_duration_ms: u32,
    /// Distance covered while this stage is active, in barrel units
    ///
    /// Only ratios between stages matter: the measured time over one
    /// stage's distance predicts the time over the next.
    pub distance_to_next: f32,
}

/// Diagnostics timing and tolerances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiagnosticsConfig {
    /// How long each coil is energized during the pulse test (ms)
    pub pulse_ms: u32,
    /// Pause after each pulse (ms)
    pub settle_ms: u32,
    /// Accepted distance between a resting gate reading and its threshold
    pub tolerance: u16,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            pulse_ms: 500,
            settle_ms: 500,
            tolerance: 40,
        }
    }
}

/// Complete sequencer configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SequencerConfig {
    /// Stages in firing order
    pub stages: [StageConfig; NUM_STAGES],
    /// Lockout after a completed sequence (ms)
    pub cooldown_ms: u32,
    /// Diagnostics parameters
    #[cfg_attr(feature = "serde", serde(default))]
    pub diagnostics: DiagnosticsConfig,
}

impl Default for SequencerConfig {
    /// Reference wiring: relays on GPIO 2/3/4, gates on ADC1 and ADC0
    fn default() -> Self {
        Self {
            stages: [
                StageConfig {
                    coil: CoilChannel(2),
                    gate: Some(GateConfig {
                        channel: GateChannel(1),
                        threshold: 3960,
                    }),
                    max_duration_ms: DEFAULT_MAX_DURATION_MS,
                    distance_to_next: 40.0,
                },
                StageConfig {
                    coil: CoilChannel(3),
                    gate: Some(GateConfig {
                        channel: GateChannel(0),
                        threshold: 4000,
                    }),
                    max_duration_ms: DEFAULT_MAX_DURATION_MS,
                    distance_to_next: 40.0,
                },
                StageConfig {
                    coil: CoilChannel(4),
                    gate: None,
                    max_duration_ms: DEFAULT_MAX_DURATION_MS,
                    distance_to_next: 20.0,
                },
            ],
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

/// Configuration validation errors
///
/// Stage numbers are 1-based, matching the operator-facing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Distance is zero, negative, NaN or infinite
    InvalidDistance { stage: u8 },
    /// Maximum duration of zero would never energize the coil
    ZeroMaxDuration { stage: u8 },
    /// A stage other than the last has no gate to end its window
    MissingGate { stage: u8 },
    /// The final stage fires open-loop and must not have a gate
    GateOnFinalStage,
    /// Two stages drive the same relay
    DuplicateCoil(CoilChannel),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDistance { stage } => {
                write!(f, "stage {}: distance_to_next must be positive", stage)
            }
            ConfigError::ZeroMaxDuration { stage } => {
                write!(f, "stage {}: max_duration_ms must be non-zero", stage)
            }
            ConfigError::MissingGate { stage } => {
                write!(f, "stage {}: gate required on all but the last stage", stage)
            }
            ConfigError::GateOnFinalStage => f.write_str("last stage fires open-loop, remove its gate"),
            ConfigError::DuplicateCoil(ch) => write!(f, "coil channel {} used twice", ch.0),
        }
    }
}

impl SequencerConfig {
    /// Check the configuration for values the sequencer cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, stage) in self.stages.iter().enumerate() {
            let ordinal = (index + 1) as u8;

            if !(stage.distance_to_next.is_finite() && stage.distance_to_next > 0.0) {
                return Err(ConfigError::InvalidDistance { stage: ordinal });
            }
            if stage.max_duration_ms == 0 {
                return Err(ConfigError::ZeroMaxDuration { stage: ordinal });
            }

            let is_last = index + 1 == NUM_STAGES;
            match (is_last, stage.gate.is_some()) {
                (false, false) => return Err(ConfigError::MissingGate { stage: ordinal }),
                (true, true) => return Err(ConfigError::GateOnFinalStage),
                _ => {}
            }

            if self.stages[..index].iter().any(|s| s.coil == stage.coil) {
                return Err(ConfigError::DuplicateCoil(stage.coil));
            }
        }
        Ok(())
    }

    /// Stage by 1-based ordinal
    pub fn stage(&self, ordinal: u8) -> Option<&StageConfig> {
        (ordinal as usize)
            .checked_sub(1)
            .and_then(|index| self.stages.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(SequencerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_wiring() {
        let config = SequencerConfig::default();
        let coils: [u8; NUM_STAGES] = [
            config.stages[0].coil.0,
            config.stages[1].coil.0,
            config.stages[2].coil.0,
        ];
        assert_eq!(coils, [2, 3, 4]);
        assert_eq!(config.cooldown_ms, 3000);
        assert!(config.stages[2].gate.is_none());
    }

    #[test]
    fn test_rejects_bad_distance() {
        let mut config = SequencerConfig::default();
        config.stages[1].distance_to_next = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDistance { stage: 2 })
        );

        config.stages[1].distance_to_next = f32::NAN;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDistance { stage: 2 })
        );
    }

    #[test]
    fn test_rejects_zero_max_duration() {
        let mut config = SequencerConfig::default();
        config.stages[2].max_duration_ms = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroMaxDuration { stage: 3 })
        );
    }

    #[test]
    fn test_gate_placement() {
        let mut config = SequencerConfig::default();
        config.stages[0].gate = None;
        assert_eq!(config.validate(), Err(ConfigError::MissingGate { stage: 1 }));

        let mut config = SequencerConfig::default();
        config.stages[2].gate = config.stages[1].gate;
        assert_eq!(config.validate(), Err(ConfigError::GateOnFinalStage));
    }

    #[test]
    fn test_rejects_duplicate_coil() {
        let mut config = SequencerConfig::default();
        config.stages[2].coil = CoilChannel(2);
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateCoil(CoilChannel(2)))
        );
    }

    #[test]
    fn test_stage_lookup_is_one_based() {
        let config = SequencerConfig::default();
        assert_eq!(config.stage(0), None);
        assert_eq!(config.stage(1).map(|s| s.coil), Some(CoilChannel(2)));
        assert_eq!(config.stage(4), None);
    }
}
