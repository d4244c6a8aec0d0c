//! Events that trigger state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Fire command accepted
    Fire,
    /// Active stage window closed without abort
    StageComplete,
    /// Reset received while a stage was active
    Abort,
    /// All coils confirmed released after an abort
    ActuatorsSafe,
    /// Cooldown lockout expired
    CooldownElapsed,
    /// Reset received outside an active stage
    Reset,
}
