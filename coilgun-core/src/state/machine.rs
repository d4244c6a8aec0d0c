//! State machine definition
//!
//! All coil activity is a function of the current state and an event.

use super::events::Event;

/// Sequencer states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Ready for commands, all coils off
    Idle,
    /// First coil energized, waiting for gate 1
    Stage1Active,
    /// Second coil energized for the predicted window, waiting for gate 2
    Stage2Active,
    /// Third coil energized open-loop
    Stage3Active,
    /// Post-sequence lockout
    Cooldown,
    /// Run aborted, coils being forced off
    Aborted,
}

impl State {
    /// Check if a coil window is open
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            State::Stage1Active | State::Stage2Active | State::Stage3Active
        )
    }

    /// 1-based stage number for active states
    pub fn stage(&self) -> Option<u8> {
        match self {
            State::Stage1Active => Some(1),
            State::Stage2Active => Some(2),
            State::Stage3Active => Some(3),
            _ => None,
        }
    }

    /// Check if fire and diagnose commands are accepted
    pub fn accepts_commands(&self) -> bool {
        matches!(self, State::Idle)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            (Idle, Fire) => Stage1Active,

            (Stage1Active, StageComplete) => Stage2Active,
            (Stage2Active, StageComplete) => Stage3Active,
            (Stage3Active, StageComplete) => Cooldown,

            (Stage1Active | Stage2Active | Stage3Active, Abort) => Aborted,
            (Aborted, ActuatorsSafe) => Idle,

            (Cooldown, CooldownElapsed) => Idle,
            (Cooldown, Reset) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_sequence() {
        let mut state = State::Idle.transition(Event::Fire);
        assert_eq!(state, State::Stage1Active);

        for expected in [State::Stage2Active, State::Stage3Active, State::Cooldown] {
            state = state.transition(Event::StageComplete);
            assert_eq!(state, expected);
        }

        assert_eq!(state.transition(Event::CooldownElapsed), State::Idle);
    }

    #[test]
    fn test_abort_from_any_active_state() {
        for state in [State::Stage1Active, State::Stage2Active, State::Stage3Active] {
            let aborted = state.transition(Event::Abort);
            assert_eq!(aborted, State::Aborted);
            assert_eq!(aborted.transition(Event::ActuatorsSafe), State::Idle);
        }
    }

    #[test]
    fn test_fire_only_from_idle() {
        for state in [
            State::Stage1Active,
            State::Stage2Active,
            State::Stage3Active,
            State::Cooldown,
            State::Aborted,
        ] {
            assert_eq!(state.transition(Event::Fire), state);
            assert!(!state.accepts_commands());
        }
        assert!(State::Idle.accepts_commands());
    }

    #[test]
    fn test_reset_skips_cooldown() {
        assert_eq!(State::Cooldown.transition(Event::Reset), State::Idle);
    }

    #[test]
    fn test_reset_while_idle_is_noop() {
        assert_eq!(State::Idle.transition(Event::Reset), State::Idle);
        assert_eq!(State::Idle.transition(Event::Abort), State::Idle);
    }

    #[test]
    fn test_stage_numbers() {
        assert_eq!(State::Stage1Active.stage(), Some(1));
        assert_eq!(State::Stage3Active.stage(), Some(3));
        assert_eq!(State::Cooldown.stage(), None);
        assert!(State::Stage2Active.is_active());
        assert!(!State::Aborted.is_active());
    }
}
