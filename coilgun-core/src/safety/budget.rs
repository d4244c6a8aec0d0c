//! Stage time budgets

use crate::config::StageConfig;
use crate::velocity::{self, VelocityError};

/// Where a stage's time budget came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BudgetSource {
    /// The stage's configured maximum (first stage)
    Configured,
    /// Predicted from the previous stage's measured velocity
    Predicted,
    /// Prediction failed; the stage's maximum is used instead
    Fallback,
}

/// Time budget for one stage window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StageBudget {
    /// Window length in ms, never above the stage's maximum
    pub ms: u32,
    pub source: BudgetSource,
}

impl StageBudget {
    /// Budget equal to the stage's maximum duration
    pub fn configured(stage: &StageConfig) -> Self {
        Self {
            ms: stage.max_duration_ms,
            source: BudgetSource::Configured,
        }
    }

    /// Predicted budget, clamped to the stage's maximum duration
    pub fn predicted(stage: &StageConfig, predicted_ms: u32) -> Self {
        Self {
            ms: clamp_budget(predicted_ms, stage.max_duration_ms),
            source: BudgetSource::Predicted,
        }
    }

    /// Fallback budget after a failed prediction
    pub fn fallback(stage: &StageConfig) -> Self {
        Self {
            ms: stage.max_duration_ms,
            source: BudgetSource::Fallback,
        }
    }
}

/// Limit a requested budget to the stage's maximum duration
#[inline]
pub fn clamp_budget(requested_ms: u32, max_duration_ms: u32) -> u32 {
    requested_ms.min(max_duration_ms)
}

/// Result of planning the next stage's window
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BudgetPlan {
    pub budget: StageBudget,
    /// Velocity measured over the previous stage, if it could be computed
    pub velocity: Option<f32>,
    /// Why the plan fell back to the maximum duration
    pub error: Option<VelocityError>,
}

/// Plan the window for `next` from the time `prev` took
///
/// The velocity over `prev.distance_to_next` predicts how long the
/// projectile needs for `next.distance_to_next`. Any estimator failure
/// falls back to `next.max_duration_ms`.
pub fn plan_next_budget(prev: &StageConfig, prev_elapsed_ms: u32, next: &StageConfig) -> BudgetPlan {
    let velocity = match velocity::estimate(prev.distance_to_next, prev_elapsed_ms) {
        Ok(v) => v,
        Err(error) => {
            return BudgetPlan {
                budget: StageBudget::fallback(next),
                velocity: None,
                error: Some(error),
            }
        }
    };

    match velocity::predict_time(next.distance_to_next, velocity) {
        Ok(predicted) => BudgetPlan {
            budget: StageBudget::predicted(next, predicted),
            velocity: Some(velocity),
            error: None,
        },
        Err(error) => BudgetPlan {
            budget: StageBudget::fallback(next),
            velocity: Some(velocity),
            error: Some(error),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SequencerConfig;
    use proptest::prelude::*;

    #[test]
    fn test_trip_at_40ms_predicts_next_window() {
        let config = SequencerConfig::default();
        let mut next = config.stages[1];
        next.distance_to_next = 30.0;

        // v1 = 40 / 40 = 1.0, predicted2 = 30 / 1.0
        let plan = plan_next_budget(&config.stages[0], 40, &next);
        assert_eq!(plan.velocity, Some(1.0));
        assert_eq!(plan.error, None);
        assert_eq!(
            plan.budget,
            StageBudget {
                ms: 30,
                source: BudgetSource::Predicted
            }
        );
    }

    #[test]
    fn test_prediction_is_clamped() {
        let config = SequencerConfig::default();
        let mut next = config.stages[1];
        next.distance_to_next = 400.0;

        let plan = plan_next_budget(&config.stages[0], 40, &next);
        assert_eq!(plan.budget.ms, next.max_duration_ms);
        assert_eq!(plan.budget.source, BudgetSource::Predicted);
    }

    #[test]
    fn test_zero_elapsed_falls_back() {
        let config = SequencerConfig::default();
        let plan = plan_next_budget(&config.stages[0], 0, &config.stages[1]);
        assert_eq!(plan.error, Some(VelocityError::DivideByZero));
        assert_eq!(plan.velocity, None);
        assert_eq!(plan.budget, StageBudget::fallback(&config.stages[1]));
    }

    #[test]
    fn test_invalid_distance_falls_back() {
        let config = SequencerConfig::default();
        let mut prev = config.stages[0];
        prev.distance_to_next = f32::NAN;

        let plan = plan_next_budget(&prev, 40, &config.stages[1]);
        assert_eq!(plan.error, Some(VelocityError::InvalidInput));
        assert_eq!(plan.budget.ms, config.stages[1].max_duration_ms);
        assert_eq!(plan.budget.source, BudgetSource::Fallback);
    }

    proptest! {
        #[test]
        fn prop_clamp_never_exceeds_max(requested in any::<u32>(), max in any::<u32>()) {
            let clamped = clamp_budget(requested, max);
            prop_assert!(clamped <= max);
            prop_assert!(clamped <= requested);
        }

        #[test]
        fn prop_plan_within_max(
            elapsed in 0u32..1000,
            d_prev in -10.0f32..500.0,
            d_next in -10.0f32..500.0,
            max in 1u32..500,
        ) {
            let config = SequencerConfig::default();
            let mut prev = config.stages[0];
            prev.distance_to_next = d_prev;
            let mut next = config.stages[1];
            next.distance_to_next = d_next;
            next.max_duration_ms = max;

            let plan = plan_next_budget(&prev, elapsed, &next);
            prop_assert!(plan.budget.ms <= max);
            if plan.error.is_some() {
                prop_assert_eq!(plan.budget.ms, max);
                prop_assert_eq!(plan.budget.source, BudgetSource::Fallback);
            }
        }
    }
}
