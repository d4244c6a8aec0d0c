//! Safety bounds
//!
//! Every coil window is bounded by its stage's maximum duration no matter
//! where the requested budget came from.

pub mod budget;

pub use budget::{clamp_budget, plan_next_budget, BudgetPlan, BudgetSource, StageBudget};
