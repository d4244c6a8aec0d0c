//! Per-run bookkeeping

use crate::config::NUM_STAGES;
use crate::safety::StageBudget;
use crate::stage::StageResult;

/// Record of one completed stage window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StageRecord {
    /// 1-based stage number
    pub stage: u8,
    pub result: StageResult,
    pub budget: StageBudget,
}

/// Outcome of a run, returned once the run is discarded
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunSummary {
    /// Records for stages that ran, in firing order
    pub stages: [Option<StageRecord>; NUM_STAGES],
    /// Last velocity estimate (distance units per ms)
    pub velocity: Option<f32>,
    pub started_ms: u32,
    pub aborted: bool,
}

impl RunSummary {
    /// Record for a 1-based stage number
    pub fn stage(&self, ordinal: u8) -> Option<&StageRecord> {
        (ordinal as usize)
            .checked_sub(1)
            .and_then(|index| self.stages.get(index))
            .and_then(Option::as_ref)
    }

    /// Number of stages that ran (including an aborted one)
    pub fn stages_run(&self) -> usize {
        self.stages.iter().filter(|s| s.is_some()).count()
    }
}

/// A firing sequence in progress
///
/// Owned by the sequencer for the duration of one fire command.
#[derive(Debug, Clone)]
pub struct SequenceRun {
    stage_index: usize,
    records: [Option<StageRecord>; NUM_STAGES],
    velocity: Option<f32>,
    started_ms: u32,
    stage_started_ms: u32,
    aborted: bool,
}

impl SequenceRun {
    pub fn new(now_ms: u32) -> Self {
        Self {
            stage_index: 0,
            records: [None; NUM_STAGES],
            velocity: None,
            started_ms: now_ms,
            stage_started_ms: now_ms,
            aborted: false,
        }
    }

    /// Mark the start of the stage at `index` (0-based)
    pub fn begin_stage(&mut self, index: usize, now_ms: u32) {
        self.stage_index = index;
        self.stage_started_ms = now_ms;
    }

    /// Store the record for the current stage
    pub fn record(&mut self, record: StageRecord) {
        if let Some(slot) = self.records.get_mut(self.stage_index) {
            *slot = Some(record);
        }
    }

    pub fn set_velocity(&mut self, velocity: f32) {
        self.velocity = Some(velocity);
    }

    pub fn mark_aborted(&mut self) {
        self.aborted = true;
    }

    pub fn stage_started_ms(&self) -> u32 {
        self.stage_started_ms
    }

    /// Consume the run into its summary
    pub fn finish(self) -> RunSummary {
        RunSummary {
            stages: self.records,
            velocity: self.velocity,
            started_ms: self.started_ms,
            aborted: self.aborted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety::BudgetSource;
    use crate::stage::TriggerCause;

    fn record(stage: u8, elapsed_ms: u32) -> StageRecord {
        StageRecord {
            stage,
            result: StageResult {
                elapsed_ms,
                cause: TriggerCause::SensorTrip,
            },
            budget: StageBudget {
                ms: 75,
                source: BudgetSource::Configured,
            },
        }
    }

    #[test]
    fn test_records_land_in_stage_slots() {
        let mut run = SequenceRun::new(100);
        run.begin_stage(0, 100);
        run.record(record(1, 40));
        run.begin_stage(1, 141);
        run.record(record(2, 38));
        assert_eq!(run.stage_started_ms(), 141);

        let summary = run.finish();
        assert_eq!(summary.stages_run(), 2);
        assert_eq!(summary.stage(2).map(|r| r.result.elapsed_ms), Some(38));
        assert_eq!(summary.stage(3), None);
        assert_eq!(summary.stage(0), None);
        assert!(!summary.aborted);
    }
}
