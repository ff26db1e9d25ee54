//! Per-step outcome tracking.
//!
//! Uninstalls, path removals, and database configuration are all made of
//! independent steps. Each step reports an explicit tri-state status so an
//! aggregate can be computed over the steps that actually ran — a step that
//! never ran is neither a success nor a failure.

/// The outcome of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step did not execute (precondition not met, nothing to do).
    NotRun,

    /// The step executed and completed.
    Succeeded,

    /// The step executed and failed.
    Failed,
}

impl StepStatus {
    /// Whether the step executed at all.
    pub fn ran(&self) -> bool {
        !matches!(self, StepStatus::NotRun)
    }

    /// Whether the step executed and failed. `NotRun` is not a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, StepStatus::Failed)
    }
}

/// Aggregate over steps: failed only if a step that ran failed.
pub fn aggregate<'a>(steps: impl IntoIterator<Item = &'a StepStatus>) -> StepStatus {
    let mut any_ran = false;
    for step in steps {
        if step.is_failure() {
            return StepStatus::Failed;
        }
        any_ran |= step.ran();
    }
    if any_ran {
        StepStatus::Succeeded
    } else {
        StepStatus::NotRun
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_run_is_not_a_failure() {
        assert!(!StepStatus::NotRun.is_failure());
        assert!(!StepStatus::NotRun.ran());
    }

    #[test]
    fn aggregate_of_nothing_is_not_run() {
        let empty: [StepStatus; 0] = [];
        assert_eq!(aggregate(&empty), StepStatus::NotRun);
        assert_eq!(
            aggregate(&[StepStatus::NotRun, StepStatus::NotRun]),
            StepStatus::NotRun
        );
    }

    #[test]
    fn aggregate_ignores_steps_that_did_not_run() {
        assert_eq!(
            aggregate(&[StepStatus::NotRun, StepStatus::Succeeded]),
            StepStatus::Succeeded
        );
    }

    #[test]
    fn aggregate_fails_if_any_ran_step_failed() {
        assert_eq!(
            aggregate(&[StepStatus::Succeeded, StepStatus::Failed]),
            StepStatus::Failed
        );
        assert_eq!(
            aggregate(&[StepStatus::NotRun, StepStatus::Failed]),
            StepStatus::Failed
        );
    }
}
