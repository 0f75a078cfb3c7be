//! Plan replay: re-apply a plan's operators from the initial state.
//!
//! Operator application is the only state-changing step in planning and
//! operators are deterministic, so replaying a returned plan must land on
//! exactly the final state the planner reported.

use crate::carrier::task::Task;
use crate::operators::failure::OperatorFailure;
use crate::operators::registry::DomainRegistry;

/// The plan could not be replayed at all.
///
/// Distinct from [`ReplayVerdict::Divergence`], which means the plan replayed
/// cleanly but ended somewhere else.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    /// A plan step names a task with no registered operator.
    #[error("step {step}: {task} has no registered operator")]
    UnknownOperator { step: usize, task: String },
    /// An operator rejected its step during replay.
    #[error("step {step}: {task} failed: {failure}")]
    OperatorFailed {
        step: usize,
        task: String,
        failure: OperatorFailure,
    },
}

/// Outcome of comparing a replayed plan against the reported final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayVerdict {
    Match,
    Divergence { steps_replayed: usize },
}

impl ReplayVerdict {
    #[must_use]
    pub fn is_match(self) -> bool {
        matches!(self, Self::Match)
    }
}

/// Apply every step of `plan` in order, starting from `initial`.
///
/// # Errors
///
/// Returns [`ReplayError`] for the first step that has no operator or whose
/// operator fails.
pub fn replay_plan<S>(
    registry: &DomainRegistry<S>,
    initial: S,
    plan: &[Task],
) -> Result<S, ReplayError> {
    plan.iter()
        .enumerate()
        .try_fold(initial, |state, (step, task)| {
            let operator =
                registry
                    .operator(&task.name)
                    .ok_or_else(|| ReplayError::UnknownOperator {
                        step,
                        task: task.to_string(),
                    })?;
            operator
                .apply(state, &task.args)
                .map_err(|failure| ReplayError::OperatorFailed {
                    step,
                    task: task.to_string(),
                    failure,
                })
        })
}

/// Replay `plan` and compare the result with `reported_final`.
///
/// # Errors
///
/// See [`replay_plan`].
pub fn replay_verify<S: PartialEq>(
    registry: &DomainRegistry<S>,
    initial: S,
    plan: &[Task],
    reported_final: &S,
) -> Result<ReplayVerdict, ReplayError> {
    let replayed = replay_plan(registry, initial, plan)?;
    if &replayed == reported_final {
        Ok(ReplayVerdict::Match)
    } else {
        Ok(ReplayVerdict::Divergence {
            steps_replayed: plan.len(),
        })
    }
}
