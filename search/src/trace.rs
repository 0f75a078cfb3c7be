//! Planning event log and run counters.
//!
//! The event log is the engine's audit trail: one entry per decision, in
//! the order the engine made them. It is only kept when the policy asks
//! for it (`record_events`); the counters in [`PlanStats`] are always kept.

use hopper_kernel::carrier::task::Task;
use hopper_kernel::proof::canon::{to_canonical_json_bytes, CanonError};
use hopper_kernel::proof::hash::{canonical_hash, ContentHash, DOMAIN_PLAN_TRACE};
use serde::{Deserialize, Serialize};

/// One engine decision.
///
/// `depth` is the frame depth the decision was made at (the root frame is
/// depth 0). `task` is the agenda head being dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanEventV1 {
    /// A frame was entered with `task` at the head of its agenda.
    Dispatch { depth: u32, task: Task, remaining: u64 },
    /// The operator for `task` produced a successor state.
    OperatorApplied { depth: u32, task: Task },
    /// The operator for `task` declined.
    OperatorFailed {
        depth: u32,
        task: Task,
        detail: String,
    },
    /// `method` decomposed `task` into `subtasks` (possibly none).
    MethodExpanded {
        depth: u32,
        task: Task,
        method: String,
        subtasks: Vec<Task>,
    },
    /// `method` does not apply to `task` here.
    MethodInapplicable {
        depth: u32,
        task: Task,
        method: String,
        detail: String,
    },
    /// `task` names neither an operator nor a method list.
    Unresolved { depth: u32, task: Task },
    /// A child frame for `task` would exceed the depth cap.
    DepthCutoff { depth: u32, task: Task },
    /// The agenda emptied: a plan was found.
    Solved { depth: u32, plan_len: u64 },
}

/// Ordered event log for one planning run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanTraceV1 {
    events: Vec<PlanEventV1>,
}

impl PlanTraceV1 {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PlanEventV1) {
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[PlanEventV1] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Canonical JSON of the whole log.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if a task argument cannot be canonicalized.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        to_canonical_json_bytes(self)
    }

    /// Content digest of the log under `DOMAIN_PLAN_TRACE`.
    ///
    /// # Errors
    ///
    /// See [`PlanTraceV1::to_canonical_json_bytes`].
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = self.to_canonical_json_bytes()?;
        Ok(canonical_hash(DOMAIN_PLAN_TRACE, &bytes))
    }
}

/// Counters collected on every run, whatever the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStats {
    /// Engine steps taken (frames dispatched or resumed).
    pub expansions: u64,
    pub operator_applications: u64,
    pub operator_failures: u64,
    pub method_expansions: u64,
    pub method_failures: u64,
    /// Dispatches of a task name found in neither table.
    pub unresolved_tasks: u64,
    pub depth_cutoffs: u64,
    /// Deepest frame reached.
    pub max_depth: u32,
}
