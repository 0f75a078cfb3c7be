//! Harness runner: plans one domain instance and verifies the plan by replay.
//!
//! The runner uses ONLY search and kernel APIs. It does not plan, hash, or
//! replay by itself.
//!
//! # Pipeline
//!
//! ```text
//! registry() → registry digest
//!   → initial_state() → state digest
//!   → Planner::plan() → (plan, final state) | termination
//!   → replay_verify() → plan/state digests → PlanReportV1
//! ```

use hopper_kernel::carrier::task::{Plan, Task};
use hopper_kernel::proof::canon::{to_canonical_json_bytes, CanonError};
use hopper_kernel::proof::hash::{
    canonical_hash, plan_digest, state_digest, ContentHash, DOMAIN_PLAN_REPORT,
};
use hopper_kernel::proof::replay::{replay_verify, ReplayError, ReplayVerdict};
use hopper_search::error::PlanError;
use hopper_search::planner::{Planner, TerminationReason};
use hopper_search::policy::PlanningPolicy;
use hopper_search::trace::PlanStats;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::contract::{DomainError, PlanningDomainV1};

/// Report schema identifier written into every report.
pub const PLAN_REPORT_SCHEMA_VERSION: &str = "plan_report.v1";

/// Configuration for one harness run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub policy: PlanningPolicy,
}

impl RunConfig {
    #[must_use]
    pub fn with_policy(policy: PlanningPolicy) -> Self {
        Self { policy }
    }
}

/// Error during a harness run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The domain could not build its registry or instance.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    /// The planner rejected the run configuration.
    #[error("planner rejected configuration: {0}")]
    Plan(#[from] PlanError),
    /// The returned plan could not be replayed at all.
    #[error("replay failed: {0}")]
    Replay(#[from] ReplayError),
    /// Canonical JSON serialization failed.
    #[error("canonical JSON failed: {0}")]
    Canon(#[from] CanonError),
}

/// Replay outcome as recorded in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayStatusV1 {
    /// No plan was found, so nothing was replayed.
    NotRun,
    Match,
    Divergence { steps_replayed: u64 },
}

impl From<ReplayVerdict> for ReplayStatusV1 {
    fn from(verdict: ReplayVerdict) -> Self {
        match verdict {
            ReplayVerdict::Match => Self::Match,
            ReplayVerdict::Divergence { steps_replayed } => Self::Divergence {
                steps_replayed: steps_replayed as u64,
            },
        }
    }
}

/// Self-describing record of one planning run.
///
/// Every field is deterministic for a given domain, instance and policy, so
/// two runs (in-process or across processes) produce byte-identical
/// canonical JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanReportV1 {
    pub schema_version: String,
    pub domain_id: String,
    pub registry_digest: String,
    pub initial_state_digest: String,
    pub tasks: Vec<Task>,
    pub termination: TerminationReason,
    pub plan: Option<Plan>,
    pub plan_digest: Option<String>,
    pub final_state: Option<serde_json::Value>,
    pub final_state_digest: Option<String>,
    pub stats: PlanStats,
    /// Digest of the event log, when the policy recorded one.
    pub trace_digest: Option<String>,
    pub replay: ReplayStatusV1,
}

impl PlanReportV1 {
    /// # Errors
    ///
    /// Returns [`CanonError`] if the report holds a non-integer number.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        to_canonical_json_bytes(self)
    }

    /// Digest of the canonical report bytes under `DOMAIN_PLAN_REPORT`.
    ///
    /// # Errors
    ///
    /// See [`PlanReportV1::to_canonical_json_bytes`].
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = self.to_canonical_json_bytes()?;
        Ok(canonical_hash(DOMAIN_PLAN_REPORT, &bytes))
    }

    #[must_use]
    pub fn is_plan_found(&self) -> bool {
        self.termination == TerminationReason::PlanFound
    }
}

/// Run `domain` through the planner and package the outcome as a report.
///
/// A search that ends without a plan is a normal report (see
/// `termination`). A found plan that replays to a different final state is
/// recorded as [`ReplayStatusV1::Divergence`].
///
/// # Errors
///
/// Returns [`RunError`] when the domain cannot be built, the policy is
/// invalid, the plan cannot be replayed, or a digest cannot be computed.
pub fn run_domain<D: PlanningDomainV1>(
    domain: &D,
    config: &RunConfig,
) -> Result<PlanReportV1, RunError> {
    let span = info_span!("run_domain", domain_id = domain.domain_id());
    let _guard = span.enter();

    let registry = domain.registry()?;
    let registry_digest = registry.digest()?;
    let initial = domain.initial_state();
    let initial_state_digest = state_digest(&initial)?;
    let tasks = domain.tasks();

    let result = Planner::new(&registry)
        .with_policy(config.policy.clone())
        .plan(initial.clone(), tasks.clone())?;
    let trace_digest = result
        .trace
        .as_ref()
        .map(|trace| trace.digest().map(|d| d.to_string()))
        .transpose()?;
    debug!(
        termination = %result.termination,
        expansions = result.stats.expansions,
        "planning finished"
    );

    let (plan, plan_digest, final_state, final_state_digest, replay) = match &result.solution {
        Some(solution) => {
            let verdict = replay_verify(&registry, initial, &solution.plan, &solution.final_state)?;
            let final_json = serde_json::to_value(&solution.final_state).map_err(|e| {
                CanonError::Serialization {
                    detail: e.to_string(),
                }
            })?;
            (
                Some(solution.plan.clone()),
                Some(plan_digest(&solution.plan)?.to_string()),
                Some(final_json),
                Some(state_digest(&solution.final_state)?.to_string()),
                ReplayStatusV1::from(verdict),
            )
        }
        None => (None, None, None, None, ReplayStatusV1::NotRun),
    };
    debug!(replay = ?replay, "replay checked");

    Ok(PlanReportV1 {
        schema_version: PLAN_REPORT_SCHEMA_VERSION.to_string(),
        domain_id: domain.domain_id().to_string(),
        registry_digest: registry_digest.to_string(),
        initial_state_digest: initial_state_digest.to_string(),
        tasks,
        termination: result.termination,
        plan,
        plan_digest,
        final_state,
        final_state_digest,
        stats: result.stats,
        trace_digest,
        replay,
    })
}
