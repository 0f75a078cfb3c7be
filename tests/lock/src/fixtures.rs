//! Single source of truth for the fixture runs.
//!
//! Used by both the `plan_fixture` binary and the in-process determinism
//! tests. Any change here changes both, so the cross-process comparison
//! never drifts from what the in-process tests pin.

use hopper_harness::runner::{run_domain, PlanReportV1, RunConfig, RunError};
use hopper_harness::worlds::logistics::{Logistics, LogisticsProblem};
use hopper_harness::worlds::simple_travel::SimpleTravel;
use hopper_search::policy::{PlanningPolicy, Verbosity};

/// Run configuration for fixture runs: events recorded, output at `verbosity`.
#[must_use]
pub fn fixture_config(verbosity: Verbosity) -> RunConfig {
    RunConfig::with_policy(
        PlanningPolicy::default()
            .with_verbosity(verbosity)
            .recording_events(),
    )
}

/// Every fixture run, in output order.
///
/// # Errors
///
/// Returns the first [`RunError`].
pub fn fixture_reports(verbosity: Verbosity) -> Result<Vec<PlanReportV1>, RunError> {
    let config = fixture_config(verbosity);
    Ok(vec![
        run_domain(&SimpleTravel::default(), &config)?,
        run_domain(
            &SimpleTravel {
                cash: 5,
                distance: 8,
            },
            &config,
        )?,
        run_domain(&Logistics::new(LogisticsProblem::driver_transfer(4)), &config)?,
        run_domain(&Logistics::full_delivery(), &config)?,
        run_domain(&Logistics::new(LogisticsProblem::full_delivery(6)), &config)?,
    ])
}

/// `key=value` lines describing one report.
#[must_use]
pub fn report_lines(report: &PlanReportV1) -> Vec<String> {
    let digest = report
        .digest()
        .map_or_else(|e| format!("error:{e}"), |d| d.as_str().to_string());
    let none = || "none".to_string();
    vec![
        format!("domain_id={}", report.domain_id),
        format!("termination={}", report.termination),
        format!(
            "plan_len={}",
            report.plan.as_ref().map_or_else(none, |p| p.len().to_string())
        ),
        format!(
            "plan_digest={}",
            report.plan_digest.clone().unwrap_or_else(none)
        ),
        format!(
            "final_state_digest={}",
            report.final_state_digest.clone().unwrap_or_else(none)
        ),
        format!(
            "trace_digest={}",
            report.trace_digest.clone().unwrap_or_else(none)
        ),
        format!("expansions={}", report.stats.expansions),
        format!("replay={:?}", report.replay),
        format!("report_digest={digest}"),
    ]
}
