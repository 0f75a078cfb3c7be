//! Report directory lock tests: a logistics report survives the disk
//! round trip, and any edit to it is detected.

use hopper_harness::report_dir::{read_report, write_report, ReportDirError, REPORT_FILENAME};
use hopper_harness::runner::{run_domain, RunConfig};
use hopper_harness::worlds::logistics::Logistics;
use hopper_search::policy::PlanningPolicy;

fn logistics_report() -> hopper_harness::runner::PlanReportV1 {
    let config = RunConfig::with_policy(PlanningPolicy::default().recording_events());
    run_domain(&Logistics::full_delivery(), &config).unwrap()
}

#[test]
fn logistics_report_roundtrips() {
    let report = logistics_report();
    let dir = tempfile::tempdir().unwrap();
    write_report(&report, dir.path()).unwrap();

    let loaded = read_report(dir.path()).unwrap();
    assert_eq!(loaded, report);
    assert_eq!(loaded.digest().unwrap(), report.digest().unwrap());
}

#[test]
fn rewriting_is_byte_identical() {
    let report = logistics_report();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    write_report(&report, first.path()).unwrap();
    write_report(&read_report(first.path()).unwrap(), second.path()).unwrap();
    assert_eq!(
        std::fs::read(first.path().join(REPORT_FILENAME)).unwrap(),
        std::fs::read(second.path().join(REPORT_FILENAME)).unwrap()
    );
}

#[test]
fn edited_plan_is_detected() {
    let report = logistics_report();
    let dir = tempfile::tempdir().unwrap();
    write_report(&report, dir.path()).unwrap();

    let mut edited = report.clone();
    if let Some(plan) = edited.plan.as_mut() {
        plan.pop();
    }
    let bytes = edited.to_canonical_json_bytes().unwrap();
    std::fs::write(dir.path().join(REPORT_FILENAME), bytes).unwrap();

    let err = read_report(dir.path()).unwrap_err();
    assert!(matches!(err, ReportDirError::DigestMismatch { .. }));
}
