//! In-process determinism: repeated runs and verbosity changes produce
//! byte-identical reports.

use hopper_harness::runner::run_domain;
use hopper_harness::worlds::logistics::Logistics;
use hopper_search::policy::Verbosity;
use lock_tests::fixtures::{fixture_config, fixture_reports, report_lines};

#[test]
fn fixture_reports_are_stable_across_ten_runs() {
    let first = fixture_reports(Verbosity::QUIET).unwrap();
    for _ in 1..10 {
        let other = fixture_reports(Verbosity::QUIET).unwrap();
        assert_eq!(first.len(), other.len());
        for (a, b) in first.iter().zip(&other) {
            assert_eq!(
                a.to_canonical_json_bytes().unwrap(),
                b.to_canonical_json_bytes().unwrap(),
                "report bytes differ for {}",
                a.domain_id
            );
        }
    }
}

#[test]
fn verbosity_never_changes_the_report() {
    let quiet = fixture_reports(Verbosity::QUIET).unwrap();
    for verbosity in [Verbosity::SUMMARY, Verbosity::STEPS, Verbosity::DETAIL] {
        let loud = fixture_reports(verbosity).unwrap();
        assert_eq!(quiet, loud, "verbosity {} changed a report", verbosity.level());
    }
}

#[test]
fn fixture_outcomes() {
    let reports = fixture_reports(Verbosity::QUIET).unwrap();
    let found: Vec<bool> = reports.iter().map(|r| r.is_plan_found()).collect();
    assert_eq!(found, [true, false, true, true, false]);
    assert!(reports.iter().all(|r| r.trace_digest.is_some()));
}

#[test]
fn report_lines_are_key_value() {
    let report = run_domain(
        &Logistics::full_delivery(),
        &fixture_config(Verbosity::QUIET),
    )
    .unwrap();
    let lines = report_lines(&report);
    assert_eq!(lines[0], "domain_id=logistics");
    assert_eq!(lines[1], "termination=plan_found");
    assert_eq!(lines[2], "plan_len=21");
    assert!(lines.iter().all(|line| line.contains('=')));
    assert!(lines
        .last()
        .is_some_and(|line| line.starts_with("report_digest=sha256:")));
}
