//! Cross-process determinism: spawns the `plan_fixture` binary under
//! several environment variants and asserts identical stdout.

use std::path::Path;
use std::process::Command;

use hopper_search::policy::Verbosity;
use lock_tests::fixtures::{fixture_reports, report_lines};

/// Resolve the path to the compiled `plan_fixture` binary.
///
/// NOTE: Windows would need the `.exe` suffix; it is not a current target.
fn binary_path() -> String {
    let mut path = std::env::current_exe()
        .expect("can resolve test binary path")
        .parent()
        .expect("binary dir exists")
        .parent()
        .expect("deps parent exists")
        .to_path_buf();
    path.push("plan_fixture");
    path.to_string_lossy().to_string()
}

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

/// Run the binary with the given cwd, arguments and environment overrides.
fn run_variant(work_dir: &str, args: &[&str], env_overrides: &[(&str, &str)]) -> String {
    let bin = binary_path();
    let mut command = Command::new(&bin);
    command
        .current_dir(work_dir)
        .args(args)
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE")
        .env_remove("RUST_LOG");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });
    assert!(
        output.status.success(),
        "plan_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

#[test]
fn crossproc_determinism_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[], &[]);
    assert!(baseline.contains("domain_id=logistics"));
    assert!(baseline.contains("termination=plan_found"));
    assert!(baseline.contains("replay=Match"));

    let alt_cwd = std::env::temp_dir();
    let variant_cwd = run_variant(&alt_cwd.to_string_lossy(), &[], &[]);
    assert_eq!(baseline, variant_cwd, "output differs when cwd changes");

    let variant_locale = run_variant(&root, &[], &[("LC_ALL", "C"), ("LANG", "C")]);
    assert_eq!(baseline, variant_locale, "output differs when LC_ALL=C LANG=C");

    let variant_noise = run_variant(
        &root,
        &[],
        &[
            ("HOPPER_NOISE", "should_not_matter"),
            ("TZ", "America/New_York"),
            ("HOME", "/nonexistent"),
        ],
    );
    assert_eq!(baseline, variant_noise, "output differs with spurious env vars");
}

#[test]
fn crossproc_logging_stays_off_stdout() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[], &[]);
    let traced = run_variant(&root, &["3"], &[("RUST_LOG", "trace")]);
    assert_eq!(baseline, traced, "log output leaked into stdout");
}

#[test]
fn crossproc_detail_level_logs_the_returned_plan() {
    let stderr_at = |level: &str| {
        let output = Command::new(binary_path())
            .arg(level)
            .env("RUST_LOG", "trace")
            .output()
            .expect("spawn plan_fixture");
        assert!(output.status.success());
        String::from_utf8_lossy(&output.stderr).into_owned()
    };
    assert!(stderr_at("3").contains("returns plan"));
    assert!(!stderr_at("2").contains("returns plan"));
}

#[test]
fn crossproc_matches_inprocess() {
    let expected: Vec<String> = fixture_reports(Verbosity::QUIET)
        .unwrap()
        .iter()
        .map(|report| report_lines(report).join("\n"))
        .collect();
    let stdout = run_variant(&workspace_root(), &[], &[]);
    assert_eq!(stdout, format!("{}\n", expected.join("\n\n")));
}

#[test]
fn crossproc_rejects_bad_verbosity() {
    let output = Command::new(binary_path())
        .arg("9")
        .output()
        .expect("spawn plan_fixture");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
