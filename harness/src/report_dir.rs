//! Report directory persistence: write/read a `PlanReportV1` to/from disk.
//!
//! # Directory layout
//!
//! ```text
//! <dir>/
//!   plan_report.json    canonical JSON of the report
//!   report_digest.txt   ASCII digest string (e.g. "sha256:...")
//! ```
//!
//! The directory path is never part of the digest. Reading is fail-closed:
//! a missing file, a non-canonical report, or a digest that does not match
//! the recomputed one is an error.

use std::path::Path;

use hopper_kernel::proof::canon::CanonError;
use hopper_kernel::proof::hash::ContentHash;

use crate::runner::PlanReportV1;

pub const REPORT_FILENAME: &str = "plan_report.json";
pub const DIGEST_FILENAME: &str = "report_digest.txt";

/// Error writing or reading a report directory.
#[derive(Debug, thiserror::Error)]
pub enum ReportDirError {
    #[error("I/O error: {detail}")]
    Io { detail: String },
    #[error("missing file: {filename}")]
    MissingFile { filename: String },
    #[error("canonical JSON error: {0}")]
    Canon(#[from] CanonError),
    #[error("report parse error: {detail}")]
    Parse { detail: String },
    /// `plan_report.json` parses but is not in canonical form.
    #[error("{filename} is not canonical JSON")]
    NonCanonical { filename: String },
    #[error("digest mismatch: stored={stored}, recomputed={recomputed}")]
    DigestMismatch { stored: String, recomputed: String },
}

/// Write `report` into `dir`, creating the directory if needed.
///
/// # Errors
///
/// Returns [`ReportDirError`] on I/O failure or canonical JSON error.
pub fn write_report(report: &PlanReportV1, dir: &Path) -> Result<(), ReportDirError> {
    std::fs::create_dir_all(dir).map_err(|e| ReportDirError::Io {
        detail: format!("create_dir_all {}: {e}", dir.display()),
    })?;
    let bytes = report.to_canonical_json_bytes()?;
    let digest = report.digest()?;
    write_atomic(&dir.join(REPORT_FILENAME), &bytes)?;
    write_atomic(&dir.join(DIGEST_FILENAME), digest.as_str().as_bytes())?;
    Ok(())
}

/// Read and verify a report written by [`write_report`].
///
/// # Errors
///
/// Returns [`ReportDirError`] on any validation failure.
pub fn read_report(dir: &Path) -> Result<PlanReportV1, ReportDirError> {
    let bytes = read_required(dir, REPORT_FILENAME)?;
    let stored = read_required(dir, DIGEST_FILENAME)?;

    let report: PlanReportV1 =
        serde_json::from_slice(&bytes).map_err(|e| ReportDirError::Parse {
            detail: e.to_string(),
        })?;
    if report.to_canonical_json_bytes()? != bytes {
        return Err(ReportDirError::NonCanonical {
            filename: REPORT_FILENAME.to_string(),
        });
    }

    let stored = String::from_utf8_lossy(&stored).trim().to_string();
    let recomputed = report.digest()?;
    if ContentHash::parse(&stored).as_ref() != Some(&recomputed) {
        return Err(ReportDirError::DigestMismatch {
            stored,
            recomputed: recomputed.to_string(),
        });
    }
    Ok(report)
}

/// Write via temp file + rename in the same directory.
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ReportDirError> {
    let dir = path.parent().ok_or_else(|| ReportDirError::Io {
        detail: format!("{} has no parent directory", path.display()),
    })?;
    let temp_name = format!(
        ".tmp_{}",
        path.file_name().unwrap_or_default().to_string_lossy()
    );
    let temp_path = dir.join(temp_name);

    std::fs::write(&temp_path, content).map_err(|e| ReportDirError::Io {
        detail: format!("write {}: {e}", temp_path.display()),
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| ReportDirError::Io {
        detail: format!("rename {} -> {}: {e}", temp_path.display(), path.display()),
    })
}

fn read_required(dir: &Path, filename: &str) -> Result<Vec<u8>, ReportDirError> {
    std::fs::read(dir.join(filename)).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ReportDirError::MissingFile {
            filename: filename.to_string(),
        },
        _ => ReportDirError::Io {
            detail: format!("read {filename}: {e}"),
        },
    })
}
