//! Hopper Harness: domain-level orchestration for the planner.
//!
//! The harness runs a domain through the planner and the kernel's proof
//! pipeline (`registry` → `plan` → `replay_verify` → digests) and packages
//! the result as a self-describing [`runner::PlanReportV1`].
//!
//! The harness does NOT plan or hash by itself; it delegates to
//! `hopper_search` and `hopper_kernel`. Domains provide operators, methods
//! and problem instances only.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod contract;
pub mod report_dir;
pub mod runner;
pub mod worlds;
