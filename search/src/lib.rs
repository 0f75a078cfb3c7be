//! Hopper Search: the HTN planning engine and bounded route search.
//!
//! This crate depends only on `hopper_kernel`. It does NOT depend on
//! `hopper_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! hopper_kernel  ←  hopper_search  ←  hopper_harness
//! (tasks, registry)  (planner, routes)  (domains, runner, reports)
//! ```
//!
//! # Key types
//!
//! - [`planner::Planner`] -- depth-first backtracking decomposition over a registry
//! - [`planner::PlanResult`] -- solution, termination reason, stats, optional event log
//! - [`policy::PlanningPolicy`] -- depth cap, expansion budget, verbosity
//! - [`agenda::TaskChain`] -- persistent task list shared between frames
//! - [`route::find_route`] -- cost-bounded walk/bus uniform-cost search

#![forbid(unsafe_code)]

pub mod agenda;
pub mod error;
pub mod frontier;
pub mod planner;
pub mod policy;
pub mod route;
pub mod trace;

pub use planner::{plan, CancelToken, PlanResult, Planner, Solution, TerminationReason};
