//! Hopper Kernel: the data model and capability contract of the planner.
//!
//! # API Surface
//!
//! - [`carrier`] -- tasks, task arguments, and the schema-free [`carrier::state::StateBag`]
//! - [`operators::registry::DomainRegistry`] -- operator and method tables a domain registers
//! - [`proof`] -- canonical JSON, domain-separated hashing, and plan replay
//!
//! # Module Dependency Direction
//!
//! `carrier` ← `operators` ← `proof`
//!
//! `proof::hash` also reads `carrier::task` for plan digests, and
//! `operators::registry` uses `proof::hash` for its digest. No other edges.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod carrier;
pub mod operators;
pub mod proof;
