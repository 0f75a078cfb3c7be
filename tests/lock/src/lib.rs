//! Shared helpers for the lock tests and the `plan_fixture` binary.

pub mod fixtures;
