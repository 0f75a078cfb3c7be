//! Operators module: capability signatures, failures, and the registry.

pub mod failure;
pub mod registry;
