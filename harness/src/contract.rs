//! Planning domain contract: the minimal trait a domain must implement.
//!
//! Domains provide a state type, a capability registry, an initial state
//! and goal tasks. Domains may NOT implement planning, hashing, or replay
//! verification; those are search, kernel, and runner concerns.

use std::fmt;

use hopper_kernel::carrier::task::Task;
use hopper_kernel::operators::registry::{DomainRegistry, RegistryError};
use serde::Serialize;

/// Typed failure for domain construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Operator or method registration was rejected.
    #[error("registration failed: {0}")]
    Registration(#[from] RegistryError),
    /// The problem instance is inconsistent with the domain.
    #[error("invalid problem instance: {detail}")]
    InvalidInstance { detail: String },
}

/// The contract a domain must implement to be run by the harness runner.
///
/// A domain provides:
/// - A unique identifier
/// - A registry of operators and methods over its state type
/// - The initial state and the ordered goal tasks of one problem instance
///
/// A domain does NOT provide:
/// - The search itself (`hopper_search`'s job)
/// - Digests or replay verification (kernel and runner)
pub trait PlanningDomainV1 {
    /// World state. Serialized for digests and reports.
    type State: Clone + fmt::Debug + PartialEq + Serialize;

    /// Unique domain identifier (e.g., `"logistics"`).
    fn domain_id(&self) -> &str;

    /// Build the capability registry.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Registration`] if a registration is malformed.
    fn registry(&self) -> Result<DomainRegistry<Self::State>, DomainError>;

    fn initial_state(&self) -> Self::State;

    /// Goal tasks, in order.
    fn tasks(&self) -> Vec<Task>;
}
