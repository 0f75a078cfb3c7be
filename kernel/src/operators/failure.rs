//! Capability failure signals.
//!
//! These are ordinary return values, not errors in the exceptional sense:
//! the planner consumes them by backtracking.

use crate::carrier::task::ArgumentError;

/// An operator declined to produce a successor state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperatorFailure {
    /// The operator's preconditions do not hold in the given state.
    #[error("precondition not met: {detail}")]
    PreconditionNotMet { detail: String },
    /// The task's arguments do not fit the operator's signature.
    #[error("argument mismatch: {0}")]
    ArgumentMismatch(#[from] ArgumentError),
}

impl OperatorFailure {
    /// Shorthand for [`OperatorFailure::PreconditionNotMet`].
    pub fn precondition(detail: impl Into<String>) -> Self {
        Self::PreconditionNotMet {
            detail: detail.into(),
        }
    }
}

/// A method is not applicable to the given state and arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MethodFailure {
    #[error("method inapplicable: {detail}")]
    Inapplicable { detail: String },
    #[error("argument mismatch: {0}")]
    ArgumentMismatch(#[from] ArgumentError),
}

impl MethodFailure {
    /// Shorthand for [`MethodFailure::Inapplicable`].
    pub fn inapplicable(detail: impl Into<String>) -> Self {
        Self::Inapplicable {
            detail: detail.into(),
        }
    }
}
