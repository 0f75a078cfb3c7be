//! Typed planner errors.
//!
//! `PlanError` represents pre-flight failures only. Every way a search can
//! end once it has started (plan found, exhaustion, budget, cancellation)
//! is a [`crate::planner::TerminationReason`] on a normal result.

/// Typed failure for pre-flight planner validation.
///
/// Returned before the first task is dispatched; no stats or trace exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// Verbosity outside the supported `0..=3` range.
    #[error("verbosity must be between 0 and 3, got {level}")]
    InvalidVerbosity { level: u8 },
    /// A policy field holds a value the planner cannot honor.
    #[error("invalid planning policy: {detail}")]
    InvalidPolicy { detail: String },
}
