//! Planning policy: budgets, guards, and diagnostic verbosity.

use serde::Serialize;

use crate::error::PlanError;

/// Diagnostic verbosity, `0..=3`.
///
/// Governs trace emission only; it never changes which plan is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct Verbosity(u8);

impl Verbosity {
    /// No trace output.
    pub const QUIET: Self = Self(0);
    /// Initial parameters and the answer.
    pub const SUMMARY: Self = Self(1);
    /// Additionally, one event per engine step.
    pub const STEPS: Self = Self(2);
    /// Additionally, operator results, method proposals, and returns.
    pub const DETAIL: Self = Self(3);

    /// # Errors
    ///
    /// Returns [`PlanError::InvalidVerbosity`] for levels above 3.
    pub fn new(level: u8) -> Result<Self, PlanError> {
        if level > Self::DETAIL.0 {
            return Err(PlanError::InvalidVerbosity { level });
        }
        Ok(Self(level))
    }

    #[must_use]
    pub fn level(self) -> u8 {
        self.0
    }

    /// Whether output at `at` is enabled under this verbosity.
    #[must_use]
    pub fn allows(self, at: Self) -> bool {
        at != Self::QUIET && self >= at
    }
}

/// Search guards and diagnostics for one planning run.
///
/// The default is the unbounded depth-first search: no depth cap, no
/// expansion budget, quiet, no event log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PlanningPolicy {
    /// Frames deeper than this are not explored. A cut branch counts as a
    /// failed branch and is reported through the termination reason.
    pub max_depth: Option<u32>,
    /// Hard cap on engine steps before the run stops.
    pub max_expansions: Option<u64>,
    pub verbosity: Verbosity,
    /// Keep a structured event log on the result.
    pub record_events: bool,
}

impl PlanningPolicy {
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidPolicy`] for a zero expansion budget,
    /// which could never dispatch the first task.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.max_expansions == Some(0) {
            return Err(PlanError::InvalidPolicy {
                detail: "max_expansions must be at least 1".into(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    #[must_use]
    pub fn with_max_expansions(mut self, max_expansions: u64) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    #[must_use]
    pub fn recording_events(mut self) -> Self {
        self.record_events = true;
        self
    }
}
