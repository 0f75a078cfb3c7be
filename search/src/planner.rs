//! Planner entry point and the backtracking engine loop.
//!
//! The engine is depth-first and left to right. Each frame owns a state
//! handle, the remaining agenda, the plan trail and a cursor over the
//! alternatives for its agenda head:
//!
//! 1. Empty agenda: the trail is the plan and the frame state is final.
//! 2. Primitive head: apply the operator to a private copy of the state
//!    and push the continuation. The operator is tried once per frame.
//! 3. Compound head: try each method in registration order on the
//!    unmodified state and push `subtasks ++ tail` as the continuation.
//! 4. Neither: the frame fails.
//!
//! A frame whose alternatives are used up is popped, which resumes its
//! parent at the next alternative. Frames live on an explicit stack, so
//! agenda depth is bounded by memory rather than by the native call stack.
//! Method continuations share the parent state through an `Rc`; only
//! operator application copies it.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hopper_kernel::carrier::task::{render_tasks, Plan, Task};
use hopper_kernel::operators::registry::DomainRegistry;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::agenda::TaskChain;
use crate::error::PlanError;
use crate::policy::{PlanningPolicy, Verbosity};
use crate::trace::{PlanEventV1, PlanStats, PlanTraceV1};

/// Shared cancellation flag, checked before every engine step.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A found plan and the state it leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution<S> {
    pub plan: Plan,
    pub final_state: S,
}

/// Why a planning run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerminationReason {
    PlanFound,
    /// Every alternative failed. `depth_limited` is set when at least one
    /// branch was cut by the depth cap, so a deeper search might succeed.
    SearchExhausted { depth_limited: bool },
    ExpansionBudgetExceeded,
    Cancelled,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlanFound => f.write_str("plan_found"),
            Self::SearchExhausted {
                depth_limited: false,
            } => f.write_str("search_exhausted"),
            Self::SearchExhausted {
                depth_limited: true,
            } => f.write_str("search_exhausted(depth_limited)"),
            Self::ExpansionBudgetExceeded => f.write_str("expansion_budget_exceeded"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Outcome of a planning run.
///
/// Runtime terminations all land here; only pre-flight validation fails
/// with [`PlanError`]. "No plan" is `solution == None` and is never
/// confused with an empty plan, which is `Some` with `plan` empty.
#[derive(Debug)]
pub struct PlanResult<S> {
    pub solution: Option<Solution<S>>,
    pub termination: TerminationReason,
    pub stats: PlanStats,
    /// Present when the policy set `record_events`.
    pub trace: Option<PlanTraceV1>,
}

impl<S> PlanResult<S> {
    #[must_use]
    pub fn is_plan_found(&self) -> bool {
        self.solution.is_some()
    }

    #[must_use]
    pub fn into_solution(self) -> Option<Solution<S>> {
        self.solution
    }
}

#[derive(Debug, Clone, Copy)]
enum Cursor {
    /// Head not dispatched yet.
    Fresh,
    /// Operator (if any) done; `next` is the next method index to try.
    Methods { next: usize },
}

struct Frame<S> {
    state: Rc<S>,
    agenda: TaskChain,
    /// Newest-first.
    trail: TaskChain,
    depth: u32,
    cursor: Cursor,
}

impl<S> Frame<S> {
    fn child(&self, state: Rc<S>, agenda: TaskChain, trail: TaskChain) -> Self {
        Self {
            state,
            agenda,
            trail,
            depth: self.depth.saturating_add(1),
            cursor: Cursor::Fresh,
        }
    }
}

/// Counters plus the optional event log for one run.
struct RunLog {
    stats: PlanStats,
    trace: Option<PlanTraceV1>,
}

impl RunLog {
    fn record(&mut self, event: impl FnOnce() -> PlanEventV1) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(event());
        }
    }
}

/// HTN planner over one capability registry.
///
/// The registry is borrowed read-only; any number of planners may share it.
pub struct Planner<'r, S> {
    registry: &'r DomainRegistry<S>,
    policy: PlanningPolicy,
    cancel: Option<CancelToken>,
}

impl<'r, S: Clone + fmt::Debug> Planner<'r, S> {
    #[must_use]
    pub fn new(registry: &'r DomainRegistry<S>) -> Self {
        Self {
            registry,
            policy: PlanningPolicy::default(),
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: PlanningPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Search for a plan achieving `tasks` from `initial`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidPolicy`] when the policy fails
    /// validation. No search step is taken in that case.
    pub fn plan(&self, initial: S, tasks: Vec<Task>) -> Result<PlanResult<S>, PlanError> {
        self.policy.validate()?;
        let verbosity = self.policy.verbosity;

        if verbosity.allows(Verbosity::SUMMARY) {
            info!(
                verbosity = verbosity.level(),
                tasks = %render_tasks(&tasks),
                state = ?initial,
                "planning started"
            );
        }

        let mut log = RunLog {
            stats: PlanStats::default(),
            trace: self.policy.record_events.then(PlanTraceV1::new),
        };
        let mut stack = vec![Frame {
            state: Rc::new(initial),
            agenda: TaskChain::from_tasks(tasks),
            trail: TaskChain::new(),
            depth: 0,
            cursor: Cursor::Fresh,
        }];

        loop {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Ok(self.finish(log, TerminationReason::Cancelled, None));
            }
            let Some(frame) = stack.last_mut() else {
                let termination = TerminationReason::SearchExhausted {
                    depth_limited: log.stats.depth_cutoffs > 0,
                };
                return Ok(self.finish(log, termination, None));
            };
            log.stats.max_depth = log.stats.max_depth.max(frame.depth);

            // Collecting a finished plan is not an expansion.
            let Some(task) = frame.agenda.first().cloned() else {
                let depth = frame.depth;
                let solution = Self::take_solution(&mut stack);
                if let Some(solution) = &solution {
                    if verbosity.allows(Verbosity::DETAIL) {
                        trace!(
                            depth,
                            plan = %render_tasks(&solution.plan),
                            "returns plan"
                        );
                    }
                    log.record(|| PlanEventV1::Solved {
                        depth,
                        plan_len: solution.plan.len() as u64,
                    });
                }
                return Ok(self.finish(log, TerminationReason::PlanFound, solution));
            };

            if self
                .policy
                .max_expansions
                .is_some_and(|max| log.stats.expansions >= max)
            {
                return Ok(self.finish(log, TerminationReason::ExpansionBudgetExceeded, None));
            }
            log.stats.expansions += 1;

            let mut child = None;
            let method_index = match frame.cursor {
                Cursor::Fresh => {
                    if verbosity.allows(Verbosity::STEPS) {
                        debug!(
                            depth = frame.depth,
                            task = %task,
                            remaining = %frame.agenda,
                            "dispatch"
                        );
                    }
                    log.record(|| PlanEventV1::Dispatch {
                        depth: frame.depth,
                        task: task.clone(),
                        remaining: frame.agenda.len() as u64,
                    });
                    frame.cursor = Cursor::Methods { next: 0 };
                    child = self.try_operator(frame, &task, &mut log);
                    if child.is_none()
                        && !self.registry.is_primitive(&task.name)
                        && !self.registry.is_compound(&task.name)
                    {
                        log.stats.unresolved_tasks += 1;
                        if verbosity.allows(Verbosity::DETAIL) {
                            trace!(depth = frame.depth, task = %task, "unresolved task name");
                        }
                        log.record(|| PlanEventV1::Unresolved {
                            depth: frame.depth,
                            task: task.clone(),
                        });
                    }
                    // With an operator child pending, methods wait until
                    // that continuation fails and this frame resumes.
                    child.is_none().then_some(0)
                }
                Cursor::Methods { next } => Some(next),
            };

            let mut exhausted = false;
            if let Some(index) = method_index {
                match self.registry.methods(&task.name) {
                    Some(methods) if index < methods.len() => {
                        frame.cursor = Cursor::Methods { next: index + 1 };
                        let method = &methods[index];
                        match method.decompose(&frame.state, &task.args) {
                            Ok(subtasks) => {
                                log.stats.method_expansions += 1;
                                if verbosity.allows(Verbosity::DETAIL) {
                                    trace!(
                                        depth = frame.depth,
                                        task = %task,
                                        method = method.name(),
                                        subtasks = %render_tasks(&subtasks),
                                        "method expanded"
                                    );
                                }
                                log.record(|| PlanEventV1::MethodExpanded {
                                    depth: frame.depth,
                                    task: task.clone(),
                                    method: method.name().to_string(),
                                    subtasks: subtasks.clone(),
                                });
                                let agenda = frame.agenda.rest().prepend(subtasks);
                                child = Some(frame.child(
                                    Rc::clone(&frame.state),
                                    agenda,
                                    frame.trail.clone(),
                                ));
                            }
                            Err(failure) => {
                                log.stats.method_failures += 1;
                                if verbosity.allows(Verbosity::DETAIL) {
                                    trace!(
                                        depth = frame.depth,
                                        task = %task,
                                        method = method.name(),
                                        %failure,
                                        "method inapplicable"
                                    );
                                }
                                log.record(|| PlanEventV1::MethodInapplicable {
                                    depth: frame.depth,
                                    task: task.clone(),
                                    method: method.name().to_string(),
                                    detail: failure.to_string(),
                                });
                            }
                        }
                    }
                    _ => exhausted = true,
                }
            }

            if exhausted {
                if verbosity.allows(Verbosity::DETAIL) {
                    trace!(depth = frame.depth, task = %task, "frame failed, backtracking");
                }
                stack.pop();
            } else if let Some(child) = child {
                if self.policy.max_depth.is_some_and(|max| child.depth > max) {
                    log.stats.depth_cutoffs += 1;
                    if verbosity.allows(Verbosity::DETAIL) {
                        trace!(depth = child.depth, task = %task, "depth cap reached");
                    }
                    log.record(|| PlanEventV1::DepthCutoff {
                        depth: child.depth,
                        task,
                    });
                } else {
                    stack.push(child);
                }
            }
        }
    }

    /// Apply the head operator, if there is one, and build the continuation.
    fn try_operator(&self, frame: &Frame<S>, task: &Task, log: &mut RunLog) -> Option<Frame<S>> {
        let operator = self.registry.operator(&task.name)?;
        let verbosity = self.policy.verbosity;
        match operator.apply(S::clone(&frame.state), &task.args) {
            Ok(next_state) => {
                log.stats.operator_applications += 1;
                if verbosity.allows(Verbosity::DETAIL) {
                    trace!(
                        depth = frame.depth,
                        action = %task,
                        new_state = ?next_state,
                        "operator applied"
                    );
                }
                log.record(|| PlanEventV1::OperatorApplied {
                    depth: frame.depth,
                    task: task.clone(),
                });
                Some(frame.child(
                    Rc::new(next_state),
                    frame.agenda.rest(),
                    frame.trail.cons(task.clone()),
                ))
            }
            Err(failure) => {
                log.stats.operator_failures += 1;
                if verbosity.allows(Verbosity::DETAIL) {
                    trace!(depth = frame.depth, action = %task, %failure, "operator failed");
                }
                log.record(|| PlanEventV1::OperatorFailed {
                    depth: frame.depth,
                    task: task.clone(),
                    detail: failure.to_string(),
                });
                None
            }
        }
    }

    /// Pop the solved frame and release every other handle on its state.
    fn take_solution(stack: &mut Vec<Frame<S>>) -> Option<Solution<S>> {
        let frame = stack.pop()?;
        stack.clear();
        let plan = frame.trail.to_plan();
        let final_state = Rc::try_unwrap(frame.state).unwrap_or_else(|shared| (*shared).clone());
        Some(Solution { plan, final_state })
    }

    fn finish(
        &self,
        log: RunLog,
        termination: TerminationReason,
        solution: Option<Solution<S>>,
    ) -> PlanResult<S> {
        if self.policy.verbosity.allows(Verbosity::SUMMARY) {
            match &solution {
                Some(solution) => info!(
                    %termination,
                    plan = %render_tasks(&solution.plan),
                    final_state = ?solution.final_state,
                    expansions = log.stats.expansions,
                    "plan found"
                ),
                None => info!(
                    %termination,
                    expansions = log.stats.expansions,
                    "no plan"
                ),
            }
        }
        PlanResult {
            solution,
            termination,
            stats: log.stats,
            trace: log.trace,
        }
    }
}

/// Plan with the default policy at the given verbosity (`0..=3`).
///
/// # Errors
///
/// Returns [`PlanError::InvalidVerbosity`] for a level above 3.
pub fn plan<S: Clone + fmt::Debug>(
    registry: &DomainRegistry<S>,
    initial: S,
    tasks: Vec<Task>,
    verbosity: u8,
) -> Result<PlanResult<S>, PlanError> {
    let verbosity = Verbosity::new(verbosity)?;
    Planner::new(registry)
        .with_policy(PlanningPolicy::default().with_verbosity(verbosity))
        .plan(initial, tasks)
}
