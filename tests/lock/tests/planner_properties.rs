//! Planner lock tests over a schema-free `StateBag` domain: empty plans,
//! empty decompositions, unregistered names, branch isolation,
//! operator-before-method dispatch, and the visible depth and budget guards.

use hopper_kernel::carrier::state::StateBag;
use hopper_kernel::carrier::task::{expect_arity, symbol_arg, Task, TaskArg};
use hopper_kernel::operators::failure::{MethodFailure, OperatorFailure};
use hopper_kernel::operators::registry::{DomainRegistry, Method};
use hopper_search::planner::{Planner, TerminationReason};
use hopper_search::policy::PlanningPolicy;

fn set(mut state: StateBag, args: &[TaskArg]) -> Result<StateBag, OperatorFailure> {
    expect_arity(args, 2)?;
    state.set(symbol_arg(args, 0)?, symbol_arg(args, 1)?);
    Ok(state)
}

fn require(state: StateBag, args: &[TaskArg]) -> Result<StateBag, OperatorFailure> {
    expect_arity(args, 2)?;
    let (key, want) = (symbol_arg(args, 0)?, symbol_arg(args, 1)?);
    if state.get_str(key) == Some(want) {
        Ok(state)
    } else {
        Err(OperatorFailure::precondition(format!("{key} is not {want}")))
    }
}

/// Operator `go` only works once the door is blue.
fn go(mut state: StateBag, _args: &[TaskArg]) -> Result<StateBag, OperatorFailure> {
    if state.get_str("door") != Some("blue") {
        return Err(OperatorFailure::precondition("door is not blue"));
    }
    state.set("at", "there");
    Ok(state)
}

fn task(name: &str, args: &[&str]) -> Task {
    Task::new(name, args.iter().copied())
}

fn registry() -> DomainRegistry<StateBag> {
    let mut registry = DomainRegistry::new();
    registry.register_operator("set", set).unwrap();
    registry.register_operator("require", require).unwrap();
    registry.register_operator("go", go).unwrap();
    registry
        .register_methods(
            "paint",
            vec![
                Method::new("paint_red_then_check_mood", |_: &StateBag, _: &[TaskArg]| {
                    Ok(vec![task("set", &["door", "red"]), task("require", &["mood", "happy"])])
                }),
                Method::new("paint_blue_if_bare", |_: &StateBag, _: &[TaskArg]| {
                    Ok(vec![task("require", &["door", "bare"]), task("set", &["door", "blue"])])
                }),
            ],
        )
        .unwrap();
    registry
        .register_methods(
            "go",
            vec![Method::new("paint_first", |_: &StateBag, _: &[TaskArg]| {
                Ok(vec![task("set", &["door", "blue"]), Task::bare("go")])
            })],
        )
        .unwrap();
    registry
        .register_methods(
            "tidy",
            vec![Method::new("already_tidy", |_: &StateBag, _: &[TaskArg]| {
                Ok(Vec::new())
            })],
        )
        .unwrap();
    registry
        .register_methods(
            "impossible",
            vec![Method::new("never", |_: &StateBag, _: &[TaskArg]| {
                Err(MethodFailure::inapplicable("never applies"))
            })],
        )
        .unwrap();
    registry
        .register_methods(
            "forever",
            vec![Method::new("again", |_: &StateBag, _: &[TaskArg]| {
                Ok(vec![Task::bare("forever")])
            })],
        )
        .unwrap();
    registry
}

fn bare_door() -> StateBag {
    let mut state = StateBag::new();
    state.set("door", "bare");
    state
}

fn run(tasks: Vec<Task>) -> hopper_search::PlanResult<StateBag> {
    Planner::new(&registry()).plan(bare_door(), tasks).unwrap()
}

// ---------------------------------------------------------------------------
// Empty plan versus no plan
// ---------------------------------------------------------------------------

#[test]
fn no_tasks_is_an_empty_plan() {
    let solution = run(Vec::new()).into_solution().unwrap();
    assert!(solution.plan.is_empty());
    assert_eq!(solution.final_state, bare_door());
}

#[test]
fn empty_decomposition_is_success_not_failure() {
    let result = run(vec![Task::bare("tidy")]);
    assert_eq!(result.termination, TerminationReason::PlanFound);
    assert_eq!(result.stats.method_expansions, 1);
    assert!(result.into_solution().unwrap().plan.is_empty());
}

#[test]
fn inapplicable_method_is_no_plan() {
    let result = run(vec![Task::bare("impossible")]);
    assert_eq!(
        result.termination,
        TerminationReason::SearchExhausted {
            depth_limited: false
        }
    );
    assert!(result.solution.is_none());
    assert_eq!(result.stats.method_failures, 1);
}

#[test]
fn unregistered_task_fails_the_branch() {
    let result = run(vec![Task::bare("tidy"), Task::bare("fly")]);
    assert!(!result.is_plan_found());
    assert_eq!(result.stats.unresolved_tasks, 1);
}

// ---------------------------------------------------------------------------
// Branch isolation
// ---------------------------------------------------------------------------

#[test]
fn failed_sibling_leaves_no_trace_in_state() {
    let solution = run(vec![Task::bare("paint")]).into_solution().unwrap();
    assert_eq!(
        solution.plan,
        vec![task("require", &["door", "bare"]), task("set", &["door", "blue"])]
    );
    assert_eq!(solution.final_state.get_str("door"), Some("blue"));
}

// ---------------------------------------------------------------------------
// Operator first, then methods
// ---------------------------------------------------------------------------

#[test]
fn operator_is_tried_before_methods() {
    let mut blue = StateBag::new();
    blue.set("door", "blue");
    let solution = Planner::new(&registry())
        .plan(blue, vec![Task::bare("go")])
        .unwrap()
        .into_solution()
        .unwrap();
    assert_eq!(solution.plan, vec![Task::bare("go")]);
}

#[test]
fn failed_operator_falls_through_to_methods() {
    let result = run(vec![Task::bare("go")]);
    assert_eq!(result.stats.operator_failures, 1);
    let solution = result.into_solution().unwrap();
    assert_eq!(
        solution.plan,
        vec![task("set", &["door", "blue"]), Task::bare("go")]
    );
    assert_eq!(solution.final_state.get_str("at"), Some("there"));
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

#[test]
fn depth_cap_is_a_visible_cause() {
    let policy = PlanningPolicy::default().with_max_depth(50);
    let result = Planner::new(&registry())
        .with_policy(policy)
        .plan(bare_door(), vec![Task::bare("forever")])
        .unwrap();
    assert_eq!(
        result.termination,
        TerminationReason::SearchExhausted {
            depth_limited: true
        }
    );
    assert!(result.stats.depth_cutoffs >= 1);
    assert!(result.stats.max_depth <= 50);
}

#[test]
fn expansion_budget_stops_unbounded_decomposition() {
    let policy = PlanningPolicy::default().with_max_expansions(1_000);
    let result = Planner::new(&registry())
        .with_policy(policy)
        .plan(bare_door(), vec![Task::bare("forever")])
        .unwrap();
    assert_eq!(result.termination, TerminationReason::ExpansionBudgetExceeded);
    assert_eq!(result.stats.expansions, 1_000);
}
