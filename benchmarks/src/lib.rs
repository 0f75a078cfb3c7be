//! Shared helpers for hopper benchmark suites.

use hopper_harness::contract::PlanningDomainV1;
use hopper_harness::worlds::logistics::{Logistics, LogisticsState};
use hopper_kernel::carrier::task::{expect_arity, int_arg, Task, TaskArg};
use hopper_kernel::operators::failure::{MethodFailure, OperatorFailure};
use hopper_kernel::operators::registry::{DomainRegistry, Method};
use hopper_search::route::Graph;

/// Prepared inputs for calling `Planner::plan` directly, bypassing the
/// runner's digest and replay overhead.
pub struct PlanSetup<S> {
    pub registry: DomainRegistry<S>,
    pub initial: S,
    pub tasks: Vec<Task>,
}

/// Build the registry, initial state and tasks once for a logistics domain.
///
/// # Panics
///
/// Panics if the registry cannot be built. Benchmark setup failures are fatal.
#[must_use]
pub fn prepare_logistics(domain: &Logistics) -> PlanSetup<LogisticsState> {
    PlanSetup {
        registry: domain.registry().expect("logistics registry"),
        initial: domain.initial_state(),
        tasks: domain.tasks(),
    }
}

/// A foot map of `cities` cities in a line, with a midpoint between each
/// neighboring pair: `C0 - P_0_1 - C1 - P_1_2 - C2 ...`.
#[must_use]
pub fn corridor_footmap(cities: usize) -> Graph<String> {
    let mut graph = Graph::new();
    let mut link = |a: &str, b: &str| {
        graph.entry(a.to_string()).or_insert_with(Vec::new).push(b.to_string());
        graph.entry(b.to_string()).or_insert_with(Vec::new).push(a.to_string());
    };
    for i in 1..cities {
        let (left, right) = (format!("C{}", i - 1), format!("C{i}"));
        let mid = format!("P_{}_{i}", i - 1);
        link(&left, &mid);
        link(&mid, &right);
    }
    graph
}

fn step(state: i64, args: &[TaskArg]) -> Result<i64, OperatorFailure> {
    expect_arity(args, 0)?;
    Ok(state + 1)
}

fn count_down(_state: &i64, args: &[TaskArg]) -> Result<Vec<Task>, MethodFailure> {
    expect_arity(args, 1)?;
    let n = int_arg(args, 0)?;
    if n <= 0 {
        return Ok(Vec::new());
    }
    Ok(vec![Task::bare("step"), Task::new("count", [n - 1])])
}

/// A counter domain whose `count(n)` task decomposes `n` levels deep into
/// `n` `step` operators.
///
/// # Panics
///
/// Panics if registration fails.
#[must_use]
pub fn counting_setup(depth: i64) -> PlanSetup<i64> {
    let mut registry = DomainRegistry::new();
    registry.register_operator("step", step).expect("register step");
    registry
        .register_methods("count", vec![Method::new("count_down", count_down)])
        .expect("register count");
    PlanSetup {
        registry,
        initial: 0,
        tasks: vec![Task::new("count", [depth])],
    }
}
