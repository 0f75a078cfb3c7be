//! Logistics end to end: the harness runner plans the delivery problems,
//! replays the plan, and reports what happened.

use hopper_harness::contract::PlanningDomainV1;
use hopper_harness::runner::{run_domain, ReplayStatusV1, RunConfig};
use hopper_harness::worlds::logistics::{Logistics, LogisticsProblem, LogisticsState};
use hopper_kernel::carrier::task::Task;
use hopper_kernel::proof::hash::{plan_digest, state_digest};
use hopper_kernel::proof::replay::replay_plan;
use hopper_search::planner::{Planner, TerminationReason};
use hopper_search::policy::PlanningPolicy;

fn final_state(report_state: Option<serde_json::Value>) -> LogisticsState {
    serde_json::from_value(report_state.unwrap()).unwrap()
}

#[test]
fn full_delivery_report() {
    let domain = Logistics::full_delivery();
    let report = run_domain(&domain, &RunConfig::default()).unwrap();

    assert_eq!(report.domain_id, "logistics");
    assert_eq!(report.termination, TerminationReason::PlanFound);
    assert_eq!(report.replay, ReplayStatusV1::Match);
    assert_eq!(report.tasks, domain.tasks());

    let plan = report.plan.clone().unwrap();
    assert_eq!(plan.len(), 21);
    assert_eq!(plan[0], Task::new("update_final_cost", [10i64]));
    assert_eq!(
        report.plan_digest.as_deref(),
        Some(plan_digest(&plan).unwrap().as_str())
    );

    let end = final_state(report.final_state.clone());
    assert_eq!(end.cost, 7);
    assert_eq!(end.limit_cost, Some(10));
    assert_eq!(
        report.final_state_digest.as_deref(),
        Some(state_digest(&end).unwrap().as_str())
    );
}

#[test]
fn every_goal_holds_in_the_final_state() {
    let report = run_domain(&Logistics::full_delivery(), &RunConfig::default()).unwrap();
    let end = final_state(report.final_state);
    for (object, place) in [
        ("P1", "C1"),
        ("P2", "C2"),
        ("P3", "C0"),
        ("T1", "C0"),
        ("T2", "C1"),
        ("T3", "C2"),
        ("D1", "C0"),
        ("D3", "C0"),
    ] {
        assert_eq!(end.location(object), Some(place), "{object} misplaced");
    }
    assert!(end.pack_in.values().all(Option::is_none));
    assert!(end.cost <= 10);
}

#[test]
fn plan_replays_step_by_step_within_the_limit() {
    let domain = Logistics::full_delivery();
    let registry = domain.registry().unwrap();
    let solution = Planner::new(&registry)
        .plan(domain.initial_state(), domain.tasks())
        .unwrap()
        .into_solution()
        .unwrap();

    let mut state = domain.initial_state();
    for step in &solution.plan {
        let operator = registry.operator(&step.name).unwrap();
        state = operator.apply(state, &step.args).unwrap();
        if let Some(limit) = state.limit_cost {
            assert!(state.cost <= limit);
        }
    }
    assert_eq!(state, solution.final_state);
    assert_eq!(
        replay_plan(&registry, domain.initial_state(), &solution.plan).unwrap(),
        solution.final_state
    );
}

#[test]
fn tight_limit_is_a_no_plan_report() {
    let domain = Logistics::new(LogisticsProblem::full_delivery(6));
    let report = run_domain(&domain, &RunConfig::default()).unwrap();
    assert_eq!(
        report.termination,
        TerminationReason::SearchExhausted {
            depth_limited: false
        }
    );
    assert_eq!(report.plan, None);
    assert_eq!(report.final_state, None);
    assert_eq!(report.replay, ReplayStatusV1::NotRun);
    assert!(report.stats.method_failures > 0);
}

#[test]
fn missing_final_cost_task_has_no_plan() {
    let mut problem = LogisticsProblem::driver_transfer(4);
    problem.tasks.remove(0);
    let report = run_domain(&Logistics::new(problem), &RunConfig::default()).unwrap();
    assert!(!report.is_plan_found());
    assert_eq!(report.stats.method_failures, 1);
}

#[test]
fn expansion_budget_is_reported() {
    let config = RunConfig::with_policy(PlanningPolicy::default().with_max_expansions(10));
    let report = run_domain(&Logistics::full_delivery(), &config).unwrap();
    assert_eq!(
        report.termination,
        TerminationReason::ExpansionBudgetExceeded
    );
    assert_eq!(report.stats.expansions, 10);
}

#[test]
fn independent_runs_share_one_registry_across_threads() {
    let domain = Logistics::full_delivery();
    let registry = domain.registry().unwrap();
    let baseline = Planner::new(&registry)
        .plan(domain.initial_state(), domain.tasks())
        .unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    Planner::new(&registry)
                        .plan(domain.initial_state(), domain.tasks())
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            let result = handle.join().unwrap();
            assert_eq!(result.solution, baseline.solution);
            assert_eq!(result.stats, baseline.stats);
        }
    });
}
