//! Route search lock tests over the logistics foot map: minimal cost,
//! budget boundaries, unreachable goals, and the serialized route shape.

use hopper_harness::worlds::logistics::LogisticsProblem;
use hopper_search::route::{
    find_route, search_routes, Graph, ModeCosts, RouteError, TransitMode,
};

fn footmap() -> Graph<String> {
    LogisticsProblem::full_delivery(10).state.footmap
}

fn s(name: &str) -> String {
    name.to_string()
}

#[test]
fn route_cost_is_minimal_and_walks_every_edge() {
    let route = find_route(&footmap(), &s("C0"), &s("C2"), 10, ModeCosts::default()).unwrap();
    assert_eq!(route.total_cost, 4);
    assert!(route.steps.iter().all(|step| step.mode == TransitMode::Walk));
    let path: Vec<&str> = std::iter::once(route.steps[0].from.as_str())
        .chain(route.steps.iter().map(|step| step.to.as_str()))
        .collect();
    assert_eq!(path, ["C0", "P_01", "C1", "P_12", "C2"]);
}

#[test]
fn budget_equal_to_the_optimum_is_enough() {
    let map = footmap();
    let costs = ModeCosts::default();
    assert!(find_route(&map, &s("C2"), &s("C0"), 4, costs).is_ok());
    assert!(matches!(
        find_route(&map, &s("C2"), &s("C0"), 3, costs),
        Err(RouteError::NoRouteWithinBudget { budget: 3, .. })
    ));
}

#[test]
fn larger_budget_never_changes_the_route() {
    let map = footmap();
    let costs = ModeCosts::default();
    let tight = find_route(&map, &s("P_01"), &s("P_12"), 2, costs).unwrap();
    for budget in [3, 5, 50, u32::MAX] {
        assert_eq!(
            find_route(&map, &s("P_01"), &s("P_12"), budget, costs).unwrap(),
            tight
        );
    }
}

#[test]
fn start_equal_to_goal_is_an_empty_route() {
    let route = find_route(&footmap(), &s("C1"), &s("C1"), 1, ModeCosts::default()).unwrap();
    assert!(route.is_empty());
    assert_eq!(route.total_cost, 0);
}

#[test]
fn disconnected_goal_explores_the_reachable_part_only() {
    let mut map = footmap();
    map.insert(s("island"), vec![s("harbor")]);
    map.insert(s("harbor"), vec![s("island")]);
    let search = search_routes(&map, &s("C0"), &s("island"), 100, ModeCosts::default()).unwrap();
    assert!(search.route.is_none());
    assert_eq!(search.expanded.len(), 5);
    assert!(!search.expanded.contains(&s("harbor")));
}

#[test]
fn custom_costs_scale_the_total() {
    let costs = ModeCosts { walk: 2, bus: 5 };
    let route = find_route(&footmap(), &s("C0"), &s("C1"), 4, costs).unwrap();
    assert_eq!(route.total_cost, 4);
    assert!(find_route(&footmap(), &s("C0"), &s("C1"), 3, costs).is_err());
}

#[test]
fn borrowed_node_names_work_too() {
    let map: Graph<&str> = [("a", vec!["b"]), ("b", vec!["c"]), ("c", vec![])]
        .into_iter()
        .collect();
    let route = find_route(&map, &"a", &"c", 2, ModeCosts::default()).unwrap();
    assert_eq!(route.total_cost, 2);
    assert_eq!(route.first_step().map(|step| step.to), Some("b"));
}

#[test]
fn route_serializes_with_snake_case_modes() {
    let route = find_route(&footmap(), &s("C0"), &s("P_01"), 1, ModeCosts::default()).unwrap();
    let json = serde_json::to_value(&route).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "steps": [{"from": "C0", "to": "P_01", "mode": "walk"}],
            "total_cost": 1,
        })
    );
}
