//! Bounded two-mode route search.
//!
//! Uniform-cost search over a neighbor graph in which every edge can be
//! taken in either of two [`TransitMode`]s. A node's best cost is only
//! replaced by a strictly lower one, candidates above the budget are never
//! pushed, and the goal test happens when a node is popped, so the first
//! goal pop carries a minimal cost. Paths are rebuilt from per-node back
//! pointers rather than copied into every frontier entry.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::frontier::CostFrontier;

/// Adjacency list: node to neighbors, neighbor order is push order.
pub type Graph<N> = BTreeMap<N, Vec<N>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitMode {
    Walk,
    Bus,
}

impl TransitMode {
    /// Modes in the order candidates are generated.
    pub const ALL: [Self; 2] = [Self::Walk, Self::Bus];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Bus => "bus",
        }
    }
}

impl fmt::Display for TransitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-edge cost of each mode. Walking must be the cheaper mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeCosts {
    pub walk: u32,
    pub bus: u32,
}

impl Default for ModeCosts {
    fn default() -> Self {
        Self { walk: 1, bus: 3 }
    }
}

impl ModeCosts {
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidCosts`] unless `0 < walk < bus`.
    pub fn validate(self) -> Result<(), RouteError> {
        if self.walk == 0 || self.walk >= self.bus {
            return Err(RouteError::InvalidCosts {
                walk: self.walk,
                bus: self.bus,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn cost(self, mode: TransitMode) -> u32 {
        match mode {
            TransitMode::Walk => self.walk,
            TransitMode::Bus => self.bus,
        }
    }
}

/// One traversed edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStep<N> {
    pub from: N,
    pub to: N,
    pub mode: TransitMode,
}

/// A minimum-cost route. Empty when start and goal coincide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route<N> {
    pub steps: Vec<RouteStep<N>>,
    pub total_cost: u32,
}

impl<N> Route<N> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn first_step(&self) -> Option<&RouteStep<N>> {
        self.steps.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("mode costs must satisfy 0 < walk < bus (walk={walk}, bus={bus})")]
    InvalidCosts { walk: u32, bus: u32 },
    #[error("route budget must be positive, got {budget}")]
    InvalidBudget { budget: u32 },
    /// The frontier emptied before the goal was popped.
    #[error("no route within budget {budget} ({explored} nodes explored)")]
    NoRouteWithinBudget { budget: u32, explored: usize },
}

/// Full outcome of a route search, including what was explored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSearch<N> {
    pub route: Option<Route<N>>,
    /// Nodes in the order they were settled (popped at their best cost).
    pub expanded: Vec<N>,
    pub frontier_high_water: u64,
}

struct Reached<N> {
    cost: u32,
    via: Option<(N, TransitMode)>,
}

/// Run the bounded search and report the explored node order.
///
/// # Errors
///
/// Returns [`RouteError::InvalidCosts`] or [`RouteError::InvalidBudget`]
/// for bad inputs. An unreachable goal is not an error here; see
/// [`find_route`].
pub fn search_routes<N: Ord + Clone>(
    graph: &Graph<N>,
    start: &N,
    goal: &N,
    budget: u32,
    costs: ModeCosts,
) -> Result<RouteSearch<N>, RouteError> {
    costs.validate()?;
    if budget == 0 {
        return Err(RouteError::InvalidBudget { budget });
    }

    let mut best: BTreeMap<N, Reached<N>> = BTreeMap::new();
    best.insert(start.clone(), Reached { cost: 0, via: None });
    let mut frontier = CostFrontier::new();
    frontier.push(0, start.clone());
    let mut expanded = Vec::new();

    while let Some((cost, current)) = frontier.pop() {
        if best.get(&current).is_some_and(|r| r.cost < cost) {
            continue;
        }
        expanded.push(current.clone());
        if &current == goal {
            let route = rebuild(&best, current, cost);
            return Ok(RouteSearch {
                route: Some(route),
                expanded,
                frontier_high_water: frontier.high_water(),
            });
        }

        let neighbors = graph.get(&current).map_or(&[][..], Vec::as_slice);
        for neighbor in neighbors {
            for mode in TransitMode::ALL {
                let candidate = cost.saturating_add(costs.cost(mode));
                if candidate > budget {
                    continue;
                }
                if best.get(neighbor).is_some_and(|r| r.cost <= candidate) {
                    continue;
                }
                best.insert(
                    neighbor.clone(),
                    Reached {
                        cost: candidate,
                        via: Some((current.clone(), mode)),
                    },
                );
                frontier.push(candidate, neighbor.clone());
            }
        }
    }

    Ok(RouteSearch {
        route: None,
        expanded,
        frontier_high_water: frontier.high_water(),
    })
}

/// Follow back pointers from `goal` to the start.
fn rebuild<N: Ord + Clone>(best: &BTreeMap<N, Reached<N>>, goal: N, total_cost: u32) -> Route<N> {
    let mut steps = Vec::new();
    let mut to = goal;
    while let Some((from, mode)) = best.get(&to).and_then(|r| r.via.clone()) {
        steps.push(RouteStep {
            from: from.clone(),
            to,
            mode,
        });
        to = from;
    }
    steps.reverse();
    Route { steps, total_cost }
}

/// Minimum-cost route from `start` to `goal` within `budget`.
///
/// # Errors
///
/// Returns [`RouteError::NoRouteWithinBudget`] when the goal cannot be
/// reached without exceeding the budget, plus the input errors of
/// [`search_routes`].
pub fn find_route<N: Ord + Clone>(
    graph: &Graph<N>,
    start: &N,
    goal: &N,
    budget: u32,
    costs: ModeCosts,
) -> Result<Route<N>, RouteError> {
    let search = search_routes(graph, start, goal, budget, costs)?;
    let explored = search.expanded.len();
    match search.route {
        Some(route) => {
            trace!(
                budget,
                explored,
                steps = route.steps.len(),
                total_cost = route.total_cost,
                "route found"
            );
            Ok(route)
        }
        None => Err(RouteError::NoRouteWithinBudget { budget, explored }),
    }
}
