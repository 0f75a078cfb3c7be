//! `Logistics`: trucks, drivers and packages moving between cities.
//!
//! Trucks drive along the road map and need an assigned driver. Drivers
//! walk or take the bus along the foot map, which also reaches the
//! midpoints between cities; every foot move adds to the running `cost`,
//! and no move may take `cost` past `limit_cost`. The limit is set by the
//! `final_cost` task, so it normally heads the goal list.
//!
//! Operators: `assign_driver_op`, `remove_driver_op`, `drive_truck_op`,
//! `walk_op`, `bus_op`, `load_op`, `unload_op`, `update_final_cost`.
//!
//! Methods: `final_cost`, `move_truck`, `move_driver`, `transport_package`.
//! `move_driver` plans one foot step at a time along a cheapest route that
//! fits the remaining budget, then recurses.

use std::collections::BTreeMap;

use hopper_kernel::carrier::task::{expect_arity, int_arg, symbol_arg, Task, TaskArg};
use hopper_kernel::operators::failure::{MethodFailure, OperatorFailure};
use hopper_kernel::operators::registry::{DomainRegistry, Method};
use hopper_search::route::{find_route, Graph, ModeCosts, TransitMode};
use serde::{Deserialize, Serialize};

use crate::contract::{DomainError, PlanningDomainV1};

/// Domain identifier used in reports.
pub const DOMAIN_ID: &str = "logistics";

/// World state of the logistics domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogisticsState {
    pub cities: Vec<String>,
    /// Candidate order for driver selection.
    pub drivers: Vec<String>,
    /// Candidate order for truck selection.
    pub trucks: Vec<String>,
    pub packages: Vec<String>,
    /// Location of every driver, truck and package. A loaded package keeps
    /// the city it was loaded in until it is unloaded.
    pub loc: BTreeMap<String, String>,
    pub driver_of: BTreeMap<String, Option<String>>,
    pub pack_in: BTreeMap<String, Option<String>>,
    pub roadmap: Graph<String>,
    pub footmap: Graph<String>,
    pub cost: u32,
    /// Unset until a `final_cost` task has run.
    pub limit_cost: Option<u32>,
}

impl LogisticsState {
    #[must_use]
    pub fn location(&self, object: &str) -> Option<&str> {
        self.loc.get(object).map(String::as_str)
    }

    /// The driver assigned to `truck`, if any.
    #[must_use]
    pub fn driver_for(&self, truck: &str) -> Option<&str> {
        self.driver_of.get(truck).and_then(Option::as_deref)
    }

    #[must_use]
    pub fn is_assigned(&self, driver: &str) -> bool {
        self.driver_of
            .values()
            .any(|d| d.as_deref() == Some(driver))
    }

    #[must_use]
    pub fn is_carrying(&self, truck: &str) -> bool {
        self.pack_in.values().any(|t| t.as_deref() == Some(truck))
    }

    /// First truck (in `trucks` order) driven by `driver`.
    #[must_use]
    pub fn truck_driven_by(&self, driver: &str) -> Option<&str> {
        self.trucks
            .iter()
            .map(String::as_str)
            .find(|t| self.driver_for(t) == Some(driver))
    }

    /// First unassigned driver standing at `place`.
    #[must_use]
    pub fn free_driver_at(&self, place: &str) -> Option<&str> {
        self.drivers
            .iter()
            .map(String::as_str)
            .find(|d| self.location(d) == Some(place) && !self.is_assigned(d))
    }

    /// First unassigned driver standing anywhere but `place`.
    #[must_use]
    pub fn free_driver_away_from(&self, place: &str) -> Option<&str> {
        self.drivers
            .iter()
            .map(String::as_str)
            .find(|d| self.location(d) != Some(place) && !self.is_assigned(d))
    }

    /// Budget left for foot moves, or `None` while the limit is unset.
    #[must_use]
    pub fn remaining_budget(&self) -> Option<u32> {
        self.limit_cost
            .map(|limit| limit.saturating_sub(self.cost))
    }
}

fn connected(graph: &Graph<String>, from: &str, to: &str) -> bool {
    graph
        .get(from)
        .is_some_and(|next| next.iter().any(|c| c.as_str() == to))
}

fn unknown_object(name: &str) -> MethodFailure {
    MethodFailure::inapplicable(format!("{name} has no location"))
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

fn assign_driver_op(
    mut state: LogisticsState,
    args: &[TaskArg],
) -> Result<LogisticsState, OperatorFailure> {
    expect_arity(args, 2)?;
    let (driver, truck) = (symbol_arg(args, 0)?, symbol_arg(args, 1)?);
    let here = state.location(driver);
    if here.is_none() || here != state.location(truck) {
        return Err(OperatorFailure::precondition(format!(
            "{driver} is not with {truck}"
        )));
    }
    if let Some(current) = state.driver_for(truck) {
        return Err(OperatorFailure::precondition(format!(
            "{truck} is already driven by {current}"
        )));
    }
    state
        .driver_of
        .insert(truck.to_string(), Some(driver.to_string()));
    Ok(state)
}

fn remove_driver_op(
    mut state: LogisticsState,
    args: &[TaskArg],
) -> Result<LogisticsState, OperatorFailure> {
    expect_arity(args, 2)?;
    let (driver, truck) = (symbol_arg(args, 0)?, symbol_arg(args, 1)?);
    if state.driver_for(truck) != Some(driver) || state.location(driver) != state.location(truck)
    {
        return Err(OperatorFailure::precondition(format!(
            "{driver} is not in the cab of {truck}"
        )));
    }
    state.driver_of.insert(truck.to_string(), None);
    Ok(state)
}

fn drive_truck_op(
    mut state: LogisticsState,
    args: &[TaskArg],
) -> Result<LogisticsState, OperatorFailure> {
    expect_arity(args, 3)?;
    let (truck, from, to) = (
        symbol_arg(args, 0)?,
        symbol_arg(args, 1)?,
        symbol_arg(args, 2)?,
    );
    let driver = state
        .driver_for(truck)
        .ok_or_else(|| OperatorFailure::precondition(format!("{truck} has no driver")))?
        .to_string();
    if state.location(truck) != Some(from) || state.location(&driver) != Some(from) {
        return Err(OperatorFailure::precondition(format!(
            "{truck} and {driver} are not both at {from}"
        )));
    }
    if !connected(&state.roadmap, from, to) {
        return Err(OperatorFailure::precondition(format!(
            "no road {from} -> {to}"
        )));
    }
    state.loc.insert(truck.to_string(), to.to_string());
    state.loc.insert(driver, to.to_string());
    Ok(state)
}

/// Shared body of `walk_op` and `bus_op`.
fn foot_move(
    mut state: LogisticsState,
    args: &[TaskArg],
    step_cost: u32,
) -> Result<LogisticsState, OperatorFailure> {
    expect_arity(args, 3)?;
    let (driver, from, to) = (
        symbol_arg(args, 0)?,
        symbol_arg(args, 1)?,
        symbol_arg(args, 2)?,
    );
    if state.location(driver) != Some(from) || !connected(&state.footmap, from, to) {
        return Err(OperatorFailure::precondition(format!(
            "{driver} cannot go {from} -> {to} on foot"
        )));
    }
    let limit = state
        .limit_cost
        .ok_or_else(|| OperatorFailure::precondition("cost limit unset"))?;
    let cost = state.cost.saturating_add(step_cost);
    if cost > limit {
        return Err(OperatorFailure::precondition(format!(
            "cost {cost} would exceed limit {limit}"
        )));
    }
    state.loc.insert(driver.to_string(), to.to_string());
    state.cost = cost;
    Ok(state)
}

fn load_op(mut state: LogisticsState, args: &[TaskArg]) -> Result<LogisticsState, OperatorFailure> {
    expect_arity(args, 2)?;
    let (package, truck) = (symbol_arg(args, 0)?, symbol_arg(args, 1)?);
    let driver = state
        .driver_for(truck)
        .ok_or_else(|| OperatorFailure::precondition(format!("{truck} has no driver")))?;
    let city = state.location(truck);
    if city.is_none() || state.location(package) != city || state.location(driver) != city {
        return Err(OperatorFailure::precondition(format!(
            "{package}, {truck} and {driver} are not together"
        )));
    }
    if let Some(Some(carrier)) = state.pack_in.get(package) {
        return Err(OperatorFailure::precondition(format!(
            "{package} is already in {carrier}"
        )));
    }
    state
        .pack_in
        .insert(package.to_string(), Some(truck.to_string()));
    Ok(state)
}

fn unload_op(
    mut state: LogisticsState,
    args: &[TaskArg],
) -> Result<LogisticsState, OperatorFailure> {
    expect_arity(args, 2)?;
    let (package, truck) = (symbol_arg(args, 0)?, symbol_arg(args, 1)?);
    if state.pack_in.get(package).and_then(Option::as_deref) != Some(truck) {
        return Err(OperatorFailure::precondition(format!(
            "{package} is not in {truck}"
        )));
    }
    let driver = state
        .driver_for(truck)
        .ok_or_else(|| OperatorFailure::precondition(format!("{truck} has no driver")))?;
    let city = state
        .location(truck)
        .filter(|city| state.location(driver) == Some(*city))
        .ok_or_else(|| OperatorFailure::precondition(format!("{driver} is not with {truck}")))?
        .to_string();
    state.loc.insert(package.to_string(), city);
    state.pack_in.insert(package.to_string(), None);
    Ok(state)
}

fn update_final_cost(
    mut state: LogisticsState,
    args: &[TaskArg],
) -> Result<LogisticsState, OperatorFailure> {
    expect_arity(args, 1)?;
    let limit = int_arg(args, 0)?;
    let limit = u32::try_from(limit).map_err(|_| {
        OperatorFailure::precondition(format!("cost limit {limit} is out of range"))
    })?;
    state.limit_cost = Some(limit);
    Ok(state)
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

fn assign(driver: &str, truck: &str) -> Task {
    Task::new("assign_driver_op", [driver, truck])
}

fn move_truck_to(truck: &str, city: &str) -> Task {
    Task::new("move_truck", [truck, city])
}

fn move_driver_to(driver: &str, place: &str) -> Task {
    Task::new("move_driver", [driver, place])
}

fn final_cost(_state: &LogisticsState, args: &[TaskArg]) -> Result<Vec<Task>, MethodFailure> {
    expect_arity(args, 1)?;
    Ok(vec![Task::new("update_final_cost", [int_arg(args, 0)?])])
}

fn move_truck(state: &LogisticsState, args: &[TaskArg]) -> Result<Vec<Task>, MethodFailure> {
    expect_arity(args, 2)?;
    let (truck, dest) = (symbol_arg(args, 0)?, symbol_arg(args, 1)?);
    let here = state.location(truck).ok_or_else(|| unknown_object(truck))?;
    if here == dest {
        return Ok(Vec::new());
    }
    let again = move_truck_to(truck, dest);

    if state.driver_for(truck).is_none() {
        if let Some(driver) = state.free_driver_at(here) {
            return Ok(vec![assign(driver, truck), again]);
        }
        if let Some(driver) = state.free_driver_away_from(here) {
            return Ok(vec![move_driver_to(driver, here), assign(driver, truck), again]);
        }
        return Err(MethodFailure::inapplicable(format!(
            "no free driver for {truck}"
        )));
    }

    let roads = state.roadmap.get(here).map_or(&[][..], Vec::as_slice);
    if roads.iter().any(|c| c.as_str() == dest) {
        return Ok(vec![Task::new("drive_truck_op", [truck, here, dest])]);
    }
    match roads.first() {
        Some(next) => Ok(vec![
            Task::new("drive_truck_op", [truck, here, next.as_str()]),
            again,
        ]),
        None => Err(MethodFailure::inapplicable(format!("no roads out of {here}"))),
    }
}

fn move_driver(
    state: &LogisticsState,
    args: &[TaskArg],
    costs: ModeCosts,
) -> Result<Vec<Task>, MethodFailure> {
    expect_arity(args, 2)?;
    let (driver, dest) = (symbol_arg(args, 0)?, symbol_arg(args, 1)?);
    let here = state.location(driver).ok_or_else(|| unknown_object(driver))?;
    if here == dest {
        return Ok(Vec::new());
    }
    let budget = state.remaining_budget().ok_or_else(|| {
        MethodFailure::inapplicable("cost limit unset: run final_cost before moving drivers")
    })?;
    let route = find_route(
        &state.footmap,
        &here.to_string(),
        &dest.to_string(),
        budget,
        costs,
    )
    .map_err(|e| MethodFailure::inapplicable(e.to_string()))?;
    let step = route
        .first_step()
        .ok_or_else(|| MethodFailure::inapplicable(format!("empty route {here} -> {dest}")))?;
    let operator = match step.mode {
        TransitMode::Walk => "walk_op",
        TransitMode::Bus => "bus_op",
    };

    let mut tasks = Vec::with_capacity(3);
    if let Some(truck) = state.truck_driven_by(driver) {
        tasks.push(Task::new("remove_driver_op", [driver, truck]));
    }
    tasks.push(Task::new(operator, [driver, here, step.to.as_str()]));
    tasks.push(move_driver_to(driver, dest));
    Ok(tasks)
}

fn transport_package(
    state: &LogisticsState,
    args: &[TaskArg],
) -> Result<Vec<Task>, MethodFailure> {
    expect_arity(args, 2)?;
    let (package, dest) = (symbol_arg(args, 0)?, symbol_arg(args, 1)?);
    let current = state
        .location(package)
        .ok_or_else(|| unknown_object(package))?;
    if current == dest {
        return Ok(Vec::new());
    }
    let again = Task::new("transport_package", [package, dest]);
    match state.pack_in.get(package).and_then(Option::as_deref) {
        None => load_here(state, package, current, again),
        Some(truck) => carry(state, package, truck, dest, again),
    }
}

/// Package on the ground at `current`: load it, or get a truck there first.
fn load_here(
    state: &LogisticsState,
    package: &str,
    current: &str,
    again: Task,
) -> Result<Vec<Task>, MethodFailure> {
    let Some(truck) = state
        .trucks
        .iter()
        .map(String::as_str)
        .find(|t| state.location(t) == Some(current))
    else {
        return fetch_truck(state, current, again);
    };

    if state.driver_for(truck).is_some() {
        return Ok(vec![Task::new("load_op", [package, truck]), again]);
    }
    if let Some(driver) = state.free_driver_at(current) {
        return Ok(vec![assign(driver, truck), again]);
    }
    if let Some(driver) = state.free_driver_away_from(current) {
        return Ok(vec![move_driver_to(driver, current), assign(driver, truck), again]);
    }
    Err(MethodFailure::inapplicable(format!(
        "no free driver for {truck}"
    )))
}

/// No truck at `current`: bring the first one that can be crewed.
fn fetch_truck(
    state: &LogisticsState,
    current: &str,
    again: Task,
) -> Result<Vec<Task>, MethodFailure> {
    for truck in state.trucks.iter().map(String::as_str) {
        let Some(truck_city) = state.location(truck) else {
            continue;
        };
        if state.driver_for(truck).is_some() && !state.is_carrying(truck) {
            return Ok(vec![move_truck_to(truck, current), again]);
        }
        if let Some(driver) = state.free_driver_at(truck_city) {
            return Ok(vec![
                assign(driver, truck),
                move_truck_to(truck, current),
                again,
            ]);
        }
        if let Some(driver) = state.free_driver_away_from(truck_city) {
            return Ok(vec![
                move_driver_to(driver, truck_city),
                assign(driver, truck),
                move_truck_to(truck, current),
                again,
            ]);
        }
    }
    Err(MethodFailure::inapplicable(format!(
        "no truck can be brought to {current}"
    )))
}

/// Package inside `truck`: crew it, drive it, or unload at the destination.
fn carry(
    state: &LogisticsState,
    package: &str,
    truck: &str,
    dest: &str,
    again: Task,
) -> Result<Vec<Task>, MethodFailure> {
    let truck_city = state.location(truck).ok_or_else(|| unknown_object(truck))?;
    if state.driver_for(truck).is_none() {
        if let Some(driver) = state.free_driver_at(truck_city) {
            return Ok(vec![assign(driver, truck), again]);
        }
        if let Some(driver) = state.free_driver_away_from(truck_city) {
            return Ok(vec![move_driver_to(driver, truck_city), assign(driver, truck), again]);
        }
        return Err(MethodFailure::inapplicable(format!(
            "no free driver for {truck}"
        )));
    }
    if truck_city == dest {
        Ok(vec![Task::new("unload_op", [package, truck])])
    } else {
        Ok(vec![move_truck_to(truck, dest), again])
    }
}

/// Build the logistics registry with the given foot-move costs.
///
/// # Errors
///
/// Returns [`DomainError::Registration`] if a registration is rejected.
pub fn logistics_registry(costs: ModeCosts) -> Result<DomainRegistry<LogisticsState>, DomainError> {
    let mut registry = DomainRegistry::new();
    registry.register_operator("assign_driver_op", assign_driver_op)?;
    registry.register_operator("remove_driver_op", remove_driver_op)?;
    registry.register_operator("drive_truck_op", drive_truck_op)?;
    registry.register_operator("walk_op", move |state: LogisticsState, args: &[TaskArg]| {
        foot_move(state, args, costs.walk)
    })?;
    registry.register_operator("bus_op", move |state: LogisticsState, args: &[TaskArg]| {
        foot_move(state, args, costs.bus)
    })?;
    registry.register_operator("load_op", load_op)?;
    registry.register_operator("unload_op", unload_op)?;
    registry.register_operator("update_final_cost", update_final_cost)?;

    registry.register_methods("final_cost", vec![Method::new("final_cost", final_cost)])?;
    registry.register_methods("move_truck", vec![Method::new("move_truck", move_truck)])?;
    registry.register_methods(
        "move_driver",
        vec![Method::new(
            "move_driver",
            move |state: &LogisticsState, args: &[TaskArg]| move_driver(state, args, costs),
        )],
    )?;
    registry.register_methods(
        "transport_package",
        vec![Method::new("transport_package", transport_package)],
    )?;
    Ok(registry)
}

// ---------------------------------------------------------------------------
// Problem instances
// ---------------------------------------------------------------------------

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn graph(rows: &[(&str, &[&str])]) -> Graph<String> {
    rows.iter()
        .map(|(node, next)| ((*node).to_string(), names(next)))
        .collect()
}

/// The three cities with midpoints `P_01` and `P_12` on the foot map.
fn three_city_state() -> LogisticsState {
    LogisticsState {
        cities: names(&["C0", "C1", "C2"]),
        drivers: names(&["D1", "D2", "D3"]),
        trucks: names(&["T1", "T2", "T3"]),
        packages: names(&["P1", "P2", "P3"]),
        loc: [
            ("D1", "P_01"),
            ("D2", "C1"),
            ("D3", "C2"),
            ("T1", "C1"),
            ("T2", "C0"),
            ("T3", "C0"),
            ("P1", "C0"),
            ("P2", "C0"),
            ("P3", "C1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
        driver_of: ["T1", "T2", "T3"]
            .into_iter()
            .map(|t| (t.to_string(), None))
            .collect(),
        pack_in: ["P1", "P2", "P3"]
            .into_iter()
            .map(|p| (p.to_string(), None))
            .collect(),
        roadmap: graph(&[
            ("C0", &["C1", "C2"]),
            ("C1", &["C0", "C2"]),
            ("C2", &["C1", "C0"]),
        ]),
        footmap: graph(&[
            ("C0", &["P_01"]),
            ("P_01", &["C0", "C1"]),
            ("C1", &["P_01", "P_12"]),
            ("P_12", &["C1", "C2"]),
            ("C2", &["P_12"]),
        ]),
        cost: 0,
        limit_cost: None,
    }
}

/// One problem instance: a named initial state and goal tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogisticsProblem {
    pub name: String,
    pub state: LogisticsState,
    pub tasks: Vec<Task>,
}

impl LogisticsProblem {
    /// Walk driver `D1` from `C0` to `C2` under cost limit `limit`.
    #[must_use]
    pub fn driver_transfer(limit: i64) -> Self {
        let mut state = three_city_state();
        state.loc.insert("D1".into(), "C0".into());
        Self {
            name: "driver_transfer".into(),
            state,
            tasks: vec![
                Task::new("final_cost", [limit]),
                Task::new("move_driver", ["D1", "C2"]),
            ],
        }
    }

    /// Deliver all three packages, reposition every truck, and bring
    /// drivers `D1` and `D3` to `C0`, under cost limit `limit`.
    #[must_use]
    pub fn full_delivery(limit: i64) -> Self {
        Self {
            name: "full_delivery".into(),
            state: three_city_state(),
            tasks: vec![
                Task::new("final_cost", [limit]),
                Task::new("transport_package", ["P1", "C1"]),
                Task::new("transport_package", ["P2", "C2"]),
                Task::new("transport_package", ["P3", "C0"]),
                Task::new("move_truck", ["T1", "C0"]),
                Task::new("move_truck", ["T2", "C1"]),
                Task::new("move_truck", ["T3", "C2"]),
                Task::new("move_driver", ["D1", "C0"]),
                Task::new("move_driver", ["D3", "C0"]),
            ],
        }
    }
}

/// The logistics domain bound to one problem instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logistics {
    pub problem: LogisticsProblem,
    pub costs: ModeCosts,
}

impl Logistics {
    #[must_use]
    pub fn new(problem: LogisticsProblem) -> Self {
        Self {
            problem,
            costs: ModeCosts::default(),
        }
    }

    /// The nine-task delivery problem with cost limit 10.
    #[must_use]
    pub fn full_delivery() -> Self {
        Self::new(LogisticsProblem::full_delivery(10))
    }
}

impl PlanningDomainV1 for Logistics {
    type State = LogisticsState;

    fn domain_id(&self) -> &str {
        DOMAIN_ID
    }

    fn registry(&self) -> Result<DomainRegistry<LogisticsState>, DomainError> {
        self.costs
            .validate()
            .map_err(|e| DomainError::InvalidInstance {
                detail: e.to_string(),
            })?;
        logistics_registry(self.costs)
    }

    fn initial_state(&self) -> LogisticsState {
        self.problem.state.clone()
    }

    fn tasks(&self) -> Vec<Task> {
        self.problem.tasks.clone()
    }
}
