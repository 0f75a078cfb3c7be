//! `SimpleTravel`: a two-method travel domain over a [`StateBag`].
//!
//! A traveler gets from `home` to `park` either on foot (short distances
//! only) or by taxi. The taxi method does not check the fare up front; an
//! unaffordable fare fails at `pay_driver`, two steps into the
//! decomposition, so the planner has to backtrack out of it.
//!
//! State layout:
//!
//! ```text
//! loc  = {"me": "home", "taxi": "depot"}
//! cash = {"me": <cash>}
//! owe  = {"me": 0}
//! dist = {"home": {"park": <distance>}, "park": {"home": <distance>}}
//! ```

use hopper_kernel::carrier::state::StateBag;
use hopper_kernel::carrier::task::{expect_arity, symbol_arg, Task, TaskArg};
use hopper_kernel::operators::failure::{MethodFailure, OperatorFailure};
use hopper_kernel::operators::registry::{DomainRegistry, Method};
use serde_json::json;

use crate::contract::{DomainError, PlanningDomainV1};

/// Longest distance the traveler will walk.
pub const WALK_LIMIT: i64 = 2;

/// Taxi fare for a ride of `distance`.
#[must_use]
pub fn taxi_fare(distance: i64) -> i64 {
    2 + distance
}

/// Problem instance: one trip from `home` to `park`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleTravel {
    pub cash: i64,
    pub distance: i64,
}

impl Default for SimpleTravel {
    fn default() -> Self {
        Self {
            cash: 20,
            distance: 8,
        }
    }
}

fn loc<'a>(state: &'a StateBag, who: &str) -> Option<&'a str> {
    state.lookup("loc", who).and_then(serde_json::Value::as_str)
}

fn amount(state: &StateBag, table: &str, who: &str) -> i64 {
    state
        .lookup(table, who)
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(0)
}

fn distance(state: &StateBag, from: &str, to: &str) -> Option<i64> {
    state
        .lookup("dist", from)
        .and_then(|row| row.get(to))
        .and_then(serde_json::Value::as_i64)
}

fn walk(mut state: StateBag, args: &[TaskArg]) -> Result<StateBag, OperatorFailure> {
    expect_arity(args, 3)?;
    let (who, from, to) = (
        symbol_arg(args, 0)?,
        symbol_arg(args, 1)?,
        symbol_arg(args, 2)?,
    );
    if loc(&state, who) != Some(from) {
        return Err(OperatorFailure::precondition(format!("{who} is not at {from}")));
    }
    state.insert_entry("loc", who, to);
    Ok(state)
}

fn call_taxi(mut state: StateBag, args: &[TaskArg]) -> Result<StateBag, OperatorFailure> {
    expect_arity(args, 2)?;
    let place = symbol_arg(args, 1)?;
    state.insert_entry("loc", "taxi", place);
    Ok(state)
}

fn ride_taxi(mut state: StateBag, args: &[TaskArg]) -> Result<StateBag, OperatorFailure> {
    expect_arity(args, 3)?;
    let (who, from, to) = (
        symbol_arg(args, 0)?,
        symbol_arg(args, 1)?,
        symbol_arg(args, 2)?,
    );
    if loc(&state, "taxi") != Some(from) || loc(&state, who) != Some(from) {
        return Err(OperatorFailure::precondition(format!(
            "{who} and the taxi are not both at {from}"
        )));
    }
    let dist = distance(&state, from, to)
        .ok_or_else(|| OperatorFailure::precondition(format!("no road {from} -> {to}")))?;
    state.insert_entry("loc", "taxi", to);
    state.insert_entry("loc", who, to);
    state.insert_entry("owe", who, taxi_fare(dist));
    Ok(state)
}

fn pay_driver(mut state: StateBag, args: &[TaskArg]) -> Result<StateBag, OperatorFailure> {
    expect_arity(args, 1)?;
    let who = symbol_arg(args, 0)?;
    let (cash, owe) = (amount(&state, "cash", who), amount(&state, "owe", who));
    if cash < owe {
        return Err(OperatorFailure::precondition(format!(
            "{who} has {cash}, owes {owe}"
        )));
    }
    state.insert_entry("cash", who, cash - owe);
    state.insert_entry("owe", who, 0);
    Ok(state)
}

fn travel_by_foot(state: &StateBag, args: &[TaskArg]) -> Result<Vec<Task>, MethodFailure> {
    expect_arity(args, 3)?;
    let (who, from, to) = (
        symbol_arg(args, 0)?,
        symbol_arg(args, 1)?,
        symbol_arg(args, 2)?,
    );
    match distance(state, from, to) {
        Some(d) if d <= WALK_LIMIT => Ok(vec![Task::new("walk", [who, from, to])]),
        Some(d) => Err(MethodFailure::inapplicable(format!(
            "{d} is too far to walk"
        ))),
        None => Err(MethodFailure::inapplicable(format!("no path {from} -> {to}"))),
    }
}

fn travel_by_taxi(_state: &StateBag, args: &[TaskArg]) -> Result<Vec<Task>, MethodFailure> {
    expect_arity(args, 3)?;
    let (who, from, to) = (
        symbol_arg(args, 0)?,
        symbol_arg(args, 1)?,
        symbol_arg(args, 2)?,
    );
    Ok(vec![
        Task::new("call_taxi", [who, from]),
        Task::new("ride_taxi", [who, from, to]),
        Task::new("pay_driver", [who]),
    ])
}

/// Build the travel registry.
///
/// # Errors
///
/// Returns [`DomainError::Registration`] if a registration is rejected.
pub fn travel_registry() -> Result<DomainRegistry<StateBag>, DomainError> {
    let mut registry = DomainRegistry::new();
    registry.register_operator("walk", walk)?;
    registry.register_operator("call_taxi", call_taxi)?;
    registry.register_operator("ride_taxi", ride_taxi)?;
    registry.register_operator("pay_driver", pay_driver)?;
    registry.register_methods(
        "travel",
        vec![
            Method::new("travel_by_foot", travel_by_foot),
            Method::new("travel_by_taxi", travel_by_taxi),
        ],
    )?;
    Ok(registry)
}

impl PlanningDomainV1 for SimpleTravel {
    type State = StateBag;

    #[allow(clippy::unnecessary_literal_bound)]
    fn domain_id(&self) -> &str {
        "simple_travel"
    }

    fn registry(&self) -> Result<DomainRegistry<StateBag>, DomainError> {
        travel_registry()
    }

    fn initial_state(&self) -> StateBag {
        let mut state = StateBag::new();
        state.set("loc", json!({"me": "home", "taxi": "depot"}));
        state.set("cash", json!({"me": self.cash}));
        state.set("owe", json!({"me": 0}));
        state.set(
            "dist",
            json!({
                "home": {"park": self.distance},
                "park": {"home": self.distance},
            }),
        );
        state
    }

    fn tasks(&self) -> Vec<Task> {
        vec![Task::new("travel", ["me", "home", "park"])]
    }
}
