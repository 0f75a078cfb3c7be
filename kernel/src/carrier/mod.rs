//! Carrier module: what the planner moves around.
//!
//! Tasks are the planner's currency; states are opaque to it and only
//! operators change them.

pub mod state;
pub mod task;
