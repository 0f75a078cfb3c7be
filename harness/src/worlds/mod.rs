//! Domains runnable by the harness runner.

pub mod logistics;
pub mod simple_travel;
