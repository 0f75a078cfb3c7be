//! Proof module: canonical hashing and plan replay.

pub mod canon;
pub mod hash;
pub mod replay;
