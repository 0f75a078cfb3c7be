//! Canonical hashing types and domain separation constants.
//!
//! Algorithm: SHA-256 for all V1 digests. Every digest produced by the
//! workspace routes through [`canonical_hash`]; callers pick a domain prefix
//! so that identical bytes hashed for different purposes never collide.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::carrier::task::Task;
use crate::proof::canon::{to_canonical_json_bytes, CanonError};

/// A digest tagged with its algorithm: `"sha256:<hex>"`.
///
/// Both halves are non-empty; [`ContentHash::parse`] is the only way to
/// build one from text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash {
    text: String,
    split: usize,
}

impl ContentHash {
    /// `None` unless `s` is `<algorithm>:<digest>` with both parts present.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (algorithm, digest) = s.split_once(':')?;
        if algorithm.is_empty() || digest.is_empty() {
            return None;
        }
        Some(Self {
            text: s.to_string(),
            split: algorithm.len(),
        })
    }

    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.text[..self.split]
    }

    #[must_use]
    pub fn hex_digest(&self) -> &str {
        &self.text[self.split + 1..]
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

// Domain separation constants. Each prefix is null-terminated.

/// Domain prefix for world state digests.
pub const DOMAIN_STATE: &[u8] = b"HOPPER::STATE::V1\0";

/// Domain prefix for plan (grounded primitive task list) digests.
pub const DOMAIN_PLAN: &[u8] = b"HOPPER::PLAN::V1\0";

/// Domain prefix for capability registry digests.
pub const DOMAIN_REGISTRY: &[u8] = b"HOPPER::REGISTRY::V1\0";

/// Domain prefix for planner event log digests.
pub const DOMAIN_PLAN_TRACE: &[u8] = b"HOPPER::PLAN_TRACE::V1\0";

/// Domain prefix for persisted plan reports.
pub const DOMAIN_PLAN_REPORT: &[u8] = b"HOPPER::PLAN_REPORT::V1\0";

/// Compute the canonical hash of a byte slice with domain separation.
///
/// Hash = `sha256(domain || data)`, rendered as `"sha256:<hex_digest>"`.
#[must_use]
pub fn canonical_hash(domain: &[u8], data: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    let digest = hex::encode(hasher.finalize());
    ContentHash {
        text: format!("sha256:{digest}"),
        split: "sha256".len(),
    }
}

/// Digest of any serializable value through canonical JSON.
///
/// # Errors
///
/// Returns [`CanonError`] if the value cannot be represented as canonical
/// JSON (serialization failure or a non-integer number).
pub fn value_digest<T: Serialize + ?Sized>(
    domain: &[u8],
    value: &T,
) -> Result<ContentHash, CanonError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(canonical_hash(domain, &bytes))
}

/// Digest of a world state under [`DOMAIN_STATE`].
///
/// # Errors
///
/// See [`value_digest`].
pub fn state_digest<S: Serialize>(state: &S) -> Result<ContentHash, CanonError> {
    value_digest(DOMAIN_STATE, state)
}

/// Digest of a plan under [`DOMAIN_PLAN`].
///
/// # Errors
///
/// See [`value_digest`].
pub fn plan_digest(plan: &[Task]) -> Result<ContentHash, CanonError> {
    value_digest(DOMAIN_PLAN, plan)
}
