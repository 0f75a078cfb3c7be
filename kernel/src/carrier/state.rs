//! `StateBag`: an open, string-keyed world state.
//!
//! Domains with a fixed shape should define their own state struct and plan
//! over it directly; the planner is generic over the state type. `StateBag`
//! exists for domains that want a schema-free store of named values.
//!
//! Keys are held in a `BTreeMap` so iteration, `Debug` output and digests
//! are deterministic.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An open bag of named values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateBag {
    vars: BTreeMap<String, Value>,
}

impl StateBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, returning the previous binding.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.vars.insert(name.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.vars.get(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.vars.get(name).and_then(Value::as_i64)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.vars.get(name).and_then(Value::as_bool)
    }

    /// Look up `name[key]` where `name` is bound to a JSON object.
    #[must_use]
    pub fn lookup(&self, name: &str, key: &str) -> Option<&Value> {
        self.vars.get(name)?.as_object()?.get(key)
    }

    /// Set `name[key] = value`, creating the object binding if absent.
    ///
    /// Returns `false` (and changes nothing) when `name` is bound to a
    /// non-object value.
    pub fn insert_entry(
        &mut self,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> bool {
        let slot = self
            .vars
            .entry(name.into())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        match slot.as_object_mut() {
            Some(map) => {
                map.insert(key.into(), value.into());
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.vars.remove(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for StateBag {
    /// One `name = value` binding per line, sorted by name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.vars.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}
