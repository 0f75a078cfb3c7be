//! `DomainRegistry`: the capability tables the planner dispatches through.
//!
//! Two tables keyed by task name:
//!
//! - operators: at most one [`Operator`] per primitive task name
//! - methods: an ordered list of [`Method`]s per compound task name
//!
//! Registration replaces whatever was bound to a name before; lists are
//! never merged. Lookups return `None` for unknown names. The registry is
//! built once by the domain and is read-only while a search runs, so one
//! registry may back any number of independent planning runs, including
//! runs on other threads.

use std::collections::BTreeMap;
use std::fmt;

use crate::carrier::task::{Task, TaskArg};
use crate::operators::failure::{MethodFailure, OperatorFailure};
use crate::proof::canon::CanonError;
use crate::proof::hash::{value_digest, ContentHash, DOMAIN_REGISTRY};

/// Operator signature: consumes a private copy of the state and returns the
/// successor, or declines.
pub type OperatorFn<S> = dyn Fn(S, &[TaskArg]) -> Result<S, OperatorFailure> + Send + Sync;

/// Method signature: reads the state and proposes subtasks, or declines.
/// An empty `Ok` list means the task is already satisfied.
pub type MethodFn<S> = dyn Fn(&S, &[TaskArg]) -> Result<Vec<Task>, MethodFailure> + Send + Sync;

/// A named primitive state transition.
pub struct Operator<S> {
    name: String,
    handler: Box<OperatorFn<S>>,
}

impl<S> Operator<S> {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(S, &[TaskArg]) -> Result<S, OperatorFailure> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Box::new(handler),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the operator to an owned state.
    ///
    /// # Errors
    ///
    /// Whatever [`OperatorFailure`] the handler reports.
    pub fn apply(&self, state: S, args: &[TaskArg]) -> Result<S, OperatorFailure> {
        (self.handler)(state, args)
    }
}

impl<S> fmt::Debug for Operator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator").field("name", &self.name).finish()
    }
}

/// A named decomposition alternative for a compound task.
pub struct Method<S> {
    name: String,
    handler: Box<MethodFn<S>>,
}

impl<S> Method<S> {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&S, &[TaskArg]) -> Result<Vec<Task>, MethodFailure> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Box::new(handler),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the method for subtasks.
    ///
    /// # Errors
    ///
    /// Whatever [`MethodFailure`] the handler reports.
    pub fn decompose(&self, state: &S, args: &[TaskArg]) -> Result<Vec<Task>, MethodFailure> {
        (self.handler)(state, args)
    }
}

impl<S> fmt::Debug for Method<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method").field("name", &self.name).finish()
    }
}

/// Malformed registration. Raised at registration time, never during search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("task name must not be empty")]
    EmptyTaskName,
    #[error("method for task {task:?} has an empty name")]
    EmptyMethodName { task: String },
    #[error("method {method:?} appears more than once for task {task:?}")]
    DuplicateMethod { task: String, method: String },
}

/// Operator and method tables for one planning domain.
pub struct DomainRegistry<S> {
    operators: BTreeMap<String, Operator<S>>,
    methods: BTreeMap<String, Vec<Method<S>>>,
}

impl<S> DomainRegistry<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            operators: BTreeMap::new(),
            methods: BTreeMap::new(),
        }
    }

    /// Bind `name` to an operator, replacing any previous binding.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyTaskName`] for an empty name.
    pub fn register_operator<F>(
        &mut self,
        name: impl Into<String>,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(S, &[TaskArg]) -> Result<S, OperatorFailure> + Send + Sync + 'static,
    {
        self.insert_operator(Operator::new(name, handler))
    }

    /// Bind an already-built operator under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyTaskName`] for an empty name.
    pub fn insert_operator(&mut self, operator: Operator<S>) -> Result<(), RegistryError> {
        if operator.name.is_empty() {
            return Err(RegistryError::EmptyTaskName);
        }
        self.operators.insert(operator.name.clone(), operator);
        Ok(())
    }

    /// Bind `task` to an ordered method list, replacing the previous list.
    ///
    /// An empty list is allowed and makes the task unresolvable through
    /// decomposition.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] for an empty task name, an unnamed method,
    /// or two methods sharing a name.
    pub fn register_methods(
        &mut self,
        task: impl Into<String>,
        methods: Vec<Method<S>>,
    ) -> Result<(), RegistryError> {
        let task = task.into();
        if task.is_empty() {
            return Err(RegistryError::EmptyTaskName);
        }
        for (i, method) in methods.iter().enumerate() {
            if method.name.is_empty() {
                return Err(RegistryError::EmptyMethodName { task });
            }
            if methods[..i].iter().any(|m| m.name == method.name) {
                return Err(RegistryError::DuplicateMethod {
                    task,
                    method: method.name.clone(),
                });
            }
        }
        self.methods.insert(task, methods);
        Ok(())
    }

    #[must_use]
    pub fn operator(&self, name: &str) -> Option<&Operator<S>> {
        self.operators.get(name)
    }

    #[must_use]
    pub fn methods(&self, name: &str) -> Option<&[Method<S>]> {
        self.methods.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn is_primitive(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    #[must_use]
    pub fn is_compound(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Operator names in sorted order.
    pub fn operator_names(&self) -> impl Iterator<Item = &str> {
        self.operators.keys().map(String::as_str)
    }

    /// `(task, [method names])` rows in sorted task order.
    #[must_use]
    pub fn method_table(&self) -> Vec<(&str, Vec<&str>)> {
        self.methods
            .iter()
            .map(|(task, methods)| {
                (
                    task.as_str(),
                    methods.iter().map(Method::name).collect::<Vec<_>>(),
                )
            })
            .collect()
    }

    /// Content digest over the registered names and method order.
    ///
    /// Handlers are opaque; two registries with the same names in the same
    /// order share a digest.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let methods: BTreeMap<&str, Vec<&str>> = self.method_table().into_iter().collect();
        let value = serde_json::json!({
            "methods": methods,
            "operators": self.operator_names().collect::<Vec<_>>(),
        });
        value_digest(DOMAIN_REGISTRY, &value)
    }
}

impl<S> Default for DomainRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for DomainRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainRegistry")
            .field("operators", &self.operators.keys().collect::<Vec<_>>())
            .field("methods", &self.method_table())
            .finish()
    }
}

impl<S> fmt::Display for DomainRegistry<S> {
    /// Operator list followed by a `TASK | METHODS` table.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operators: Vec<&str> = self.operator_names().collect();
        writeln!(f, "OPERATORS: {}", operators.join(", "))?;

        let width = self.methods.keys().map(String::len).max().unwrap_or(4).max(4);
        write!(f, "{:<width$} | METHODS", "TASK")?;
        for (task, methods) in self.method_table() {
            write!(f, "\n{task:<width$} | {}", methods.join(", "))?;
        }
        Ok(())
    }
}
