//! Tasks: the unit of work the planner decomposes.
//!
//! A task is a name plus a grounded argument tuple. Whether it is primitive
//! or compound is not a property of the task itself; it depends only on
//! which registry table its name resolves in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single grounded task argument.
///
/// Domains use symbols for object names (`"T1"`, `"C0"`) and integers for
/// quantities (cost limits, counts).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskArg {
    Int(i64),
    Symbol(String),
}

impl TaskArg {
    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(s) => Some(s),
            Self::Int(_) => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Symbol(_) => None,
        }
    }
}

impl fmt::Display for TaskArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Symbol(s) => f.write_str(s),
        }
    }
}

impl From<&str> for TaskArg {
    fn from(s: &str) -> Self {
        Self::Symbol(s.to_string())
    }
}

impl From<String> for TaskArg {
    fn from(s: String) -> Self {
        Self::Symbol(s)
    }
}

impl From<&String> for TaskArg {
    fn from(s: &String) -> Self {
        Self::Symbol(s.clone())
    }
}

impl From<i64> for TaskArg {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for TaskArg {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

/// A task: `(name, args...)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub args: Vec<TaskArg>,
}

impl Task {
    /// Build a task from a name and homogeneous arguments.
    ///
    /// Mixed argument kinds can be built with `TaskArg::from` directly:
    /// `Task::new("final_cost", [TaskArg::from(10i64)])`.
    #[must_use]
    pub fn new<A, I>(name: impl Into<String>, args: I) -> Self
    where
        A: Into<TaskArg>,
        I: IntoIterator<Item = A>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// A task with no arguments.
    #[must_use]
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.name)?;
        for arg in &self.args {
            write!(f, ", {arg}")?;
        }
        f.write_str(")")
    }
}

/// A plan: grounded primitive tasks in execution order.
pub type Plan = Vec<Task>;

/// Render a task sequence as `[(a, x), (b, y)]` for diagnostics.
#[must_use]
pub fn render_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> String {
    let parts: Vec<String> = tasks.into_iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// A task argument was missing or of the wrong kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    #[error("missing argument at position {index}")]
    Missing { index: usize },
    #[error("argument {index} must be a symbol, got {found}")]
    NotSymbol { index: usize, found: TaskArg },
    #[error("argument {index} must be an integer, got {found}")]
    NotInteger { index: usize, found: TaskArg },
    #[error("expected {expected} arguments, got {actual}")]
    Arity { expected: usize, actual: usize },
}

/// Check that exactly `expected` arguments were supplied.
///
/// # Errors
///
/// Returns [`ArgumentError::Arity`] on mismatch.
pub fn expect_arity(args: &[TaskArg], expected: usize) -> Result<(), ArgumentError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ArgumentError::Arity {
            expected,
            actual: args.len(),
        })
    }
}

/// Read a symbol argument.
///
/// # Errors
///
/// Returns [`ArgumentError::Missing`] or [`ArgumentError::NotSymbol`].
pub fn symbol_arg(args: &[TaskArg], index: usize) -> Result<&str, ArgumentError> {
    let arg = args.get(index).ok_or(ArgumentError::Missing { index })?;
    arg.as_symbol().ok_or_else(|| ArgumentError::NotSymbol {
        index,
        found: arg.clone(),
    })
}

/// Read an integer argument.
///
/// # Errors
///
/// Returns [`ArgumentError::Missing`] or [`ArgumentError::NotInteger`].
pub fn int_arg(args: &[TaskArg], index: usize) -> Result<i64, ArgumentError> {
    let arg = args.get(index).ok_or(ArgumentError::Missing { index })?;
    arg.as_int().ok_or_else(|| ArgumentError::NotInteger {
        index,
        found: arg.clone(),
    })
}
