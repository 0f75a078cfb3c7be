//! `TaskChain`: a persistent, shared-tail list of tasks.
//!
//! Every engine frame owns a remaining-task agenda and a plan trail. Sibling
//! frames share almost all of both, so they are kept as `Rc`-linked lists:
//! taking the tail is O(1), prepending `k` subtasks is O(k), and no frame
//! ever observes another frame's edits because nothing is edited in place.
//!
//! The plan trail is stored newest-first; [`TaskChain::to_plan`] reverses it.

use std::fmt;
use std::rc::Rc;

use hopper_kernel::carrier::task::{render_tasks, Plan, Task};

struct Link {
    task: Task,
    next: Option<Rc<Link>>,
}

/// Immutable task list with structural sharing.
#[derive(Clone, Default)]
pub struct TaskChain {
    head: Option<Rc<Link>>,
    len: usize,
}

impl TaskChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain whose first element is `tasks[0]`.
    #[must_use]
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self::new().prepend(tasks)
    }

    /// A new chain with `task` in front of `self`.
    #[must_use]
    pub fn cons(&self, task: Task) -> Self {
        Self {
            head: Some(Rc::new(Link {
                task,
                next: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// A new chain `tasks ++ self`, keeping the order of `tasks`.
    #[must_use]
    pub fn prepend(&self, tasks: Vec<Task>) -> Self {
        tasks
            .into_iter()
            .rev()
            .fold(self.clone(), |chain, task| chain.cons(task))
    }

    #[must_use]
    pub fn first(&self) -> Option<&Task> {
        self.head.as_ref().map(|link| &link.task)
    }

    /// Everything after the first task (empty for an empty chain).
    #[must_use]
    pub fn rest(&self) -> Self {
        match &self.head {
            Some(link) => Self {
                head: link.next.clone(),
                len: self.len - 1,
            },
            None => Self::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        std::iter::successors(self.head.as_deref(), |link| link.next.as_deref())
            .map(|link| &link.task)
    }

    /// Tasks in chain order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Task> {
        self.iter().cloned().collect()
    }

    /// Read a newest-first trail back as a plan in execution order.
    #[must_use]
    pub fn to_plan(&self) -> Plan {
        let mut plan = self.to_vec();
        plan.reverse();
        plan
    }
}

impl Drop for TaskChain {
    // Unlink uniquely owned nodes one at a time; the default recursive drop
    // would overflow the stack on very long chains.
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(link) = next {
            match Rc::try_unwrap(link) {
                Ok(mut owned) => next = owned.next.take(),
                Err(_) => break,
            }
        }
    }
}

impl fmt::Display for TaskChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_tasks(self.iter()))
    }
}

impl fmt::Debug for TaskChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
