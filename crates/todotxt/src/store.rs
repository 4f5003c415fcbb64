//! # Task Registry
//!
//! A [`TaskRegistry`] is the index that "all tasks" queries run against. It
//! does not own tasks: it keeps weak references to [`TaskHandle`]s, and a task
//! dropped by its owners silently leaves the registry. [`TaskRegistry::clear`]
//! forgets every task without touching the tasks themselves.
//!
//! Registries are cheap handles: clones share the same index. Query sets hold
//! such a clone and re-read the index on every evaluation, so tasks added later
//! show up the next time a query set is evaluated.
//!
//! ## The shared registry
//!
//! [`TaskRegistry::shared`] returns the default registry behind
//! [`crate::Task::all_tasks`] and [`crate::Task::tracked`]. It is per thread:
//! handles are `Rc`-based and cannot cross threads anyway. Tests should prefer
//! their own `TaskRegistry::new()`, or call `clear()` first.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::Result;
use crate::query::{AttrFilter, AttrValue, FilterOp, QuerySet};
use crate::task::Task;
use crate::token::TokenRegistry;

/// Shared, mutable access to a tracked task.
pub type TaskHandle = Rc<RefCell<Task>>;

thread_local! {
    static SHARED: TaskRegistry = TaskRegistry::new();
}

#[derive(Clone, Default)]
pub struct TaskRegistry {
    entries: Rc<RefCell<Vec<Weak<RefCell<Task>>>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The per-thread default registry.
    pub fn shared() -> Self {
        SHARED.with(Clone::clone)
    }

    /// Parses a line with the process-wide token registry and tracks the task.
    pub fn add(&self, line: &str) -> Result<TaskHandle> {
        Ok(self.track(Task::parse(line)?))
    }

    pub fn add_with(&self, line: &str, tokens: &TokenRegistry) -> Result<TaskHandle> {
        Ok(self.track(Task::parse_with(line, tokens)?))
    }

    /// Wraps a task in a handle and tracks it.
    pub fn track(&self, task: Task) -> TaskHandle {
        let handle = Rc::new(RefCell::new(task));
        self.entries.borrow_mut().push(Rc::downgrade(&handle));
        handle
    }

    /// Tracks an existing handle; tracking the same handle twice is a no-op.
    pub fn track_handle(&self, handle: &TaskHandle) {
        let weak = Rc::downgrade(handle);
        let mut entries = self.entries.borrow_mut();
        if !entries.iter().any(|e| e.ptr_eq(&weak)) {
            entries.push(weak);
        }
    }

    /// Stops tracking a task. Returns whether it was tracked.
    pub fn forget(&self, handle: &TaskHandle) -> bool {
        let weak = Rc::downgrade(handle);
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|e| !e.ptr_eq(&weak));
        entries.len() != before
    }

    /// Forgets every task. Tasks held elsewhere are unaffected.
    pub fn clear(&self) {
        let mut entries = self.entries.borrow_mut();
        tracing::debug!(forgotten = entries.len(), "clearing task registry");
        entries.clear();
    }

    /// Live tasks in registration order. Dropped tasks are pruned.
    pub fn snapshot(&self) -> Vec<TaskHandle> {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|e| e.strong_count() > 0);
        entries.iter().filter_map(Weak::upgrade).collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn all(&self) -> QuerySet {
        QuerySet::new(self.clone())
    }

    pub fn overdue(&self) -> QuerySet {
        self.all()
            .with_filter(AttrFilter::eq("is_overdue", AttrValue::Bool(true)))
    }

    pub fn completed(&self) -> QuerySet {
        self.all()
            .with_filter(AttrFilter::eq("is_completed", AttrValue::Bool(true)))
    }

    /// Tasks whose threshold date lies in the future.
    pub fn future(&self) -> QuerySet {
        self.all()
            .with_filter(AttrFilter::eq("is_on_threshold", AttrValue::Bool(true)))
    }

    /// Neither completed nor on threshold.
    pub fn active(&self) -> QuerySet {
        self.all()
            .with_filter(AttrFilter::new(
                "is_completed",
                FilterOp::Ne,
                AttrValue::Bool(true),
            ))
            .with_filter(AttrFilter::new(
                "is_on_threshold",
                FilterOp::Ne,
                AttrValue::Bool(true),
            ))
    }
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("tasks", &self.len())
            .finish()
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    /// A registry plus the handles that keep its tasks alive.
    pub struct RegistryFixture {
        pub registry: TaskRegistry,
        pub handles: Vec<TaskHandle>,
    }

    impl Default for RegistryFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RegistryFixture {
        pub fn new() -> Self {
            Self {
                registry: TaskRegistry::new(),
                handles: Vec::new(),
            }
        }

        pub fn with_task(mut self, line: &str) -> Self {
            let handle = self
                .registry
                .add_with(line, &TokenRegistry::with_builtins())
                .unwrap();
            self.handles.push(handle);
            self
        }

        pub fn with_tasks(self, lines: &[&str]) -> Self {
            lines.iter().fold(self, |fixture, line| fixture.with_task(line))
        }
    }
}
