//! # Query Engine
//!
//! A [`QuerySet`] is a lazy view over a [`TaskRegistry`]: it stores filter
//! conditions, not tasks. Every evaluation ([`QuerySet::tasks`],
//! [`QuerySet::list`], [`QuerySet::len`], ...) re-reads the registry, so tasks
//! tracked after the query set was built show up on the next call.
//!
//! ```text
//! Task::all_tasks()
//!     .filter("context", "home")?
//!     .filter("priority__in", ["A", "B"])?
//!     .exclude("is_completed", true)?
//!     .sorted()
//!     .list()
//! ```
//!
//! Criteria are attribute names with an optional `__op` suffix; see
//! [`ATTRIBUTES`] for the names and [`FilterOp`] for the operators. Mistakes
//! (unknown names, operators that make no sense for the attribute, values of
//! the wrong type) are reported when the filter is added, as [`QueryError`].
//!
//! Conditions combine with AND. Results come in registration order unless
//! [`QuerySet::sorted`] asks for task order.

mod filter;
mod spec;
mod value;

pub use filter::{AttrFilter, FilterOp};
pub use spec::{get_spec, AttributeKind, AttributeSpec, ATTRIBUTES};
pub use value::AttrValue;

use std::rc::Rc;
use thiserror::Error;

use crate::store::{TaskHandle, TaskRegistry};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Operator `{op}` cannot be applied to `{attr}`")]
    OperatorNotApplicable { op: String, attr: String },

    #[error("Invalid value for `{attr}`: {reason}")]
    InvalidValue { attr: String, reason: String },
}

#[derive(Debug, Clone)]
struct Clause {
    filter: AttrFilter,
    negated: bool,
}

impl Clause {
    fn admits(&self, task: &crate::task::Task) -> bool {
        self.filter.matches(task) != self.negated
    }
}

#[derive(Debug, Clone)]
pub struct QuerySet {
    registry: TaskRegistry,
    clauses: Vec<Clause>,
    sorted: bool,
}

impl QuerySet {
    pub(crate) fn new(registry: TaskRegistry) -> Self {
        Self {
            registry,
            clauses: Vec::new(),
            sorted: false,
        }
    }

    /// Adds an already built condition.
    pub fn with_filter(mut self, filter: AttrFilter) -> Self {
        self.clauses.push(Clause {
            filter,
            negated: false,
        });
        self
    }

    /// Keeps tasks matching `criterion`, e.g. `filter("priority__in", [1, 2])`.
    pub fn filter(self, criterion: &str, value: impl Into<AttrValue>) -> Result<Self, QueryError> {
        Ok(self.with_filter(AttrFilter::parse(criterion, value)?))
    }

    /// Drops tasks matching `criterion`. Tasks lacking the attribute are kept.
    pub fn exclude(
        mut self,
        criterion: &str,
        value: impl Into<AttrValue>,
    ) -> Result<Self, QueryError> {
        self.clauses.push(Clause {
            filter: AttrFilter::parse(criterion, value)?,
            negated: true,
        });
        Ok(self)
    }

    /// Evaluates in task order (see [`crate::Task`]'s `Ord`).
    pub fn sorted(mut self) -> Self {
        self.sorted = true;
        self
    }

    pub fn filters(&self) -> impl Iterator<Item = &AttrFilter> + '_ {
        self.clauses.iter().map(|c| &c.filter)
    }

    /// The matching tasks, read from the registry now.
    pub fn tasks(&self) -> Vec<TaskHandle> {
        let mut tasks: Vec<TaskHandle> = self
            .registry
            .snapshot()
            .into_iter()
            .filter(|handle| {
                let task = handle.borrow();
                self.clauses.iter().all(|clause| clause.admits(&task))
            })
            .collect();
        if self.sorted {
            tasks.sort_by(|a, b| a.borrow().cmp(&b.borrow()));
        }
        tasks
    }

    /// Text forms of the matching tasks.
    pub fn list(&self) -> Vec<String> {
        self.tasks().iter().map(|h| h.borrow().text()).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks().is_empty()
    }

    pub fn contains(&self, handle: &TaskHandle) -> bool {
        self.tasks().iter().any(|h| Rc::ptr_eq(h, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::RegistryFixture;

    fn fixture() -> RegistryFixture {
        RegistryFixture::new().with_tasks(&[
            "(B) call mom @phone",
            "x (A) done already",
            "(A) feed the cat @home",
            "water plants @home +garden",
        ])
    }

    #[test]
    fn all_keeps_registration_order() {
        let f = fixture();
        assert_eq!(f.registry.all().len(), 4);
        assert_eq!(f.registry.all().list()[0], "(B) call mom @phone");
    }

    #[test]
    fn filters_combine_with_and() {
        let f = fixture();
        let home = f.registry.all().filter("context", "home").unwrap();
        assert_eq!(home.len(), 2);
        let urgent_home = home.filter("priority", "A").unwrap();
        assert_eq!(urgent_home.list(), vec!["(A) feed the cat @home"]);
    }

    #[test]
    fn exclude_negates() {
        let f = fixture();
        let open = f.registry.all().exclude("is_completed", true).unwrap();
        assert_eq!(open.len(), 3);

        // tasks without a priority stay when excluding a priority
        let not_a = f.registry.all().exclude("priority", "A").unwrap();
        assert_eq!(
            not_a.list(),
            vec!["(B) call mom @phone", "water plants @home +garden"]
        );
    }

    #[test]
    fn sorted_uses_task_order() {
        let f = fixture();
        assert_eq!(
            f.registry.all().sorted().list(),
            vec![
                "(A) feed the cat @home",
                "(B) call mom @phone",
                "water plants @home +garden",
                "x (A) done already",
            ]
        );
    }

    #[test]
    fn later_tasks_are_visible() {
        let mut f = fixture();
        let home = f.registry.all().filter("context", "home").unwrap();
        assert_eq!(home.len(), 2);
        f = f.with_task("sweep @home");
        assert_eq!(home.len(), 3);
        assert!(home.contains(f.handles.last().unwrap()));
    }

    #[test]
    fn contains_checks_identity() {
        let f = fixture();
        let phone = f.registry.all().filter("contexts__contains", "phone").unwrap();
        assert!(phone.contains(&f.handles[0]));
        assert!(!phone.contains(&f.handles[1]));
    }

    #[test]
    fn errors_surface_when_adding_filters() {
        let f = fixture();
        assert_eq!(
            f.registry.all().filter("colour", "red").unwrap_err(),
            QueryError::UnknownAttribute("colour".into())
        );
        assert!(f.registry.all().exclude("text__gt", "a").is_err());
    }

    #[test]
    fn error_messages() {
        let err = QueryError::OperatorNotApplicable {
            op: "lt".into(),
            attr: "is_completed".into(),
        };
        assert_eq!(
            err.to_string(),
            "Operator `lt` cannot be applied to `is_completed`"
        );
    }
}
