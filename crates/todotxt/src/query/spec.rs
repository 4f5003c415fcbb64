//! Queryable attributes.
//!
//! [`ATTRIBUTES`] lists every name a filter criterion may use, what kind of
//! value it holds and which task attribute it reads. Adding a filterable
//! attribute means adding an entry here and a branch in [`crate::Task::attr`].

use super::FilterOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Bool,

    /// Compared by rank; letters are accepted and converted.
    Priority,

    Date,

    Text,

    /// Sorted string list (`projects`, `contexts`).
    List,

    /// Singular form of a list attribute; tests membership.
    Member,
}

impl AttributeKind {
    /// Whether `op` can be applied to attributes of this kind.
    pub fn supports(self, op: FilterOp) -> bool {
        match op {
            FilterOp::Eq | FilterOp::Ne => true,
            FilterOp::In => !matches!(self, AttributeKind::Bool | AttributeKind::List),
            FilterOp::Contains => matches!(self, AttributeKind::Text | AttributeKind::List),
            FilterOp::Lt | FilterOp::Le | FilterOp::Gt | FilterOp::Ge => {
                matches!(self, AttributeKind::Priority | AttributeKind::Date)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttributeSpec {
    /// Name used in criteria.
    pub name: &'static str,

    pub kind: AttributeKind,

    /// Attribute read from the task; differs from `name` for singular forms.
    pub source: &'static str,
}

impl AttributeSpec {
    const fn new(name: &'static str, kind: AttributeKind) -> Self {
        Self {
            name,
            kind,
            source: name,
        }
    }

    const fn reads(mut self, source: &'static str) -> Self {
        self.source = source;
        self
    }
}

pub const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::new("priority", AttributeKind::Priority),
    // Dates
    AttributeSpec::new("created_date", AttributeKind::Date),
    AttributeSpec::new("completion_date", AttributeKind::Date),
    AttributeSpec::new("due_date", AttributeKind::Date),
    AttributeSpec::new("threshold_date", AttributeKind::Date),
    // Computed flags
    AttributeSpec::new("is_completed", AttributeKind::Bool),
    AttributeSpec::new("is_overdue", AttributeKind::Bool),
    AttributeSpec::new("is_on_threshold", AttributeKind::Bool),
    // Lists and their singular forms
    AttributeSpec::new("projects", AttributeKind::List),
    AttributeSpec::new("contexts", AttributeKind::List),
    AttributeSpec::new("project", AttributeKind::Member).reads("projects"),
    AttributeSpec::new("context", AttributeKind::Member).reads("contexts"),
    AttributeSpec::new("text", AttributeKind::Text),
];

pub fn get_spec(name: &str) -> Option<&'static AttributeSpec> {
    ATTRIBUTES.iter().find(|spec| spec.name == name)
}
