//! Attribute filtering.
//!
//! An [`AttrFilter`] is one condition on one task attribute. Filters built with
//! [`AttrFilter::parse`] are checked against [`super::ATTRIBUTES`] and have
//! their value coerced up front (priority letters to ranks, date strings to
//! dates), so evaluating them never fails. A task lacking the attribute never
//! matches, whatever the operator.

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::fmt;

use super::spec::{get_spec, AttributeKind, AttributeSpec};
use super::{AttrValue, QueryError};
use crate::task::Task;
use crate::token::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// The attribute equals one of the given values.
    In,
    /// A list holds the value, or a text holds the substring.
    Contains,
}

impl FilterOp {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "eq" => FilterOp::Eq,
            "ne" => FilterOp::Ne,
            "lt" => FilterOp::Lt,
            "le" => FilterOp::Le,
            "gt" => FilterOp::Gt,
            "ge" => FilterOp::Ge,
            "in" => FilterOp::In,
            "contains" => FilterOp::Contains,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ne => "ne",
            FilterOp::Lt => "lt",
            FilterOp::Le => "le",
            FilterOp::Gt => "gt",
            FilterOp::Ge => "ge",
            FilterOp::In => "in",
            FilterOp::Contains => "contains",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttrFilter {
    /// The attribute name (e.g. "priority", "context", "due_date").
    pub attr: String,
    pub op: FilterOp,
    pub value: AttrValue,
}

impl AttrFilter {
    /// Creates a filter without validation. Prefer [`AttrFilter::parse`] for
    /// caller-provided criteria.
    pub fn new(attr: impl Into<String>, op: FilterOp, value: AttrValue) -> Self {
        Self {
            attr: attr.into(),
            op,
            value,
        }
    }

    pub fn eq(attr: impl Into<String>, value: AttrValue) -> Self {
        Self::new(attr, FilterOp::Eq, value)
    }

    pub fn ne(attr: impl Into<String>, value: AttrValue) -> Self {
        Self::new(attr, FilterOp::Ne, value)
    }

    /// Builds a filter from a criterion such as `priority__in` or `context`.
    ///
    /// Without a `__op` suffix the operator is `eq`; on a singular attribute
    /// (`project`, `context`) that tests membership.
    pub fn parse(criterion: &str, value: impl Into<AttrValue>) -> Result<Self, QueryError> {
        let (attr, op) = match criterion.split_once("__") {
            Some((attr, op)) => {
                let op = FilterOp::parse(op)
                    .ok_or_else(|| QueryError::UnsupportedOperator(op.to_string()))?;
                (attr, op)
            }
            None => (criterion, FilterOp::Eq),
        };

        let spec =
            get_spec(attr).ok_or_else(|| QueryError::UnknownAttribute(attr.to_string()))?;
        if !spec.kind.supports(op) {
            return Err(QueryError::OperatorNotApplicable {
                op: op.to_string(),
                attr: attr.to_string(),
            });
        }

        let value = coerce(spec, op, value.into())?;
        Ok(Self::new(attr, op, value))
    }

    /// Whether `task` satisfies the condition. Absent attributes never match.
    pub fn matches(&self, task: &Task) -> bool {
        let spec = get_spec(&self.attr);
        let source = spec.map_or(self.attr.as_str(), |s| s.source);
        let Some(actual) = task.attr(source) else {
            return false;
        };

        if spec.is_some_and(|s| s.kind == AttributeKind::Member) {
            return member_matches(&actual, self.op, &self.value);
        }

        match self.op {
            FilterOp::Eq => actual == self.value,
            FilterOp::Ne => actual != self.value,
            FilterOp::Lt => compare(&actual, &self.value) == Some(Ordering::Less),
            FilterOp::Le => matches!(
                compare(&actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::Gt => compare(&actual, &self.value) == Some(Ordering::Greater),
            FilterOp::Ge => matches!(
                compare(&actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::In => match &self.value {
                AttrValue::Set(items) => items.contains(&actual),
                _ => false,
            },
            FilterOp::Contains => contains(&actual, &self.value),
        }
    }
}

fn member_matches(actual: &AttrValue, op: FilterOp, wanted: &AttrValue) -> bool {
    let Some(list) = actual.as_list() else {
        return false;
    };
    let has = |value: &AttrValue| value.as_text().is_some_and(|v| list.iter().any(|l| l == v));
    match (op, wanted) {
        (FilterOp::Eq, value) => has(value),
        (FilterOp::Ne, value) => !has(value),
        (FilterOp::In, AttrValue::Set(items)) => items.iter().any(has),
        _ => false,
    }
}

fn compare(a: &AttrValue, b: &AttrValue) -> Option<Ordering> {
    match (a, b) {
        (AttrValue::Int(a), AttrValue::Int(b)) => Some(a.cmp(b)),
        (AttrValue::Date(a), AttrValue::Date(b)) => Some(a.cmp(b)),
        (AttrValue::Text(a), AttrValue::Text(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn contains(actual: &AttrValue, wanted: &AttrValue) -> bool {
    match (actual, wanted) {
        (AttrValue::List(list), AttrValue::Text(item)) => list.contains(item),
        (AttrValue::Text(text), AttrValue::Text(part)) => text.contains(part.as_str()),
        _ => false,
    }
}

/// Converts a caller value into the form `matches` compares against.
fn coerce(spec: &AttributeSpec, op: FilterOp, value: AttrValue) -> Result<AttrValue, QueryError> {
    if op == FilterOp::In {
        let items = match value {
            AttrValue::Set(items) => items,
            AttrValue::List(items) => items.into_iter().map(AttrValue::Text).collect(),
            other => {
                return Err(invalid(
                    spec,
                    format!("`in` needs a collection, got {}", other.type_name()),
                ))
            }
        };
        return items
            .into_iter()
            .map(|item| coerce_scalar(spec, item))
            .collect::<Result<Vec<_>, _>>()
            .map(AttrValue::Set);
    }

    match (spec.kind, op) {
        (AttributeKind::List, FilterOp::Eq | FilterOp::Ne) => coerce_list(spec, value),
        _ => coerce_scalar(spec, value),
    }
}

fn coerce_scalar(spec: &AttributeSpec, value: AttrValue) -> Result<AttrValue, QueryError> {
    match (spec.kind, value) {
        (AttributeKind::Bool, value @ AttrValue::Bool(_)) => Ok(value),
        (AttributeKind::Priority, AttrValue::Int(rank)) => u8::try_from(rank)
            .ok()
            .and_then(|rank| Priority::from_rank(rank).ok())
            .map(AttrValue::from)
            .ok_or_else(|| invalid(spec, format!("priority rank {rank} is out of range"))),
        (AttributeKind::Priority, AttrValue::Text(text)) => text
            .parse::<Priority>()
            .map(AttrValue::from)
            .map_err(|_| invalid(spec, format!("{text:?} is not a priority"))),
        (AttributeKind::Date, value @ AttrValue::Date(_)) => Ok(value),
        (AttributeKind::Date, AttrValue::Text(text)) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map(AttrValue::Date)
            .map_err(|_| invalid(spec, format!("{text:?} is not a YYYY-MM-DD date"))),
        (
            AttributeKind::Text | AttributeKind::List | AttributeKind::Member,
            value @ AttrValue::Text(_),
        ) => Ok(value),
        (_, other) => Err(invalid(
            spec,
            format!("unexpected {} value {other}", other.type_name()),
        )),
    }
}

fn coerce_list(spec: &AttributeSpec, value: AttrValue) -> Result<AttrValue, QueryError> {
    let mut items = match value {
        AttrValue::List(items) => items,
        AttrValue::Set(items) => items
            .into_iter()
            .map(|item| match item {
                AttrValue::Text(text) => Ok(text),
                other => Err(invalid(spec, format!("list items must be text, got {other}"))),
            })
            .collect::<Result<Vec<_>, _>>()?,
        other => {
            return Err(invalid(
                spec,
                format!("expected a list, got {}", other.type_name()),
            ))
        }
    };
    items.sort();
    items.dedup();
    Ok(AttrValue::List(items))
}

fn invalid(spec: &AttributeSpec, reason: String) -> QueryError {
    QueryError::InvalidValue {
        attr: spec.name.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenRegistry;

    fn task(line: &str) -> Task {
        Task::parse_with(line, &TokenRegistry::with_builtins()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn filter_eq_bool() {
        let filter = AttrFilter::eq("is_completed", AttrValue::Bool(true));
        assert!(filter.matches(&task("x done")));
        assert!(!filter.matches(&task("open")));
    }

    #[test]
    fn filter_ne_bool() {
        let filter = AttrFilter::ne("is_completed", AttrValue::Bool(true));
        assert!(!filter.matches(&task("x done")));
        assert!(filter.matches(&task("open")));
    }

    #[test]
    fn priority_letters_become_ranks() {
        let filter = AttrFilter::parse("priority", "B").unwrap();
        assert_eq!(filter.value, AttrValue::Int(2));
        assert!(filter.matches(&task("(B) second")));
        assert!(!filter.matches(&task("(A) first")));
    }

    #[test]
    fn priority_comparisons_use_rank() {
        let filter = AttrFilter::parse("priority__le", 2).unwrap();
        assert!(filter.matches(&task("(A) a")));
        assert!(filter.matches(&task("(B) b")));
        assert!(!filter.matches(&task("(C) c")));
    }

    #[test]
    fn absent_values_never_match() {
        for criterion in ["priority__ne", "priority__gt", "priority__lt"] {
            let filter = AttrFilter::parse(criterion, 1).unwrap();
            assert!(!filter.matches(&task("no priority")), "{criterion}");
        }
        let due = AttrFilter::parse("due_date__ne", "2020-01-01").unwrap();
        assert!(!due.matches(&task("no due date")));
    }

    #[test]
    fn date_strings_are_parsed() {
        let filter = AttrFilter::parse("due_date__lt", "2016-04-01").unwrap();
        assert_eq!(filter.value, AttrValue::Date(date(2016, 4, 1)));
        assert!(filter.matches(&task("pay due:2016-03-25")));
        assert!(!filter.matches(&task("pay due:2016-04-25")));
    }

    #[test]
    fn in_takes_any_collection() {
        let filter = AttrFilter::parse("priority__in", ["A", "C"]).unwrap();
        assert!(filter.matches(&task("(A) a")));
        assert!(!filter.matches(&task("(B) b")));
        assert!(filter.matches(&task("(C) c")));
    }

    #[test]
    fn singular_form_tests_membership() {
        let filter = AttrFilter::parse("context", "home").unwrap();
        assert!(filter.matches(&task("clean @home @garage")));
        assert!(!filter.matches(&task("clean @office")));

        let not_home = AttrFilter::parse("context__ne", "home").unwrap();
        assert!(not_home.matches(&task("clean @office")));

        let any = AttrFilter::parse("project__in", ["a", "b"]).unwrap();
        assert!(any.matches(&task("work +b")));
        assert!(!any.matches(&task("work +c")));
    }

    #[test]
    fn list_equality_ignores_order() {
        let filter = AttrFilter::parse("projects", vec!["y", "x"]).unwrap();
        assert!(filter.matches(&task("+x +y")));
        assert!(!filter.matches(&task("+x")));

        let none = AttrFilter::parse("projects", Vec::<String>::new()).unwrap();
        assert!(none.matches(&task("no projects")));
    }

    #[test]
    fn contains_on_lists_and_text() {
        let list = AttrFilter::parse("contexts__contains", "phone").unwrap();
        assert!(list.matches(&task("call @phone")));

        let text = AttrFilter::parse("text__contains", "cat").unwrap();
        assert!(text.matches(&task("(A) feed the cat")));
        assert!(!text.matches(&task("(A) feed the dog")));
    }

    #[test]
    fn unknown_attribute() {
        assert!(matches!(
            AttrFilter::parse("colour", "red"),
            Err(QueryError::UnknownAttribute(name)) if name == "colour"
        ));
    }

    #[test]
    fn unsupported_operator() {
        assert!(matches!(
            AttrFilter::parse("priority__near", 1),
            Err(QueryError::UnsupportedOperator(op)) if op == "near"
        ));
    }

    #[test]
    fn operator_not_applicable() {
        assert!(matches!(
            AttrFilter::parse("is_completed__lt", true),
            Err(QueryError::OperatorNotApplicable { .. })
        ));
    }

    #[test]
    fn wrong_value_types() {
        assert!(matches!(
            AttrFilter::parse("priority", 27),
            Err(QueryError::InvalidValue { .. })
        ));
        assert!(matches!(
            AttrFilter::parse("due_date", "tomorrow"),
            Err(QueryError::InvalidValue { .. })
        ));
        assert!(matches!(
            AttrFilter::parse("is_overdue", "yes"),
            Err(QueryError::InvalidValue { .. })
        ));
        assert!(matches!(
            AttrFilter::parse("priority__in", 1),
            Err(QueryError::InvalidValue { .. })
        ));
    }

    #[test]
    fn op_names() {
        assert_eq!(FilterOp::parse("ge"), Some(FilterOp::Ge));
        assert_eq!(FilterOp::parse("GE"), None);
        assert_eq!(FilterOp::Contains.to_string(), "contains");
    }
}
