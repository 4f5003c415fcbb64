//! Attribute values.
//!
//! [`AttrValue`] is both what [`crate::Task::attr`] returns and what filters
//! compare against. The `From` impls let callers pass plain Rust values to
//! [`super::QuerySet::filter`]: `filter("priority__in", [1, 2])`.

use chrono::NaiveDate;
use std::fmt;

use crate::token::Priority;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Bool(bool),

    /// Integers; priorities are compared by rank (`A` = 1).
    Int(i64),

    Date(NaiveDate),

    Text(String),

    /// A task's projects or contexts, sorted and without duplicates.
    List(Vec<String>),

    /// The right-hand side of `in`, or any collection given by a caller.
    Set(Vec<AttrValue>),
}

impl AttrValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            AttrValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttrValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) => "integer",
            AttrValue::Date(_) => "date",
            AttrValue::Text(_) => "text",
            AttrValue::List(_) => "list",
            AttrValue::Set(_) => "collection",
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(v) => write!(f, "{v}"),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::List(items) => write!(f, "[{}]", items.join(", ")),
            AttrValue::Set(items) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(i64::from(v))
    }
}

impl From<u8> for AttrValue {
    fn from(v: u8) -> Self {
        AttrValue::Int(i64::from(v))
    }
}

impl From<Priority> for AttrValue {
    fn from(p: Priority) -> Self {
        AttrValue::Int(i64::from(p.rank()))
    }
}

impl From<NaiveDate> for AttrValue {
    fn from(d: NaiveDate) -> Self {
        AttrValue::Date(d)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(items: Vec<T>) -> Self {
        AttrValue::Set(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AttrValue>, const N: usize> From<[T; N]> for AttrValue {
    fn from(items: [T; N]) -> Self {
        AttrValue::Set(items.into_iter().map(Into::into).collect())
    }
}
