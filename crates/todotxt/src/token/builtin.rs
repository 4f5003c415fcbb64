//! Built-in token kinds.
//!
//! | Kind | Text | Singleton | Head slot |
//! |------|------|-----------|-----------|
//! | `completed` | `x` | yes | 0 |
//! | `completion_date` | `2016-03-25` (after `x`) | yes | 1 |
//! | `priority` | `(A)` | yes | 2 |
//! | `created_date` | `2016-03-25` | yes | 3 |
//! | `due_date` | `due:2016-03-25` | yes | - |
//! | `threshold_date` | `t:2016-03-25` | yes | - |
//! | `project` | `+garden` | no | - |
//! | `context` | `@phone` | no | - |
//! | `url` | `https://example.org` | no | - |
//! | `tag` | `key:value` | no | - |
//! | `word` | anything else | no | - |
//!
//! `tag` and `word` are fallbacks: the registry tries them after every other
//! kind, custom kinds included.

use once_cell::sync::Lazy;
use std::sync::Arc;

use super::{PatternKind, TokenKind, ValueType};

pub const COMPLETED: &str = "completed";
pub const COMPLETION_DATE: &str = "completion_date";
pub const PRIORITY: &str = "priority";
pub const CREATED_DATE: &str = "created_date";
pub const DUE_DATE: &str = "due_date";
pub const THRESHOLD_DATE: &str = "threshold_date";
pub const PROJECT: &str = "project";
pub const CONTEXT: &str = "context";
pub const URL: &str = "url";
pub const TAG: &str = "tag";
pub const WORD: &str = "word";

const DATE: &str = r"\d{4}-\d{2}-\d{2}";

const SPAN: &str = "<{element} class=\"{class}\">{value}</{element}>";

fn kind(builder: super::PatternKindBuilder) -> Arc<dyn TokenKind> {
    let kind = builder.build().expect("built-in token kinds compile");
    Arc::new(kind)
}

static COMPLETED_KIND: Lazy<Arc<dyn TokenKind>> = Lazy::new(|| {
    kind(
        PatternKind::builder(COMPLETED, "(?P<value>x)")
            .value_type(ValueType::Flag)
            .text_template("x")
            .html_template("x")
            .singleton()
            .head_slot(0),
    )
});

static COMPLETION_DATE_KIND: Lazy<Arc<dyn TokenKind>> = Lazy::new(|| {
    kind(
        PatternKind::builder(COMPLETION_DATE, format!("(?P<value>{DATE})"))
            .value_type(ValueType::Date)
            .html_template(SPAN)
            .singleton()
            .head_slot(1)
            .after(COMPLETED),
    )
});

static PRIORITY_KIND: Lazy<Arc<dyn TokenKind>> = Lazy::new(|| {
    kind(
        PatternKind::builder(PRIORITY, r"\((?P<value>[A-Z])\)")
            .value_type(ValueType::Priority)
            .text_template("({value})")
            .html_template(SPAN)
            .singleton()
            .head_slot(2),
    )
});

static CREATED_DATE_KIND: Lazy<Arc<dyn TokenKind>> = Lazy::new(|| {
    kind(
        PatternKind::builder(CREATED_DATE, format!("(?P<value>{DATE})"))
            .value_type(ValueType::Date)
            .html_template(SPAN)
            .singleton()
            .head_slot(3),
    )
});

static DUE_DATE_KIND: Lazy<Arc<dyn TokenKind>> = Lazy::new(|| {
    kind(
        PatternKind::builder(DUE_DATE, format!("due:(?P<value>{DATE})"))
            .value_type(ValueType::Date)
            .text_template("due:{value}")
            .html_template("<{element} class=\"{class}\">due:{value}</{element}>")
            .singleton(),
    )
});

static THRESHOLD_DATE_KIND: Lazy<Arc<dyn TokenKind>> = Lazy::new(|| {
    kind(
        PatternKind::builder(THRESHOLD_DATE, format!("t:(?P<value>{DATE})"))
            .value_type(ValueType::Date)
            .text_template("t:{value}")
            .html_template("<{element} class=\"{class}\">t:{value}</{element}>")
            .singleton(),
    )
});

static PROJECT_KIND: Lazy<Arc<dyn TokenKind>> = Lazy::new(|| {
    kind(
        PatternKind::builder(PROJECT, r"\+(?P<value>\S+)")
            .text_template("+{value}")
            .html_template("<{element} class=\"{class}\">+{value}</{element}>"),
    )
});

static CONTEXT_KIND: Lazy<Arc<dyn TokenKind>> = Lazy::new(|| {
    kind(
        PatternKind::builder(CONTEXT, r"@(?P<value>\S+)")
            .text_template("@{value}")
            .html_template("<{element} class=\"{class}\">@{value}</{element}>"),
    )
});

static URL_KIND: Lazy<Arc<dyn TokenKind>> = Lazy::new(|| {
    kind(
        PatternKind::builder(
            URL,
            r"(?P<value>(?i:(?:https?|ftp)://[^\s/?#]+(?:[/?#]\S*)?|file:///\S*))",
        )
        .html_template("<a href=\"{value}\">{value}</a>"),
    )
});

static TAG_KIND: Lazy<Arc<dyn TokenKind>> = Lazy::new(|| {
    kind(
        PatternKind::builder(TAG, r"(?P<name>[A-Za-z][\w-]*):(?P<value>[^\s:]\S*)")
            .text_template("{name}:{value}")
            .html_template("<{element} class=\"{class}\">{name}:{value}</{element}>")
            .fallback(),
    )
});

static WORD_KIND: Lazy<Arc<dyn TokenKind>> = Lazy::new(|| {
    kind(PatternKind::builder(WORD, r"(?P<value>\S+)").fallback())
});

pub fn completed() -> Arc<dyn TokenKind> {
    COMPLETED_KIND.clone()
}

pub fn completion_date() -> Arc<dyn TokenKind> {
    COMPLETION_DATE_KIND.clone()
}

pub fn priority() -> Arc<dyn TokenKind> {
    PRIORITY_KIND.clone()
}

pub fn created_date() -> Arc<dyn TokenKind> {
    CREATED_DATE_KIND.clone()
}

pub fn due_date() -> Arc<dyn TokenKind> {
    DUE_DATE_KIND.clone()
}

pub fn threshold_date() -> Arc<dyn TokenKind> {
    THRESHOLD_DATE_KIND.clone()
}

pub fn project() -> Arc<dyn TokenKind> {
    PROJECT_KIND.clone()
}

pub fn context() -> Arc<dyn TokenKind> {
    CONTEXT_KIND.clone()
}

pub fn url() -> Arc<dyn TokenKind> {
    URL_KIND.clone()
}

pub fn tag() -> Arc<dyn TokenKind> {
    TAG_KIND.clone()
}

pub fn word() -> Arc<dyn TokenKind> {
    WORD_KIND.clone()
}

/// All built-in kinds in match order.
pub fn all() -> Vec<Arc<dyn TokenKind>> {
    vec![
        completed(),
        completion_date(),
        priority(),
        created_date(),
        due_date(),
        threshold_date(),
        project(),
        context(),
        url(),
        tag(),
        word(),
    ]
}
