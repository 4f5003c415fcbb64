//! # Task Model
//!
//! A [`Task`] owns the ordered tokens of one todo.txt line. Everything else
//! (priority, dates, projects, flags) is derived from those tokens on every
//! call, so a mutation is visible immediately.
//!
//! ## Construction
//!
//! [`Task::parse`] tokenizes a line and checks that the tokens serialize back
//! to the line (modulo whitespace runs, see [`crate::parser`]). A mismatch
//! means some kind broke its round-trip contract and is reported as
//! [`TodoError::ParseInconsistency`].
//!
//! ## Mutation
//!
//! - [`Task::add_token`] appends; a singleton kind already present is replaced
//!   where it stands, and head-slot kinds are inserted at their slot.
//! - [`Task::remove_token`] removes the first match; removing something absent
//!   is a no-op.
//!
//! Both work in place and return `&mut Self` for chaining. A change is only
//! applied if the resulting line parses back into the same tokens. The date in
//! `x 2016-03-25 call` is a completion date, so adding a creation date to a
//! completed task without one, or marking `2016-03-25 call` completed with a
//! bare `x`, leaves the task unchanged and logs a `debug!` event.
//! [`Task::complete_on`] and [`Task::reopen`] change the marker and the
//! completion date together.
//!
//! ## Ordering
//!
//! Tasks are equal when their texts are equal. They sort active before
//! completed, then by priority (`(A)` first, no priority last), then by
//! threshold date (none first, then earliest), then by due date (earliest
//! first, none last), then by completion date and then by creation date
//! (newest first, none last), then by text.

use chrono::{Local, NaiveDate};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::RenderConfig;
use crate::error::{Result, TodoError};
use crate::parser;
use crate::query::{AttrValue, QuerySet};
use crate::render;
use crate::store::{TaskHandle, TaskRegistry};
use crate::token::{builtin, ParseContext, Priority, Token, TokenRegistry, TokenSelector};

#[derive(Debug, Clone)]
pub struct Task {
    id: Uuid,
    tokens: Vec<Token>,
}

impl Task {
    /// Parses a line with the process-wide token registry.
    ///
    /// The task is not tracked: [`Task::all_tasks`] and the other views only
    /// see tasks created with [`Task::tracked`] or added to a
    /// [`TaskRegistry`].
    pub fn parse(line: &str) -> Result<Self> {
        Self::parse_with(line, &TokenRegistry::global())
    }

    pub fn parse_with(line: &str, registry: &TokenRegistry) -> Result<Self> {
        let task = Self {
            id: Uuid::new_v4(),
            tokens: parser::parse_line(line, registry),
        };

        let rendered = task.text();
        let expected = parser::normalize(line);
        if rendered != expected {
            return Err(TodoError::ParseInconsistency {
                line: line.to_string(),
                rendered,
            });
        }

        Ok(task)
    }

    /// Identity of this task instance; survives mutation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(Token::to_text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    // --- Mutation ---

    pub fn add_token(&mut self, token: Token) -> &mut Self {
        let kind = token.kind_id().to_string();
        let mut tokens = self.tokens.clone();

        let existing = token
            .is_singleton()
            .then(|| self.position(&kind))
            .flatten();
        match (existing, token.head_slot()) {
            (Some(index), _) => tokens[index] = token,
            (None, Some(slot)) => {
                let at = tokens
                    .iter()
                    .position(|t| t.head_slot().map_or(true, |s| s > slot))
                    .unwrap_or(tokens.len());
                if !token.kind().accepts(&ParseContext::new(&tokens[..at])) {
                    tracing::debug!(
                        kind = %kind,
                        task = %self,
                        "token does not fit the head of this task"
                    );
                    return self;
                }
                tokens.insert(at, token);
            }
            (None, None) => tokens.push(token),
        }

        self.commit(tokens, &kind)
    }

    /// Parses `text` with the process-wide registry and adds every token.
    pub fn add_text(&mut self, text: &str) -> &mut Self {
        self.add_text_with(text, &TokenRegistry::global())
    }

    pub fn add_text_with(&mut self, text: &str, registry: &TokenRegistry) -> &mut Self {
        for token in parser::parse_line(text, registry) {
            self.add_token(token);
        }
        self
    }

    pub fn remove_token(&mut self, selector: impl Into<TokenSelector>) -> &mut Self {
        let selector = selector.into();
        let Some(index) = self.tokens.iter().position(|t| selector.matches(t)) else {
            return self;
        };
        let mut tokens = self.tokens.clone();
        let removed = tokens.remove(index);
        self.commit(tokens, removed.kind_id())
    }

    /// Removes the first match of every token parsed from `text`.
    pub fn remove_text(&mut self, text: &str) -> &mut Self {
        self.remove_text_with(text, &TokenRegistry::global())
    }

    pub fn remove_text_with(&mut self, text: &str, registry: &TokenRegistry) -> &mut Self {
        for token in parser::parse_line(text, registry) {
            self.remove_token(token);
        }
        self
    }

    pub fn contains(&self, selector: impl Into<TokenSelector>) -> bool {
        let selector = selector.into();
        self.tokens.iter().any(|t| selector.matches(t))
    }

    /// True if `text` is a token of this task or a substring of its text.
    pub fn contains_text(&self, text: &str) -> bool {
        self.tokens.iter().any(|t| t.to_text() == text) || self.text().contains(text)
    }

    /// Takes `tokens` as the new content unless their text would parse into
    /// different tokens.
    fn commit(&mut self, tokens: Vec<Token>, kind: &str) -> &mut Self {
        if reparses_unchanged(&tokens) {
            self.tokens = tokens;
        } else {
            tracing::debug!(
                kind,
                task = %self,
                "change would not read back the same; task left unchanged"
            );
        }
        self
    }

    // --- Derived values ---

    fn position(&self, kind: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t.kind_id() == kind)
    }

    pub fn find(&self, kind: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.kind_id() == kind)
    }

    pub fn tokens_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Token> + 'a {
        self.tokens.iter().filter(move |t| t.kind_id() == kind)
    }

    fn date_of(&self, kind: &str) -> Option<NaiveDate> {
        self.find(kind).and_then(|t| t.value().as_date())
    }

    fn sorted_texts(&self, kind: &str) -> Vec<String> {
        let mut values: Vec<String> = self
            .tokens_of(kind)
            .filter_map(|t| t.value().as_text())
            .map(str::to_string)
            .collect();
        values.sort();
        values.dedup();
        values
    }

    pub fn priority(&self) -> Option<Priority> {
        self.find(builtin::PRIORITY)
            .and_then(|t| t.value().as_priority())
    }

    pub fn is_completed(&self) -> bool {
        self.find(builtin::COMPLETED).is_some()
    }

    pub fn completion_date(&self) -> Option<NaiveDate> {
        self.date_of(builtin::COMPLETION_DATE)
    }

    pub fn created_date(&self) -> Option<NaiveDate> {
        self.date_of(builtin::CREATED_DATE)
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.date_of(builtin::DUE_DATE)
    }

    pub fn threshold_date(&self) -> Option<NaiveDate> {
        self.date_of(builtin::THRESHOLD_DATE)
    }

    /// Project names, sorted and without duplicates.
    pub fn projects(&self) -> Vec<String> {
        self.sorted_texts(builtin::PROJECT)
    }

    /// Context names, sorted and without duplicates.
    pub fn contexts(&self) -> Vec<String> {
        self.sorted_texts(builtin::CONTEXT)
    }

    /// Generic `key:value` tags in line order.
    pub fn tags(&self) -> Vec<(String, String)> {
        self.tokens_of(builtin::TAG)
            .map(|t| (t.name().to_string(), t.value().to_string()))
            .collect()
    }

    pub fn tag(&self, key: &str) -> Option<String> {
        self.tokens_of(builtin::TAG)
            .find(|t| t.name() == key)
            .map(|t| t.value().to_string())
    }

    pub fn urls(&self) -> Vec<String> {
        self.tokens_of(builtin::URL)
            .map(|t| t.value().to_string())
            .collect()
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(today())
    }

    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.due_date().is_some_and(|due| due < today)
    }

    /// True while the threshold date lies in the future.
    pub fn is_on_threshold(&self) -> bool {
        self.is_on_threshold_on(today())
    }

    pub fn is_on_threshold_on(&self, today: NaiveDate) -> bool {
        self.threshold_date().is_some_and(|t| t > today)
    }

    /// Boolean properties by name, for filters and CSS class mappings.
    pub fn flag(&self, property: &str) -> Option<bool> {
        match property {
            "is_completed" => Some(self.is_completed()),
            "is_overdue" => Some(self.is_overdue()),
            "is_on_threshold" => Some(self.is_on_threshold()),
            _ => None,
        }
    }

    /// An attribute value by name; `None` when the task lacks it.
    ///
    /// | Name | Value |
    /// |------|-------|
    /// | `priority` | `Int` (rank, `A` = 1) |
    /// | `created_date`, `completion_date`, `due_date`, `threshold_date` | `Date` |
    /// | `is_completed`, `is_overdue`, `is_on_threshold` | `Bool` |
    /// | `projects`, `contexts` | `List` |
    /// | `text` | `Text` |
    pub fn attr(&self, name: &str) -> Option<AttrValue> {
        match name {
            "priority" => self.priority().map(|p| AttrValue::Int(i64::from(p.rank()))),
            "created_date" => self.created_date().map(AttrValue::Date),
            "completion_date" => self.completion_date().map(AttrValue::Date),
            "due_date" => self.due_date().map(AttrValue::Date),
            "threshold_date" => self.threshold_date().map(AttrValue::Date),
            "projects" => Some(AttrValue::List(self.projects())),
            "contexts" => Some(AttrValue::List(self.contexts())),
            "text" => Some(AttrValue::Text(self.text())),
            other => self.flag(other).map(AttrValue::Bool),
        }
    }

    // --- Setters ---

    pub fn set_priority(&mut self, priority: Option<Priority>) -> &mut Self {
        match priority {
            Some(p) => self.add_token(Token::priority(p)),
            None => self.remove_token(TokenSelector::kind(builtin::PRIORITY)),
        }
    }

    /// Raises the priority by `steps` letters; a task without priority
    /// starts from below `Z`.
    pub fn raise_priority(&mut self, steps: u8) -> &mut Self {
        let raised = match self.priority() {
            Some(p) => p.raised(steps),
            None => Priority::LOWEST.raised(steps.saturating_sub(1)),
        };
        self.set_priority(Some(raised))
    }

    /// Lowers the priority by `steps` letters; lowering past `Z` removes it.
    pub fn lower_priority(&mut self, steps: u8) -> &mut Self {
        let lowered = match self.priority() {
            Some(p) => p.lowered(steps),
            None if steps == 0 => None,
            None => Priority::from_rank(steps).ok(),
        };
        self.set_priority(lowered)
    }

    pub fn set_due_date(&mut self, date: Option<NaiveDate>) -> &mut Self {
        match date {
            Some(d) => self.add_token(Token::due_date(d)),
            None => self.remove_token(TokenSelector::kind(builtin::DUE_DATE)),
        }
    }

    pub fn set_threshold_date(&mut self, date: Option<NaiveDate>) -> &mut Self {
        match date {
            Some(d) => self.add_token(Token::threshold_date(d)),
            None => self.remove_token(TokenSelector::kind(builtin::THRESHOLD_DATE)),
        }
    }

    pub fn set_created_date(&mut self, date: Option<NaiveDate>) -> &mut Self {
        match date {
            Some(d) => self.add_token(Token::created_date(d)),
            None => self.remove_token(TokenSelector::kind(builtin::CREATED_DATE)),
        }
    }

    /// Marks the task completed today.
    pub fn complete(&mut self) -> &mut Self {
        self.complete_on(today())
    }

    /// Puts `x <date>` at the front, replacing an existing marker and date.
    pub fn complete_on(&mut self, date: NaiveDate) -> &mut Self {
        let mut tokens = self.without_completion();
        tokens.splice(0..0, [Token::completed(), Token::completion_date(date)]);
        self.commit(tokens, builtin::COMPLETED)
    }

    /// Drops the completion marker together with the completion date.
    pub fn reopen(&mut self) -> &mut Self {
        let tokens = self.without_completion();
        self.commit(tokens, builtin::COMPLETED)
    }

    fn without_completion(&self) -> Vec<Token> {
        self.tokens
            .iter()
            .filter(|t| !matches!(t.kind_id(), builtin::COMPLETED | builtin::COMPLETION_DATE))
            .cloned()
            .collect()
    }

    // --- Rendering ---

    /// HTML fragment using the process-wide [`RenderConfig`].
    pub fn html(&self) -> String {
        self.html_with(&RenderConfig::current())
    }

    pub fn html_with(&self, config: &RenderConfig) -> String {
        render::render_task(self, config)
    }

    // --- Queries over the per-thread default registry ---

    /// Parses a line and tracks it in the default [`TaskRegistry`].
    pub fn tracked(line: &str) -> Result<TaskHandle> {
        TaskRegistry::shared().add(line)
    }

    /// Every live task of the per-thread default registry.
    ///
    /// Tasks built with [`Task::parse`] or `str::parse` are not in it; create
    /// them with [`Task::tracked`] to have them show up here.
    pub fn all_tasks() -> QuerySet {
        TaskRegistry::shared().all()
    }

    pub fn overdue_tasks() -> QuerySet {
        TaskRegistry::shared().overdue()
    }

    pub fn completed_tasks() -> QuerySet {
        TaskRegistry::shared().completed()
    }

    pub fn active_tasks() -> QuerySet {
        TaskRegistry::shared().active()
    }

    pub fn future_tasks() -> QuerySet {
        TaskRegistry::shared().future()
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// True if joining `tokens` and parsing the line again yields tokens of the
/// same kinds and text. The kinds of `tokens` are added to the built-ins for
/// the check, so custom kinds read back as themselves.
fn reparses_unchanged(tokens: &[Token]) -> bool {
    let mut registry = TokenRegistry::with_builtins();
    for token in tokens {
        let known = registry
            .get(token.kind_id())
            .is_some_and(|kind| Arc::ptr_eq(kind, token.kind()));
        if !known {
            registry.register_arc(token.kind().clone());
        }
    }

    let line = tokens
        .iter()
        .map(Token::to_text)
        .collect::<Vec<_>>()
        .join(" ");
    let reparsed = parser::parse_line(&line, &registry);
    reparsed.len() == tokens.len()
        && reparsed
            .iter()
            .zip(tokens)
            .all(|(a, b)| a.kind_id() == b.kind_id() && a.to_text() == b.to_text())
}

/// `None` sorts before `Some`; two `Some`s use `order`.
fn absent_first<T>(a: Option<T>, b: Option<T>, order: impl Fn(&T, &T) -> Ordering) -> Ordering {
    present_first(b, a, |b, a| order(a, b))
}

/// `Some` sorts before `None`; two `Some`s use `order`.
fn present_first<T>(a: Option<T>, b: Option<T>, order: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => order(&a, &b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.text() == other.text()
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text().hash(state);
    }
}

impl PartialOrd for Task {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Task {
    fn cmp(&self, other: &Self) -> Ordering {
        self.is_completed()
            .cmp(&other.is_completed())
            .then_with(|| present_first(self.priority(), other.priority(), Ord::cmp))
            .then_with(|| absent_first(self.threshold_date(), other.threshold_date(), Ord::cmp))
            .then_with(|| present_first(self.due_date(), other.due_date(), Ord::cmp))
            .then_with(|| {
                present_first(self.completion_date(), other.completion_date(), |a, b| b.cmp(a))
            })
            .then_with(|| {
                present_first(self.created_date(), other.created_date(), |a, b| b.cmp(a))
            })
            .then_with(|| self.text().cmp(&other.text()))
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl std::str::FromStr for Task {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        Task::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(line: &str) -> Task {
        Task::parse_with(line, &TokenRegistry::with_builtins()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn text_only() {
        let t = task("do something");
        assert_eq!(t.text(), "do something");
        assert!(t.contexts().is_empty());
        assert!(t.projects().is_empty());
        assert!(!t.is_completed());
        assert_eq!(t.priority(), None);
    }

    #[test]
    fn contexts_and_projects_are_sorted() {
        let t = task("do something @context2 @context1 +project2 +project1");
        assert_eq!(t.contexts(), vec!["context1", "context2"]);
        assert_eq!(t.projects(), vec!["project1", "project2"]);
    }

    #[test]
    fn project_with_dot_and_dash() {
        assert_eq!(
            task("write docs for a +todo.txt-pylib").projects(),
            vec!["todo.txt-pylib"]
        );
    }

    #[test]
    fn completed_task_with_date() {
        let mut t = task("x 2000-01-01 finalize millenium");
        assert!(t.is_completed());
        assert_eq!(t.completion_date(), Some(date(2000, 1, 1)));
        t.reopen();
        assert_eq!(t.text(), "finalize millenium");
    }

    #[test]
    fn complete_on_inserts_at_the_head() {
        let mut t = task("(A) almost completed");
        t.complete_on(date(2024, 5, 1));
        assert_eq!(t.text(), "x 2024-05-01 (A) almost completed");
        assert!(t.is_completed());
    }

    #[test]
    fn creation_date() {
        assert_eq!(
            task("2000-01-01 And now something completely different.").created_date(),
            Some(date(2000, 1, 1))
        );
    }

    #[test]
    fn overdue_and_threshold_relative_to_today() {
        let t = task("overdue due:1999-12-31");
        assert!(t.is_overdue_on(date(2000, 1, 1)));
        assert!(!t.is_overdue_on(date(1999, 12, 31)));

        let t = task("Good news, everyone! t:2100-01-01");
        assert!(t.is_on_threshold_on(date(2099, 1, 1)));
        assert!(!t.is_on_threshold_on(date(2100, 1, 1)));
    }

    #[test]
    fn setters_build_the_expected_line() {
        let mut t = task("a task");
        t.set_due_date(Some(date(2000, 12, 31)))
            .set_threshold_date(Some(date(2000, 1, 1)));
        assert_eq!(t.text(), "a task due:2000-12-31 t:2000-01-01");

        t.set_due_date(Some(date(2001, 1, 1)));
        assert_eq!(t.text(), "a task due:2001-01-01 t:2000-01-01");

        t.set_due_date(None).set_threshold_date(None);
        assert_eq!(t.text(), "a task");
    }

    #[test]
    fn raise_priority_from_none_starts_at_z() {
        let mut t = task("this task has no Priority");
        t.raise_priority(1);
        assert_eq!(t.text(), "(Z) this task has no Priority");
        t.set_priority(Some(Priority::from_rank(20).unwrap()))
            .raise_priority(1);
        assert_eq!(t.priority().unwrap().letter(), 'S');
        t.set_priority(Some(Priority::HIGHEST)).raise_priority(1);
        assert_eq!(t.priority(), Some(Priority::HIGHEST));
    }

    #[test]
    fn lower_priority_past_z_clears_it() {
        let mut t = task("this task has no Priority");
        t.lower_priority(1);
        assert_eq!(t.priority(), Some(Priority::HIGHEST));
        t.set_priority(Some(Priority::from_rank(10).unwrap()))
            .lower_priority(1);
        assert_eq!(t.priority().unwrap().letter(), 'K');
        t.set_priority(Some(Priority::LOWEST)).lower_priority(1);
        assert_eq!(t.priority(), None);
        assert_eq!(t.text(), "this task has no Priority");
    }

    #[test]
    fn adding_a_completion_date_to_an_open_task_is_ignored() {
        let mut t = task("still open");
        t.add_token(Token::completion_date(date(2000, 1, 1)));
        assert_eq!(t.text(), "still open");
    }

    #[test]
    fn contains_tokens_and_text() {
        let t = task("A task with @context");
        assert!(t.contains_text("@context"));
        assert!(t.contains_text("A task"));
        assert!(t.contains(Token::context("context").unwrap()));
        assert!(t.contains(TokenSelector::kind("context")));
        assert!(!t.contains(TokenSelector::kind("project")));
    }

    #[test]
    fn attr_values() {
        let t = task("(B) call mom +family due:2020-02-02");
        assert_eq!(t.attr("priority"), Some(AttrValue::Int(2)));
        assert_eq!(t.attr("due_date"), Some(AttrValue::Date(date(2020, 2, 2))));
        assert_eq!(t.attr("created_date"), None);
        assert_eq!(
            t.attr("projects"),
            Some(AttrValue::List(vec!["family".into()]))
        );
        assert_eq!(t.attr("is_completed"), Some(AttrValue::Bool(false)));
        assert_eq!(t.attr("bogus"), None);
    }

    #[test]
    fn tags_and_urls() {
        let t = task("read https://example.org/a rec:1w by:me");
        assert_eq!(t.urls(), vec!["https://example.org/a"]);
        assert_eq!(
            t.tags(),
            vec![("rec".to_string(), "1w".to_string()), ("by".to_string(), "me".to_string())]
        );
        assert_eq!(t.tag("by").as_deref(), Some("me"));
        assert_eq!(t.tag("due"), None);
    }

    #[test]
    fn ids_are_unique_and_stable() {
        let mut a = task("same");
        let b = task("same");
        assert_ne!(a.id(), b.id());
        assert_eq!(a, b);
        let id = a.id();
        a.add_text("more");
        assert_eq!(a.id(), id);
    }

    #[test]
    fn from_str_uses_the_global_registry() {
        let t: Task = "(C) parsed".parse().unwrap();
        assert_eq!(t.priority().unwrap().letter(), 'C');
    }
}
