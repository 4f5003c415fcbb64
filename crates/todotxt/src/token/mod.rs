//! # Tokens
//!
//! A task line is a sequence of whitespace-separated tokens. Each token has a
//! kind (priority, due date, project, plain word, ...) that knows how to
//! recognize it in text, how to build it from a match, and how to write it back
//! as text or HTML.
//!
//! ## Kinds
//!
//! Kinds implement [`TokenKind`]. Most kinds, including all built-ins, are
//! table-driven [`PatternKind`]s: a regular expression with a named `value`
//! group, a value type, and text/HTML templates. Kinds live in a
//! [`TokenRegistry`], which decides the order in which the parser tries them.
//!
//! ## Round-trip
//!
//! `kind.to_text(token)` must produce text that the same kind recognizes again
//! as an equal token. [`crate::Task::parse`] verifies this for every line it
//! parses.
//!
//! ## Head slots
//!
//! Four kinds live at the front of a line in a fixed order: the completion
//! marker `x` (slot 0), the completion date (1), the priority (2) and the
//! creation date (3). A head-slot kind is only recognized while every earlier
//! token has a smaller slot, which is why `do something (A)` has no priority.

pub mod builtin;
mod pattern;
mod priority;
mod registry;
pub mod validation;

use chrono::NaiveDate;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::RenderConfig;

pub use pattern::{PatternKind, PatternKindBuilder, ValueType};
pub use priority::Priority;
pub use registry::TokenRegistry;
pub use validation::NameValidationError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid pattern for token kind '{kind}': {message}")]
    InvalidPattern { kind: String, message: String },

    #[error("pattern of token kind '{0}' has no named group 'value'")]
    MissingValueGroup(String),

    #[error("'{text}' is not a '{kind}' token")]
    NoMatch { kind: String, text: String },

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid priority '{0}' (expected a letter A-Z)")]
    InvalidPriority(String),

    #[error("invalid name: {0}")]
    InvalidName(#[from] NameValidationError),
}

/// The typed payload of a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TokenValue {
    /// A marker without payload (the completion `x`).
    Flag,
    Priority(Priority),
    Date(NaiveDate),
    Text(String),
}

impl TokenValue {
    pub fn as_priority(&self) -> Option<Priority> {
        match self {
            TokenValue::Priority(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            TokenValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TokenValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Flag => Ok(()),
            TokenValue::Priority(p) => write!(f, "{}", p),
            TokenValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            TokenValue::Text(s) => f.write_str(s),
        }
    }
}

/// Where in a line a kind is being matched.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    /// Tokens already parsed from the same line, in order.
    pub preceding: &'a [Token],
}

impl<'a> ParseContext<'a> {
    pub fn new(preceding: &'a [Token]) -> Self {
        Self { preceding }
    }

    /// Context of a token standing alone, e.g. when parsing `task.add_text("(A)")`.
    pub fn start() -> ParseContext<'static> {
        ParseContext { preceding: &[] }
    }

    pub fn position(&self) -> usize {
        self.preceding.len()
    }

    pub fn previous(&self) -> Option<&'a Token> {
        self.preceding.last()
    }

    /// True while only head-slot tokens with a slot below `slot` were seen.
    pub fn in_head_before(&self, slot: u8) -> bool {
        self.preceding
            .iter()
            .all(|t| t.head_slot().is_some_and(|s| s < slot))
    }
}

/// What a kind extracts from a match; the registry turns it into a [`Token`].
#[derive(Debug, Clone, PartialEq)]
pub struct TokenParts {
    pub value: TokenValue,
    /// Display name; the key for `key:value` tags.
    pub name: String,
    pub captures: BTreeMap<String, String>,
}

/// Capabilities of a token kind.
///
/// `pattern` must be anchored at the start of the text. The parser only
/// accepts a match that ends at whitespace or at the end of the line.
pub trait TokenKind: Send + Sync {
    fn id(&self) -> &str;

    fn pattern(&self) -> &Regex;

    /// Positional constraints; called before the pattern is tried.
    fn accepts(&self, _ctx: &ParseContext<'_>) -> bool {
        true
    }

    fn build(
        &self,
        captures: &Captures<'_>,
        ctx: &ParseContext<'_>,
    ) -> Result<TokenParts, TokenError>;

    fn to_text(&self, token: &Token) -> String;

    fn to_html(&self, token: &Token, config: &RenderConfig) -> String;

    /// At most one token of this kind per task.
    fn is_singleton(&self) -> bool {
        false
    }

    fn head_slot(&self) -> Option<u8> {
        None
    }

    /// Catch-all kinds are tried after every other kind.
    fn is_fallback(&self) -> bool {
        false
    }
}

/// One parsed fragment of a task line.
#[derive(Clone)]
pub struct Token {
    kind: Arc<dyn TokenKind>,
    raw: String,
    value: TokenValue,
    name: String,
    captures: BTreeMap<String, String>,
}

impl Token {
    pub(crate) fn from_parts(kind: Arc<dyn TokenKind>, raw: String, parts: TokenParts) -> Self {
        Self {
            kind,
            raw,
            value: parts.value,
            name: parts.name,
            captures: parts.captures,
        }
    }

    /// Builds a token from a value without source text; `raw` is taken from
    /// the kind's serialization.
    pub fn from_value(kind: Arc<dyn TokenKind>, value: TokenValue) -> Self {
        let name = value.to_string();
        let mut captures = BTreeMap::new();
        captures.insert("value".to_string(), name.clone());
        Self::assemble(kind, value, name, captures)
    }

    fn assemble(
        kind: Arc<dyn TokenKind>,
        value: TokenValue,
        name: String,
        captures: BTreeMap<String, String>,
    ) -> Self {
        let mut token = Self {
            kind,
            raw: String::new(),
            value,
            name,
            captures,
        };
        token.raw = token.to_text();
        token
    }

    /// Parses `text` as exactly one token of `kind`.
    pub fn from_text(kind: Arc<dyn TokenKind>, text: &str) -> Result<Self, TokenError> {
        let no_match = || TokenError::NoMatch {
            kind: kind.id().to_string(),
            text: text.to_string(),
        };
        let captures = kind.pattern().captures(text).ok_or_else(no_match)?;
        let whole = captures.get(0).ok_or_else(no_match)?;
        if whole.start() != 0 || whole.as_str().trim_end() != text {
            return Err(no_match());
        }
        let parts = kind.build(&captures, &ParseContext::start())?;
        Ok(Self::from_parts(kind.clone(), text.to_string(), parts))
    }

    pub fn completed() -> Self {
        Self::from_value(builtin::completed(), TokenValue::Flag)
    }

    pub fn completion_date(date: NaiveDate) -> Self {
        Self::from_value(builtin::completion_date(), TokenValue::Date(date))
    }

    pub fn priority(priority: Priority) -> Self {
        Self::from_value(builtin::priority(), TokenValue::Priority(priority))
    }

    pub fn created_date(date: NaiveDate) -> Self {
        Self::from_value(builtin::created_date(), TokenValue::Date(date))
    }

    pub fn due_date(date: NaiveDate) -> Self {
        Self::from_value(builtin::due_date(), TokenValue::Date(date))
    }

    pub fn threshold_date(date: NaiveDate) -> Self {
        Self::from_value(builtin::threshold_date(), TokenValue::Date(date))
    }

    pub fn project(name: &str) -> Result<Self, TokenError> {
        validation::validate_label(name)?;
        Self::from_value(builtin::project(), TokenValue::Text(name.to_string())).checked()
    }

    pub fn context(name: &str) -> Result<Self, TokenError> {
        validation::validate_label(name)?;
        Self::from_value(builtin::context(), TokenValue::Text(name.to_string())).checked()
    }

    /// A generic `key:value` tag.
    ///
    /// Keys the built-in kinds claim are rejected when the value fits them:
    /// `tag("due", "2016-03-25")` would read back as a due date, use
    /// [`Token::due_date`] instead.
    pub fn tag(key: &str, value: &str) -> Result<Self, TokenError> {
        validation::validate_tag_key(key)?;
        validation::validate_tag_value(value)?;
        let mut captures = BTreeMap::new();
        captures.insert("name".to_string(), key.to_string());
        captures.insert("value".to_string(), value.to_string());
        Self::assemble(
            builtin::tag(),
            TokenValue::Text(value.to_string()),
            key.to_string(),
            captures,
        )
        .checked()
    }

    /// A plain word; text that is a project, context, tag or URL is rejected.
    pub fn word(word: &str) -> Result<Self, TokenError> {
        validation::validate_label(word)?;
        Self::from_value(builtin::word(), TokenValue::Text(word.to_string())).checked()
    }

    /// Fails with [`TokenError::NoMatch`] unless the built-in kinds read this
    /// token's text, in the body of a line, back as the same kind.
    fn checked(self) -> Result<Self, TokenError> {
        let text = self.to_text();
        let body = [Self::from_value(builtin::word(), TokenValue::Text(String::new()))];
        match crate::parser::parse_unit(&text, &body, &TokenRegistry::with_builtins()) {
            Some(parsed) if parsed.kind_id() == self.kind_id() => Ok(self),
            _ => Err(TokenError::NoMatch {
                kind: self.kind_id().to_string(),
                text,
            }),
        }
    }

    pub fn kind(&self) -> &Arc<dyn TokenKind> {
        &self.kind
    }

    pub fn kind_id(&self) -> &str {
        self.kind.id()
    }

    /// The text this token was parsed from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> &TokenValue {
        &self.value
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A named group of the recognition match.
    pub fn capture(&self, group: &str) -> Option<&str> {
        self.captures.get(group).map(String::as_str)
    }

    pub fn captures(&self) -> &BTreeMap<String, String> {
        &self.captures
    }

    pub fn is_singleton(&self) -> bool {
        self.kind.is_singleton()
    }

    pub fn head_slot(&self) -> Option<u8> {
        self.kind.head_slot()
    }

    pub fn to_text(&self) -> String {
        self.kind.to_text(self)
    }

    pub fn to_html(&self, config: &RenderConfig) -> String {
        self.kind.to_html(self, config)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind_id() == other.kind_id() && self.name == other.name && self.value == other.value
    }
}

impl Eq for Token {}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("kind", &self.kind_id())
            .field("raw", &self.raw)
            .field("value", &self.value)
            .finish()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Selects tokens for removal or lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenSelector {
    /// Any token of this kind.
    Kind(String),
    /// A token equal to this one; singleton kinds match on kind alone.
    Token(Token),
}

impl TokenSelector {
    pub fn kind(id: impl Into<String>) -> Self {
        TokenSelector::Kind(id.into())
    }

    pub fn matches(&self, token: &Token) -> bool {
        match self {
            TokenSelector::Kind(id) => token.kind_id() == id,
            TokenSelector::Token(wanted) if wanted.is_singleton() => {
                token.kind_id() == wanted.kind_id()
            }
            TokenSelector::Token(wanted) => token == wanted,
        }
    }
}

impl From<Token> for TokenSelector {
    fn from(token: Token) -> Self {
        TokenSelector::Token(token)
    }
}

impl From<&Token> for TokenSelector {
    fn from(token: &Token) -> Self {
        TokenSelector::Token(token.clone())
    }
}
