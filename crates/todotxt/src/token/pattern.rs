//! Table-driven token kinds.
//!
//! A [`PatternKind`] is configured rather than coded: a regular expression
//! with a named `value` group, a [`ValueType`] the captured value is coerced
//! into, and two templates. Templates use `{placeholder}` syntax; placeholders
//! resolve against the token's `value`, `name` and `raw` text, every named
//! group of the match, and (for HTML only) the configured `element` and `class`
//! of the kind. Unknown placeholders are left as they are.
//!
//! ```ignore
//! let bold = PatternKind::builder("bold", r"\*\*(?P<value>\w+)\*\*")
//!     .text_template("**{value}**")
//!     .html_template("<strong>{value}</strong>")
//!     .build()?;
//! registry.register(bold);
//! ```

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fmt;

use super::{ParseContext, Priority, Token, TokenError, TokenKind, TokenParts, TokenValue};
use crate::config::RenderConfig;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

/// How the captured `value` group is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// The match is a marker; the captured text is ignored.
    Flag,
    Text,
    /// `YYYY-MM-DD`
    Date,
    /// A single letter `A`-`Z`.
    Priority,
}

impl ValueType {
    fn coerce(self, captured: &str) -> Result<TokenValue, TokenError> {
        match self {
            ValueType::Flag => Ok(TokenValue::Flag),
            ValueType::Text => Ok(TokenValue::Text(captured.to_string())),
            ValueType::Date => NaiveDate::parse_from_str(captured, "%Y-%m-%d")
                .map(TokenValue::Date)
                .map_err(|_| TokenError::InvalidDate(captured.to_string())),
            ValueType::Priority => captured.parse::<Priority>().map(TokenValue::Priority),
        }
    }
}

pub struct PatternKind {
    id: String,
    source: String,
    pattern: Regex,
    value_type: ValueType,
    text_template: String,
    html_template: String,
    singleton: bool,
    head_slot: Option<u8>,
    after: Option<String>,
    fallback: bool,
}

impl PatternKind {
    pub fn builder(id: impl Into<String>, pattern: impl Into<String>) -> PatternKindBuilder {
        PatternKindBuilder {
            id: id.into(),
            source: pattern.into(),
            value_type: ValueType::Text,
            text_template: "{value}".to_string(),
            html_template: "{value}".to_string(),
            singleton: false,
            head_slot: None,
            after: None,
            fallback: false,
        }
    }

    /// The pattern as it was given, before anchoring.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn text_template(&self) -> &str {
        &self.text_template
    }

    pub fn html_template(&self) -> &str {
        &self.html_template
    }

    fn fill(&self, template: &str, token: &Token, config: Option<&RenderConfig>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| {
                let key = &caps[1];
                let resolved = match (key, config) {
                    ("value", _) => Some(token.value().to_string()),
                    ("name", _) => Some(token.name().to_string()),
                    ("raw", _) => Some(token.raw().to_string()),
                    ("element", Some(config)) => Some(config.token_element.clone()),
                    ("class", Some(config)) => Some(config.token_class(&self.id).to_string()),
                    _ => token.capture(key).map(str::to_string),
                };
                resolved.unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

impl fmt::Debug for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternKind")
            .field("id", &self.id)
            .field("pattern", &self.source)
            .field("value_type", &self.value_type)
            .finish()
    }
}

impl TokenKind for PatternKind {
    fn id(&self) -> &str {
        &self.id
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn accepts(&self, ctx: &ParseContext<'_>) -> bool {
        if let Some(slot) = self.head_slot {
            if !ctx.in_head_before(slot) {
                return false;
            }
        }
        match &self.after {
            Some(kind) => ctx.previous().is_some_and(|t| t.kind_id() == kind),
            None => true,
        }
    }

    fn build(
        &self,
        captures: &Captures<'_>,
        _ctx: &ParseContext<'_>,
    ) -> Result<TokenParts, TokenError> {
        let captured = captures
            .name("value")
            .ok_or_else(|| TokenError::MissingValueGroup(self.id.clone()))?
            .as_str();
        let value = self.value_type.coerce(captured)?;

        let groups: BTreeMap<String, String> = self
            .pattern
            .capture_names()
            .flatten()
            .filter_map(|group| {
                captures
                    .name(group)
                    .map(|m| (group.to_string(), m.as_str().to_string()))
            })
            .collect();

        let name = match groups.get("name") {
            Some(name) => name.clone(),
            None => value.to_string(),
        };

        Ok(TokenParts {
            value,
            name,
            captures: groups,
        })
    }

    fn to_text(&self, token: &Token) -> String {
        self.fill(&self.text_template, token, None)
    }

    fn to_html(&self, token: &Token, config: &RenderConfig) -> String {
        self.fill(&self.html_template, token, Some(config))
    }

    fn is_singleton(&self) -> bool {
        self.singleton
    }

    fn head_slot(&self) -> Option<u8> {
        self.head_slot
    }

    fn is_fallback(&self) -> bool {
        self.fallback
    }
}

#[derive(Debug, Clone)]
pub struct PatternKindBuilder {
    id: String,
    source: String,
    value_type: ValueType,
    text_template: String,
    html_template: String,
    singleton: bool,
    head_slot: Option<u8>,
    after: Option<String>,
    fallback: bool,
}

impl PatternKindBuilder {
    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn text_template(mut self, template: impl Into<String>) -> Self {
        self.text_template = template.into();
        self
    }

    pub fn html_template(mut self, template: impl Into<String>) -> Self {
        self.html_template = template.into();
        self
    }

    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    /// Pins the kind to a fixed position among the leading tokens.
    pub fn head_slot(mut self, slot: u8) -> Self {
        self.head_slot = Some(slot);
        self
    }

    /// Only recognize the kind directly after a token of kind `kind`.
    pub fn after(mut self, kind: impl Into<String>) -> Self {
        self.after = Some(kind.into());
        self
    }

    pub fn fallback(mut self) -> Self {
        self.fallback = true;
        self
    }

    pub fn build(self) -> Result<PatternKind, TokenError> {
        let anchored = format!(r"^(?:{})(?:\s|\z)", self.source);
        let pattern = Regex::new(&anchored).map_err(|e| TokenError::InvalidPattern {
            kind: self.id.clone(),
            message: e.to_string(),
        })?;
        if !pattern.capture_names().flatten().any(|n| n == "value") {
            return Err(TokenError::MissingValueGroup(self.id));
        }

        Ok(PatternKind {
            id: self.id,
            source: self.source,
            pattern,
            value_type: self.value_type,
            text_template: self.text_template,
            html_template: self.html_template,
            singleton: self.singleton,
            head_slot: self.head_slot,
            after: self.after,
            fallback: self.fallback,
        })
    }
}
