//! # Rendering Configuration
//!
//! HTML output is controlled by [`RenderConfig`]. It is an explicit value
//! passed to [`crate::Task::html_with`]; [`crate::Task::html`] uses the
//! process-wide default returned by [`RenderConfig::current`].
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `element` | `div` | Element wrapping a task |
//! | `html_class` | `task` | First class of the wrapping element |
//! | `include_priority_class` | `true` | Add `priority-a` etc. |
//! | `token_element` | `span` | Element used by token templates (`{element}`) |
//! | `token_classes` | see below | Kind id → CSS class used by token templates (`{class}`) |
//! | `property_classes` | `is_completed` → `completed`, `is_on_threshold` → `threshold`, `is_overdue` → `overdue` | Added when the property is true |
//! | `context_classes` | empty | Added when the task has the context |
//! | `project_classes` | empty | Added when the task has the project |
//!
//! Kinds missing from `token_classes` use their id as class.
//!
//! ## Loading
//!
//! Every field has a default, so a TOML document only names what it changes:
//!
//! ```toml
//! element = "li"
//!
//! [project_classes]
//! garden = "green"
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::error::Result;

static CURRENT: Lazy<RwLock<RenderConfig>> = Lazy::new(|| RwLock::new(RenderConfig::default()));

fn default_token_classes() -> BTreeMap<String, String> {
    [
        ("completion_date", "completeddate"),
        ("created_date", "createddate"),
        ("due_date", "duedate"),
        ("threshold_date", "thresholddate"),
        ("priority", "priority"),
        ("project", "project"),
        ("context", "context"),
        ("tag", "tag"),
    ]
    .into_iter()
    .map(|(kind, class)| (kind.to_string(), class.to_string()))
    .collect()
}

fn default_property_classes() -> BTreeMap<String, String> {
    [
        ("is_completed", "completed"),
        ("is_on_threshold", "threshold"),
        ("is_overdue", "overdue"),
    ]
    .into_iter()
    .map(|(property, class)| (property.to_string(), class.to_string()))
    .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    pub element: String,
    pub html_class: String,
    pub include_priority_class: bool,
    pub token_element: String,
    pub token_classes: BTreeMap<String, String>,
    pub property_classes: BTreeMap<String, String>,
    pub context_classes: BTreeMap<String, String>,
    pub project_classes: BTreeMap<String, String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            element: "div".to_string(),
            html_class: "task".to_string(),
            include_priority_class: true,
            token_element: "span".to_string(),
            token_classes: default_token_classes(),
            property_classes: default_property_classes(),
            context_classes: BTreeMap::new(),
            project_classes: BTreeMap::new(),
        }
    }
}

impl RenderConfig {
    /// Parses a (partial) TOML document on top of the defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// CSS class for tokens of `kind`.
    pub fn token_class<'a>(&'a self, kind: &'a str) -> &'a str {
        self.token_classes
            .get(kind)
            .map(String::as_str)
            .unwrap_or(kind)
    }

    /// The process-wide default.
    pub fn current() -> RenderConfig {
        CURRENT
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_default(config: RenderConfig) {
        *CURRENT.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    pub fn reset_default() {
        Self::set_default(RenderConfig::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.element, "div");
        assert_eq!(config.html_class, "task");
        assert!(config.include_priority_class);
        assert_eq!(config.token_element, "span");
        assert_eq!(
            config.property_classes.get("is_overdue").map(String::as_str),
            Some("overdue")
        );
        assert!(config.project_classes.is_empty());
    }

    #[test]
    fn test_token_class_falls_back_to_kind() {
        let config = RenderConfig::default();
        assert_eq!(config.token_class("due_date"), "duedate");
        assert_eq!(config.token_class("bold"), "bold");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RenderConfig::from_toml_str(
            r#"
            element = "li"

            [project_classes]
            garden = "green"
            "#,
        )
        .unwrap();
        assert_eq!(config.element, "li");
        assert_eq!(config.html_class, "task");
        assert_eq!(
            config.project_classes.get("garden").map(String::as_str),
            Some("green")
        );
        assert_eq!(config.property_classes, default_property_classes());
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = RenderConfig::from_toml_str("element = 3").unwrap_err();
        assert!(matches!(err, crate::error::TodoError::Config(_)));
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(
            RenderConfig::from_toml_str("").unwrap(),
            RenderConfig::default()
        );
    }

    #[test]
    fn test_serializes_back_to_toml() {
        let config = RenderConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(RenderConfig::from_toml_str(&text).unwrap(), config);
    }
}
