//! # todotxt
//!
//! A library for [todo.txt](http://todotxt.org) tasks. A line is parsed into an
//! ordered sequence of typed tokens, and the tokens are the single source of
//! truth: attributes (priority, dates, projects, ...) are derived from them,
//! mutations edit them, and serializing them gives the line back.
//!
//! ```text
//! (A) 2016-03-20 call mom @phone +family due:2016-03-25
//! └┬┘ └───┬────┘ └──┬───┘ └──┬─┘ └──┬──┘ └──────┬─────┘
//! priority created  words  context project   due_date
//! ```
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Token Layer (token/)                                       │
//! │  - TokenKind trait, table-driven PatternKind, built-ins     │
//! │  - TokenRegistry: ordered kinds, process-wide default       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Parser (parser.rs)                                         │
//! │  - Line → tokens, first matching kind wins                  │
//! │  - Never fails: unrecognized spans become words             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Task Model (task.rs)                                       │
//! │  - Owns the tokens, derives attributes, mutates in place    │
//! │  - Renders through render.rs and RenderConfig               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Registry & Queries (store.rs, query/)                      │
//! │  - TaskRegistry: weak index of tracked tasks                │
//! │  - QuerySet: lazy, chainable filters over a registry        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use todotxt::{Task, Priority};
//!
//! let mut task: Task = "(B) call mom @phone".parse().unwrap();
//! task.raise_priority(1).add_text("+family");
//!
//! assert_eq!(task.priority(), Some(Priority::HIGHEST));
//! assert_eq!(task.text(), "(A) call mom @phone +family");
//! assert_eq!(task.contexts(), vec!["phone"]);
//! ```
//!
//! ## Extending
//!
//! New token types are registered with a [`TokenRegistry`], usually as a
//! [`token::PatternKind`] built from a regex and two templates. Registered
//! kinds take part in parsing, serialization and rendering like the built-ins.
//!
//! ## Logging
//!
//! The crate emits `tracing` events (`trace` per parsed token, `debug` for
//! rejected matches, refused task edits and registry changes) and never
//! installs a subscriber.
//!
//! ## Module Overview
//!
//! - [`token`]: Token kinds, token values and the token registry
//! - [`parser`]: Line tokenizer
//! - [`task`]: The task model
//! - [`store`]: Task registry and handles
//! - [`query`]: Filtering and sorting over a task registry
//! - [`render`]: HTML output
//! - [`config`]: Rendering configuration
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod parser;
pub mod query;
pub mod render;
pub mod store;
pub mod task;
pub mod token;

pub use config::RenderConfig;
pub use error::{Result, TodoError};
pub use query::{AttrFilter, AttrValue, FilterOp, QueryError, QuerySet};
pub use store::{TaskHandle, TaskRegistry};
pub use task::Task;
pub use token::{Priority, Token, TokenError, TokenRegistry};
