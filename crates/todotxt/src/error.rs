use thiserror::Error;

use crate::query::QueryError;
use crate::token::TokenError;

#[derive(Error, Debug)]
pub enum TodoError {
    /// The tokens of a line did not serialize back to the line itself.
    #[error("Parse inconsistency: {line:?} re-serialized as {rendered:?}")]
    ParseInconsistency { line: String, rendered: String },

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, TodoError>;
