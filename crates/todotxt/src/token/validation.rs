//! Name validation for tokens built from values.
//!
//! Parsed tokens never need validation, since their pattern already matched.
//! Tokens built in code (`Token::project("...")`) do: a name with whitespace
//! would serialize into several tokens and break the round-trip.
//!
//! - Labels (projects, contexts, words): non-empty, no whitespace
//! - Tag keys: start with a letter; alphanumeric, `_` and `-` only
//! - Tag values: non-empty, no whitespace, must not start with `:`

/// Validates a project, context or word.
///
/// # Examples
/// ```
/// use todotxt::token::validation::validate_label;
///
/// assert!(validate_label("garden").is_ok());
/// assert!(validate_label("todo.txt-pylib").is_ok());
///
/// assert!(validate_label("").is_err());
/// assert!(validate_label("two words").is_err());
/// ```
pub fn validate_label(name: &str) -> Result<(), NameValidationError> {
    if name.is_empty() {
        return Err(NameValidationError::Empty);
    }
    reject_whitespace(name)
}

/// Validates the key of a `key:value` tag.
pub fn validate_tag_key(key: &str) -> Result<(), NameValidationError> {
    let Some(first_char) = key.chars().next() else {
        return Err(NameValidationError::Empty);
    };
    if !first_char.is_ascii_alphabetic() {
        return Err(NameValidationError::InvalidStart(first_char));
    }

    for ch in key.chars() {
        if !is_valid_key_char(ch) {
            return Err(NameValidationError::InvalidCharacter(ch));
        }
    }

    Ok(())
}

/// Validates the value of a `key:value` tag.
pub fn validate_tag_value(value: &str) -> Result<(), NameValidationError> {
    match value.chars().next() {
        None => Err(NameValidationError::Empty),
        Some(':') => Err(NameValidationError::InvalidStart(':')),
        Some(_) => reject_whitespace(value),
    }
}

fn reject_whitespace(name: &str) -> Result<(), NameValidationError> {
    match name.chars().find(|ch| ch.is_whitespace()) {
        Some(ch) => Err(NameValidationError::Whitespace(ch)),
        None => Ok(()),
    }
}

fn is_valid_key_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    Empty,
    /// The name contains whitespace and would split into several tokens
    Whitespace(char),
    InvalidStart(char),
    InvalidCharacter(char),
}

impl std::fmt::Display for NameValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameValidationError::Empty => write!(f, "name cannot be empty"),
            NameValidationError::Whitespace(ch) => {
                write!(f, "name cannot contain whitespace, found {:?}", ch)
            }
            NameValidationError::InvalidStart(ch) => {
                write!(f, "name cannot start with '{}'", ch)
            }
            NameValidationError::InvalidCharacter(ch) => {
                write!(
                    f,
                    "name contains invalid character '{}' (only alphanumeric, underscore, and hyphen allowed)",
                    ch
                )
            }
        }
    }
}

impl std::error::Error for NameValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_labels() {
        assert!(validate_label("garden").is_ok());
        assert!(validate_label("baz.peng-zap").is_ok());
        assert!(validate_label("+").is_ok());
    }

    #[test]
    fn test_invalid_labels() {
        assert_eq!(validate_label(""), Err(NameValidationError::Empty));
        assert_eq!(
            validate_label("two words"),
            Err(NameValidationError::Whitespace(' '))
        );
        assert_eq!(
            validate_label("tab\there"),
            Err(NameValidationError::Whitespace('\t'))
        );
    }

    #[test]
    fn test_valid_tag_keys() {
        assert!(validate_tag_key("due").is_ok());
        assert!(validate_tag_key("rec").is_ok());
        assert!(validate_tag_key("my_key-2").is_ok());
    }

    #[test]
    fn test_invalid_tag_keys() {
        assert_eq!(validate_tag_key(""), Err(NameValidationError::Empty));
        assert_eq!(
            validate_tag_key("2do"),
            Err(NameValidationError::InvalidStart('2'))
        );
        assert_eq!(
            validate_tag_key("a:b"),
            Err(NameValidationError::InvalidCharacter(':'))
        );
        assert_eq!(
            validate_tag_key("a b"),
            Err(NameValidationError::InvalidCharacter(' '))
        );
    }

    #[test]
    fn test_tag_values() {
        assert!(validate_tag_value("1w").is_ok());
        assert!(validate_tag_value("a:b").is_ok());
        assert_eq!(validate_tag_value(""), Err(NameValidationError::Empty));
        assert_eq!(
            validate_tag_value(":x"),
            Err(NameValidationError::InvalidStart(':'))
        );
        assert_eq!(
            validate_tag_value("x y"),
            Err(NameValidationError::Whitespace(' '))
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            NameValidationError::Empty.to_string(),
            "name cannot be empty"
        );
        assert_eq!(
            NameValidationError::Whitespace(' ').to_string(),
            "name cannot contain whitespace, found ' '"
        );
        assert_eq!(
            NameValidationError::InvalidStart('2').to_string(),
            "name cannot start with '2'"
        );
    }
}
