//! # Line Parser
//!
//! Turns one todo.txt line into an ordered token sequence.
//!
//! The parser keeps a cursor over the line. At each position it tries the
//! registry's kinds in [`TokenRegistry::ordered_kinds`] order; the first kind
//! that accepts the position, matches up to the next whitespace (or the end of
//! the line) and builds successfully consumes the span. The separating
//! whitespace is skipped, whatever its length.
//!
//! A kind whose pattern matches but whose build fails (`due:2016-02-31`) is
//! skipped and the next kind gets its turn, so the worst outcome for any span
//! is a plain word. If even `word` was unregistered, the span up to the next
//! whitespace is made a word by the built-in word kind.
//!
//! ## Whitespace
//!
//! Runs of whitespace between tokens are not kept: re-serializing joins tokens
//! with single spaces, and leading/trailing whitespace is dropped. [`normalize`]
//! gives the text a line re-serializes to.

use regex::Captures;

use crate::token::{builtin, ParseContext, Token, TokenRegistry};

/// Parses a line into tokens. Never fails; unrecognized spans become words.
pub fn parse_line(line: &str, registry: &TokenRegistry) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        let (token, consumed) = next_token(rest, &tokens, registry);
        tracing::trace!(kind = token.kind_id(), raw = token.raw(), "matched token");
        tokens.push(token);
        rest = rest[consumed..].trim_start();
    }

    tokens
}

/// Parses `text` as the token that would follow `preceding` in a line.
/// `None` if the text is more than one token.
pub(crate) fn parse_unit(
    text: &str,
    preceding: &[Token],
    registry: &TokenRegistry,
) -> Option<Token> {
    let (token, consumed) = next_token(text, preceding, registry);
    (consumed == text.len()).then_some(token)
}

/// The text a line re-serializes to: whitespace runs collapsed, ends trimmed.
pub fn normalize(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn next_token(rest: &str, preceding: &[Token], registry: &TokenRegistry) -> (Token, usize) {
    let ctx = ParseContext::new(preceding);

    for kind in registry.ordered_kinds() {
        if !kind.accepts(&ctx) {
            continue;
        }
        let Some((end, captures)) = match_unit(kind.pattern(), rest) else {
            continue;
        };
        match kind.build(&captures, &ctx) {
            Ok(parts) => {
                let token = Token::from_parts(kind.clone(), rest[..end].to_string(), parts);
                return (token, end);
            }
            Err(err) => {
                tracing::debug!(
                    kind = kind.id(),
                    text = &rest[..end],
                    error = %err,
                    "token kind rejected its match"
                );
            }
        }
    }

    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let word = &rest[..end];
    let parts = crate::token::TokenParts {
        value: crate::token::TokenValue::Text(word.to_string()),
        name: word.to_string(),
        captures: [("value".to_string(), word.to_string())].into_iter().collect(),
    };
    (Token::from_parts(builtin::word(), word.to_string(), parts), end)
}

/// Matches `pattern` at the start of `rest`; the match must end at whitespace
/// or at the end of the text. Returns the consumed length without trailing
/// whitespace.
fn match_unit<'t>(pattern: &regex::Regex, rest: &'t str) -> Option<(usize, Captures<'t>)> {
    let captures = pattern.captures(rest)?;
    let whole = captures.get(0)?;
    if whole.start() != 0 {
        return None;
    }
    let end = whole.as_str().trim_end().len();
    if end == 0 {
        return None;
    }
    let at_boundary = rest[end..].chars().next().map_or(true, char::is_whitespace);
    at_boundary.then_some((end, captures))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{PatternKind, Priority, TokenValue};

    fn kinds(line: &str) -> Vec<String> {
        parse_line(line, &TokenRegistry::with_builtins())
            .iter()
            .map(|t| t.kind_id().to_string())
            .collect()
    }

    #[test]
    fn priority_then_words() {
        let tokens = parse_line("(A) feed the cat", &TokenRegistry::with_builtins());
        assert_eq!(tokens.len(), 4);
        assert_eq!(
            tokens[0].value(),
            &TokenValue::Priority(Priority::HIGHEST)
        );
        let words: Vec<&str> = tokens[1..].iter().map(|t| t.raw()).collect();
        assert_eq!(words, vec!["feed", "the", "cat"]);
        assert!(tokens[1..].iter().all(|t| t.kind_id() == "word"));
    }

    #[test]
    fn empty_line_has_no_tokens() {
        assert!(parse_line("", &TokenRegistry::with_builtins()).is_empty());
        assert!(parse_line("   \t ", &TokenRegistry::with_builtins()).is_empty());
    }

    #[test]
    fn priority_only_at_the_head() {
        assert_eq!(kinds("do something (A)"), vec!["word", "word", "word"]);
        assert_eq!(kinds("(A) (B) twice"), vec!["priority", "word", "word"]);
    }

    #[test]
    fn head_of_a_completed_task() {
        assert_eq!(
            kinds("x 2000-01-02 (A) 2000-01-01 done"),
            vec!["completed", "completion_date", "priority", "created_date", "word"]
        );
    }

    #[test]
    fn date_without_completion_marker_is_creation_date() {
        assert_eq!(kinds("2000-01-01 start"), vec!["created_date", "word"]);
        assert_eq!(kinds("start 2000-01-01"), vec!["word", "word"]);
    }

    #[test]
    fn due_date_beats_generic_tag() {
        assert_eq!(
            kinds("pay due:2016-03-25 rec:1m"),
            vec!["word", "due_date", "tag"]
        );
    }

    #[test]
    fn invalid_date_degrades() {
        // the tag kind picks it up once due_date rejects the calendar date
        assert_eq!(kinds("pay due:2016-02-31"), vec!["word", "tag"]);
        assert_eq!(kinds("2016-02-31 start"), vec!["word", "word"]);
    }

    #[test]
    fn projects_contexts_and_lone_signs() {
        assert_eq!(
            kinds("+test Do dev+test @home + @"),
            vec!["project", "word", "word", "context", "word", "word"]
        );
    }

    #[test]
    fn pattern_must_end_at_whitespace() {
        assert_eq!(kinds("(A)bc"), vec!["word"]);
        assert_eq!(kinds("xylophone"), vec!["word"]);
    }

    #[test]
    fn multi_unit_patterns_consume_spaces() {
        let mut registry = TokenRegistry::with_builtins();
        registry.register(
            PatternKind::builder("quote", r#""(?P<value>[^"]*)""#)
                .text_template("\"{value}\"")
                .build()
                .unwrap(),
        );
        let tokens = parse_line("say \"hello world\" now", &registry);
        let raws: Vec<&str> = tokens.iter().map(|t| t.raw()).collect();
        assert_eq!(raws, vec!["say", "\"hello world\"", "now"]);
        assert_eq!(tokens[1].value().as_text(), Some("hello world"));
    }

    #[test]
    fn without_word_kind_spans_still_become_words() {
        let tokens = parse_line("anything goes", &TokenRegistry::empty());
        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|t| t.kind_id() == "word"));
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  a \t b   c  "), "a b c");
        assert_eq!(normalize(""), "");
    }
}
