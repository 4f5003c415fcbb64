//! Task priorities.
//!
//! todo.txt priorities are the uppercase letters `A` to `Z`, written as `(A)`
//! at the start of a line. Internally a priority is its rank: `A` is 1, `Z` is
//! 26. A lower rank is more important, so ordering by rank puts `(A)` first.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::TokenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const HIGHEST: Priority = Priority(1);
    pub const LOWEST: Priority = Priority(26);

    /// Creates a priority from its rank (1 = `A` ... 26 = `Z`).
    pub fn from_rank(rank: u8) -> Result<Self, TokenError> {
        if (1..=26).contains(&rank) {
            Ok(Priority(rank))
        } else {
            Err(TokenError::InvalidPriority(rank.to_string()))
        }
    }

    /// Creates a priority from a letter; lowercase letters are accepted.
    pub fn from_letter(letter: char) -> Result<Self, TokenError> {
        let upper = letter.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Ok(Priority(upper as u8 - b'A' + 1))
        } else {
            Err(TokenError::InvalidPriority(letter.to_string()))
        }
    }

    pub fn rank(self) -> u8 {
        self.0
    }

    pub fn letter(self) -> char {
        (b'A' + self.0 - 1) as char
    }

    /// Moves the priority `steps` letters towards `A`, stopping at `A`.
    pub fn raised(self, steps: u8) -> Self {
        Priority(self.0.saturating_sub(steps).max(1))
    }

    /// Moves the priority `steps` letters towards `Z`.
    ///
    /// Returns `None` when that would go past `Z`: the task loses its priority.
    pub fn lowered(self, steps: u8) -> Option<Self> {
        let rank = self.0.checked_add(steps)?;
        (rank <= 26).then_some(Priority(rank))
    }
}

impl TryFrom<u8> for Priority {
    type Error = TokenError;

    fn try_from(rank: u8) -> Result<Self, Self::Error> {
        Priority::from_rank(rank)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Parses `A` or `(A)`.
impl FromStr for Priority {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(s);
        let mut chars = inner.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Priority::from_letter(letter),
            _ => Err(TokenError::InvalidPriority(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_to_ranks() {
        assert_eq!(Priority::from_letter('A').unwrap().rank(), 1);
        assert_eq!(Priority::from_letter('z').unwrap().rank(), 26);
        assert_eq!(Priority::from_rank(2).unwrap().letter(), 'B');
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Priority::from_rank(0).is_err());
        assert!(Priority::from_rank(29).is_err());
        assert!(Priority::from_letter('ß').is_err());
        assert!("abc".parse::<Priority>().is_err());
        assert!("(AA)".parse::<Priority>().is_err());
    }

    #[test]
    fn parses_bare_and_bracketed_letters() {
        assert_eq!("(C)".parse::<Priority>().unwrap().rank(), 3);
        assert_eq!("c".parse::<Priority>().unwrap().rank(), 3);
    }

    #[test]
    fn a_sorts_before_b() {
        let a = Priority::from_letter('A').unwrap();
        let b = Priority::from_letter('B').unwrap();
        assert!(a < b);
    }

    #[test]
    fn raising_saturates_at_a() {
        let t = Priority::from_rank(20).unwrap();
        assert_eq!(t.raised(1).letter(), 'S');
        assert_eq!(Priority::HIGHEST.raised(3), Priority::HIGHEST);
    }

    #[test]
    fn lowering_past_z_clears() {
        let k = Priority::from_rank(10).unwrap();
        assert_eq!(k.lowered(1).unwrap().letter(), 'K');
        assert_eq!(Priority::LOWEST.lowered(1), None);
    }

    #[test]
    fn deserializing_checks_the_rank() {
        let c: Priority = serde_json::from_str("3").unwrap();
        assert_eq!(c.letter(), 'C');
        assert!(serde_json::from_str::<Priority>("0").is_err());
        assert!(serde_json::from_str::<Priority>("200").is_err());
    }
}
