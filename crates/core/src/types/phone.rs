//! Russian mobile phone number type.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `+7` or `8`, then 10 digits grouped 3-3-2-2. Single spaces or dashes may
/// separate the groups and the area code may be wrapped in parentheses.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+7|8)[\s-]?\(?\d{3}\)?[\s-]?\d{3}[\s-]?\d{2}[\s-]?\d{2}$")
        .expect("Invalid regex")
});

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty (after trimming).
    #[error("phone cannot be empty")]
    Empty,
    /// The input is not a `+7`/`8` prefixed ten-digit number.
    #[error("phone must be +7 or 8 followed by 10 digits")]
    InvalidFormat,
}

/// A Russian mobile phone number, stored as entered (trimmed).
///
/// ## Examples
///
/// ```
/// use web_larek_core::Phone;
///
/// assert!(Phone::parse("+79998887766").is_ok());
/// assert!(Phone::parse("8 (999) 888-77-66").is_ok());
/// assert!(Phone::parse("12345").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::Empty`] for blank input and
    /// [`PhoneError::InvalidFormat`] when the number does not match.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        if !PHONE_PATTERN.is_match(s) {
            return Err(PhoneError::InvalidFormat);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the number as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_numbers() {
        for input in [
            "+79998887766",
            "89998887766",
            "+7 999 888 77 66",
            "8-999-888-77-66",
            "+7 (999) 888-77-66",
            "8(999)8887766",
        ] {
            assert!(Phone::parse(input).is_ok(), "{input} should be accepted");
        }
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Phone::parse(""), Err(PhoneError::Empty));
        assert_eq!(Phone::parse("  "), Err(PhoneError::Empty));
    }

    #[test]
    fn test_parse_invalid_format() {
        for input in ["12345", "+19998887766", "+7999888776", "+799988877665", "phone"] {
            assert_eq!(
                Phone::parse(input),
                Err(PhoneError::InvalidFormat),
                "{input} should be rejected"
            );
        }
    }
}
