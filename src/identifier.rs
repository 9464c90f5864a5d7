//! Syntactic validation of namespace identifiers.
//!
//! Pure, no I/O. An identifier is 3..=64 characters drawn from
//! `[A-Za-z0-9._-]`.

use std::fmt;

pub const MIN_IDENTIFIER_LEN: usize = 3;
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// A validated identifier. Only constructible through [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier ({reason})")]
pub struct ValidationError {
    pub reason: &'static str,
}

/// Accept `candidate` iff its length is within bounds and every character
/// is an ASCII letter, digit, `.`, `_` or `-`.
pub fn validate(candidate: &str) -> Result<Identifier, ValidationError> {
    // Byte length equals char count once every char is known to be ASCII.
    let allowed = candidate
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    let len = candidate.len();

    if allowed && (MIN_IDENTIFIER_LEN..=MAX_IDENTIFIER_LEN).contains(&len) {
        Ok(Identifier(candidate.to_string()))
    } else {
        Err(ValidationError { reason: "format" })
    }
}
