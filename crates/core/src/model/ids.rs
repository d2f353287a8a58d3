use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Label of a single exercise: one or more ASCII digits followed by one
/// lowercase ASCII letter (`5a`, `12c`).
///
/// Ordering is the ordering of the underlying string, so `"10b" < "1a"`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExerciseId(String);

/// Raised when a string is not a well-formed exercise identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid exercise id {raw:?}: expected digits followed by a lowercase letter")]
pub struct IdError {
    raw: String,
}

impl IdError {
    /// The rejected input.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl ExerciseId {
    /// Validates `raw` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns `IdError` unless `raw` matches `^[0-9]+[a-z]$`.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        if is_well_formed(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(IdError {
                raw: raw.to_string(),
            })
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_well_formed(raw: &str) -> bool {
    let Some((letter, digits)) = raw.as_bytes().split_last() else {
        return false;
    };
    !digits.is_empty() && digits.iter().all(u8::is_ascii_digit) && letter.is_ascii_lowercase()
}

impl fmt::Debug for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExerciseId({})", self.0)
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ExerciseId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ExerciseId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ExerciseId> for String {
    fn from(id: ExerciseId) -> Self {
        id.0
    }
}

impl AsRef<str> for ExerciseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
