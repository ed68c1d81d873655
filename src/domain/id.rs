use std::{fmt, ops::Deref, str::FromStr, sync::LazyLock};

use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;
use regex::Regex;

/// Dotted requirement identifiers: a run of uppercase letters followed by one
/// or more dot-separated integers.
static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]+\.[0-9]+(\.[0-9]+)*$").expect("pattern is valid"));

/// Returns `true` if `id` has the shape `<LETTERS>.<int>(.<int>)*`.
#[must_use]
pub fn is_well_formed(id: &str) -> bool {
    ID_PATTERN.is_match(id)
}

/// A validated string containing only uppercase alphabetic characters ([A-Z]+).
///
/// This is the leading segment of every requirement identifier and the id of
/// the Part the requirement belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartPrefix(NonEmptyString);

impl PartPrefix {
    /// Creates a new `PartPrefix` from a string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPrefixError` if the string is empty or contains
    /// characters other than uppercase letters (A-Z).
    pub fn new(s: String) -> Result<Self, InvalidPrefixError> {
        if !s.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(InvalidPrefixError(s));
        }
        NonEmptyString::new(s).map(Self).map_err(InvalidPrefixError)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<&str> for PartPrefix {
    type Error = InvalidPrefixError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl Deref for PartPrefix {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for PartPrefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string doesn't match the required pattern [A-Z]+.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid part prefix '{0}': must be non-empty and contain only uppercase letters (A-Z)")]
pub struct InvalidPrefixError(String);

/// A parsed requirement identifier such as `G.1.2.3`.
///
/// The first numeric segment is the Section number within the Part; any
/// further segments address the requirement (and its ancestors) inside that
/// Section. Segments are kept as digit strings, so ids of any length parse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequirementId {
    part: PartPrefix,
    numbers: NonEmpty<String>,
}

impl RequirementId {
    /// The letter prefix, i.e. the id of the owning Part.
    #[must_use]
    pub fn part(&self) -> &str {
        self.part.as_str()
    }

    /// The Section number (the second dot-segment), without leading zeros.
    #[must_use]
    pub fn section(&self) -> &str {
        canonical_number(&self.numbers.head)
    }

    /// Number of dot-segments, counting the letter prefix.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.numbers.len() + 1
    }
}

/// Strips leading zeros from a run of ASCII digits, keeping a lone `0`.
#[must_use]
pub fn canonical_number(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() && !digits.is_empty() {
        "0"
    } else {
        trimmed
    }
}

impl fmt::Display for RequirementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.part)?;
        for n in &self.numbers {
            write!(f, ".{n}")?;
        }
        Ok(())
    }
}

/// Errors that can occur when parsing a requirement identifier.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdError {
    /// The id does not have the shape `<LETTERS>.<int>(.<int>)*`.
    #[error("Invalid requirement ID format: '{0}'")]
    Syntax(String),

    /// The letter prefix is invalid.
    #[error(transparent)]
    Prefix(#[from] InvalidPrefixError),
}

impl FromStr for RequirementId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_well_formed(s) {
            return Err(IdError::Syntax(s.to_string()));
        }

        let mut parts = s.split('.');
        let prefix = parts
            .next()
            .ok_or_else(|| IdError::Syntax(s.to_string()))?;
        let part = PartPrefix::try_from(prefix)?;

        let numbers = NonEmpty::collect(parts.map(str::to_string))
            .ok_or_else(|| IdError::Syntax(s.to_string()))?;

        Ok(Self { part, numbers })
    }
}

impl TryFrom<&str> for RequirementId {
    type Error = IdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}
