// crates/conformance-core/src/model/expected.rs
// ============================================================================
// Module: Expected Attribute Values
// Description: Tri-state matcher for attribute assertions.
// Purpose: Keep "absent", "empty", and "matches a pattern" distinct.
// Dependencies: regex, thiserror
// ============================================================================

//! ## Overview
//! Attribute checks compare an observed `Option<&str>` against an
//! [`Expected`] value. The three states never collapse into each other:
//!
//! - [`Expected::Absent`] only matches a missing value.
//! - [`Expected::Exact`] only matches a present value with identical text,
//!   so `Exact("")` matches a present empty string and nothing else.
//! - [`Expected::Pattern`] only matches a present value the pattern accepts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use thiserror::Error;

// ============================================================================
// SECTION: Pattern
// ============================================================================

/// Errors raised when compiling an attribute pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pattern is not a valid regular expression.
    #[error("invalid attribute pattern: {0}")]
    Invalid(String),
}

/// Compiled regular expression used by attribute and error matchers.
#[derive(Debug, Clone)]
pub struct AttrPattern(Regex);

impl AttrPattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Invalid`] when the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Regex::new(pattern).map(Self).map_err(|err| PatternError::Invalid(err.to_string()))
    }

    /// Returns the pattern source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns true when the pattern matches anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for AttrPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for AttrPattern {}

impl fmt::Display for AttrPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.0.as_str())
    }
}

// ============================================================================
// SECTION: Expected
// ============================================================================

/// Expected state of a single attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// The attribute must be missing.
    Absent,
    /// The attribute must be present with exactly this text.
    Exact(String),
    /// The attribute must be present and match this pattern.
    Pattern(AttrPattern),
}

impl Expected {
    /// Expects an exact value.
    #[must_use]
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact(value.into())
    }

    /// Expects a present value matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when the pattern does not compile.
    pub fn pattern(pattern: &str) -> Result<Self, PatternError> {
        AttrPattern::new(pattern).map(Self::Pattern)
    }

    /// Expects an exact value when `Some`, absence when `None`.
    #[must_use]
    pub fn from_option(value: Option<impl Into<String>>) -> Self {
        value.map_or(Self::Absent, |value| Self::Exact(value.into()))
    }

    /// Returns true when `actual` satisfies this expectation.
    #[must_use]
    pub fn matches(&self, actual: Option<&str>) -> bool {
        match (self, actual) {
            (Self::Absent, None) => true,
            (Self::Exact(expected), Some(actual)) => expected == actual,
            (Self::Pattern(pattern), Some(actual)) => pattern.is_match(actual),
            _ => false,
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("<absent>"),
            Self::Exact(value) => write!(f, "\"{value}\""),
            Self::Pattern(pattern) => pattern.fmt(f),
        }
    }
}

/// Expected values keyed by flattened attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedAttributes {
    /// Expectations in attribute-name order.
    entries: BTreeMap<String, Expected>,
}

impl ExpectedAttributes {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one expectation.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, expected: Expected) -> Self {
        self.entries.insert(field.into(), expected);
        self
    }

    /// Returns the expectation for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Expected> {
        self.entries.get(field)
    }

    /// Iterates expectations in attribute-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expected)> {
        self.entries.iter().map(|(field, expected)| (field.as_str(), expected))
    }

    /// Returns the number of expectations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no expectation is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Renders an observed attribute value the way failures report it.
#[must_use]
pub fn describe_actual(actual: Option<&str>) -> String {
    actual.map_or_else(|| "<absent>".to_string(), |value| format!("\"{value}\""))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
