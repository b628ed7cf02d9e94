//! Pattern matching machinery for extracting fields from email bodies.
//!
//! The upstream form templates changed formatting several times over the
//! system's life, so a single regex per field is not enough. This module
//! provides a [`Matcher`] trait plus [`PatternCascade`]: an ordered list of
//! [`FieldPattern`]s, tried from most-specific (anchored to the exact known
//! template layout) to most-permissive (a bare fallback), where the first
//! pattern that matches wins.
//!
//! # Example
//!
//! ```
//! use lead_intake::matcher::{FieldPattern, Matcher, PatternCascade};
//!
//! let cascade = PatternCascade::new(
//!     "phone",
//!     vec![
//!         FieldPattern::new(r"Number.*?(\d{9,})", "labelled phone").unwrap(),
//!         FieldPattern::new(r"(\d{9,})", "bare digit run fallback").unwrap(),
//!     ],
//! );
//!
//! assert_eq!(cascade.find_match("call me on 0821234567").as_deref(), Some("0821234567"));
//! ```

use regex::Regex;
use std::borrow::Cow;

/// Trait for matching and extracting content from email body text.
pub trait Matcher: Send + Sync {
    /// Attempts to find and extract matching content from the text.
    ///
    /// Returns `Some(matched_value)` if found, `None` otherwise.
    /// Uses `Cow<str>` to avoid allocations when the match can be borrowed
    /// directly from the input text.
    fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>>;

    /// Returns a human-readable description of what this matcher looks for.
    ///
    /// Used in logging and error messages.
    fn description(&self) -> &str;
}

/// A single regex pattern that extracts its first capture group.
///
/// # Example
///
/// ```
/// use lead_intake::matcher::{FieldPattern, Matcher};
///
/// let pattern = FieldPattern::new(r"Location\s*\n+\s*([^\n]+)", "location after label").unwrap();
/// assert_eq!(pattern.find_match("Location\nCape Town").as_deref(), Some("Cape Town"));
/// ```
#[derive(Debug, Clone)]
pub struct FieldPattern {
    regex: Regex,
    description: String,
}

impl FieldPattern {
    /// Creates a new field pattern.
    ///
    /// The regex must contain at least one capture group; the first capture
    /// group is extracted as the match result.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn new(pattern: &str, description: impl Into<String>) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        Ok(Self {
            regex,
            description: description.into(),
        })
    }
}

impl Matcher for FieldPattern {
    fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| Cow::Borrowed(m.as_str()))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// An ordered list of patterns for one field, tried first to last.
///
/// Order encodes priority: patterns tuned to the newest template layout come
/// first, historical and permissive fallbacks last. Evaluation runs against
/// the raw, un-normalized body so that anchoring on neighboring field labels
/// keeps working.
pub struct PatternCascade {
    field: String,
    patterns: Vec<FieldPattern>,
}

impl PatternCascade {
    /// Creates a cascade for the named field.
    #[must_use]
    pub fn new(field: impl Into<String>, patterns: Vec<FieldPattern>) -> Self {
        Self {
            field: field.into(),
            patterns,
        }
    }

    /// Compiles a cascade from `(pattern, description)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`](crate::Error::InvalidPattern) if
    /// any pattern fails to compile, naming the field it was meant for.
    pub fn try_new<'p, I>(field: impl Into<String>, patterns: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = (&'p str, &'p str)>,
    {
        let field = field.into();
        let patterns = patterns
            .into_iter()
            .map(|(pattern, description)| {
                FieldPattern::new(pattern, description).map_err(|source| {
                    crate::Error::InvalidPattern {
                        field: field.clone(),
                        source,
                    }
                })
            })
            .collect::<crate::Result<Vec<_>>>()?;
        Ok(Self { field, patterns })
    }

    /// Returns the name of the field this cascade extracts.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the patterns in priority order.
    ///
    /// Exposed so each pattern can be exercised in isolation by tests.
    #[must_use]
    pub fn patterns(&self) -> &[FieldPattern] {
        &self.patterns
    }

    /// Runs the cascade, additionally applying `accept` to each candidate.
    ///
    /// A pattern whose raw capture is rejected by `accept` falls through to
    /// the next pattern rather than ending the cascade. `accept` receives the
    /// raw capture and returns the cleaned value to keep, or `None`.
    pub fn find_match_where<F>(&self, text: &str, mut accept: F) -> Option<String>
    where
        F: FnMut(&str) -> Option<String>,
    {
        for pattern in &self.patterns {
            if let Some(raw) = pattern.find_match(text) {
                if let Some(value) = accept(&raw) {
                    tracing::debug!(
                        field = %self.field,
                        pattern = %pattern.description(),
                        "Cascade pattern matched"
                    );
                    return Some(value);
                }
            }
        }
        None
    }
}

impl Matcher for PatternCascade {
    fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>> {
        self.patterns
            .iter()
            .find_map(|pattern| pattern.find_match(text))
    }

    fn description(&self) -> &str {
        &self.field
    }
}

impl std::fmt::Debug for PatternCascade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternCascade")
            .field("field", &self.field)
            .field("patterns", &self.patterns.len())
            .finish()
    }
}
