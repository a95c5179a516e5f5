use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SlugError {
    #[error("slug cannot be empty")]
    Empty,

    #[error("slug cannot exceed {MAX_SLUG_LEN} characters")]
    TooLong,

    #[error("slug contains invalid character '{0}'")]
    InvalidChar(char),
}

/// Maximum accepted slug length, matching the content store's column bound.
pub const MAX_SLUG_LEN: usize = 250;

/// URL-safe identifier for a content item.
///
/// Slugs are stored lowercase; parsing trims and lowercases its input so
/// lookups are insensitive to how a caller cased the path segment. After
/// normalization only `a-z`, `0-9` and `-` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Slug(String);

impl Slug {
    /// Parses and normalizes a raw slug string.
    ///
    /// # Errors
    ///
    /// Returns `SlugError` if the trimmed input is empty, too long, or
    /// contains characters outside `[a-z0-9-]` after lowercasing.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, SlugError> {
        let normalized = raw.as_ref().trim().to_lowercase();

        if normalized.is_empty() {
            return Err(SlugError::Empty);
        }
        if normalized.len() > MAX_SLUG_LEN {
            return Err(SlugError::TooLong);
        }
        if let Some(bad) = normalized
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(SlugError::InvalidChar(bad));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized slug text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_lowercases() {
        let slug = Slug::parse("  JavaScript-Basics  ").unwrap();
        assert_eq!(slug.as_str(), "javascript-basics");
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(Slug::parse("   ").unwrap_err(), SlugError::Empty);
        assert_eq!(Slug::parse("").unwrap_err(), SlugError::Empty);
    }

    #[test]
    fn parse_rejects_invalid_characters() {
        assert_eq!(
            Slug::parse("hello world").unwrap_err(),
            SlugError::InvalidChar(' ')
        );
        assert_eq!(
            Slug::parse("a_b").unwrap_err(),
            SlugError::InvalidChar('_')
        );
    }

    #[test]
    fn parse_rejects_over_length() {
        let raw = "a".repeat(MAX_SLUG_LEN + 1);
        assert_eq!(Slug::parse(raw).unwrap_err(), SlugError::TooLong);
    }

    #[test]
    fn parse_accepts_digits_and_hyphens() {
        let slug = Slug::parse("system-design-101").unwrap();
        assert_eq!(slug.to_string(), "system-design-101");
    }
}
