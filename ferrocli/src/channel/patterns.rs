//! Pattern type used for prompt and error detection.

use std::fmt;

use regex::bytes::Regex;

/// A compiled pattern the stream engine can wait for.
///
/// Config values are regular expressions; [`Pattern::literal`] escapes
/// plain text for callers that want to match a prompt verbatim.
#[derive(Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile a regular expression.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Match `text` literally.
    pub fn literal(text: &str) -> Self {
        Self {
            regex: Regex::new(&regex::escape(text))
                .unwrap_or_else(|_| unreachable!("escaped literal is a valid regex")),
        }
    }

    /// Get a reference to the underlying regex.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// The source text of the pattern.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Find the first match at or after `start`, returning its byte range.
    ///
    /// Anchors and word boundaries see the whole haystack, not just the
    /// searched region.
    pub fn find_at(&self, haystack: &[u8], start: usize) -> Option<(usize, usize)> {
        self.regex
            .find_at(haystack, start)
            .map(|m| (m.start(), m.end()))
    }

    /// Check if the data matches the pattern anywhere.
    pub fn is_match(&self, data: &[u8]) -> bool {
        self.regex.is_match(data)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self { regex }
    }
}

/// Source strings of a pattern set, for error reporting.
pub(crate) fn describe(patterns: &[Pattern]) -> Vec<String> {
    patterns.iter().map(|p| p.as_str().to_string()).collect()
}
