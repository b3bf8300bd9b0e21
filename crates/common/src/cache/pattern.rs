//! Glob-style key patterns for bulk invalidation
//!
//! Only `*` (any run of characters, including none) is special; every other
//! character matches itself. Patterns are anchored at both ends, the way
//! Redis `SCAN MATCH` treats them.

use regex::Regex;

use crate::error::{CommonError, CommonResult};

/// Compiled key pattern
#[derive(Debug, Clone)]
pub struct KeyPattern {
    source: String,
    regex: Regex,
}

impl KeyPattern {
    /// Compile a glob pattern.
    ///
    /// # Example
    /// ```
    /// use gameap_common::cache::KeyPattern;
    ///
    /// let pattern = KeyPattern::new("roles*").unwrap();
    /// assert!(pattern.matches("roles:all"));
    /// assert!(pattern.matches("roles:users_7"));
    /// assert!(!pattern.matches("permissions:users_7"));
    /// ```
    pub fn new(pattern: &str) -> CommonResult<Self> {
        let body = pattern.split('*').map(regex::escape).collect::<Vec<_>>().join(".*");
        let regex = Regex::new(&format!("^{body}$"))
            .map_err(|e| CommonError::validation("pattern", e.to_string()))?;
        Ok(Self { source: pattern.to_string(), regex })
    }

    /// Whether the whole key matches
    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}
