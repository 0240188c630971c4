//! Optional inclusion gate on rendered post text.

use regex::Regex;

use crate::error::Result;

/// Compiled filter pattern. Without a pattern every text passes.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pattern: Option<Regex>,
}

impl Filter {
    /// Compile `pattern`. An invalid pattern is a startup error.
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern.map(Regex::new).transpose()?;
        Ok(Self { pattern })
    }

    pub fn is_configured(&self) -> bool {
        self.pattern.is_some()
    }

    /// True when unconfigured, or when the pattern matches anywhere in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.as_ref().map_or(true, |re| re.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pattern_always_matches() {
        let filter = Filter::new(None).unwrap();
        assert!(!filter.is_configured());
        assert!(filter.matches(""));
        assert!(filter.matches("anything"));
    }

    #[test]
    fn test_substring_semantics() {
        let filter = Filter::new(Some("breaking")).unwrap();
        assert!(filter.matches("This is breaking news"));
        assert!(!filter.matches("Weekly roundup\nhttps://x"));
    }

    #[test]
    fn test_regex_semantics() {
        let filter = Filter::new(Some(r"(?i)^release v\d+")).unwrap();
        assert!(filter.matches("Release v2 is out"));
        assert!(!filter.matches("Pre-release v2"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(Filter::new(Some("(unclosed")).is_err());
    }
}
