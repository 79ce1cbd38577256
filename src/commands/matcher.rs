//! Deciding whether a command applies to a message.

use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Result of testing a [`Matcher`] against message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    NoMatch,
    /// Matched; carries the text left over after the matched part.
    Match(String),
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match(_))
    }
}

/// Custom match function: return the residual on a match.
pub type MatchFn = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// How a command recognizes the messages it handles.
#[derive(Clone)]
pub enum Matcher {
    /// Text starts with this literal; the residual is the rest.
    Prefix(String),
    /// Regex found somewhere in the text; the residual is the text after it.
    Regex(Regex),
    /// Arbitrary predicate.
    Custom(MatchFn),
}

impl Matcher {
    pub fn prefix(literal: impl Into<String>) -> Self {
        Self::Prefix(literal.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Regex)
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Test `text` against this matcher.
    pub fn matches(&self, text: &str) -> MatchResult {
        let residual = match self {
            Self::Prefix(literal) => text.strip_prefix(literal.as_str()).map(str::to_string),
            Self::Regex(re) => re.find(text).map(|m| text[m.end()..].to_string()),
            Self::Custom(f) => f(text),
        };
        residual.map_or(MatchResult::NoMatch, MatchResult::Match)
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(literal) => f.debug_tuple("Prefix").field(literal).finish(),
            Self::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_yields_rest() {
        let m = Matcher::prefix("!see ");
        assert_eq!(m.matches("!see rust"), MatchResult::Match("rust".into()));
        assert_eq!(m.matches("!seen rust"), MatchResult::NoMatch);
        assert_eq!(m.matches("see rust"), MatchResult::NoMatch);
    }

    #[test]
    fn regex_yields_text_after_match() {
        let m = Matcher::regex(r"(?i)\bhello\b").unwrap();
        assert_eq!(m.matches("well HELLO there"), MatchResult::Match(" there".into()));
        assert!(!m.matches("othello").is_match());
        assert!(Matcher::regex("(").is_err());
    }

    #[test]
    fn custom_decides() {
        let m = Matcher::custom(|text| text.strip_suffix("++").map(str::to_string));
        assert_eq!(m.matches("rust++"), MatchResult::Match("rust".into()));
        assert_eq!(m.matches("rust"), MatchResult::NoMatch);
        assert_eq!(format!("{m:?}"), "Custom(..)");
    }
}
