/// Decides whether a preference token matches a record's free-text field.
///
/// The ranking pipeline only talks to this trait, so the matching rule can be
/// changed without touching scoring or exclusion.
pub trait Matcher {
    fn matches(&self, field: Option<&str>, token: &str) -> bool;
}

/// Case-insensitive substring match: `"rich"` matches `"Enriched"`.
///
/// A missing field never matches, and neither does an empty token.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl Matcher for SubstringMatcher {
    fn matches(&self, field: Option<&str>, token: &str) -> bool {
        let Some(field) = field else {
            return false;
        };
        if token.is_empty() {
            return false;
        }
        field.to_lowercase().contains(&token.to_lowercase())
    }
}

/// Matches whole comma-delimited entries only: `"rich"` matches `"sweet, Rich"`
/// but not `"enriched"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedTokenMatcher;

impl Matcher for DelimitedTokenMatcher {
    fn matches(&self, field: Option<&str>, token: &str) -> bool {
        let Some(field) = field else {
            return false;
        };
        let token = token.trim();
        if token.is_empty() {
            return false;
        }
        let token = token.to_lowercase();
        field
            .split(',')
            .any(|entry| entry.trim().to_lowercase() == token)
    }
}
