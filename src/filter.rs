//! Ignore-list filtering
//!
//! Excludes resources from collection by identity, before any detail
//! sub-fetch is issued for them. Patterns are case-insensitive prefixes, so
//! `"arn:aws:sns:us-east-1:123:test-"` excludes a whole naming family.

/// Predicate deciding whether a resource identity is excluded from a scan.
#[derive(Debug, Clone, Default)]
pub struct ScopeFilter {
    prefixes: Vec<String>,
}

impl ScopeFilter {
    /// Build a filter from ignore-list patterns.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: patterns
                .into_iter()
                .map(|p| p.into().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// True when `identity` matches any ignore pattern.
    pub fn is_ignored(&self, identity: &str) -> bool {
        if self.prefixes.is_empty() {
            return false;
        }
        let identity = identity.to_lowercase();
        self.prefixes.iter().any(|p| identity.starts_with(p.as_str()))
    }
}
