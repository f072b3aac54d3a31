//! Experiment flags
//!
//! Provides [`FlagsService`], the set of experiments enabled for this process.

use std::collections::BTreeSet;

/// Enabled experiments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagsService {
    enabled: BTreeSet<String>,
}

impl FlagsService {
    /// Create from experiment ids; blanks are ignored
    #[must_use]
    pub fn new<I, S>(experiments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let enabled = experiments
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        Self { enabled }
    }

    /// Check if an experiment is enabled
    #[inline]
    #[must_use]
    pub fn is_enabled(&self, experiment: &str) -> bool {
        self.enabled.contains(experiment)
    }

    /// Enabled experiment ids, sorted
    #[must_use]
    pub fn enabled_experiments(&self) -> Vec<&str> {
        self.enabled.iter().map(String::as_str).collect()
    }

    /// Number of enabled experiments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    /// Check if no experiment is enabled
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_empty() {
        let flags = FlagsService::default();
        assert!(flags.is_empty());
        assert!(!flags.is_enabled("anything"));
    }

    #[test]
    fn flags_sorted_and_deduplicated() {
        let flags = FlagsService::new(["zeta", "alpha", "zeta", " "]);
        assert_eq!(flags.enabled_experiments(), vec!["alpha", "zeta"]);
        assert_eq!(flags.len(), 2);
    }

    #[test]
    fn flags_is_enabled() {
        let flags = FlagsService::new(vec![String::from("new-diff-view")]);
        assert!(flags.is_enabled("new-diff-view"));
        assert!(!flags.is_enabled("new-diff"));
    }
}
