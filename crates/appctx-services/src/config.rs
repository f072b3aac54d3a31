//! Application configuration
//!
//! [`AppConfig`] is read from TOML and refined with `with_*` builders:
//!
//! ```toml
//! enabled_experiments = ["new-diff-view", "comment-threads"]
//!
//! [reporting]
//! max_events = 500
//! tag_experiments = true
//! ```

use crate::error::ServicesError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable with extra comma-separated experiment ids
pub const EXPERIMENTS_ENV: &str = "APPCTX_ENABLED_EXPERIMENTS";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Experiment ids the flags service reports as enabled
    pub enabled_experiments: Vec<String>,
    /// Reporting service settings
    pub reporting: ReportingConfig,
}

impl AppConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// - `ServicesError::Parse` on malformed TOML or unknown keys
    pub fn from_toml_str(text: &str) -> Result<Self, ServicesError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// - `ServicesError::Io` if the file cannot be read
    /// - `ServicesError::Parse` on malformed TOML or unknown keys
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServicesError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ServicesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// - `ServicesError::Render` if serialization fails
    pub fn to_toml_string(&self) -> Result<String, ServicesError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Add enabled experiments, skipping blanks and duplicates
    #[must_use]
    pub fn with_experiments<I, S>(mut self, experiments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for experiment in experiments {
            let experiment = experiment.as_ref().trim();
            if experiment.is_empty() {
                continue;
            }
            if !self.enabled_experiments.iter().any(|e| e == experiment) {
                self.enabled_experiments.push(experiment.to_string());
            }
        }
        self
    }

    /// Add experiments from a comma-separated list
    #[inline]
    #[must_use]
    pub fn with_experiment_list(self, list: &str) -> Self {
        self.with_experiments(list.split(','))
    }

    /// Add experiments from [`EXPERIMENTS_ENV`], if set
    #[must_use]
    pub fn with_env(self) -> Self {
        match std::env::var(EXPERIMENTS_ENV) {
            Ok(list) => self.with_experiment_list(&list),
            Err(_) => self,
        }
    }

    /// With reporting settings
    #[inline]
    #[must_use]
    pub fn with_reporting(mut self, reporting: ReportingConfig) -> Self {
        self.reporting = reporting;
        self
    }
}

/// Reporting service settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportingConfig {
    /// Recorded events kept in memory; oldest are dropped first
    pub max_events: usize,
    /// Attach the enabled experiments to every event
    pub tag_experiments: bool,
}

impl ReportingConfig {
    /// With event capacity
    #[inline]
    #[must_use]
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    /// With experiment tagging on or off
    #[inline]
    #[must_use]
    pub fn with_tag_experiments(mut self, tag: bool) -> Self {
        self.tag_experiments = tag;
        self
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            max_events: 1_000,
            tag_experiments: true,
        }
    }
}
