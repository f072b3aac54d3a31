//! Error types for appctx services
//!
//! Provides [`ServicesError`] for configuration loading and context startup.

use appctx_registry::RegistryError;
use std::path::PathBuf;

/// Services error type
#[derive(Debug, thiserror::Error)]
pub enum ServicesError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`AppConfig`](crate::AppConfig)
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be rendered
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    /// Registry rejected an operation
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl ServicesError {
    /// Check if the error comes from user-supplied configuration
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Parse(_))
    }
}
