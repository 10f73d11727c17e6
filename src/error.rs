use std::{io, path::PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure of a credential refresh. Every variant is fatal to the invocation.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Invalid configuration in {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("Profile '{profile}' not found in AWS config. Available profiles: {available}")]
    ProfileNotFound { profile: String, available: String },

    #[error("Profile '{profile}' has no {key} in AWS config")]
    ProfileIncomplete { profile: String, key: String },

    #[error("No cached SSO token for {start_url} (expected {})", path.display())]
    CacheMiss { start_url: String, path: PathBuf },

    #[error("Failed to read SSO cache file {}: {reason}", path.display())]
    InvalidCache { path: PathBuf, reason: String },

    #[error(
        "SSO region in cache ({cache_region}) does not match sso_region defined in profile ({sso_region})"
    )]
    CacheRegionMismatch {
        cache_region: String,
        sso_region: String,
    },

    #[error("SSO credentials expired at {expired_at}, please re-run using '--login'")]
    ExpiredToken { expired_at: DateTime<Utc> },

    #[error("Failed to get role credentials from AWS SSO: {0}")]
    Exchange(String),

    #[error("Failed to write {}: {source}", path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Section [{section}] not found in {}", path.display())]
    SectionNotFound { section: String, path: PathBuf },

    #[error("AWS SSO login failed: {0}")]
    LoginSubprocess(String),
}

impl RefreshError {
    pub(crate) fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn store_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::StoreWrite {
            path: path.into(),
            source,
        }
    }
}
