use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tokio::fs;
use tracing::{debug, info};

use crate::{config::ProfileSection, constants::SSO_CACHE_EXTENSION, error::RefreshError};

/// On-disk shape of an SSO token cache file. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SsoCacheRecord {
    access_token: String,
    expires_at: String,
    #[serde(default)]
    region: Option<String>,
}

/// Bearer token left behind by `aws sso login`
#[derive(Clone)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub region: Option<String>,
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("region", &self.region)
            .finish()
    }
}

impl CachedToken {
    /// Fail with `ExpiredToken` when `now` is strictly after the expiry
    pub fn check_fresh(&self, now: DateTime<Utc>) -> Result<(), RefreshError> {
        if now > self.expires_at {
            return Err(RefreshError::ExpiredToken {
                expired_at: self.expires_at,
            });
        }

        debug!("SSO token valid until {}", self.expires_at);
        Ok(())
    }
}

/// Lowercase hex SHA-1 of the start URL, the cache file stem used by the AWS CLI
pub fn cache_key(start_url: &str) -> String {
    hex::encode(Sha1::digest(start_url.as_bytes()))
}

pub fn cache_file_path(cache_dir: &Path, start_url: &str) -> PathBuf {
    cache_dir.join(format!("{}.{SSO_CACHE_EXTENSION}", cache_key(start_url)))
}

/// Load the cached token shared by every profile with this profile's start URL
pub async fn resolve_token(
    cache_dir: &Path,
    profile: &ProfileSection,
) -> Result<CachedToken, RefreshError> {
    let start_url = profile.required("sso_start_url", &profile.sso_start_url)?;
    let path = cache_file_path(cache_dir, start_url);

    info!("Checking for SSO credentials...");
    debug!("SSO cache file: {}", path.display());

    let data = match fs::read_to_string(&path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(RefreshError::CacheMiss {
                start_url: start_url.to_string(),
                path,
            });
        }
        Err(e) => {
            return Err(RefreshError::InvalidCache {
                path,
                reason: e.to_string(),
            });
        }
    };

    let token = parse_token(&data).map_err(|reason| RefreshError::InvalidCache {
        path: path.clone(),
        reason,
    })?;

    if let Some(cache_region) = token.region.as_deref() {
        if !profile.sso_region.is_empty() && cache_region != profile.sso_region {
            return Err(RefreshError::CacheRegionMismatch {
                cache_region: cache_region.to_string(),
                sso_region: profile.sso_region.clone(),
            });
        }
    }

    Ok(token)
}

fn parse_token(data: &str) -> Result<CachedToken, String> {
    let record: SsoCacheRecord = serde_json::from_str(data).map_err(|e| e.to_string())?;
    let expires_at = parse_expiry(&record.expires_at)?;

    Ok(CachedToken {
        access_token: record.access_token,
        expires_at,
        region: record.region,
    })
}

/// RFC 3339, also accepting the `2019-11-14T04:05:45UTC` form written by AWS CLI v1
fn parse_expiry(value: &str) -> Result<DateTime<Utc>, String> {
    let normalized = match value.strip_suffix("UTC") {
        Some(stem) => format!("{stem}Z"),
        None => value.to_string(),
    };

    DateTime::parse_from_rfc3339(&normalized)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid expiresAt '{value}': {e}"))
}
