use std::{collections::BTreeMap, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use ini::{Ini, Properties};
use tokio::fs;
use tracing::debug;

use crate::{constants, error::RefreshError};

/// Locations of the files the refresh pipeline reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsPaths {
    pub config: PathBuf,
    pub credentials: PathBuf,
    pub sso_cache_dir: PathBuf,
}

impl AwsPaths {
    /// Resolve paths from the environment and the user's home directory
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            config: constants::get_aws_config_path()
                .context("Failed to determine AWS config path")?,
            credentials: constants::get_aws_credentials_path()
                .context("Failed to determine AWS credentials path")?,
            sso_cache_dir: constants::get_sso_cache_dir()
                .context("Failed to determine AWS SSO cache directory")?,
        })
    }

    /// Lay out the standard `.aws` tree under `aws_dir`
    pub fn under(aws_dir: &Path) -> Self {
        Self {
            config: aws_dir.join(constants::AWS_CONFIG_FILE_NAME),
            credentials: aws_dir.join(constants::AWS_CREDENTIALS_FILE_NAME),
            sso_cache_dir: constants::SSO_CACHE_DIR
                .iter()
                .fold(aws_dir.to_path_buf(), |acc, part| acc.join(part)),
        }
    }
}

/// A named profile section of the AWS config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSection {
    /// Raw section name, e.g. `profile work`
    pub name: String,
    pub region: String,
    pub sso_account_id: String,
    pub sso_role_name: String,
    pub sso_start_url: String,
    pub sso_region: String,
}

impl ProfileSection {
    fn from_ini_section(name: &str, section: &Properties) -> Self {
        let get = |key: &str| section.get(key).unwrap_or_default().trim().to_string();

        Self {
            name: name.to_string(),
            region: get("region"),
            sso_account_id: get("sso_account_id"),
            sso_role_name: get("sso_role_name"),
            sso_start_url: get("sso_start_url"),
            sso_region: get("sso_region"),
        }
    }

    /// Bare profile name: the last whitespace separated token of the section name
    pub fn short_name(&self) -> &str {
        self.name.split_whitespace().last().unwrap_or(&self.name)
    }

    /// Return `value` or a config error naming the missing `key`
    pub fn required<'a>(&self, key: &str, value: &'a str) -> Result<&'a str, RefreshError> {
        if value.is_empty() {
            return Err(RefreshError::ProfileIncomplete {
                profile: self.short_name().to_string(),
                key: key.to_string(),
            });
        }
        Ok(value)
    }
}

/// Profiles keyed by raw section name
pub type Profiles = BTreeMap<String, ProfileSection>;

/// Load every non-empty section of the AWS config file
pub async fn load_profiles(path: &Path) -> Result<Profiles, RefreshError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|e| RefreshError::config(path, e.to_string()))?;

    let profiles = parse_profiles(&text).map_err(|reason| RefreshError::config(path, reason))?;
    debug!("Loaded {} profiles from {}", profiles.len(), path.display());

    Ok(profiles)
}

/// Parse AWS config text into profile sections, skipping sections without keys
pub fn parse_profiles(text: &str) -> Result<Profiles, String> {
    let ini = Ini::load_from_str(text).map_err(|e| e.to_string())?;

    let profiles = ini
        .iter()
        .filter_map(|(name, props)| Some((name?, props)))
        .filter(|(_, props)| !props.is_empty())
        .map(|(name, props)| {
            (
                name.to_string(),
                ProfileSection::from_ini_section(name, props),
            )
        })
        .collect();

    Ok(profiles)
}

/// Find a profile by raw section name or by short name
pub fn find_profile<'a>(
    profiles: &'a Profiles,
    name: &str,
) -> Result<&'a ProfileSection, RefreshError> {
    if let Some(section) = profiles.get(name) {
        return Ok(section);
    }

    profiles
        .values()
        .find(|section| section.short_name() == name)
        .ok_or_else(|| RefreshError::ProfileNotFound {
            profile: name.to_string(),
            available: profiles
                .values()
                .map(ProfileSection::short_name)
                .collect::<Vec<_>>()
                .join(", "),
        })
}
