//! End-to-end credential refresh:
//! login (optional) → profile lookup → cache resolve → freshness check →
//! store load → exchange → store persist. Any stage failing ends the refresh.

use std::io::Write;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    aws::{
        CredentialExchange, CredentialsStore, LoginSession, PersistOptions, PersistOutcome, cache,
        credentials,
    },
    config::{self, AwsPaths},
    error::RefreshError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub profile: String,
    /// Run the interactive SSO login before anything else
    pub login: bool,
    pub options: PersistOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// Credentials section that received the new values
    pub section: String,
    pub outcome: PersistOutcome,
}

pub struct Refresher<'a> {
    paths: &'a AwsPaths,
    exchange: &'a dyn CredentialExchange,
    login: &'a dyn LoginSession,
}

impl<'a> Refresher<'a> {
    pub fn new(
        paths: &'a AwsPaths,
        exchange: &'a dyn CredentialExchange,
        login: &'a dyn LoginSession,
    ) -> Self {
        Self {
            paths,
            exchange,
            login,
        }
    }

    /// Refresh credentials, judging token freshness against `now`
    pub async fn refresh(
        &self,
        request: &RefreshRequest,
        now: DateTime<Utc>,
        out: &mut (dyn Write + Send),
    ) -> Result<RefreshReport, RefreshError> {
        if request.login {
            self.login.login(&request.profile).await?;
        }

        info!("Reading profile: {}", request.profile);
        let profiles = config::load_profiles(&self.paths.config).await?;
        let profile = config::find_profile(&profiles, &request.profile)?;
        debug!("Using config section [{}]", profile.name);

        let token = cache::resolve_token(&self.paths.sso_cache_dir, profile).await?;
        token.check_fresh(now)?;

        let account_id = profile.required("sso_account_id", &profile.sso_account_id)?;
        let role_name = profile.required("sso_role_name", &profile.sso_role_name)?;
        let sso_region = profile.required("sso_region", &profile.sso_region)?;

        let section = profile.short_name().to_string();
        let mut store = CredentialsStore::load(&self.paths.credentials).await?;
        store.ensure_section(&section)?;

        let creds = self
            .exchange
            .exchange(account_id, role_name, &token.access_token, sso_region)
            .await?;

        let outcome =
            credentials::merge_and_persist(&mut store, &section, &creds, request.options, out)
                .await?;

        info!("Credentials for [{}] refreshed", section);
        Ok(RefreshReport { section, outcome })
    }
}
