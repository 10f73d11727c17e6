use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sso::{Client as SsoClient, error::DisplayErrorContext};
use tracing::{debug, info};

use super::Credentials;
use crate::error::RefreshError;

/// Exchanges an SSO bearer token for temporary role credentials
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    async fn exchange(
        &self,
        account_id: &str,
        role_name: &str,
        access_token: &str,
        region: &str,
    ) -> Result<Credentials, RefreshError>;
}

/// `GetRoleCredentials` against the AWS SSO portal
#[derive(Debug, Clone, Default)]
pub struct SsoPortal;

#[async_trait]
impl CredentialExchange for SsoPortal {
    async fn exchange(
        &self,
        account_id: &str,
        role_name: &str,
        access_token: &str,
        region: &str,
    ) -> Result<Credentials, RefreshError> {
        info!("Fetching short-term CLI session token...");
        debug!("Account: {}", account_id);
        debug!("Role: {}", role_name);
        debug!("SSO region: {}", region);

        // The bearer token authenticates the call, so no signing credentials are loaded
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .no_credentials()
            .load()
            .await;

        let client = SsoClient::new(&config);

        let response = client
            .get_role_credentials()
            .account_id(account_id)
            .role_name(role_name)
            .access_token(access_token)
            .send()
            .await
            .map_err(|e| RefreshError::Exchange(DisplayErrorContext(&e).to_string()))?;

        let role_creds = response
            .role_credentials()
            .ok_or_else(|| RefreshError::Exchange("AWS SSO returned no credentials".into()))?;

        let field = |value: Option<&str>, name: &str| {
            value
                .map(str::to_string)
                .ok_or_else(|| RefreshError::Exchange(format!("AWS SSO response has no {name}")))
        };

        let credentials = Credentials {
            access_key_id: field(role_creds.access_key_id(), "access key id")?,
            secret_access_key: field(role_creds.secret_access_key(), "secret access key")?,
            session_token: field(role_creds.session_token(), "session token")?,
            region: region.to_string(),
        };

        info!("Successfully obtained AWS credentials");
        Ok(credentials)
    }
}
