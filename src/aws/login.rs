use std::{ffi::OsString, process::Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::{constants::AWS_CLI_PROGRAM, error::RefreshError};

/// Interactive login that refreshes the SSO token cache
#[async_trait]
pub trait LoginSession: Send + Sync {
    async fn login(&self, profile: &str) -> Result<(), RefreshError>;
}

/// Runs `aws sso login --profile <name>` with the caller's stdout and stderr
#[derive(Debug, Clone)]
pub struct AwsCliLogin {
    program: OsString,
}

impl AwsCliLogin {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for AwsCliLogin {
    fn default() -> Self {
        Self::new(AWS_CLI_PROGRAM)
    }
}

#[async_trait]
impl LoginSession for AwsCliLogin {
    async fn login(&self, profile: &str) -> Result<(), RefreshError> {
        info!("Starting AWS SSO login for profile: {}", profile);

        let status = Command::new(&self.program)
            .args(["sso", "login", "--profile", profile])
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| {
                RefreshError::LoginSubprocess(format!(
                    "failed to spawn {}: {e}",
                    self.program.to_string_lossy()
                ))
            })?;

        if !status.success() {
            return Err(RefreshError::LoginSubprocess(format!(
                "{} exited with {status}",
                self.program.to_string_lossy()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_program_is_aws_cli() {
        assert_eq!(AwsCliLogin::default().program, OsString::from("aws"));
    }

    #[tokio::test]
    async fn test_missing_program_is_login_error() {
        let login = AwsCliLogin::new("awsso-test-no-such-program");

        let err = login.login("work").await.unwrap_err();
        assert!(matches!(err, RefreshError::LoginSubprocess(_)));
        assert!(err.to_string().contains("failed to spawn"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_login_error() {
        // `false` ignores its arguments and exits 1
        let login = AwsCliLogin::new("false");

        let err = login.login("work").await.unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_exit_succeeds() {
        let login = AwsCliLogin::new("true");

        assert!(login.login("work").await.is_ok());
    }
}
