use std::io;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use tracing::info;

use crate::{
    aws::{AwsCliLogin, PersistOptions, PersistOutcome, SsoPortal},
    config::AwsPaths,
    refresh::{RefreshRequest, Refresher},
};

#[derive(Debug, Clone, Args)]
pub struct CredsCommand {
    #[arg(help = "AWS profile name (without the 'profile ' prefix)")]
    pub profile: String,

    #[arg(long, help = "Create an AWS SSO login session before fetching credentials")]
    pub login: bool,

    #[arg(long, help = "Write the updated credentials file to stdout instead")]
    pub dry_run: bool,

    #[arg(long, help = "Make a backup before writing to the credentials file")]
    pub backup: bool,
}

impl CredsCommand {
    pub async fn execute(self) -> Result<()> {
        let paths = AwsPaths::from_env()?;
        let exchange = SsoPortal;
        let login = AwsCliLogin::default();
        let refresher = Refresher::new(&paths, &exchange, &login);

        let request = RefreshRequest {
            profile: self.profile,
            login: self.login,
            options: PersistOptions {
                backup: self.backup,
                dry_run: self.dry_run,
            },
        };

        info!("Refreshing credentials for profile: {}", request.profile);

        let report = refresher
            .refresh(&request, Utc::now(), &mut io::stdout())
            .await
            .with_context(|| format!("Failed to refresh credentials for '{}'", request.profile))?;

        match report.outcome {
            PersistOutcome::Written { backup } => {
                if let Some(backup) = backup {
                    println!("Previous credentials saved to {}", backup.display());
                }
                println!(
                    "AWS credentials for [{}] were successfully updated.",
                    report.section
                );
            }
            PersistOutcome::Previewed => {
                info!("Dry run, {} left untouched", paths.credentials.display());
            }
        }

        Ok(())
    }
}
