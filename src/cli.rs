use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{CompletionsCommand, CredsCommand, ProfilesCommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "awsso", version, about = "AWS SSO helper", long_about = None, arg_required_else_help = true)]
pub struct Cli {
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Refresh short-term credentials")]
    Creds(CredsCommand),
    #[command(about = "List available SSO profiles")]
    Profiles(ProfilesCommand),
    #[command(about = "Generate shell completion scripts for awsso")]
    Completions(CompletionsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Creds(cmd) => cmd.execute().await,
            Commands::Profiles(cmd) => cmd.execute().await,
            Commands::Completions(cmd) => cmd.execute(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, error::ErrorKind};

    #[test]
    fn test_command_structure_validation() {
        let cmd = Cli::command();
        cmd.debug_assert();
    }

    #[test]
    fn test_creds_command_parsing() {
        let cli = Cli::try_parse_from(["awsso", "creds", "work"]).unwrap();
        assert!(matches!(cli.command, Commands::Creds(_)));
    }

    #[test]
    fn test_profiles_command_parsing() {
        let cli = Cli::try_parse_from(["awsso", "profiles"]).unwrap();
        assert!(matches!(cli.command, Commands::Profiles(_)));
    }

    #[test]
    fn test_profiles_takes_no_arguments() {
        assert!(Cli::try_parse_from(["awsso", "profiles", "extra"]).is_err());
    }

    #[test]
    fn test_completions_command_parsing() {
        let cli = Cli::try_parse_from(["awsso", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions(_)));
    }

    #[test]
    fn test_no_command_shows_help() {
        let result = Cli::try_parse_from(["awsso"]);
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(
                e.kind(),
                ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            );
        }
    }

    #[test]
    fn test_invalid_command_fails() {
        let result = Cli::try_parse_from(["awsso", "invalid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_flag_works() {
        let result = Cli::try_parse_from(["awsso", "--help"]);
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::DisplayHelp);
        }
    }

    #[test]
    fn test_version_flag_works() {
        let result = Cli::try_parse_from(["awsso", "--version"]);
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::DisplayVersion);
        }
    }

    #[test]
    fn test_verbose_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["awsso", "creds", "work", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_verbose_default_zero() {
        let cli = Cli::try_parse_from(["awsso", "profiles"]).unwrap();
        assert_eq!(cli.verbose, 0);
    }
}
