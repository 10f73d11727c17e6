use std::process::ExitCode;

use awsso::{cli::Cli, logging};
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("awsso: failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    // The whole context chain, e.g. "awsso: Failed to refresh credentials for 'work': ..."
    if let Err(e) = cli.execute().await {
        eprintln!("awsso: {e:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
