use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// `-v` count to the default log level
pub fn level_for(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// A valid `RUST_LOG` wins over `-v`
pub fn filter_for(verbose: u8, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level_for(verbose).to_string()))
}

/// Install the global subscriber. Everything goes to stderr so stdout only
/// carries command output (a dry-run preview, the profile table).
pub fn init(verbose: u8) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_thread_ids(verbose >= 3)
        .with_file(verbose >= 3)
        .with_line_number(verbose >= 3)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, rust_log.as_deref()))
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
