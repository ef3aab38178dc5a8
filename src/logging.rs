//! Tracing setup for the CLI and the dashboard server.
//!
//! The `--log` flag picks the destination: `0`/`off`, `1`/`stdout`,
//! `2`/`stderr` (the default) or a file path, opened in append mode.
//! `RUST_LOG` directives override the `--verbose` level.

use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    pub fn parse(value: &str) -> Self {
        match value {
            "0" | "off" => LogTarget::Off,
            "1" | "stdout" => LogTarget::Stdout,
            "2" | "stderr" => LogTarget::Stderr,
            path => LogTarget::File(PathBuf::from(path)),
        }
    }
}

/// Level filter for the subscriber. `RUST_LOG` directives win when present;
/// otherwise everything at `level` and above is logged.
fn env_filter(level: Level, rust_log: Option<&str>) -> EnvFilter {
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::from_level(level).into());
    builder.parse_lossy(rust_log.map(str::trim).unwrap_or_default())
}

/// Install the global subscriber. `verbose` lowers the default level to DEBUG.
pub fn init(target: &LogTarget, verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = || env_filter(level, rust_log.as_deref());

    match target {
        LogTarget::Off => {}
        LogTarget::Stdout => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::Stderr => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_and_named_targets() {
        assert_eq!(LogTarget::parse("0"), LogTarget::Off);
        assert_eq!(LogTarget::parse("off"), LogTarget::Off);
        assert_eq!(LogTarget::parse("1"), LogTarget::Stdout);
        assert_eq!(LogTarget::parse("stderr"), LogTarget::Stderr);
        assert_eq!(
            LogTarget::parse("dashboard.log"),
            LogTarget::File(PathBuf::from("dashboard.log"))
        );
    }

    #[test]
    fn filter_defaults_to_verbosity() {
        let info = env_filter(Level::INFO, None);
        assert_eq!(info.max_level_hint(), Some(LevelFilter::INFO));
        let debug = env_filter(Level::DEBUG, Some("  "));
        assert_eq!(debug.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn rust_log_overrides_level() {
        let filter = env_filter(Level::INFO, Some("agent_dashboard=trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn off_installs_nothing() {
        assert!(init(&LogTarget::Off, true).is_ok());
    }
}
