//! Logging setup for the command-line binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to whoever embeds it. The binary uses [`init_logging`], which honours
//! `RUST_LOG` when it is set and falls back to `--verbose` otherwise.

use anyhow::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Where log output goes, parsed from the `--log` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// `0`/`off`, `1`/`stdout`, `2`/`stderr`, anything else is a file name.
    pub fn parse(value: &str) -> Self {
        match value {
            "0" | "off" => LogTarget::Off,
            "1" | "stdout" => LogTarget::Stdout,
            "2" | "stderr" => LogTarget::Stderr,
            filename => LogTarget::File(PathBuf::from(filename)),
        }
    }
}

pub fn max_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::INFO }
}

/// Filter directives: `rust_log` if non-empty, else the `--verbose` level.
pub fn filter_directives(rust_log: Option<String>, verbose: bool) -> String {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .unwrap_or_else(|| max_level(verbose).to_string().to_lowercase())
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(filter_directives(
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        verbose,
    ))
}

/// Install the global tracing subscriber.
pub fn init_logging(target: &LogTarget, verbose: bool) -> Result<()> {
    match target {
        LogTarget::Off => {}
        LogTarget::Stdout => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter(verbose))
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::Stderr => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter(verbose))
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter(verbose))
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
    fn parse_targets() {
        assert_eq!(LogTarget::parse("0"), LogTarget::Off);
        assert_eq!(LogTarget::parse("off"), LogTarget::Off);
        assert_eq!(LogTarget::parse("1"), LogTarget::Stdout);
        assert_eq!(LogTarget::parse("stderr"), LogTarget::Stderr);
        assert_eq!(
            LogTarget::parse("todo.log"),
            LogTarget::File(PathBuf::from("todo.log"))
        );
    }

    #[test]
    fn verbose_raises_level() {
        assert_eq!(max_level(true), Level::DEBUG);
        assert_eq!(max_level(false), Level::INFO);
    }

    #[test]
    fn rust_log_wins_over_verbose() {
        assert_eq!(
            filter_directives(Some("todo_store=trace".to_string()), false),
            "todo_store=trace"
        );
        assert_eq!(filter_directives(None, true), "debug");
        assert_eq!(filter_directives(Some("  ".to_string()), false), "info");
    }
}
