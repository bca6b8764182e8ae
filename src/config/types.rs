//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::DNS_TIMEOUT_SECS;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options for the `pwned-notice` binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pwned-notice",
    about = "Extract abuse incidents from breach notification emails"
)]
pub struct Opt {
    /// Message file: `Name: value` header lines, a blank line, then the body
    pub message: PathBuf,

    /// JSON parser configuration (feeds, sender patterns, composite TLDs)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,

    /// DNS timeout in seconds, overrides the configuration file
    #[arg(long)]
    pub dns_timeout: Option<u64>,

    /// Parse the message even when the sender does not match the configured patterns
    #[arg(long)]
    pub skip_sender_check: bool,
}

impl Opt {
    /// Effective DNS timeout, falling back to the given configured value.
    pub fn dns_timeout_secs(&self, configured: Option<u64>) -> u64 {
        self.dns_timeout.or(configured).unwrap_or(DNS_TIMEOUT_SECS)
    }
}
