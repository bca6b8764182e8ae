//! Error and outcome type definitions.
//!
//! Hard failures (`ConfigError`, `InitializationError`) are `thiserror` enums.
//! Routine outcomes of parsing a message (`SkipReason`, `Rejection`) are not
//! errors: they are reported to the parse observer and the message simply
//! yields zero incidents.

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::incident::RuleViolation;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Malformed parser configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parser name must not be empty")]
    EmptyParserName,

    #[error("Feed '{feed}' requires unknown report field '{field}'")]
    UnknownField { feed: String, field: String },

    #[error("Feed '{feed}' has an invalid fallback IP '{ip}'")]
    InvalidFallbackIp { feed: String, ip: String },

    #[error("Composite TLD '{0}' must have exactly two non-empty labels")]
    InvalidCompositeTld(String),

    #[error("DNS timeout must be at least one second, got {0}")]
    InvalidDnsTimeout(u64),

    #[error("Invalid sender/body pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// DNS failures that are not a plain "no records" answer.
///
/// Callers treat these as a routine skip; they are never surfaced from a parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    #[error("DNS lookup for {host} timed out after {secs}s")]
    Timeout { host: String, secs: u64 },

    #[error("DNS lookup for {host} failed: {message}")]
    Resolve { host: String, message: String },
}

/// Why a message produced no candidate report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum SkipReason {
    ParserDisabled,
    MissingSubject,
    NoSubjectMatch,
    NoMxRecords,
    DnsFailure,
    MxAddressUnresolved,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::ParserDisabled => "parser disabled",
            SkipReason::MissingSubject => "missing subject header",
            SkipReason::NoSubjectMatch => "subject does not name a domain",
            SkipReason::NoMxRecords => "no MX records",
            SkipReason::DnsFailure => "DNS failure",
            SkipReason::MxAddressUnresolved => "MX host has no IPv4 address",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A skipped message: the reason plus a human-readable detail for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub reason: SkipReason,
    pub detail: String,
}

impl Skip {
    pub fn new(reason: SkipReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for Skip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}: {}", self.reason, self.detail)
        }
    }
}

/// Why a candidate report did not become an incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnknownFeed(String),
    DisabledFeed(String),
    MissingField(String),
    SchemaViolation(Vec<RuleViolation>),
}

/// Stage at which a report was rejected, for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum RejectionKind {
    UnknownFeed,
    DisabledFeed,
    MissingField,
    SchemaViolation,
}

impl Rejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::UnknownFeed(_) => RejectionKind::UnknownFeed,
            Rejection::DisabledFeed(_) => RejectionKind::DisabledFeed,
            Rejection::MissingField(_) => RejectionKind::MissingField,
            Rejection::SchemaViolation(_) => RejectionKind::SchemaViolation,
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::UnknownFeed(feed) => write!(f, "unknown feed '{feed}'"),
            Rejection::DisabledFeed(feed) => write!(f, "feed '{feed}' is disabled"),
            Rejection::MissingField(field) => write!(f, "required field '{field}' is missing"),
            Rejection::SchemaViolation(violations) => {
                let fields: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
                write!(f, "schema validation failed: {}", fields.join("; "))
            }
        }
    }
}
