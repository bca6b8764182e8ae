//! Error handling and parse statistics.
//!
//! This module provides:
//! - Hard error types (configuration, initialization, DNS)
//! - Routine outcome types (skip reasons, rejections)
//! - Parse statistics tracking
//!
//! Only configuration and initialization errors ever reach a caller. Every
//! "this message does not match / does not resolve" case is a skip or a
//! rejection and yields zero incidents.

mod stats;
mod types;

// Re-export public API
pub use stats::ParseStats;
pub use types::{
    ConfigError, DnsError, InitializationError, Rejection, RejectionKind, Skip, SkipReason,
};
