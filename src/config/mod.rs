//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, stock feed values, field names)
//! - Parser and feed configuration loaded from JSON
//! - CLI option types and parsing

mod constants;
mod parser;
mod types;

// Re-export all constants
pub use constants::*;
pub use parser::{FeedConfig, ParserConfig, ParserSettings, SenderFilter};
pub use types::{LogFormat, LogLevel, Opt};
