//! pwned_notice library: breach notice to abuse incident
//!
//! Breach notification emails name a compromised domain in their subject
//! (`An email on <domain> has been compromised`). This library extracts that
//! domain, reduces it to its registrable form, resolves the domain's
//! preferred mail exchanger and its IPv4 address, and emits a normalized
//! abuse incident validated against the feed configuration.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use pwned_notice::initialization::init_resolver;
//! use pwned_notice::{Message, NoticeParser, ParserConfig, PwnedParser};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = init_resolver(Duration::from_secs(3));
//! let parser = PwnedParser::new(ParserConfig::default(), resolver)?;
//!
//! let raw = std::fs::read_to_string("notice.eml")?;
//! let message = Message::from_raw(&raw);
//! if parser.accepts(&message) {
//!     for incident in parser.parse(&message).await {
//!         println!("{} {} {}", incident.class, incident.domain, incident.ip);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! DNS lookups are async and need a Tokio runtime.

pub mod config;
pub mod dns;
pub mod domain;
pub mod error_handling;
pub mod incident;
pub mod initialization;
pub mod message;
pub mod observer;
pub mod parser;
pub mod report;

// Re-export public API
pub use config::{FeedConfig, LogFormat, LogLevel, ParserConfig};
pub use dns::{MxResolver, PreferredMx};
pub use domain::{CompositeTlds, DomainExtractor};
pub use error_handling::{ConfigError, ParseStats, Rejection, SkipReason};
pub use incident::{Incident, IncidentAssembler, IncidentRules, StandardRules};
pub use message::Message;
pub use observer::{LogObserver, NoopObserver, ParseObserver};
pub use parser::{NoticeParser, PwnedParser};
pub use report::{CandidateReport, ReportBuilder};
