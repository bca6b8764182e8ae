//! Configuration constants.
//!
//! Defaults used when no configuration file is supplied, plus the field
//! names a feed may list as required.

/// Parser name recorded as the incident `source`.
pub const DEFAULT_PARSER_NAME: &str = "HaveIBeenPwnd";

/// Feed every candidate report is filed under.
pub const DEFAULT_FEED: &str = "Default";

/// Incident class of the stock `Default` feed.
pub const DEFAULT_INCIDENT_CLASS: &str = "HAVE_I_BEEN_PWND_DOMAIN_FOUND";

/// Incident type of the stock `Default` feed.
pub const DEFAULT_INCIDENT_TYPE: &str = "ABUSE";

/// Address the stock feed substitutes when a report carries no IP.
pub const DEFAULT_FALLBACK_IP: &str = "127.0.0.1";

/// Sender pattern the notices arrive from.
pub const DEFAULT_SENDER_PATTERN: &str = "noreply@haveibeenpwned.com";

/// Two-label public suffixes that need one more label to form a registrable domain.
pub const DEFAULT_COMPOSITE_TLDS: &[&str] = &[
    "co.uk", "ac.uk", "co.nz", "co.za", "com.au", "com.us", "gov.us", "edu.us",
];

// Network operation timeouts
/// DNS query timeout in seconds (applies to the MX query and the A query separately)
pub const DNS_TIMEOUT_SECS: u64 = 3;

/// Field names a feed may mark as required.
///
/// Anything else in a feed's `fields` list is a configuration error.
pub const REPORT_FIELDS: &[&str] = &["feed", "domain", "ip", "timestamp"];

/// Incident types accepted by the standard schema rules.
pub const INCIDENT_TYPES: &[&str] = &["INFO", "ABUSE", "ESCALATION"];
