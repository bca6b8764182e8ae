//! Parser and feed configuration.
//!
//! The configuration is read-only once loaded: the parser looks feeds up by
//! name and never mutates them. `ParserConfig::default()` reproduces the
//! stock configuration shipped with the parser.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::constants::{
    DEFAULT_COMPOSITE_TLDS, DEFAULT_FALLBACK_IP, DEFAULT_FEED, DEFAULT_INCIDENT_CLASS,
    DEFAULT_INCIDENT_TYPE, DEFAULT_PARSER_NAME, DEFAULT_SENDER_PATTERN, REPORT_FIELDS,
};
use crate::error_handling::ConfigError;

fn default_true() -> bool {
    true
}

fn default_composite_tlds() -> Vec<String> {
    DEFAULT_COMPOSITE_TLDS.iter().map(|s| s.to_string()).collect()
}

/// How reports filed under one feed become incidents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Incident class, e.g. `HAVE_I_BEEN_PWND_DOMAIN_FOUND`
    pub class: String,
    /// Incident type, e.g. `ABUSE`
    #[serde(rename = "type")]
    pub incident_type: String,
    /// Reports for a disabled feed are dropped without an incident
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Report fields that must be present and non-empty, in check order
    #[serde(default)]
    pub fields: Vec<String>,
    /// Address used when a required `ip` is missing from the report
    #[serde(default)]
    pub fallback_ip: Option<String>,
}

/// Identity of the parser and how messages are routed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserSettings {
    /// Recorded as the incident `source`
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Regexes matched against the `From` header
    #[serde(default)]
    pub sender_map: Vec<String>,
    /// Regexes matched against the message body
    #[serde(default)]
    pub body_map: Vec<String>,
}

/// Complete parser configuration.
///
/// # Examples
///
/// ```
/// use pwned_notice::config::ParserConfig;
///
/// let config = ParserConfig::default();
/// let feed = config.feed("Default").unwrap();
/// assert_eq!(feed.incident_type, "ABUSE");
/// assert!(config.composite_tlds.iter().any(|s| s == "co.uk"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    pub parser: ParserSettings,
    #[serde(default)]
    pub feeds: BTreeMap<String, FeedConfig>,
    #[serde(default = "default_composite_tlds")]
    pub composite_tlds: Vec<String>,
    /// Per-query DNS timeout; `None` means `DNS_TIMEOUT_SECS`
    #[serde(default)]
    pub dns_timeout_secs: Option<u64>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let mut feeds = BTreeMap::new();
        feeds.insert(
            DEFAULT_FEED.to_string(),
            FeedConfig {
                class: DEFAULT_INCIDENT_CLASS.to_string(),
                incident_type: DEFAULT_INCIDENT_TYPE.to_string(),
                enabled: true,
                fields: vec!["ip".to_string(), "domain".to_string()],
                fallback_ip: Some(DEFAULT_FALLBACK_IP.to_string()),
            },
        );

        Self {
            parser: ParserSettings {
                name: DEFAULT_PARSER_NAME.to_string(),
                enabled: true,
                sender_map: vec![format!("/{}/", DEFAULT_SENDER_PATTERN)],
                body_map: Vec::new(),
            },
            feeds,
            composite_tlds: default_composite_tlds(),
            dns_timeout_secs: None,
        }
    }
}

impl ParserConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ParserConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Looks a feed up by name.
    pub fn feed(&self, name: &str) -> Option<&FeedConfig> {
        self.feeds.get(name)
    }

    /// Rejects configuration the parser cannot act on.
    ///
    /// These are faults the surrounding system should catch before any mail
    /// is parsed, so they surface as errors instead of silent rejections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parser.name.trim().is_empty() {
            return Err(ConfigError::EmptyParserName);
        }

        for (feed_name, feed) in &self.feeds {
            for field in &feed.fields {
                if !REPORT_FIELDS.contains(&field.as_str()) {
                    return Err(ConfigError::UnknownField {
                        feed: feed_name.clone(),
                        field: field.clone(),
                    });
                }
            }
            if let Some(ip) = &feed.fallback_ip {
                if ip.parse::<IpAddr>().is_err() {
                    return Err(ConfigError::InvalidFallbackIp {
                        feed: feed_name.clone(),
                        ip: ip.clone(),
                    });
                }
            }
        }

        for suffix in &self.composite_tlds {
            if suffix.split('.').count() != 2 || suffix.split('.').any(str::is_empty) {
                return Err(ConfigError::InvalidCompositeTld(suffix.clone()));
            }
        }

        if let Some(secs @ 0) = self.dns_timeout_secs {
            return Err(ConfigError::InvalidDnsTimeout(secs));
        }

        SenderFilter::from_settings(&self.parser)?;
        Ok(())
    }
}

/// Compiled `sender_map` / `body_map` patterns.
///
/// A message belongs to this parser when any sender pattern matches its
/// `From` header or any body pattern matches its body.
#[derive(Debug, Clone)]
pub struct SenderFilter {
    senders: Vec<Regex>,
    bodies: Vec<Regex>,
}

impl SenderFilter {
    pub fn from_settings(settings: &ParserSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            senders: compile_patterns(&settings.sender_map)?,
            bodies: compile_patterns(&settings.body_map)?,
        })
    }

    pub fn matches(&self, from: Option<&str>, body: &str) -> bool {
        let sender_hit = from
            .map(|from| self.senders.iter().any(|re| re.is_match(from)))
            .unwrap_or(false);
        sender_hit || self.bodies.iter().any(|re| re.is_match(body))
    }
}

/// Compiles patterns, accepting the `/pattern/` delimiter form used by
/// existing feed configurations.
fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            let body = pattern
                .strip_prefix('/')
                .and_then(|p| p.strip_suffix('/'))
                .filter(|p| !p.is_empty())
                .unwrap_or(pattern.as_str());
            Regex::new(body).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}
