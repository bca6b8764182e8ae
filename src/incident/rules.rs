//! Incident schema rules.
//!
//! The persistence layer owns the real schema; `IncidentRules` is the seam
//! it plugs into. `StandardRules` mirrors the field rules incidents are
//! normally created under.

use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;

use super::Incident;
use crate::config::INCIDENT_TYPES;

static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$")
        .expect("hostname pattern is a valid regex")
});

static CLASS_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").expect("class pattern is a valid regex"));

/// One failed field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    pub field: &'static str,
    pub message: String,
}

impl RuleViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Field-level validation applied to an incident before it is accepted.
pub trait IncidentRules: Send + Sync {
    /// Returns every violated rule, or `Ok(())` when the incident is valid.
    fn validate(&self, incident: &Incident) -> Result<(), Vec<RuleViolation>>;
}

/// Default incident rules.
///
/// | field | rule |
/// |---|---|
/// | source | required |
/// | source_id | optional, non-empty when present |
/// | ip | required, IPv4 or IPv6 |
/// | domain | optional, a hostname with at least two labels when present |
/// | class | required, upper-case identifier |
/// | type | one of `INFO`, `ABUSE`, `ESCALATION` |
/// | timestamp | required, positive |
/// | information | required, JSON |
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl IncidentRules for StandardRules {
    fn validate(&self, incident: &Incident) -> Result<(), Vec<RuleViolation>> {
        let mut violations = Vec::new();

        if incident.source.trim().is_empty() {
            violations.push(RuleViolation::new("source", "is required"));
        }

        if let Some(source_id) = &incident.source_id {
            if source_id.trim().is_empty() {
                violations.push(RuleViolation::new("source_id", "must not be empty when set"));
            }
        }

        if incident.ip.is_empty() {
            violations.push(RuleViolation::new("ip", "is required"));
        } else if incident.ip.parse::<IpAddr>().is_err() {
            violations.push(RuleViolation::new(
                "ip",
                format!("'{}' is not an IP address", incident.ip),
            ));
        }

        if !incident.domain.is_empty() && !HOSTNAME.is_match(&incident.domain) {
            violations.push(RuleViolation::new(
                "domain",
                format!("'{}' is not a valid domain", incident.domain),
            ));
        }

        if !CLASS_NAME.is_match(&incident.class) {
            violations.push(RuleViolation::new(
                "class",
                format!("'{}' is not a valid incident class", incident.class),
            ));
        }

        if !INCIDENT_TYPES.contains(&incident.incident_type.as_str()) {
            violations.push(RuleViolation::new(
                "type",
                format!("'{}' is not a valid incident type", incident.incident_type),
            ));
        }

        match incident.timestamp {
            Some(ts) if ts > 0 => {}
            Some(ts) => violations.push(RuleViolation::new(
                "timestamp",
                format!("{ts} is not a valid timestamp"),
            )),
            None => violations.push(RuleViolation::new("timestamp", "is required")),
        }

        if incident.information.is_empty() {
            violations.push(RuleViolation::new("information", "is required"));
        } else if serde_json::from_str::<serde_json::Value>(&incident.information).is_err() {
            violations.push(RuleViolation::new("information", "is not valid JSON"));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}
