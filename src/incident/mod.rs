//! Incident assembly.
//!
//! Turns a candidate report into an incident using the feed configuration.
//! Each report moves strictly forward through
//! feed check -> required fields -> schema rules -> accepted, stopping at
//! the first rejection.

mod rules;

use serde::{Deserialize, Serialize};

use crate::config::ParserConfig;
use crate::error_handling::Rejection;
use crate::report::CandidateReport;

pub use rules::{IncidentRules, RuleViolation, StandardRules};

/// Normalized abuse event handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// Parser name
    pub source: String,
    /// Always `None` for breach notices
    pub source_id: Option<String>,
    pub ip: String,
    pub domain: String,
    pub class: String,
    #[serde(rename = "type")]
    pub incident_type: String,
    pub timestamp: Option<i64>,
    /// JSON snapshot of the candidate report
    pub information: String,
}

/// A report that did not become an incident.
///
/// `incident` is set when the report got as far as schema validation, so
/// the rejected payload can be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub rejection: Rejection,
    pub incident: Option<Incident>,
}

impl From<Rejection> for Rejected {
    fn from(rejection: Rejection) -> Self {
        Self {
            rejection,
            incident: None,
        }
    }
}

/// Maps candidate reports to validated incidents.
pub struct IncidentAssembler {
    rules: Box<dyn IncidentRules>,
}

impl Default for IncidentAssembler {
    fn default() -> Self {
        Self::new(Box::new(StandardRules))
    }
}

impl IncidentAssembler {
    pub fn new(rules: Box<dyn IncidentRules>) -> Self {
        Self { rules }
    }

    pub fn assemble(
        &self,
        report: &CandidateReport,
        config: &ParserConfig,
    ) -> Result<Incident, Rejected> {
        let feed = config
            .feed(&report.feed)
            .ok_or_else(|| Rejection::UnknownFeed(report.feed.clone()))?;
        if !feed.enabled {
            return Err(Rejection::DisabledFeed(report.feed.clone()).into());
        }

        let mut ip = report.ip.clone();
        for field in &feed.fields {
            if report.field(field).is_some() {
                continue;
            }
            match (field.as_str(), &feed.fallback_ip) {
                ("ip", Some(fallback)) => {
                    log::debug!(
                        "Report for {} has no IP, using fallback {fallback}",
                        report.domain
                    );
                    ip = fallback.clone();
                }
                _ => return Err(Rejection::MissingField(field.clone()).into()),
            }
        }

        let information = report.to_json().unwrap_or_else(|e| {
            log::error!("Failed to serialize report for {}: {e}", report.domain);
            String::new()
        });

        let incident = Incident {
            source: config.parser.name.clone(),
            source_id: None,
            ip,
            domain: report.domain.clone(),
            class: feed.class.clone(),
            incident_type: feed.incident_type.clone(),
            timestamp: report.timestamp,
            information,
        };

        match self.rules.validate(&incident) {
            Ok(()) => Ok(incident),
            Err(violations) => Err(Rejected {
                rejection: Rejection::SchemaViolation(violations),
                incident: Some(incident),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::PreferredMx;
    use crate::report::ReportData;

    fn report() -> CandidateReport {
        CandidateReport {
            feed: "Default".into(),
            domain: "example.com".into(),
            ip: "192.0.2.10".into(),
            timestamp: Some(1_057_049_557),
            data: ReportData {
                body: "body".into(),
                mx: PreferredMx {
                    mx: "mx1.example.com".into(),
                    weight: 10,
                    ip: "192.0.2.10".into(),
                },
                breach: Vec::new(),
            },
        }
    }

    #[test]
    fn test_assemble_accepts_valid_report() {
        let incident = IncidentAssembler::default()
            .assemble(&report(), &ParserConfig::default())
            .unwrap();

        assert_eq!(incident.source, "HaveIBeenPwnd");
        assert_eq!(incident.source_id, None);
        assert_eq!(incident.ip, "192.0.2.10");
        assert_eq!(incident.domain, "example.com");
        assert_eq!(incident.class, "HAVE_I_BEEN_PWND_DOMAIN_FOUND");
        assert_eq!(incident.incident_type, "ABUSE");
        assert_eq!(incident.timestamp, Some(1_057_049_557));

        let snapshot: CandidateReport = serde_json::from_str(&incident.information).unwrap();
        assert_eq!(snapshot, report());
    }

    #[test]
    fn test_assemble_rejects_unknown_feed() {
        let mut report = report();
        report.feed = "Other".into();
        let rejected = IncidentAssembler::default()
            .assemble(&report, &ParserConfig::default())
            .unwrap_err();
        assert_eq!(rejected.rejection, Rejection::UnknownFeed("Other".into()));
        assert!(rejected.incident.is_none());
    }

    #[test]
    fn test_assemble_rejects_disabled_feed() {
        let mut config = ParserConfig::default();
        config.feeds.get_mut("Default").unwrap().enabled = false;
        let rejected = IncidentAssembler::default()
            .assemble(&report(), &config)
            .unwrap_err();
        assert_eq!(rejected.rejection, Rejection::DisabledFeed("Default".into()));
    }

    #[test]
    fn test_assemble_rejects_missing_required_field() {
        let mut report = report();
        report.domain = String::new();
        let rejected = IncidentAssembler::default()
            .assemble(&report, &ParserConfig::default())
            .unwrap_err();
        assert_eq!(rejected.rejection, Rejection::MissingField("domain".into()));
    }

    #[test]
    fn test_assemble_uses_fallback_ip() {
        let mut report = report();
        report.ip = String::new();
        let incident = IncidentAssembler::default()
            .assemble(&report, &ParserConfig::default())
            .unwrap();
        assert_eq!(incident.ip, "127.0.0.1");
    }

    #[test]
    fn test_assemble_rejects_missing_ip_without_fallback() {
        let mut config = ParserConfig::default();
        config.feeds.get_mut("Default").unwrap().fallback_ip = None;
        let mut report = report();
        report.ip = "  ".into();
        let rejected = IncidentAssembler::default()
            .assemble(&report, &config)
            .unwrap_err();
        assert_eq!(rejected.rejection, Rejection::MissingField("ip".into()));
    }

    #[test]
    fn test_assemble_required_timestamp() {
        let mut config = ParserConfig::default();
        config
            .feeds
            .get_mut("Default")
            .unwrap()
            .fields
            .push("timestamp".into());
        let mut report = report();
        report.timestamp = None;
        let rejected = IncidentAssembler::default()
            .assemble(&report, &config)
            .unwrap_err();
        assert_eq!(rejected.rejection, Rejection::MissingField("timestamp".into()));
    }

    #[test]
    fn test_assemble_schema_violation_keeps_payload() {
        // Timestamp is not a required feed field, but the schema needs it
        let mut report = report();
        report.timestamp = None;
        let rejected = IncidentAssembler::default()
            .assemble(&report, &ParserConfig::default())
            .unwrap_err();

        match &rejected.rejection {
            Rejection::SchemaViolation(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "timestamp");
            }
            other => panic!("expected schema violation, got {other:?}"),
        }
        assert_eq!(rejected.incident.unwrap().domain, "example.com");
    }

    #[test]
    fn test_assemble_with_custom_rules() {
        struct RejectAll;
        impl IncidentRules for RejectAll {
            fn validate(&self, _incident: &Incident) -> Result<(), Vec<RuleViolation>> {
                Err(vec![RuleViolation {
                    field: "source",
                    message: "blocked".into(),
                }])
            }
        }

        let rejected = IncidentAssembler::new(Box::new(RejectAll))
            .assemble(&report(), &ParserConfig::default())
            .unwrap_err();
        assert_eq!(rejected.rejection.kind(), crate::error_handling::RejectionKind::SchemaViolation);
    }
}
