//! Candidate report assembly.
//!
//! A candidate report exists only when the subject named a domain and that
//! domain's preferred mail exchanger resolved to an address. Everything else
//! is a skip.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_FEED;
use crate::dns::{DnsLookup, MxResolver, PreferredMx};
use crate::domain::DomainExtractor;
use crate::error_handling::{Skip, SkipReason};
use crate::message::Message;

/// Raw material attached to a report for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportData {
    /// Message body as received
    pub body: String,
    pub mx: PreferredMx,
    /// Breach details; not extracted yet, always empty
    pub breach: Vec<String>,
}

/// A breach notice reduced to the fields an incident needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateReport {
    pub feed: String,
    pub domain: String,
    pub ip: String,
    /// Unix seconds from the `Date` header; `None` when it could not be parsed
    pub timestamp: Option<i64>,
    pub data: ReportData,
}

impl CandidateReport {
    /// Value of a named report field, `None` when absent or empty.
    ///
    /// Knows the names in `config::REPORT_FIELDS`; anything else is `None`.
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "feed" => self.feed.clone(),
            "domain" => self.domain.clone(),
            "ip" => self.ip.clone(),
            "timestamp" => self.timestamp?.to_string(),
            _ => return None,
        };
        (!value.trim().is_empty()).then_some(value)
    }

    /// JSON snapshot stored as the incident's `information`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Builds candidate reports from messages.
pub struct ReportBuilder<D> {
    extractor: DomainExtractor,
    resolver: MxResolver<D>,
}

impl<D: DnsLookup> ReportBuilder<D> {
    pub fn new(extractor: DomainExtractor, resolver: MxResolver<D>) -> Self {
        Self {
            extractor,
            resolver,
        }
    }

    /// Extracts the domain, resolves its preferred MX and assembles the report.
    ///
    /// Returns the skip reason when the subject does not name a domain or the
    /// MX lookup does not produce a host with an IPv4 address.
    pub async fn build(&self, message: &Message) -> Result<CandidateReport, Skip> {
        let subject = message
            .subject()
            .ok_or_else(|| Skip::new(SkipReason::MissingSubject, ""))?;

        let domain = self
            .extractor
            .extract(subject)
            .ok_or_else(|| Skip::new(SkipReason::NoSubjectMatch, subject))?;

        let mx = self
            .resolver
            .resolve_preferred(&domain)
            .await
            .map_err(|failure| Skip::new(failure.skip_reason(), format!("{domain}: {failure}")))?;

        let timestamp = message.timestamp();
        if timestamp.is_none() {
            log::debug!(
                "Unparseable date header {:?} in notice for {domain}",
                message.date()
            );
        }

        Ok(CandidateReport {
            feed: DEFAULT_FEED.to_string(),
            domain,
            ip: mx.ip.clone(),
            timestamp,
            data: ReportData {
                body: message.body().to_string(),
                mx,
                breach: Vec::new(),
            },
        })
    }
}
