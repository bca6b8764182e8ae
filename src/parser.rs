//! Notice parsers.
//!
//! `NoticeParser` is the capability every notification handler offers: say
//! whether a message is meant for it and turn a message into zero or more
//! incidents. `PwnedParser` handles "An email on <domain> has been ..."
//! breach notices.

use std::future::Future;
use std::time::Duration;

use crate::config::{ParserConfig, SenderFilter, DNS_TIMEOUT_SECS};
use crate::dns::{DnsLookup, MxResolver};
use crate::domain::{CompositeTlds, DomainExtractor};
use crate::error_handling::{ConfigError, Skip, SkipReason};
use crate::incident::{Incident, IncidentAssembler, IncidentRules};
use crate::message::Message;
use crate::observer::{LogObserver, ParseObserver};
use crate::report::ReportBuilder;

/// A handler for one kind of abuse notification.
pub trait NoticeParser: Send + Sync {
    /// Name recorded as the incident source.
    fn name(&self) -> &str;

    /// Whether `message` comes from a sender (or carries a body) this parser handles.
    fn accepts(&self, message: &Message) -> bool;

    /// Parses one message. Messages that do not match or do not resolve
    /// yield an empty vector; this never fails.
    fn parse(&self, message: &Message) -> impl Future<Output = Vec<Incident>> + Send;
}

/// Parser for domain breach notices.
///
/// Holds no mutable state: parsing the same message twice against unchanged
/// DNS gives the same incidents, and one parser can serve concurrent calls.
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// use pwned_notice::dns::StaticDns;
/// use pwned_notice::{Message, NoticeParser, ParserConfig, PwnedParser};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dns = StaticDns::new()
///     .with_mx("example.com", &[("mx.example.com", 10)])
///     .with_a("mx.example.com", Ipv4Addr::new(192, 0, 2, 25));
/// let parser = PwnedParser::new(ParserConfig::default(), dns)?;
///
/// let message = Message::new("...")
///     .with_header("Subject", "An email on www.example.com has been compromised")
///     .with_header("Date", "Tue, 1 Jul 2003 10:52:37 +0200");
///
/// let incidents = parser.parse(&message).await;
/// assert_eq!(incidents.len(), 1);
/// assert_eq!(incidents[0].domain, "example.com");
/// assert_eq!(incidents[0].ip, "192.0.2.25");
/// # Ok(())
/// # }
/// ```
pub struct PwnedParser<D, O = LogObserver> {
    config: ParserConfig,
    senders: SenderFilter,
    builder: ReportBuilder<D>,
    assembler: IncidentAssembler,
    observer: O,
}

impl<D: DnsLookup> PwnedParser<D, LogObserver> {
    /// Validates `config` and builds a parser that resolves through `dns`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for configuration the parser cannot act on.
    pub fn new(config: ParserConfig, dns: D) -> Result<Self, ConfigError> {
        config.validate()?;

        let senders = SenderFilter::from_settings(&config.parser)?;
        let timeout = Duration::from_secs(config.dns_timeout_secs.unwrap_or(DNS_TIMEOUT_SECS));
        let extractor = DomainExtractor::new(CompositeTlds::new(&config.composite_tlds));
        let builder = ReportBuilder::new(extractor, MxResolver::new(dns, timeout));

        Ok(Self {
            config,
            senders,
            builder,
            assembler: IncidentAssembler::default(),
            observer: LogObserver,
        })
    }
}

impl<D: DnsLookup, O: ParseObserver> PwnedParser<D, O> {
    /// Replaces the observer parse events are reported to.
    pub fn with_observer<P: ParseObserver>(self, observer: P) -> PwnedParser<D, P> {
        PwnedParser {
            config: self.config,
            senders: self.senders,
            builder: self.builder,
            assembler: self.assembler,
            observer,
        }
    }

    /// Replaces the schema rules incidents are validated against.
    pub fn with_rules(mut self, rules: Box<dyn IncidentRules>) -> Self {
        self.assembler = IncidentAssembler::new(rules);
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}

impl<D: DnsLookup, O: ParseObserver> NoticeParser for PwnedParser<D, O> {
    fn name(&self) -> &str {
        &self.config.parser.name
    }

    fn accepts(&self, message: &Message) -> bool {
        self.senders.matches(message.from(), message.body())
    }

    async fn parse(&self, message: &Message) -> Vec<Incident> {
        if !self.config.parser.enabled {
            self.observer
                .skipped(&Skip::new(SkipReason::ParserDisabled, self.name()));
            return Vec::new();
        }

        let report = match self.builder.build(message).await {
            Ok(report) => report,
            Err(skip) => {
                self.observer.skipped(&skip);
                return Vec::new();
            }
        };
        self.observer.report_built(&report);

        let mut incidents = Vec::new();
        match self.assembler.assemble(&report, &self.config) {
            Ok(incident) => {
                self.observer.accepted(&incident);
                incidents.push(incident);
            }
            Err(rejected) => {
                self.observer
                    .rejected(&report, &rejected.rejection, rejected.incident.as_ref());
            }
        }
        incidents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::StaticDns;
    use crate::error_handling::{ParseStats, RejectionKind};
    use std::net::Ipv4Addr;
    use std::sync::Arc;

    fn dns() -> StaticDns {
        StaticDns::new()
            .with_mx(
                "example.com",
                &[("a.example.com", 20), ("b.example.com", 5), ("c.example.com", 5)],
            )
            .with_a("b.example.com", Ipv4Addr::new(192, 0, 2, 5))
            .with_mx("company.co.uk", &[("mx.company.co.uk", 10)])
            .with_a("mx.company.co.uk", Ipv4Addr::new(198, 51, 100, 7))
    }

    fn notice(subject: &str) -> Message {
        Message::new("Breach details are in the HTML part.")
            .with_header("From", "Have I Been Pwned <noreply@haveibeenpwned.com>")
            .with_header("Subject", subject)
            .with_header("Date", "Tue, 1 Jul 2003 10:52:37 +0200")
    }

    fn counting_parser(
        config: ParserConfig,
    ) -> (PwnedParser<StaticDns, Arc<ParseStats>>, Arc<ParseStats>) {
        let stats = Arc::new(ParseStats::new());
        let parser = PwnedParser::new(config, dns())
            .unwrap()
            .with_observer(Arc::clone(&stats));
        (parser, stats)
    }

    #[tokio::test]
    async fn test_parse_emits_incident() {
        let (parser, stats) = counting_parser(ParserConfig::default());
        let incidents = parser
            .parse(&notice("An email on sub.company.co.uk has been compromised"))
            .await;

        assert_eq!(incidents.len(), 1);
        let incident = &incidents[0];
        assert_eq!(incident.source, "HaveIBeenPwnd");
        assert_eq!(incident.domain, "company.co.uk");
        assert_eq!(incident.ip, "198.51.100.7");
        assert_eq!(incident.class, "HAVE_I_BEEN_PWND_DOMAIN_FOUND");
        assert_eq!(stats.reports_built(), 1);
        assert_eq!((*stats).accepted(), 1);
    }

    #[tokio::test]
    async fn test_parse_picks_first_lowest_weight_mx() {
        let (parser, _) = counting_parser(ParserConfig::default());
        let incidents = parser
            .parse(&notice("An email on example.com has been compromised"))
            .await;

        let info: serde_json::Value = serde_json::from_str(&incidents[0].information).unwrap();
        assert_eq!(info["data"]["mx"]["mx"], "b.example.com");
        assert_eq!(info["data"]["mx"]["weight"], 5);
        assert_eq!(incidents[0].ip, "192.0.2.5");
    }

    #[tokio::test]
    async fn test_parse_unmatched_subject_yields_nothing() {
        let (parser, stats) = counting_parser(ParserConfig::default());
        let incidents = parser.parse(&notice("Your monthly summary")).await;
        assert!(incidents.is_empty());
        assert_eq!(stats.get_skip_count(SkipReason::NoSubjectMatch), 1);
        assert_eq!(stats.reports_built(), 0);
    }

    #[tokio::test]
    async fn test_parse_domain_without_mx_yields_nothing() {
        let (parser, stats) = counting_parser(ParserConfig::default());
        let incidents = parser
            .parse(&notice("An email on nomx.example has been compromised"))
            .await;
        assert!(incidents.is_empty());
        assert_eq!(stats.get_skip_count(SkipReason::NoMxRecords), 1);
    }

    #[tokio::test]
    async fn test_parse_disabled_parser_yields_nothing() {
        let mut config = ParserConfig::default();
        config.parser.enabled = false;
        let (parser, stats) = counting_parser(config);
        let incidents = parser
            .parse(&notice("An email on example.com has been compromised"))
            .await;
        assert!(incidents.is_empty());
        assert_eq!(stats.get_skip_count(SkipReason::ParserDisabled), 1);
    }

    #[tokio::test]
    async fn test_parse_disabled_feed_yields_nothing() {
        let mut config = ParserConfig::default();
        config.feeds.get_mut("Default").unwrap().enabled = false;
        let (parser, stats) = counting_parser(config);
        let incidents = parser
            .parse(&notice("An email on example.com has been compromised"))
            .await;
        assert!(incidents.is_empty());
        assert_eq!(stats.reports_built(), 1);
        assert_eq!(stats.get_rejection_count(RejectionKind::DisabledFeed), 1);
    }

    #[tokio::test]
    async fn test_parse_bad_date_rejected_by_schema() {
        let (parser, stats) = counting_parser(ParserConfig::default());
        let message = Message::new("")
            .with_header("Subject", "An email on example.com has been compromised")
            .with_header("Date", "sometime last week");
        assert!(parser.parse(&message).await.is_empty());
        assert_eq!(stats.get_rejection_count(RejectionKind::SchemaViolation), 1);
    }

    #[tokio::test]
    async fn test_parse_is_repeatable() {
        let (parser, _) = counting_parser(ParserConfig::default());
        let message = notice("An email on mail.example.com has been compromised");
        let first = parser.parse(&message).await;
        let second = parser.parse(&message).await;
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_accepts_sender() {
        let parser = PwnedParser::new(ParserConfig::default(), dns()).unwrap();
        assert_eq!(parser.name(), "HaveIBeenPwnd");
        assert!(parser.accepts(&notice("anything")));
        assert!(!parser.accepts(&Message::new("").with_header("From", "bob@example.com")));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = ParserConfig::default();
        config.feeds.get_mut("Default").unwrap().fields.push("asn".into());
        assert!(matches!(
            PwnedParser::new(config, dns()),
            Err(ConfigError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_new_rejects_zero_dns_timeout_override() {
        let mut config = ParserConfig::default();
        config.dns_timeout_secs = Some(0);
        assert!(matches!(
            PwnedParser::new(config, dns()),
            Err(ConfigError::InvalidDnsTimeout(0))
        ));
    }
}
