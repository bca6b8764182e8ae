//! End-to-end tests: message in, incidents out.

mod helpers;

use std::sync::Arc;

use helpers::{notice, test_dns, NOTICE_TIMESTAMP};
use pwned_notice::dns::StaticDns;
use pwned_notice::error_handling::RejectionKind;
use pwned_notice::{
    CandidateReport, Message, NoticeParser, ParseStats, ParserConfig, PwnedParser, SkipReason,
};

fn parser_with_stats(
    config: ParserConfig,
) -> (PwnedParser<StaticDns, Arc<ParseStats>>, Arc<ParseStats>) {
    let stats = Arc::new(ParseStats::new());
    let parser = PwnedParser::new(config, test_dns())
        .expect("valid configuration")
        .with_observer(Arc::clone(&stats));
    (parser, stats)
}

#[tokio::test]
async fn test_subdomain_notice_becomes_incident() {
    let (parser, _) = parser_with_stats(ParserConfig::default());
    let incidents = parser
        .parse(&notice("An email on mail.example.com has been compromised"))
        .await;

    assert_eq!(incidents.len(), 1);
    let incident = &incidents[0];
    assert_eq!(incident.source, "HaveIBeenPwnd");
    assert!(incident.source_id.is_none());
    assert_eq!(incident.domain, "example.com");
    assert_eq!(incident.ip, "192.0.2.5");
    assert_eq!(incident.class, "HAVE_I_BEEN_PWND_DOMAIN_FOUND");
    assert_eq!(incident.incident_type, "ABUSE");
    assert_eq!(incident.timestamp, Some(NOTICE_TIMESTAMP));

    let report: CandidateReport = serde_json::from_str(&incident.information).unwrap();
    assert_eq!(report.feed, "Default");
    assert_eq!(report.domain, "example.com");
    assert_eq!(report.data.mx.mx, "b.example.com");
    assert_eq!(report.data.mx.weight, 5);
    assert_eq!(report.data.mx.ip, "192.0.2.5");
    assert_eq!(report.data.body, "<html>breach details</html>");
    assert!(report.data.breach.is_empty());
}

#[tokio::test]
async fn test_raw_mime_notice_becomes_incident() {
    let raw = "From: Have I Been Pwned <noreply@haveibeenpwned.com>\r\n\
               Subject: =?utf-8?Q?An_email_on_example.com_has_been_compromised?=\r\n\
               Date: Tue, 1 Jul 2003 10:52:37 +0200\r\n\
               MIME-Version: 1.0\r\n\
               Content-Type: multipart/alternative; boundary=\"sep\"\r\n\
               \r\n\
               --sep\r\n\
               Content-Type: text/plain; charset=utf-8\r\n\
               Content-Transfer-Encoding: base64\r\n\
               \r\n\
               QnJlYWNoOiBBZG9iZQ==\r\n\
               --sep--\r\n";
    let (parser, _) = parser_with_stats(ParserConfig::default());
    let message = Message::from_raw(raw);
    assert!(parser.accepts(&message));

    let incidents = parser.parse(&message).await;
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].domain, "example.com");
    assert_eq!(incidents[0].ip, "192.0.2.5");
    assert_eq!(incidents[0].timestamp, Some(NOTICE_TIMESTAMP));

    let report: CandidateReport = serde_json::from_str(&incidents[0].information).unwrap();
    assert_eq!(report.data.body.trim_end(), "Breach: Adobe");
}

#[tokio::test]
async fn test_composite_tld_notice() {
    let (parser, _) = parser_with_stats(ParserConfig::default());
    let incidents = parser
        .parse(&notice("An email on sub.company.co.uk has been compromised"))
        .await;

    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].domain, "company.co.uk");
    assert_eq!(incidents[0].ip, "198.51.100.7");
}

#[tokio::test]
async fn test_non_notice_subject_yields_nothing() {
    let (parser, stats) = parser_with_stats(ParserConfig::default());
    for subject in [
        "Verify your email address",
        "An email on example has been compromised",
        "Fwd: An email on example.com has been compromised",
    ] {
        assert!(parser.parse(&notice(subject)).await.is_empty(), "{subject}");
    }
    assert_eq!(stats.get_skip_count(SkipReason::NoSubjectMatch), 3);
    assert_eq!(stats.reports_built(), 0);
}

#[tokio::test]
async fn test_domain_without_mx_yields_nothing() {
    let (parser, stats) = parser_with_stats(ParserConfig::default());
    let incidents = parser
        .parse(&notice("An email on nomail.example.net has been compromised"))
        .await;
    assert!(incidents.is_empty());
    assert_eq!(stats.get_skip_count(SkipReason::NoMxRecords), 1);
}

#[tokio::test]
async fn test_unresolvable_mx_host_yields_nothing() {
    let (parser, stats) = parser_with_stats(ParserConfig::default());
    let incidents = parser
        .parse(&notice("An email on unreachable.example has been compromised"))
        .await;
    assert!(incidents.is_empty());
    assert_eq!(stats.get_skip_count(SkipReason::MxAddressUnresolved), 1);
    assert_eq!(stats.reports_built(), 0);
}

#[tokio::test]
async fn test_disabled_feed_yields_nothing() {
    let mut config = ParserConfig::default();
    config.feeds.get_mut("Default").unwrap().enabled = false;
    let (parser, stats) = parser_with_stats(config);

    let incidents = parser
        .parse(&notice("An email on example.com has been compromised"))
        .await;
    assert!(incidents.is_empty());
    assert_eq!(stats.get_rejection_count(RejectionKind::DisabledFeed), 1);
}

#[tokio::test]
async fn test_unknown_feed_yields_nothing() {
    let mut config = ParserConfig::default();
    let feed = config.feeds.remove("Default").unwrap();
    config.feeds.insert("Other".into(), feed);
    let (parser, stats) = parser_with_stats(config);

    let incidents = parser
        .parse(&notice("An email on example.com has been compromised"))
        .await;
    assert!(incidents.is_empty());
    assert_eq!(stats.get_rejection_count(RejectionKind::UnknownFeed), 1);
}

#[tokio::test]
async fn test_required_timestamp_missing_rejects() {
    let mut config = ParserConfig::default();
    config
        .feeds
        .get_mut("Default")
        .unwrap()
        .fields
        .push("timestamp".into());
    let (parser, stats) = parser_with_stats(config);

    let message = Message::new("body")
        .with_header("Subject", "An email on example.com has been compromised");
    assert!(parser.parse(&message).await.is_empty());
    assert_eq!(stats.get_rejection_count(RejectionKind::MissingField), 1);
}

#[tokio::test]
async fn test_same_message_twice_gives_same_incidents() {
    let (parser, stats) = parser_with_stats(ParserConfig::default());
    let message = notice("An email on www.example.com has been compromised");

    let first = parser.parse(&message).await;
    let second = parser.parse(&message).await;
    assert_eq!(first, second);
    assert_eq!(stats.accepted(), 2);
}

#[tokio::test]
async fn test_concurrent_parses_share_one_parser() {
    let (parser, stats) = parser_with_stats(ParserConfig::default());
    let parser = Arc::new(parser);

    let mut handles = Vec::new();
    for subject in [
        "An email on example.com has been compromised",
        "An email on sub.company.co.uk has been compromised",
        "Nothing to see here",
    ] {
        let parser = Arc::clone(&parser);
        let message = notice(subject);
        handles.push(tokio::spawn(async move { parser.parse(&message).await }));
    }

    let mut total = 0;
    for handle in handles {
        total += handle.await.unwrap().len();
    }
    assert_eq!(total, 2);
    assert_eq!(stats.accepted(), 2);
    assert_eq!(stats.total_skipped(), 1);
}
