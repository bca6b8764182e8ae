// Shared test helpers for building notices and DNS tables.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::net::Ipv4Addr;

use pwned_notice::dns::StaticDns;
use pwned_notice::Message;

pub const NOTICE_DATE: &str = "Tue, 1 Jul 2003 10:52:37 +0200";
#[allow(dead_code)] // Used by pipeline tests
pub const NOTICE_TIMESTAMP: i64 = 1_057_049_557;

/// Builds a breach notice as the ingestion layer would hand it over.
pub fn notice(subject: &str) -> Message {
    Message::new("<html>breach details</html>")
        .with_header("From", "Have I Been Pwned <noreply@haveibeenpwned.com>")
        .with_header("Subject", subject)
        .with_header("Date", NOTICE_DATE)
}

/// DNS table covering the domains used across the integration tests.
#[allow(dead_code)] // Not every test file resolves every domain
pub fn test_dns() -> StaticDns {
    StaticDns::new()
        .with_mx(
            "example.com",
            &[("a.example.com.", 20), ("b.example.com.", 5), ("c.example.com.", 5)],
        )
        .with_a("a.example.com", Ipv4Addr::new(192, 0, 2, 20))
        .with_a("b.example.com", Ipv4Addr::new(192, 0, 2, 5))
        .with_a("c.example.com", Ipv4Addr::new(192, 0, 2, 6))
        .with_mx("company.co.uk", &[("mx.company.co.uk.", 10)])
        .with_a("mx.company.co.uk", Ipv4Addr::new(198, 51, 100, 7))
        .with_mx("unreachable.example", &[("mx.unreachable.example.", 10)])
}
