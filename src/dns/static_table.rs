//! In-memory DNS table.
//!
//! A test double for `DnsLookup`: answers MX and A queries from fixed data
//! and counts them, so parser behavior can be checked without a network.
//! The CLI always resolves through hickory. Names are matched
//! case-insensitively.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::records::{DnsLookup, MxRecord};
use crate::error_handling::DnsError;

#[derive(Debug, Default)]
pub struct StaticDns {
    mx: HashMap<String, Result<Vec<MxRecord>, DnsError>>,
    a: HashMap<String, Ipv4Addr>,
    delay: Option<Duration>,
    queries: AtomicUsize,
}

impl StaticDns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds MX records for `domain`, answered in the given order.
    pub fn with_mx(mut self, domain: &str, records: &[(&str, u16)]) -> Self {
        let records = records
            .iter()
            .map(|(host, preference)| MxRecord::new(*host, *preference))
            .collect();
        self.mx.insert(domain.to_ascii_lowercase(), Ok(records));
        self
    }

    /// Makes MX queries for `domain` fail with `error`.
    pub fn with_mx_error(mut self, domain: &str, error: DnsError) -> Self {
        self.mx.insert(domain.to_ascii_lowercase(), Err(error));
        self
    }

    pub fn with_a(mut self, host: &str, ip: Ipv4Addr) -> Self {
        self.a.insert(host.to_ascii_lowercase(), ip);
        self
    }

    /// Delays every answer, to exercise caller timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of queries answered so far (MX and A combined).
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl DnsLookup for StaticDns {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        self.pause().await;
        self.mx
            .get(&domain.to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn lookup_ipv4(&self, host: &str) -> Result<Option<Ipv4Addr>, DnsError> {
        self.pause().await;
        Ok(self.a.get(&host.to_ascii_lowercase()).copied())
    }
}
