//! Preferred mail exchanger selection.

use std::net::Ipv4Addr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::records::{DnsLookup, MxRecord};
use crate::error_handling::{DnsError, SkipReason};

/// The selected mail exchanger of a domain and its address.
///
/// Serialized as `{"mx": ..., "weight": ..., "ip": ...}` inside the incident
/// information snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferredMx {
    pub mx: String,
    pub weight: u16,
    pub ip: String,
}

/// Why no preferred MX with an address could be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MxLookupFailure {
    /// The domain has no MX records (or does not exist)
    NoRecords,
    /// The MX query itself failed or timed out
    Dns(DnsError),
    /// An MX was selected but its host did not resolve to an IPv4 address
    NoAddress {
        mx: String,
        weight: u16,
        cause: Option<DnsError>,
    },
}

impl MxLookupFailure {
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            MxLookupFailure::NoRecords => SkipReason::NoMxRecords,
            MxLookupFailure::Dns(_) => SkipReason::DnsFailure,
            MxLookupFailure::NoAddress { .. } => SkipReason::MxAddressUnresolved,
        }
    }
}

impl std::fmt::Display for MxLookupFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MxLookupFailure::NoRecords => f.write_str("no MX records"),
            MxLookupFailure::Dns(e) => write!(f, "{e}"),
            MxLookupFailure::NoAddress { mx, weight, cause } => {
                write!(f, "MX {mx} (weight {weight}) has no IPv4 address")?;
                if let Some(cause) = cause {
                    write!(f, ": {cause}")?;
                }
                Ok(())
            }
        }
    }
}

/// Picks the record with the lowest preference.
///
/// Ties go to the record that appears first.
pub fn select_preferred(records: &[MxRecord]) -> Option<&MxRecord> {
    records.iter().min_by_key(|record| record.preference)
}

/// Resolves the preferred mail exchanger of a domain.
///
/// Each call makes exactly one MX query and, if a record is selected, one A
/// query. Both are bounded by the configured timeout. There are no retries.
#[derive(Debug, Clone)]
pub struct MxResolver<D> {
    dns: D,
    timeout: Duration,
}

impl<D: DnsLookup> MxResolver<D> {
    pub fn new(dns: D, timeout: Duration) -> Self {
        Self { dns, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the lowest-weight MX of `domain` together with its IPv4 address.
    pub async fn resolve_preferred(&self, domain: &str) -> Result<PreferredMx, MxLookupFailure> {
        let records = tokio::time::timeout(self.timeout, self.dns.lookup_mx(domain))
            .await
            .map_err(|_| MxLookupFailure::Dns(self.timed_out(domain)))?
            .map_err(MxLookupFailure::Dns)?;

        let preferred = select_preferred(&records).ok_or(MxLookupFailure::NoRecords)?;
        // Null MX (RFC 7505): the domain accepts no mail
        if preferred.exchange.is_empty() {
            log::debug!("Null MX published for {domain}");
            return Err(MxLookupFailure::NoRecords);
        }
        log::debug!(
            "Preferred MX for {domain}: {} (weight {}) out of {} record(s)",
            preferred.exchange,
            preferred.preference,
            records.len()
        );

        let address: Result<Option<Ipv4Addr>, DnsError> =
            tokio::time::timeout(self.timeout, self.dns.lookup_ipv4(&preferred.exchange))
                .await
                .unwrap_or_else(|_| Err(self.timed_out(&preferred.exchange)));

        match address {
            Ok(Some(ip)) => Ok(PreferredMx {
                mx: preferred.exchange.clone(),
                weight: preferred.preference,
                ip: ip.to_string(),
            }),
            Ok(None) => Err(MxLookupFailure::NoAddress {
                mx: preferred.exchange.clone(),
                weight: preferred.preference,
                cause: None,
            }),
            Err(e) => Err(MxLookupFailure::NoAddress {
                mx: preferred.exchange.clone(),
                weight: preferred.preference,
                cause: Some(e),
            }),
        }
    }

    fn timed_out(&self, host: &str) -> DnsError {
        DnsError::Timeout {
            host: host.to_string(),
            secs: self.timeout.as_secs(),
        }
    }
}
