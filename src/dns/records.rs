//! DNS record queries (MX, A).
//!
//! `DnsLookup` is the seam between the MX resolver and the network. The
//! production implementation is `hickory_resolver::TokioAsyncResolver`;
//! tests substitute an in-memory table.

use std::future::Future;
use std::net::Ipv4Addr;
use std::sync::Arc;

use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::TokioAsyncResolver;

use crate::error_handling::DnsError;

/// One mail exchanger of a domain, in DNS response order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    /// Exchange hostname, without the trailing root dot
    pub exchange: String,
    /// Preference; lower is preferred
    pub preference: u16,
}

impl MxRecord {
    pub fn new(exchange: impl Into<String>, preference: u16) -> Self {
        let exchange = exchange.into();
        let exchange = exchange.strip_suffix('.').unwrap_or(&exchange).to_string();
        Self {
            exchange,
            preference,
        }
    }
}

/// DNS queries the MX resolver needs.
///
/// A name that exists but has no records of the queried type is not an
/// error: `lookup_mx` returns an empty vector and `lookup_ipv4` returns `None`.
pub trait DnsLookup: Send + Sync {
    /// MX records of `domain`, in response order.
    fn lookup_mx(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Vec<MxRecord>, DnsError>> + Send;

    /// First IPv4 address of `host`.
    fn lookup_ipv4(
        &self,
        host: &str,
    ) -> impl Future<Output = Result<Option<Ipv4Addr>, DnsError>> + Send;
}

impl DnsLookup for TokioAsyncResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        lookup_mx_records(domain, self).await
    }

    async fn lookup_ipv4(&self, host: &str) -> Result<Option<Ipv4Addr>, DnsError> {
        resolve_host_to_ipv4(host, self).await
    }
}

impl<T: DnsLookup> DnsLookup for Arc<T> {
    fn lookup_mx(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Vec<MxRecord>, DnsError>> + Send {
        (**self).lookup_mx(domain)
    }

    fn lookup_ipv4(
        &self,
        host: &str,
    ) -> impl Future<Output = Result<Option<Ipv4Addr>, DnsError>> + Send {
        (**self).lookup_ipv4(host)
    }
}

/// Queries MX (mail exchanger) records for a domain.
///
/// # Returns
///
/// The records in the order the resolver returned them. Returns an empty
/// vector if the domain does not exist or has no MX records.
///
/// # Errors
///
/// Returns `DnsError::Resolve` for actual failures (timeouts inside the
/// resolver, network errors, SERVFAIL).
pub async fn lookup_mx_records(
    domain: &str,
    resolver: &TokioAsyncResolver,
) -> Result<Vec<MxRecord>, DnsError> {
    match resolver.mx_lookup(domain).await {
        Ok(lookup) => Ok(lookup
            .iter()
            .map(|mx| MxRecord::new(mx.exchange().to_utf8(), mx.preference()))
            .collect()),
        Err(e) if is_no_records(&e) => Ok(Vec::new()),
        Err(e) => {
            log::debug!("Failed to lookup MX records for {domain}: {e}");
            Err(DnsError::Resolve {
                host: domain.to_string(),
                message: e.to_string(),
            })
        }
    }
}

/// Resolves a hostname to its first IPv4 address.
///
/// # Errors
///
/// Returns `DnsError::Resolve` if the lookup fails for a reason other than
/// the host having no A records.
pub async fn resolve_host_to_ipv4(
    host: &str,
    resolver: &TokioAsyncResolver,
) -> Result<Option<Ipv4Addr>, DnsError> {
    match resolver.ipv4_lookup(host).await {
        Ok(lookup) => Ok(lookup.iter().next().map(|a| a.0)),
        Err(e) if is_no_records(&e) => Ok(None),
        Err(e) => {
            log::debug!("Failed to resolve {host}: {e}");
            Err(DnsError::Resolve {
                host: host.to_string(),
                message: e.to_string(),
            })
        }
    }
}

// NXDOMAIN is reported as NoRecordsFound with the response code attached
fn is_no_records(e: &ResolveError) -> bool {
    matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. })
}
