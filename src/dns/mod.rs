//! DNS resolution for breach notices.
//!
//! This module provides async DNS operations using `hickory-resolver`:
//! - Mail exchanger queries (MX records), kept in response order
//! - IPv4 address resolution (A records)
//! - Preferred (lowest-weight) MX selection with a bounded timeout
//!
//! DNS failures never propagate out of a parse; they surface as
//! `MxLookupFailure` values that the report builder turns into skips.

mod mx;
mod records;
mod static_table;

// Re-export public API
pub use mx::{select_preferred, MxLookupFailure, MxResolver, PreferredMx};
pub use records::{lookup_mx_records, resolve_host_to_ipv4, DnsLookup, MxRecord};
pub use static_table::StaticDns;
