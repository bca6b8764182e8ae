//! Domain extraction and normalization.
//!
//! Breach notices name the affected domain in the subject line:
//! `An email on <domain> has been ...`. This module pulls that token out and
//! reduces it to a registrable domain, dropping subdomains while keeping one
//! extra label in front of known composite suffixes such as `co.uk`.
//!
//! Key types:
//! - `CompositeTlds` - the immutable set of two-label public suffixes
//! - `DomainExtractor` - subject line to normalized domain

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::DEFAULT_COMPOSITE_TLDS;

static SUBJECT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^An email on (\S+?\.\S+?) has been").expect("subject pattern is a valid regex")
});

/// Two-label public suffixes (e.g. `co.uk`) that are not registrable on their own.
///
/// Lookups are ASCII case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeTlds(HashSet<String>);

impl CompositeTlds {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            suffixes
                .into_iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .collect(),
        )
    }

    pub fn contains(&self, suffix: &str) -> bool {
        self.0.contains(&suffix.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CompositeTlds {
    fn default() -> Self {
        Self::new(DEFAULT_COMPOSITE_TLDS)
    }
}

/// Extracts the compromised domain from a notice subject.
///
/// Pure: no DNS or other I/O happens here.
///
/// # Examples
///
/// ```
/// use pwned_notice::domain::DomainExtractor;
///
/// let extractor = DomainExtractor::default();
/// assert_eq!(
///     extractor.extract("An email on sub.company.co.uk has been compromised").as_deref(),
///     Some("company.co.uk")
/// );
/// assert_eq!(extractor.extract("Weekly newsletter"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DomainExtractor {
    composite_tlds: CompositeTlds,
}

impl DomainExtractor {
    pub fn new(composite_tlds: CompositeTlds) -> Self {
        Self { composite_tlds }
    }

    /// Returns the normalized domain named by `subject`, or `None` when the
    /// subject is not a breach notice.
    pub fn extract(&self, subject: &str) -> Option<String> {
        let captures = SUBJECT_PATTERN.captures(subject)?;
        let token = captures.get(1)?.as_str();
        Some(self.registrable_domain(token))
    }

    /// Collapses `host` to its last two labels, or three when the last two
    /// form a composite suffix.
    ///
    /// Hosts with two or fewer labels, or with an empty label anywhere, are
    /// returned unchanged.
    pub fn registrable_domain(&self, host: &str) -> String {
        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() <= 2 || labels.iter().any(|label| label.is_empty()) {
            return host.to_string();
        }

        let n = labels.len();
        let candidate = format!("{}.{}", labels[n - 2], labels[n - 1]);
        if self.composite_tlds.contains(&candidate) {
            format!("{}.{}", labels[n - 3], candidate)
        } else {
            candidate
        }
    }

    pub fn composite_tlds(&self) -> &CompositeTlds {
        &self.composite_tlds
    }
}
