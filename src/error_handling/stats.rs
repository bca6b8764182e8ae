//! Parse outcome statistics.
//!
//! Thread-safe counters for every skip and rejection reason, usable as a
//! [`ParseObserver`] so a batch driver can summarize what happened to its
//! messages.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{Rejection, RejectionKind, Skip, SkipReason};
use crate::incident::Incident;
use crate::observer::ParseObserver;
use crate::report::CandidateReport;

/// Thread-safe parse statistics tracker.
///
/// All counters are initialized to zero on creation, one per
/// [`SkipReason`] and [`RejectionKind`] variant.
pub struct ParseStats {
    skipped: HashMap<SkipReason, AtomicUsize>,
    rejected: HashMap<RejectionKind, AtomicUsize>,
    reports: AtomicUsize,
    accepted: AtomicUsize,
}

impl ParseStats {
    pub fn new() -> Self {
        let mut skipped = HashMap::new();
        for reason in SkipReason::iter() {
            skipped.insert(reason, AtomicUsize::new(0));
        }

        let mut rejected = HashMap::new();
        for kind in RejectionKind::iter() {
            rejected.insert(kind, AtomicUsize::new(0));
        }

        ParseStats {
            skipped,
            rejected,
            reports: AtomicUsize::new(0),
            accepted: AtomicUsize::new(0),
        }
    }

    pub fn increment_skip(&self, reason: SkipReason) {
        if let Some(counter) = self.skipped.get(&reason) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!("No skip counter for {:?}", reason);
        }
    }

    pub fn increment_rejection(&self, kind: RejectionKind) {
        if let Some(counter) = self.rejected.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!("No rejection counter for {:?}", kind);
        }
    }

    pub fn get_skip_count(&self, reason: SkipReason) -> usize {
        self.skipped
            .get(&reason)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn get_rejection_count(&self, kind: RejectionKind) -> usize {
        self.rejected
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    pub fn total_rejected(&self) -> usize {
        self.rejected.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Candidate reports built (before feed and schema checks).
    pub fn reports_built(&self) -> usize {
        self.reports.load(Ordering::SeqCst)
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Logs a one-line summary plus one line per non-zero counter.
    pub fn log_summary(&self) {
        log::info!(
            "Parse summary: {} report(s) built, {} incident(s) accepted, {} skipped, {} rejected",
            self.reports_built(),
            self.accepted(),
            self.total_skipped(),
            self.total_rejected()
        );
        for reason in SkipReason::iter() {
            let count = self.get_skip_count(reason);
            if count > 0 {
                log::info!("   skipped ({reason}): {count}");
            }
        }
        for kind in RejectionKind::iter() {
            let count = self.get_rejection_count(kind);
            if count > 0 {
                log::info!("   rejected ({kind:?}): {count}");
            }
        }
    }
}

impl Default for ParseStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseObserver for ParseStats {
    fn skipped(&self, skip: &Skip) {
        self.increment_skip(skip.reason);
    }

    fn report_built(&self, _report: &CandidateReport) {
        self.reports.fetch_add(1, Ordering::Relaxed);
    }

    fn rejected(
        &self,
        _report: &CandidateReport,
        rejection: &Rejection,
        _incident: Option<&Incident>,
    ) {
        self.increment_rejection(rejection.kind());
    }

    fn accepted(&self, _incident: &Incident) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }
}
