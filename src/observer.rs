//! Parse event reporting.
//!
//! The parser never logs directly; it reports what happened to a
//! `ParseObserver`. `LogObserver` writes the events to the `log` facade and
//! `ParseStats` counts them. A pair of observers forwards to both.

use crate::error_handling::{Rejection, Skip};
use crate::incident::Incident;
use crate::report::CandidateReport;

/// Receives parse events. Every method defaults to doing nothing.
pub trait ParseObserver: Send + Sync {
    /// The message produced no candidate report.
    fn skipped(&self, _skip: &Skip) {}

    /// A candidate report was built.
    fn report_built(&self, _report: &CandidateReport) {}

    /// A report did not become an incident. `incident` is set for schema
    /// rejections.
    fn rejected(
        &self,
        _report: &CandidateReport,
        _rejection: &Rejection,
        _incident: Option<&Incident>,
    ) {}

    /// An incident passed validation.
    fn accepted(&self, _incident: &Incident) {}
}

/// Writes parse events to the `log` facade.
///
/// Routine skips and rejections go to debug; schema rejections include the
/// serialized incident.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl ParseObserver for LogObserver {
    fn skipped(&self, skip: &Skip) {
        log::debug!("Skipping message: {skip}");
    }

    fn report_built(&self, report: &CandidateReport) {
        log::debug!(
            "Built report for {} (mx {} weight {}, ip {})",
            report.domain,
            report.data.mx.mx,
            report.data.mx.weight,
            report.ip
        );
    }

    fn rejected(
        &self,
        report: &CandidateReport,
        rejection: &Rejection,
        incident: Option<&Incident>,
    ) {
        match incident {
            Some(incident) => {
                let payload = serde_json::to_string(incident)
                    .unwrap_or_else(|_| format!("{incident:?}"));
                log::debug!(
                    "Rejected incident for {}: {rejection}; payload {payload}",
                    report.domain
                );
            }
            None => log::debug!("Rejected report for {}: {rejection}", report.domain),
        }
    }

    fn accepted(&self, incident: &Incident) {
        log::info!(
            "Accepted {} incident for {} ({})",
            incident.class,
            incident.domain,
            incident.ip
        );
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ParseObserver for NoopObserver {}

impl<A: ParseObserver, B: ParseObserver> ParseObserver for (A, B) {
    fn skipped(&self, skip: &Skip) {
        self.0.skipped(skip);
        self.1.skipped(skip);
    }

    fn report_built(&self, report: &CandidateReport) {
        self.0.report_built(report);
        self.1.report_built(report);
    }

    fn rejected(
        &self,
        report: &CandidateReport,
        rejection: &Rejection,
        incident: Option<&Incident>,
    ) {
        self.0.rejected(report, rejection, incident);
        self.1.rejected(report, rejection, incident);
    }

    fn accepted(&self, incident: &Incident) {
        self.0.accepted(incident);
        self.1.accepted(incident);
    }
}

impl<T: ParseObserver + ?Sized> ParseObserver for std::sync::Arc<T> {
    fn skipped(&self, skip: &Skip) {
        (**self).skipped(skip);
    }

    fn report_built(&self, report: &CandidateReport) {
        (**self).report_built(report);
    }

    fn rejected(
        &self,
        report: &CandidateReport,
        rejection: &Rejection,
        incident: Option<&Incident>,
    ) {
        (**self).rejected(report, rejection, incident);
    }

    fn accepted(&self, incident: &Incident) {
        (**self).accepted(incident);
    }
}
