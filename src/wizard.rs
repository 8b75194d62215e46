//! Wizard workflow state machine
//!
//! UPLOAD --data_ready--> REVIEW --report_requested--> REPORT
//!   ^-------------------- reset ------------------------'
//!
//! Export from REPORT is single-flight: a second export cannot start
//! until the first one has finished, successfully or not.

use crate::error::ValuationError;
use crate::models::ValuationSummary;
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum WizardStep {
    Upload,
    Review { summary: Arc<ValuationSummary> },
    Report { summary: Arc<ValuationSummary> },
}

impl WizardStep {
    pub fn name(&self) -> &'static str {
        match self {
            WizardStep::Upload => "upload",
            WizardStep::Review { .. } => "review",
            WizardStep::Report { .. } => "report",
        }
    }

    pub fn summary(&self) -> Option<&ValuationSummary> {
        match self {
            WizardStep::Upload => None,
            WizardStep::Review { summary } | WizardStep::Report { summary } => Some(summary),
        }
    }
}

#[derive(Debug, Clone)]
pub enum WizardEvent {
    DataReady(ValuationSummary),
    ReportRequested,
    Reset,
}

impl WizardEvent {
    fn name(&self) -> &'static str {
        match self {
            WizardEvent::DataReady(_) => "data_ready",
            WizardEvent::ReportRequested => "report_requested",
            WizardEvent::Reset => "reset",
        }
    }
}

/// Pure transition function. Invalid pairs are rejected, never ignored.
pub fn transition(step: &WizardStep, event: WizardEvent) -> Result<WizardStep> {
    match (step, event) {
        (_, WizardEvent::Reset) => Ok(WizardStep::Upload),
        (WizardStep::Upload, WizardEvent::DataReady(summary)) => Ok(WizardStep::Review {
            summary: Arc::new(summary),
        }),
        (WizardStep::Review { summary }, WizardEvent::ReportRequested) => Ok(WizardStep::Report {
            summary: Arc::clone(summary),
        }),
        (step, event) => Err(ValuationError::InvalidTransition {
            state: step.name(),
            event: event.name(),
        }),
    }
}

/// Proof that an export was started; hand it back to `finish_export`.
#[derive(Debug)]
#[must_use]
pub struct ExportTicket {
    summary: Arc<ValuationSummary>,
    generation: u64,
}

impl ExportTicket {
    pub fn summary(&self) -> &ValuationSummary {
        &self.summary
    }
}

/// One user's pass through the wizard
#[derive(Debug)]
pub struct WizardSession {
    step: WizardStep,
    export_in_flight: bool,
    /// Bumped by every export start; only the newest ticket clears the flag
    export_generation: u64,
}

impl WizardSession {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Upload,
            export_in_flight: false,
            export_generation: 0,
        }
    }

    pub fn step(&self) -> &WizardStep {
        &self.step
    }

    pub fn is_exporting(&self) -> bool {
        self.export_in_flight
    }

    pub fn apply(&mut self, event: WizardEvent) -> Result<&WizardStep> {
        let next = transition(&self.step, event)?;
        info!(from = self.step.name(), to = next.name(), "Wizard transition");
        if matches!(next, WizardStep::Upload) {
            self.export_in_flight = false;
        }
        self.step = next;
        Ok(&self.step)
    }

    pub fn begin_export(&mut self) -> Result<ExportTicket> {
        let WizardStep::Report { summary } = &self.step else {
            return Err(ValuationError::InvalidTransition {
                state: self.step.name(),
                event: "export",
            });
        };
        if self.export_in_flight {
            return Err(ValuationError::ExportInFlight);
        }
        self.export_in_flight = true;
        self.export_generation += 1;
        Ok(ExportTicket {
            summary: Arc::clone(summary),
            generation: self.export_generation,
        })
    }

    /// Clears the in-flight flag. Failures are logged, not retried.
    ///
    /// A ticket issued before a reset is stale: its outcome is still
    /// returned but it leaves the current export untouched.
    pub fn finish_export<T>(&mut self, ticket: ExportTicket, outcome: Result<T>) -> Result<T> {
        if ticket.generation == self.export_generation {
            self.export_in_flight = false;
        } else {
            debug!(
                ticket = ticket.generation,
                current = self.export_generation,
                "Ignoring stale export ticket"
            );
        }
        if let Err(e) = &outcome {
            warn!(
                company = %ticket.summary.company_name,
                error = %e,
                "Report export failed"
            );
        }
        outcome
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}
