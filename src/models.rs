//! Core data models for the valuation service

use crate::error::ValuationError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

/// Months in the default annual horizon
pub const DEFAULT_HORIZON_MONTHS: usize = 12;

/// Valuation multiple applied when none is configured
pub const DEFAULT_MULTIPLE: f64 = 10.0;

//
// ================= Monthly Figures =================
//

/// One period of revenue and expenses.
///
/// `cash_flow` is always `revenue - expenses`; use [`MonthlyRecord::new`]
/// rather than building the struct by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    #[serde(rename = "month")]
    pub label: String,
    pub revenue: f64,
    pub expenses: f64,
    pub cash_flow: f64,
}

impl MonthlyRecord {
    pub fn new(label: impl Into<String>, revenue: f64, expenses: f64) -> Self {
        Self {
            label: label.into(),
            revenue,
            expenses,
            cash_flow: revenue - expenses,
        }
    }
}

//
// ================= Summary =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationSummary {
    pub company_name: String,
    pub months: Vec<MonthlyRecord>,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub total_cash_flow: f64,
    pub average_monthly_cash_flow: f64,
    pub dcf_valuation: f64,
    pub multiple: f64,
}

//
// ================= Parameters =================
//

/// Number of periods the average cash flow is taken over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon(NonZeroUsize);

impl Horizon {
    pub fn new(months: usize) -> Result<Self> {
        NonZeroUsize::new(months)
            .map(Horizon)
            .ok_or_else(|| ValuationError::Validation("Horizon must be at least one month".into()))
    }

    pub fn months(&self) -> usize {
        self.0.get()
    }
}

impl Default for Horizon {
    fn default() -> Self {
        const DEFAULT: NonZeroUsize = match NonZeroUsize::new(DEFAULT_HORIZON_MONTHS) {
            Some(months) => months,
            None => panic!("default horizon must be non-zero"),
        };
        Horizon(DEFAULT)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Months", self.0)
    }
}

/// Scalar applied to average monthly cash flow. Always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multiple(f64);

impl Multiple {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Multiple(value))
        } else {
            Err(ValuationError::Validation(format!(
                "Multiple must be a positive number, got {}",
                value
            )))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Multiple {
    fn default() -> Self {
        Multiple(DEFAULT_MULTIPLE)
    }
}

//
// ================= API Envelopes =================
//

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
