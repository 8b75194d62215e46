//! Aggregation and valuation engine
//!
//! Pure arithmetic over monthly records. No I/O, no errors.
//! Everything downstream (API, report, CLI) consumes the summary built here.

use crate::models::{Horizon, MonthlyRecord, Multiple, ValuationSummary};
use tracing::debug;

/// Build the valuation summary for one reporting period.
///
/// Revenue and expenses are summed independently and cash flow is derived
/// from the two totals. The average divides by `horizon`, never by
/// `months.len()`; callers that care about the difference should check
/// [`horizon_mismatch`] first.
pub fn compute_valuation(
    company_name: impl Into<String>,
    months: &[MonthlyRecord],
    multiple: Multiple,
    horizon: Horizon,
) -> ValuationSummary {
    let total_revenue: f64 = months.iter().map(|m| m.revenue).sum();
    let total_expenses: f64 = months.iter().map(|m| m.expenses).sum();
    let total_cash_flow = total_revenue - total_expenses;
    let average_monthly_cash_flow = total_cash_flow / horizon.months() as f64;
    let dcf_valuation = round_half_up(average_monthly_cash_flow * multiple.value());

    debug!(
        periods = months.len(),
        horizon = horizon.months(),
        total_cash_flow,
        dcf_valuation,
        "Valuation computed"
    );

    ValuationSummary {
        company_name: company_name.into(),
        months: months.to_vec(),
        total_revenue,
        total_expenses,
        total_cash_flow,
        average_monthly_cash_flow,
        dcf_valuation,
        multiple: multiple.value(),
    }
}

/// Row count disagreeing with the configured horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizonMismatch {
    pub expected: usize,
    pub found: usize,
}

pub fn horizon_mismatch(months: &[MonthlyRecord], horizon: Horizon) -> Option<HorizonMismatch> {
    (months.len() != horizon.months()).then(|| HorizonMismatch {
        expected: horizon.months(),
        found: months.len(),
    })
}

/// Cash flow as a percentage of revenue, one decimal place, e.g. `"40.0%"`.
///
/// Returns `None` when the ratio is not finite (zero revenue).
pub fn margin_percent(cash_flow: f64, revenue: f64) -> Option<String> {
    let percent = cash_flow / revenue * 100.0;
    if !percent.is_finite() {
        return None;
    }
    // f64::round is half away from zero
    let rounded = (percent * 10.0).round() / 10.0;
    Some(format!("{:.1}%", rounded))
}

/// Round to the nearest integer, ties toward positive infinity.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
