//! Synthetic monthly data for demos and the "try sample data" path
//!
//! The random source is always passed in so seeded runs are reproducible.

use crate::models::{Horizon, MonthlyRecord, Multiple, ValuationSummary};
use crate::valuation::{compute_valuation, round_half_up};
use rand::Rng;
use std::f64::consts::PI;

pub const SAMPLE_COMPANY_NAME: &str = "Sample Corporation";

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun",
    "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const BASE_REVENUE: f64 = 100_000.0;
const SEASONAL_AMPLITUDE: f64 = 0.2;

/// Twelve records labelled Jan..Dec with seasonal, jittered revenue.
pub fn generate_synthetic_months<R: Rng>(rng: &mut R) -> Vec<MonthlyRecord> {
    MONTH_LABELS
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let seasonal_factor = 1.0 + (index as f64 * PI / 6.0).sin() * SEASONAL_AMPLITUDE;
            let jitter: f64 = rng.gen_range(1.0..1.1);
            let revenue = round_half_up(BASE_REVENUE * seasonal_factor * jitter);

            let expense_ratio: f64 = rng.gen_range(0.6..0.7);
            let expenses = round_half_up(revenue * expense_ratio);

            MonthlyRecord::new(*label, revenue, expenses)
        })
        .collect()
}

/// Summary for the built-in sample company
pub fn sample_summary<R: Rng>(
    rng: &mut R,
    multiple: Multiple,
    horizon: Horizon,
) -> ValuationSummary {
    let months = generate_synthetic_months(rng);
    compute_valuation(SAMPLE_COMPANY_NAME, &months, multiple, horizon)
}
