//! Cash Flow Valuation Service
//!
//! Backend for a three-step wizard:
//! - Upload a spreadsheet of monthly revenue / expenses (or use sample data)
//! - Review the derived cash flow summary
//! - Export a styled valuation report
//!
//! PIPELINE:
//! UPLOAD → EXTRACT ROWS → AGGREGATE → VALUE (avg cash flow × multiple) → RENDER

pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod report;
pub mod sample;
pub mod valuation;
pub mod wizard;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use valuation::{compute_valuation, margin_percent};
pub use wizard::{WizardEvent, WizardSession, WizardStep};
