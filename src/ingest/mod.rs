//! Upload validation and spreadsheet row extraction
//!
//! Turns an uploaded file into monthly records. The valuation engine never
//! sees raw bytes: it only consumes what [`extract_records`] hands back.

mod delimited;
mod workbook;

use crate::error::ValuationError;
use crate::models::MonthlyRecord;
use crate::Result;
use std::collections::HashSet;
use std::fmt;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLS_MIME: &str = "application/vnd.ms-excel";
pub const CSV_MIME: &str = "text/csv";

pub const INVALID_TYPE_MESSAGE: &str = "Invalid file type. Only Excel and CSV files are allowed.";

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Xlsx,
    Xls,
    Csv,
}

impl UploadKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        // drop parameters such as "; charset=utf-8"
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            XLSX_MIME => Some(UploadKind::Xlsx),
            XLS_MIME => Some(UploadKind::Xls),
            CSV_MIME => Some(UploadKind::Csv),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            UploadKind::Xlsx => XLSX_MIME,
            UploadKind::Xls => XLS_MIME,
            UploadKind::Csv => CSV_MIME,
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UploadKind::Xlsx => "xlsx",
            UploadKind::Xls => "xls",
            UploadKind::Csv => "csv",
        };
        write!(f, "{}", s)
    }
}

/// Check the declared content type of an upload.
pub fn validate_content_type(content_type: Option<&str>) -> Result<UploadKind> {
    content_type
        .and_then(UploadKind::from_mime)
        .ok_or_else(|| ValuationError::Validation(INVALID_TYPE_MESSAGE.to_string()))
}

/// Check the byte size of an upload against the configured ceiling.
pub fn validate_size(size: usize, max_bytes: usize) -> Result<()> {
    if size > max_bytes {
        return Err(ValuationError::Validation(too_large_message(max_bytes)));
    }
    Ok(())
}

pub fn too_large_message(max_bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if max_bytes % MIB == 0 {
        format!("File too large. Maximum size is {}MB.", max_bytes / MIB)
    } else {
        format!("File too large. Maximum size is {:.1}MB.", max_bytes as f64 / MIB as f64)
    }
}

/// Full upload validation, type first then size.
pub fn validate_upload(content_type: Option<&str>, size: usize, max_bytes: usize) -> Result<UploadKind> {
    let kind = validate_content_type(content_type)?;
    validate_size(size, max_bytes)?;
    Ok(kind)
}

//
// ================= Extraction =================
//

/// Result of reading monthly rows out of an uploaded file
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Parsed(Vec<MonthlyRecord>),
    ParseFailed(String),
}

impl IngestOutcome {
    pub fn into_result(self) -> Result<Vec<MonthlyRecord>> {
        match self {
            IngestOutcome::Parsed(records) => Ok(records),
            IngestOutcome::ParseFailed(reason) => Err(ValuationError::Processing(reason)),
        }
    }
}

/// A single decoded spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    fn text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(n.to_string()),
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }

    fn amount(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => parse_amount(s),
        }
    }
}

/// Read month / revenue / expenses rows from the first sheet of `bytes`.
pub fn extract_records(kind: UploadKind, bytes: &[u8]) -> IngestOutcome {
    let rows = match kind {
        UploadKind::Csv => delimited::read_rows(bytes),
        UploadKind::Xlsx | UploadKind::Xls => workbook::read_first_sheet(bytes),
    };

    match rows {
        Ok(rows) => records_from_rows(&rows),
        Err(e) => IngestOutcome::ParseFailed(e.to_string()),
    }
}

/// Column positions of the three fields we read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    month: usize,
    revenue: usize,
    expenses: usize,
}

const POSITIONAL: ColumnMap = ColumnMap { month: 0, revenue: 1, expenses: 2 };

/// Find the header row's column layout. `None` means the row is data.
fn detect_header(row: &[Cell]) -> Option<ColumnMap> {
    let names: Vec<String> = row
        .iter()
        .map(|c| c.text().unwrap_or_default().to_ascii_lowercase())
        .collect();

    let find = |needles: &[&str]| names.iter().position(|n| needles.iter().any(|k| n.contains(k)));

    match (
        find(&["month", "period"]),
        find(&["revenue", "sales"]),
        find(&["expense", "cost"]),
    ) {
        (Some(month), Some(revenue), Some(expenses)) => Some(ColumnMap { month, revenue, expenses }),
        // A header we don't recognise: anything non-numeric where revenue sits
        _ if row.get(POSITIONAL.revenue).map_or(false, |c| {
            matches!(c, Cell::Text(_)) && c.amount().is_none()
        }) =>
        {
            Some(POSITIONAL)
        }
        _ => None,
    }
}

fn records_from_rows(rows: &[Vec<Cell>]) -> IngestOutcome {
    let mut rows = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (i + 1, row))
        .filter(|(_, row)| row.iter().any(|c| c.text().is_some()));

    let Some((first_line, first_row)) = rows.next() else {
        return IngestOutcome::ParseFailed("The uploaded sheet is empty".into());
    };

    let (columns, mut data): (ColumnMap, Vec<(usize, &Vec<Cell>)>) = match detect_header(first_row) {
        Some(columns) => (columns, Vec::new()),
        None => (POSITIONAL, vec![(first_line, first_row)]),
    };
    data.extend(rows);

    let mut records = Vec::with_capacity(data.len());
    let mut seen = HashSet::new();

    for (line, row) in data {
        let cell = |idx: usize| row.get(idx).cloned().unwrap_or(Cell::Empty);

        let Some(label) = cell(columns.month).text() else {
            continue;
        };
        if label.eq_ignore_ascii_case("total") {
            continue;
        }

        let revenue = match read_amount(&cell(columns.revenue), "revenue", line) {
            Ok(v) => v,
            Err(reason) => return IngestOutcome::ParseFailed(reason),
        };
        let expenses = match read_amount(&cell(columns.expenses), "expenses", line) {
            Ok(v) => v,
            Err(reason) => return IngestOutcome::ParseFailed(reason),
        };

        if !seen.insert(label.to_lowercase()) {
            return IngestOutcome::ParseFailed(format!("Duplicate month '{}' in row {}", label, line));
        }

        records.push(MonthlyRecord::new(label, revenue, expenses));
    }

    if records.is_empty() {
        return IngestOutcome::ParseFailed("No monthly rows found in the uploaded sheet".into());
    }

    IngestOutcome::Parsed(records)
}

/// Why `value` can't stand as a revenue or expense figure, if it can't.
pub fn amount_problem(value: f64, field: &str) -> Option<String> {
    if !value.is_finite() {
        Some(format!("Non-numeric {}", field))
    } else if value < 0.0 {
        Some(format!("Negative {} ({})", field, value))
    } else {
        None
    }
}

fn read_amount(cell: &Cell, field: &str, line: usize) -> std::result::Result<f64, String> {
    match cell.amount() {
        Some(v) => match amount_problem(v, field) {
            None => Ok(v),
            Some(problem) => Err(format!("{} in row {}", problem, line)),
        },
        None => Err(format!("Missing or non-numeric {} in row {}", field, line)),
    }
}

/// Parse "$1,234.50", "1234", "(500)" style amounts.
fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let (negative, body) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let value: f64 = cleaned.parse().ok()?;
    Some(if negative { -value } else { value })
}
