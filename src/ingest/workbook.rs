//! Excel uploads (.xlsx / .xls), first worksheet only

use super::Cell;
use crate::error::ValuationError;
use crate::Result;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

pub(crate) fn read_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<Cell>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ValuationError::Processing("Workbook has no worksheets".into()))??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(to_cell).collect())
        .collect())
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}
