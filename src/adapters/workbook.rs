//! Spreadsheet workbooks (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) via calamine.

use crate::domain::model::{Cell, RawTable, RawWorkbook};
use crate::utils::error::{DashboardError, Result};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{Days, NaiveDate, NaiveDateTime, TimeDelta};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

pub const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

pub fn read_workbook_path(path: &Path) -> Result<RawWorkbook> {
    let source_name = path.display().to_string();
    let workbook = open_workbook_auto(path).map_err(|e| DashboardError::load(&source_name, e))?;
    collect_sheets(source_name, workbook)
}

pub fn read_workbook_bytes(name: &str, bytes: &[u8]) -> Result<RawWorkbook> {
    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| DashboardError::load(name, e))?;
    collect_sheets(name.to_string(), workbook)
}

fn collect_sheets<RS: Read + Seek>(
    source_name: String,
    mut workbook: calamine::Sheets<RS>,
) -> Result<RawWorkbook> {
    let mut tables = Vec::new();

    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| DashboardError::load(&source_name, e))?;
        tracing::debug!(
            "Sheet '{}' spans {} rows x {} columns",
            sheet_name,
            range.height(),
            range.width()
        );
        tables.push(RawTable::from_grid(sheet_name, range_to_grid(&range)));
    }

    Ok(RawWorkbook {
        source_name,
        tables,
    })
}

fn range_to_grid(range: &Range<Data>) -> Vec<Vec<Cell>> {
    range
        .rows()
        .map(|row| row.iter().map(convert_value).collect())
        .collect()
}

fn convert_value(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Empty,
        Data::Bool(v) => Cell::Bool(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::String(v) => Cell::Text(v.clone()),
        Data::DateTime(v) if v.is_duration() => Cell::Number(v.as_f64()),
        Data::DateTime(v) => excel_serial_to_datetime(v.as_f64())
            .map(Cell::Date)
            .unwrap_or(Cell::Number(v.as_f64())),
        Data::DateTimeIso(v) | Data::DurationIso(v) => Cell::Text(v.clone()),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
    }
}

/// Serial days since 1899-12-30, fractional part as time of day.
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.floor();
    let seconds = ((serial - days) * 86_400.0).round() as i64;
    NaiveDate::from_ymd_opt(1899, 12, 30)?
        .checked_add_days(Days::new(days as u64))?
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::seconds(seconds))
}
