//! Spreadsheet (.xlsx / .xls) reading via calamine.
//!
//! Only the first sheet is read. Headers come from the first row of the
//! sheet's used range, so leading empty rows are ignored; row lines are
//! still reported against the physical sheet (row 1 = line 1).
//! Cell values are coerced to text:
//!
//! | Cell                     | Text                                   |
//! |--------------------------|----------------------------------------|
//! | date / time              | `HH:MM:SS` time of day                 |
//! | number                   | decimal string (`0.00625`, `15`)       |
//! | formula                  | its cached result                      |
//! | rich text                | concatenated runs                      |
//! | error                    | empty                                  |
//!
//! Numbers keep their fraction because a bare number can be an Excel
//! time stored as a fraction of a day.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;

use super::{ParsedTable, SourceFormat};
use crate::error::{ImportError, ImportResult};
use crate::models::{normalize_header, RawRow};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Read the first sheet of an XLSX/XLS workbook held in memory.
pub fn read_spreadsheet(bytes: &[u8]) -> ImportResult<ParsedTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::Malformed(e.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => return Err(ImportError::Malformed(e.to_string())),
        None => {
            return Err(ImportError::Malformed(
                "O arquivo XLSX não contém planilhas".to_string(),
            ))
        }
    };

    table_from_range(&range)
}

fn table_from_range(range: &Range<Data>) -> ImportResult<ParsedTable> {
    // 0-based sheet row of the header
    let header_row_index = range.start().map_or(0, |(row, _)| row as usize);
    let mut rows_iter = range.rows();
    let header_row = rows_iter.next().ok_or(ImportError::EmptyFile)?;

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| normalize_header(&cell_to_string(cell)))
        .collect();

    let mut rows = Vec::new();
    for (offset, data_row) in rows_iter.enumerate() {
        let row: RawRow = headers
            .iter()
            .zip(data_row.iter())
            .map(|(h, cell)| (h.as_str(), cell_to_string(cell)))
            .collect();

        if row.is_blank() {
            continue;
        }
        rows.push(row.with_line(header_row_index + offset + 2));
    }

    if rows.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    Ok(ParsedTable {
        rows,
        headers: headers.into_iter().filter(|h| !h.is_empty()).collect(),
        format: SourceFormat::Spreadsheet,
        encoding: None,
        warnings: Vec::new(),
    })
}

/// Coerce one cell to trimmed text.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => time_of_day(dt.as_f64()),
        Data::DateTimeIso(s) => iso_time_of_day(s),
        Data::DurationIso(s) => s.trim().to_string(),
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Render the fractional (time) part of an Excel serial as `HH:MM:SS`.
///
/// Milliseconds are rounded, then seconds truncated.
pub fn time_of_day(serial: f64) -> String {
    let fraction = serial.rem_euclid(1.0);
    let millis = (fraction * SECONDS_PER_DAY * 1000.0).round() as u64;
    let total_seconds = (millis / 1000) % 86_400;
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}

fn iso_time_of_day(iso: &str) -> String {
    let time = match iso.split_once('T') {
        Some((_, time)) => time,
        None if iso.contains(':') => iso,
        None => return "00:00:00".to_string(),
    };
    time.chars().take(8).collect()
}
