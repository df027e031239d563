use std::path::Path;

use calamine::{Data, Range, Reader};

use crate::datatable::BasicDataTable;
use crate::error::{ImportError, Result};

/// Converts an Excel serial date (days since 1899-12-30, fraction = time of
/// day) to `YYYY-MM-DD HH:MM:SS`.
pub fn excel_serial_to_datetime(serial: f64) -> Option<String> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    let datetime = base.checked_add_signed(chrono::Duration::seconds(seconds))?;
    Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => {
            excel_serial_to_datetime(dt.as_f64()).unwrap_or_else(|| dt.as_f64().to_string())
        }
        Data::DateTimeIso(s) => s.replacen('T', " ", 1),
        other => other.to_string(),
    }
}

/// Turns a worksheet range into a table: the first non-blank row is the header.
pub fn table_from_range(range: &Range<Data>) -> Result<BasicDataTable> {
    let mut rows = range
        .rows()
        .map(|r| r.iter().map(cell_to_string).collect::<Vec<String>>())
        .skip_while(|r| r.iter().all(|f| f.trim().is_empty()));
    let header: Vec<String> = rows
        .next()
        .ok_or(ImportError::MissingHeaderRow)?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();
    Ok(BasicDataTable::new(header, rows.collect()))
}

/// Opens a workbook and reads `sheet`, or the first worksheet when `None`.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<BasicDataTable> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| ImportError::Spreadsheet(format!("Failed to open workbook: {e}")))?;
    let name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::Spreadsheet("Workbook has no worksheets".to_string()))?,
    };
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| ImportError::Spreadsheet(format!("Failed to read sheet {name}: {e}")))?;
    table_from_range(&range)
}
