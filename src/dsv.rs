use std::io::Read;

use crate::datatable::BasicDataTable;
use crate::error::{ImportError, Result};

const CANDIDATE_DELIMITERS: &[u8] = &[b',', b'\t', b';', b'|'];

/// Picks the delimiter that splits `header_line` into the most fields.
/// Falls back to a comma.
pub fn detect_delimiter(header_line: &str) -> u8 {
    let mut best = b',';
    let mut best_count = 0;
    for &delimiter in CANDIDATE_DELIMITERS {
        let count = header_line.bytes().filter(|b| *b == delimiter).count();
        if count > best_count {
            best = delimiter;
            best_count = count;
        }
    }
    best
}

/// Reads delimiter-separated text. The first non-blank record is the header;
/// blank records after it are kept so row numbers line up with the file.
pub fn read_table<R: Read>(reader: R, delimiter: u8) -> Result<BasicDataTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let fields: Vec<String> = record.iter().map(|f| f.to_string()).collect();
        match header {
            None => {
                if fields.iter().all(|f| f.trim().is_empty()) {
                    continue;
                }
                header = Some(
                    fields
                        .iter()
                        .enumerate()
                        .map(|(i, f)| {
                            let f = if i == 0 { f.trim_start_matches('\u{feff}') } else { f };
                            f.trim().to_string()
                        })
                        .collect(),
                );
            }
            Some(_) => rows.push(fields),
        }
    }

    let header = header.ok_or(ImportError::MissingHeaderRow)?;
    Ok(BasicDataTable::new(header, rows))
}

/// Reads a file, sniffing the delimiter from its first line when none is given.
pub fn read_file(path: &std::path::Path, delimiter: Option<u8>) -> Result<BasicDataTable> {
    let content = std::fs::read_to_string(path)?;
    let delimiter = delimiter.unwrap_or_else(|| {
        let first = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        detect_delimiter(first)
    });
    read_table(content.as_bytes(), delimiter)
}
