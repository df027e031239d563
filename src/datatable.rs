use std::collections::{HashMap, HashSet};

use crate::column::{Column, ALL_COLUMNS};
use crate::error::{ImportError, Result};
use crate::models::User;

// ---------------------------------------------------------------------------
// Row source contract
// ---------------------------------------------------------------------------

/// One record produced by a reader.
pub trait TransactionDataRow {
    /// `false` for records the reader deliberately does not import. The
    /// engine skips them.
    fn is_valid(&self) -> bool;

    /// The value for `column`, or `""` when there is none.
    fn get_data(&self, column: Column) -> &str;
}

/// Sequential, single-consumer cursor over the rows of a table.
pub trait TransactionDataRowIterator {
    fn has_next(&self) -> bool;

    /// Produces the next row. An error aborts the whole import.
    fn next(&mut self, user: &User) -> Result<Box<dyn TransactionDataRow>>;
}

/// What every format reader hands to the normalization engine.
pub trait TransactionDataTable {
    fn has_column(&self, column: Column) -> bool;

    /// Advisory row count.
    fn transaction_row_count(&self) -> usize;

    fn transaction_row_iterator(&self) -> Box<dyn TransactionDataRowIterator + '_>;
}

// ---------------------------------------------------------------------------
// Raw tables
// ---------------------------------------------------------------------------

/// Header plus data rows, as read from a delimited file or worksheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicDataTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl BasicDataTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }
}

/// Which header text carries each canonical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    headers: HashMap<Column, String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            headers: ALL_COLUMNS
                .iter()
                .map(|c| (*c, c.default_header().to_string()))
                .collect(),
        }
    }
}

impl ColumnMapping {
    pub fn with_header(mut self, column: Column, header: &str) -> Self {
        self.headers.insert(column, header.to_string());
        self
    }

    pub fn header(&self, column: Column) -> Option<&str> {
        self.headers.get(&column).map(String::as_str)
    }
}

// Readers always expose these, with empty values when the file has no data.
const ALWAYS_AVAILABLE: &[Column] = &[
    Column::SubCategory,
    Column::AccountName,
    Column::RelatedAccountName,
];

/// A [`BasicDataTable`] whose header has been matched against a
/// [`ColumnMapping`].
#[derive(Debug, Clone)]
pub struct MappedDataTable {
    table: BasicDataTable,
    indexes: HashMap<Column, usize>,
    ignored: HashMap<Column, HashSet<String>>,
}

impl MappedDataTable {
    pub fn new(table: BasicDataTable, mapping: &ColumnMapping) -> Self {
        let mut indexes = HashMap::new();
        for column in ALL_COLUMNS {
            let Some(header) = mapping.header(*column) else {
                continue;
            };
            if let Some(i) = table.header.iter().position(|h| h.trim() == header) {
                indexes.insert(*column, i);
            }
        }
        Self {
            table,
            indexes,
            ignored: HashMap::new(),
        }
    }

    /// Marks rows whose `column` holds `value` as invalid, e.g. a status
    /// column with "Closed" or "Refunded" entries.
    pub fn ignore_value(mut self, column: Column, value: &str) -> Self {
        self.ignored
            .entry(column)
            .or_default()
            .insert(value.to_string());
        self
    }

    fn is_ignored(&self, values: &HashMap<Column, String>) -> bool {
        self.ignored.iter().any(|(column, set)| {
            values.get(column).is_some_and(|v| set.contains(v))
        })
    }
}

impl TransactionDataTable for MappedDataTable {
    fn has_column(&self, column: Column) -> bool {
        self.indexes.contains_key(&column) || ALWAYS_AVAILABLE.contains(&column)
    }

    fn transaction_row_count(&self) -> usize {
        self.table.rows.len()
    }

    fn transaction_row_iterator(&self) -> Box<dyn TransactionDataRowIterator + '_> {
        Box::new(MappedRowIterator {
            table: self,
            next_index: 0,
        })
    }
}

struct MappedRowIterator<'a> {
    table: &'a MappedDataTable,
    next_index: usize,
}

impl TransactionDataRowIterator for MappedRowIterator<'_> {
    fn has_next(&self) -> bool {
        self.next_index < self.table.table.rows.len()
    }

    fn next(&mut self, _user: &User) -> Result<Box<dyn TransactionDataRow>> {
        let Some(fields) = self.table.table.rows.get(self.next_index) else {
            return Err(ImportError::Other("no more rows".to_string()));
        };
        self.next_index += 1;

        if fields.iter().all(|f| f.trim().is_empty()) {
            return Ok(Box::new(MappedRow {
                valid: false,
                values: HashMap::new(),
            }));
        }

        let expected = self.table.table.header.len();
        if fields.len() < expected {
            return Err(ImportError::FewerFieldsInDataRowThanInHeaderRow {
                row: self.next_index,
                expected,
                actual: fields.len(),
            });
        }

        let values: HashMap<Column, String> = self
            .table
            .indexes
            .iter()
            .map(|(column, &i)| (*column, fields[i].trim().to_string()))
            .collect();
        let valid = !self.table.is_ignored(&values);
        Ok(Box::new(MappedRow { valid, values }))
    }
}

struct MappedRow {
    valid: bool,
    values: HashMap<Column, String>,
}

impl TransactionDataRow for MappedRow {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn get_data(&self, column: Column) -> &str {
        self.values.get(&column).map(String::as_str).unwrap_or("")
    }
}
