use thiserror::Error;

use crate::column::Column;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("No transaction data found in file")]
    NotFoundTransactionDataInFile,

    #[error("Transaction type \"{value}\" is invalid in row {row}")]
    TransactionTypeInvalid { row: usize, value: String },

    #[error("Missing required field in header row: {0}")]
    MissingRequiredFieldInHeaderRow(Column),

    #[error("Transaction timezone \"{value}\" is invalid in row {row}")]
    TransactionTimeZoneInvalid { row: usize, value: String },

    #[error("Transaction time \"{value}\" is invalid in row {row}")]
    TransactionTimeInvalid { row: usize, value: String },

    #[error("{column} is invalid in row {row}")]
    AmountInvalid { row: usize, column: Column },

    #[error("Geographic location is invalid in row {row}")]
    GeographicLocationInvalid { row: usize },

    #[error("Project id is invalid in row {row}")]
    ProjectIdInvalid { row: usize },

    #[error("Row {row} has fewer fields ({actual}) than the header row ({expected})")]
    FewerFieldsInDataRowThanInHeaderRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("No header row found")]
    MissingHeaderRow,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ImportError>;
