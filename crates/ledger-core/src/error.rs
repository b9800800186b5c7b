use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the Ledger Dashboard.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The uploaded content is not well-formed CSV.
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// A cell of the `date` column could not be coerced to a date/time.
    #[error("Invalid date on row {row}: {value:?}")]
    DateParse { row: usize, value: String },

    /// A column the pipeline needs is absent from the header row.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A column the pipeline needs holds a value that is not a number.
    #[error("Column {column:?} is not numeric (row {row}: {value:?})")]
    NonNumericColumn {
        column: String,
        row: usize,
        value: String,
    },

    /// A net-amount strategy name is not one of the recognised strategies.
    #[error("Invalid net-amount strategy: {0}")]
    InvalidStrategy(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the ledger crates.
pub type Result<T> = std::result::Result<T, LedgerError>;
