//! Custom error types for the application
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A connection table could not be read. Fatal unless the scan tolerates it.
    #[error("Cannot read connection table {}: {source}", .path.display())]
    SourceReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed hex endpoint or row. Dropped by the table reader.
    #[error("Format error: {0}")]
    FormatError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Worker error: {0}")]
    WorkerError(String),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("JSON error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("CSV into_inner error: {0}")]
    CsvIntoInnerError(#[from] csv::IntoInnerError<csv::Writer<Vec<u8>>>),

    #[error("UTF-8 conversion error: {0}")]
    FromUtf8Error(#[from] std::string::FromUtf8Error),
}
