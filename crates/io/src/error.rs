use berth_recon::ReconError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot read {path}: {message}")]
    Read { path: String, message: String },

    #[error("cannot write {path}: {message}")]
    Write { path: String, message: String },

    #[error("unsupported file type: {0} (expected .csv, .tsv, .xlsx, .xls, .xlsb or .ods)")]
    UnsupportedFormat(String),

    #[error("{path}: sheet '{sheet}' not found (available: {available})")]
    SheetNotFound { path: String, sheet: String, available: String },

    #[error("{0}: no header row")]
    Empty(String),

    #[error("{table}: missing column '{column}' for {field}")]
    MissingColumn { table: String, field: String, column: String },

    #[error("{table} row {row}: cannot parse {field} '{value}'")]
    Parse { table: String, row: usize, field: String, value: String },

    /// Row is structurally unusable (e.g. no serial number).
    #[error(transparent)]
    Record(#[from] ReconError),
}
