use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (missing file, bad column mapping, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Unrecognized `kind` / `origin` filter value. Raised before any computation.
    #[error("invalid {field} filter: '{value}' (expected one of: {expected})")]
    InvalidFilter {
        field: &'static str,
        value: String,
        expected: String,
    },
    /// A row lacks a field a collaborator needs to build it at all.
    #[error("{side} record '{record}': missing required field '{field}'")]
    InputShape {
        side: String,
        record: String,
        field: String,
    },
}
