use thiserror::Error;

use super::model::Field;

/// Reasons a table cannot become an enrollment dataset.
///
/// Row numbers are 1-based data rows (the header is not counted).
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}, column '{field}': cannot read '{value}' as {expected}")]
    InvalidValue {
        row: usize,
        field: Field,
        value: String,
        expected: &'static str,
    },

    #[error("row {row}, column '{field}': {value} is outside [{min}, {max}]")]
    OutOfRange {
        row: usize,
        field: Field,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("file contains no data rows")]
    Empty,

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}
