use thiserror::Error;

use crate::adapters::host::ValueType;

/// Convenience result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Error type returned by feature inference, the dataset context and the adapters.
///
/// None of these are transient: they describe a source shape or a usage that is not supported,
/// so callers should report them rather than retry.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The column's data region is blank, so it cannot be classified.
    #[error("column '{column}' has no data to classify (empty header/data region)")]
    EmptyHeader { column: String },

    /// The host reported a value type the inference engine does not handle.
    #[error("column '{column}' has unsupported value type {value_type:?}")]
    UnsupportedValueType { column: String, value_type: ValueType },

    /// A dataset was provided inside a scope that already has one.
    #[error("you cannot provide a dataset inside another dataset")]
    NestedProvider,

    /// An accessor was used with no dataset in scope.
    #[error("{accessor}() may only be used in the context of a dataset")]
    OutsideContext { accessor: &'static str },

    /// A cell does not fit the type its column was classified as.
    #[error("invalid cell at row {row} column '{column}': {message} (raw='{raw}')")]
    InvalidCell {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// Two columns share the same header key.
    #[error("duplicate feature key '{key}'")]
    DuplicateKey { key: String },

    /// A serial date number cannot be represented as a calendar date-time.
    #[error("serial date {serial} is out of range")]
    DateOutOfRange { serial: f64 },

    /// A mock dataset was built from no rows.
    #[error("dataset has no rows to infer features from")]
    EmptyDataset,

    /// The spreadsheet host never signalled readiness.
    #[error("spreadsheet host is not ready")]
    HostNotReady,

    /// The spreadsheet host failed a read.
    #[error("host error: {message}")]
    Host { message: String },

    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error while loading mock rows.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error while loading mock rows.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "excel")]
    /// Workbook error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),
}
