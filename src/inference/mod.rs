//! Feature inference for spreadsheet columns.
//!
//! Given a [`crate::adapters::host::RawColumn`] (header key, data cells, declared value type
//! and number-format code), [`infer_column`] decides whether the column is discrete or
//! continuous, computes its modalities or range, and normalizes its cells so that row data and
//! feature agree on one interpretation of the column.
//!
//! ## Example
//!
//! ```rust
//! use lupa_dataset::adapters::host::{RawColumn, GENERAL_FORMAT};
//! use lupa_dataset::inference::infer_column;
//! use lupa_dataset::types::{Feature, FeatureRange, Value};
//!
//! let col = RawColumn::from_cells(
//!     vec!["Price".into(), 10.0.into(), "".into(), 20.0.into(), 30.0.into()],
//!     GENERAL_FORMAT,
//! );
//! let out = infer_column(&col).unwrap();
//!
//! assert_eq!(
//!     out.feature,
//!     Feature::Continuous { key: "Price".to_string(), range: FeatureRange::Number(10.0, 30.0) }
//! );
//! assert_eq!(out.values[1], Value::Null);
//! ```

pub mod column;
pub mod date;

pub use column::{infer_column, infer_columns, infer_feature, rows_from_columns, InferredColumn};
pub use date::{decode_serial, is_date_format};
