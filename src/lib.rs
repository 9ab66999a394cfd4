//! `lupa-dataset` exposes tabular data together with per-column feature metadata to consumer
//! code: whether each column is discrete (with its modalities) or continuous (with a numeric or
//! date range).
//!
//! A [`types::Dataset`] is the triple `{ features, shape, data }`. It is produced by an adapter
//! and handed to consumers through a [`context::DatasetContext`] scope.
//!
//! ## Adapters
//!
//! - [`adapters::MockDataset`]: rows already in memory (also loadable from JSON or CSV)
//! - [`adapters::ExcelDataset`]: reads the used range of a worksheet through a
//!   [`adapters::SpreadsheetHost`]. [`adapters::WorksheetGrid`] is an in-memory host; with the
//!   Cargo feature `excel`, `adapters::CalamineHost` reads workbook files.
//!
//! ## Feature inference
//!
//! Spreadsheet columns are classified by [`inference::infer_column`] from the host-declared value
//! type of the data region:
//!
//! - string → discrete, modalities are the distinct values in first-seen order
//! - integer/double → continuous; blank cells are ignored for the range and become
//!   [`types::Value::Null`] in rows; date number formats turn the range and the cells into
//!   date-times (see [`inference::decode_serial`])
//! - empty → [`DatasetError::EmptyHeader`]; anything else → [`DatasetError::UnsupportedValueType`]
//!
//! ## Example
//!
//! ```rust
//! use lupa_dataset::adapters::{ExcelDataset, RawCell, WorksheetGrid};
//! use lupa_dataset::context::DatasetContext;
//! use lupa_dataset::types::{FeatureRange, Value};
//!
//! # fn main() -> Result<(), lupa_dataset::DatasetError> {
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let grid = WorksheetGrid::new(
//!     "Sheet1",
//!     vec![
//!         vec!["Color".into(), "Price".into()],
//!         vec!["Red".into(), 10.0.into()],
//!         vec!["Blue".into(), RawCell::Empty],
//!         vec!["Red".into(), 30.0.into()],
//!     ],
//! );
//!
//! let excel = ExcelDataset::new(grid);
//! let dataset = excel.load().await?;
//!
//! let cx = DatasetContext::root().provide(&dataset)?;
//! assert_eq!(cx.use_shape()?.rows, 3);
//! assert_eq!(
//!     cx.use_features()?[1].range(),
//!     Some(&FeatureRange::Number(10.0, 30.0))
//! );
//!
//! let rows = cx.use_data()?.resolve().await?;
//! assert_eq!(rows[1]["Price"], Value::Null);
//! # Ok(())
//! # })
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: features, rows, shape and dataset types
//! - [`inference`]: column classification and serial date decoding
//! - [`context`]: scoped access to a dataset
//! - [`adapters`]: mock and spreadsheet data sources, observability hooks
//! - [`error`]: error type shared across the crate

pub mod adapters;
pub mod context;
pub mod error;
pub mod inference;
pub mod types;

pub use error::{DatasetError, DatasetResult};
