//! Data-source adapters that produce a [`crate::types::Dataset`].
//!
//! - [`mock`]: fixed in-memory rows, with first-row type inference
//! - [`excel`]: a live [`host::SpreadsheetHost`], classified with [`crate::inference`]
//! - [`host`]: the host boundary plus the in-memory [`host::WorksheetGrid`]
//! - [`workbook`]: workbook files as a host (requires the Cargo feature `excel`)
//!
//! Loads of the spreadsheet adapter can report to a [`DatasetObserver`].

pub mod excel;
pub mod host;
pub mod mock;
pub mod observability;
#[cfg(feature = "excel")]
pub mod workbook;

pub use excel::{read_features, read_rows, ExcelDataset, ExcelDatasetOptions};
pub use host::{
    Bounds, ColumnBounds, RawCell, RawColumn, SpreadsheetHost, ValueType, WorksheetGrid,
    GENERAL_FORMAT,
};
pub use mock::{infer_mock_features, MockDataset};
pub use observability::{
    severity_for_error, CompositeObserver, DatasetObserver, FileObserver, LoadContext,
    LoadSeverity, LoadStats, StdErrObserver,
};
#[cfg(feature = "excel")]
pub use workbook::{read_worksheet, CalamineHost, SheetSelection};
