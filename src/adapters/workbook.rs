#![cfg(feature = "excel")]

//! Workbook files as a spreadsheet host (feature `excel`).
//!
//! [`CalamineHost`] re-opens the workbook on every batch, so each load sees the file as it is at
//! that moment. File reads run on tokio's blocking pool, so the host must be driven from within a
//! tokio runtime.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{DatasetError, DatasetResult};

use super::host::{Bounds, RawCell, RawColumn, SpreadsheetHost, WorksheetGrid, GENERAL_FORMAT};

/// Format code reported for date-time cells.
pub const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
/// Format code reported for duration cells.
pub const DURATION_FORMAT: &str = "[h]:mm:ss";

/// Which worksheet of a workbook to read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetSelection {
    /// The first sheet (default).
    #[default]
    First,
    /// A single named sheet.
    Named(String),
}

/// Spreadsheet host over a workbook file (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`).
#[derive(Debug, Clone)]
pub struct CalamineHost {
    path: PathBuf,
    sheet: SheetSelection,
}

impl CalamineHost {
    pub fn new(path: impl AsRef<Path>, sheet: SheetSelection) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the selected sheet's used range into memory. Blocking.
    pub fn read_grid(&self) -> DatasetResult<WorksheetGrid> {
        read_worksheet(&self.path, &self.sheet)
    }

    async fn read_grid_blocking(&self) -> DatasetResult<WorksheetGrid> {
        let host = self.clone();
        blocking(move || host.read_grid()).await
    }
}

async fn blocking<T, F>(f: F) -> DatasetResult<T>
where
    F: FnOnce() -> DatasetResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DatasetError::Host {
            message: format!("workbook read task failed: {e}"),
        })?
}

/// Each batch opens the workbook on tokio's blocking pool; call from within a tokio runtime.
#[async_trait]
impl SpreadsheetHost for CalamineHost {
    async fn ready(&self) -> DatasetResult<()> {
        let path = self.path.clone();
        blocking(move || {
            std::fs::metadata(&path)?;
            Ok(())
        })
        .await
    }

    async fn load_bounds(&self) -> DatasetResult<Bounds> {
        self.read_grid_blocking().await?.load_bounds().await
    }

    async fn load_columns(&self, bounds: &Bounds) -> DatasetResult<Vec<RawColumn>> {
        let grid = self.read_grid_blocking().await?;
        if grid.name() != bounds.sheet {
            return Err(DatasetError::Host {
                message: format!(
                    "bounds were read from sheet '{}' but the selection now resolves to '{}'",
                    bounds.sheet,
                    grid.name()
                ),
            });
        }
        grid.load_columns(bounds).await
    }
}

/// Read a worksheet's used range into a [`WorksheetGrid`].
///
/// Each column's number format is derived from its first non-empty data cell: date-time and
/// duration cells report a date/time format code, everything else `General`. Date-time cells
/// keep their serial number.
pub fn read_worksheet(path: impl AsRef<Path>, sheet: &SheetSelection) -> DatasetResult<WorksheetGrid> {
    let mut workbook = open_workbook_auto(path)?;

    let name = match sheet {
        SheetSelection::Named(name) => name.clone(),
        SheetSelection::First => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| DatasetError::Host {
                message: "workbook has no sheets".to_string(),
            })?,
    };
    let range = workbook.worksheet_range(&name)?;

    let rows: Vec<Vec<RawCell>> = range
        .rows()
        .map(|row| row.iter().map(raw_cell).collect())
        .collect();

    let mut grid = WorksheetGrid::new(name, rows);
    for idx in 0..grid.width() {
        let first = range
            .rows()
            .skip(1)
            .filter_map(|row| row.get(idx))
            .find(|cell| !matches!(cell, Data::Empty));
        if let Some(cell) = first {
            grid = grid.with_number_format(idx, number_format(cell));
        }
    }
    Ok(grid)
}

fn raw_cell(c: &Data) -> RawCell {
    match c {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Float(f) => RawCell::Number(*f),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(e) => RawCell::Error(e.to_string()),
    }
}

fn number_format(c: &Data) -> &'static str {
    match c {
        Data::DateTime(dt) if dt.is_duration() => DURATION_FORMAT,
        Data::DateTime(_) => DATETIME_FORMAT,
        _ => GENERAL_FORMAT,
    }
}
