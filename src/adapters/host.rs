//! Boundary to a spreadsheet host's object model.
//!
//! A host reads the used range of a worksheet in two batches: first the bounds (row count and
//! one header key per column), then the per-column values together with the declared value type
//! and number-format code. [`WorksheetGrid`] is an in-memory host; the workbook-backed host
//! lives in [`super::workbook`] (feature `excel`).

use async_trait::async_trait;

use crate::error::{DatasetError, DatasetResult};

/// Number format the host reports for cells with no explicit format.
pub const GENERAL_FORMAT: &str = "General";

/// Value type the host declares for a range, mirroring the spreadsheet's own classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Unknown,
    Empty,
    String,
    Integer,
    Double,
    Boolean,
    Error,
    RichValue,
}

impl ValueType {
    /// Integer and double encodings are both numeric.
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Double)
    }
}

/// A raw cell value as read from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Error cell, carrying the host's error literal (e.g. `#DIV/0!`).
    Error(String),
}

impl RawCell {
    /// Value type the host would declare for this cell alone.
    pub fn value_type(&self) -> ValueType {
        match self {
            RawCell::Empty => ValueType::Empty,
            RawCell::Text(s) if s.trim().is_empty() => ValueType::Empty,
            RawCell::Text(_) => ValueType::String,
            RawCell::Number(_) => ValueType::Double,
            RawCell::Bool(_) => ValueType::Boolean,
            RawCell::Error(_) => ValueType::Error,
        }
    }
}

impl std::fmt::Display for RawCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawCell::Empty => Ok(()),
            RawCell::Text(s) | RawCell::Error(s) => f.write_str(s),
            RawCell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            RawCell::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        RawCell::Text(s.to_string())
    }
}

impl From<String> for RawCell {
    fn from(s: String) -> Self {
        RawCell::Text(s)
    }
}

impl From<f64> for RawCell {
    fn from(n: f64) -> Self {
        RawCell::Number(n)
    }
}

impl From<i64> for RawCell {
    fn from(n: i64) -> Self {
        RawCell::Number(n as f64)
    }
}

impl From<bool> for RawCell {
    fn from(b: bool) -> Self {
        RawCell::Bool(b)
    }
}

/// One worksheet column as handed to feature inference.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    /// Header cell text.
    pub key: String,
    /// Data cells below the header, top to bottom.
    pub cells: Vec<RawCell>,
    /// Value type the host declares for the data region.
    pub value_type: ValueType,
    /// Number-format code of the data region.
    pub number_format: String,
}

impl RawColumn {
    pub fn new(
        key: impl Into<String>,
        cells: Vec<RawCell>,
        value_type: ValueType,
        number_format: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            cells,
            value_type,
            number_format: number_format.into(),
        }
    }

    /// Build a column from its header cell followed by its data cells.
    ///
    /// The declared type is taken from the first non-blank data cell; a column whose data cells
    /// are all blank (or that has none) is declared [`ValueType::Empty`].
    pub fn from_cells(mut cells: Vec<RawCell>, number_format: impl Into<String>) -> Self {
        let key = if cells.is_empty() {
            String::new()
        } else {
            cells.remove(0).to_string()
        };
        let value_type = cells
            .iter()
            .map(RawCell::value_type)
            .find(|t| *t != ValueType::Empty)
            .unwrap_or(ValueType::Empty);
        Self::new(key, cells, value_type, number_format)
    }
}

/// Header key and position of one column of the used range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBounds {
    /// Zero-based column offset within the used range.
    pub index: usize,
    pub key: String,
}

/// Result of the first host batch: the partition of the used range into columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bounds {
    /// Worksheet the bounds were read from.
    pub sheet: String,
    /// Number of data rows (header excluded).
    pub rows: usize,
    pub columns: Vec<ColumnBounds>,
}

/// Object model of a spreadsheet host.
#[async_trait]
pub trait SpreadsheetHost: Send + Sync {
    /// Resolves once the host can serve reads.
    async fn ready(&self) -> DatasetResult<()>;

    /// First batch: used-range dimensions and one header key per column.
    async fn load_bounds(&self) -> DatasetResult<Bounds>;

    /// Second batch: values, declared type and number format for every column in `bounds`.
    async fn load_columns(&self, bounds: &Bounds) -> DatasetResult<Vec<RawColumn>>;
}

/// In-memory worksheet acting as a spreadsheet host.
///
/// Row 0 is the header row. Ragged rows are padded with [`RawCell::Empty`].
#[derive(Debug, Clone, PartialEq)]
pub struct WorksheetGrid {
    name: String,
    rows: Vec<Vec<RawCell>>,
    formats: Vec<String>,
}

impl WorksheetGrid {
    pub fn new(name: impl Into<String>, mut rows: Vec<Vec<RawCell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, RawCell::Empty);
        }
        Self {
            name: name.into(),
            rows,
            formats: vec![GENERAL_FORMAT.to_string(); width],
        }
    }

    /// Set the number-format code of column `column`. Out-of-range columns are ignored.
    pub fn with_number_format(mut self, column: usize, code: impl Into<String>) -> Self {
        if let Some(slot) = self.formats.get_mut(column) {
            *slot = code.into();
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of columns in the used range.
    pub fn width(&self) -> usize {
        self.formats.len()
    }

    /// Number of rows in the used range, header included.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    fn column(&self, index: usize) -> DatasetResult<RawColumn> {
        let format = self.formats.get(index).ok_or_else(|| DatasetError::Host {
            message: format!(
                "column {index} is outside the used range of sheet '{}' (width {})",
                self.name,
                self.width()
            ),
        })?;
        let cells = self.rows.iter().map(|row| row[index].clone()).collect();
        Ok(RawColumn::from_cells(cells, format.clone()))
    }
}

#[async_trait]
impl SpreadsheetHost for WorksheetGrid {
    async fn ready(&self) -> DatasetResult<()> {
        Ok(())
    }

    async fn load_bounds(&self) -> DatasetResult<Bounds> {
        let columns = match self.rows.first() {
            Some(header) => header
                .iter()
                .enumerate()
                .map(|(index, cell)| ColumnBounds {
                    index,
                    key: cell.to_string(),
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(Bounds {
            sheet: self.name.clone(),
            rows: self.height().saturating_sub(1),
            columns,
        })
    }

    async fn load_columns(&self, bounds: &Bounds) -> DatasetResult<Vec<RawColumn>> {
        bounds
            .columns
            .iter()
            .map(|col| self.column(col.index))
            .collect()
    }
}
