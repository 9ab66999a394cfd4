//! Column classification for spreadsheet data.

use std::collections::HashSet;

use tracing::debug;

use crate::adapters::host::{RawCell, RawColumn, ValueType};
use crate::error::{DatasetError, DatasetResult};
use crate::types::{Feature, FeatureRange, Row, Value};

use super::date::{decode_serial, is_date_format};

/// A classified column: its feature plus its normalized cell values, top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct InferredColumn {
    pub feature: Feature,
    pub values: Vec<Value>,
}

/// Classify one column.
///
/// Rules, by the host-declared value type of the data region:
///
/// - `Empty`: fails with [`DatasetError::EmptyHeader`].
/// - `Integer`/`Double`: continuous. Blank cells are skipped for the range and become
///   [`Value::Null`]. If the number format is a date format, the range endpoints and every
///   value are decoded with [`decode_serial`].
/// - `String`: discrete, modalities are the distinct cell texts in first-seen order.
/// - anything else: fails with [`DatasetError::UnsupportedValueType`].
pub fn infer_column(column: &RawColumn) -> DatasetResult<InferredColumn> {
    match column.value_type {
        ValueType::Empty => Err(DatasetError::EmptyHeader {
            column: column.key.clone(),
        }),
        ValueType::Integer | ValueType::Double => infer_continuous(column),
        ValueType::String => Ok(infer_discrete(column)),
        other => Err(DatasetError::UnsupportedValueType {
            column: column.key.clone(),
            value_type: other,
        }),
    }
}

/// Classify one column, keeping only its feature.
pub fn infer_feature(column: &RawColumn) -> DatasetResult<Feature> {
    infer_column(column).map(|c| c.feature)
}

/// Classify every column of a read.
///
/// Fails as a whole on the first column that cannot be classified, or when two columns share a
/// key.
pub fn infer_columns(columns: &[RawColumn]) -> DatasetResult<Vec<InferredColumn>> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(columns.len());
    columns
        .iter()
        .map(|column| {
            if !seen.insert(column.key.as_str()) {
                return Err(DatasetError::DuplicateKey {
                    key: column.key.clone(),
                });
            }
            infer_column(column)
        })
        .collect()
}

/// Assemble rows from classified columns. Shorter columns are padded with [`Value::Null`].
pub fn rows_from_columns(columns: &[InferredColumn]) -> Vec<Row> {
    let height = columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
    (0..height)
        .map(|i| {
            columns
                .iter()
                .map(|c| {
                    let value = c.values.get(i).cloned().unwrap_or(Value::Null);
                    (c.feature.key().to_string(), value)
                })
                .collect()
        })
        .collect()
}

fn infer_continuous(column: &RawColumn) -> DatasetResult<InferredColumn> {
    let numbers = column
        .cells
        .iter()
        .enumerate()
        // Report 1-based row numbers; the header is row 1.
        .map(|(idx0, cell)| numeric_cell(idx0 + 2, &column.key, cell))
        .collect::<DatasetResult<Vec<Option<f64>>>>()?;

    let (min, max) = numbers
        .iter()
        .flatten()
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })
        .ok_or_else(|| DatasetError::EmptyHeader {
            column: column.key.clone(),
        })?;

    let is_date = is_date_format(&column.number_format);
    let (range, values) = if is_date {
        let values = numbers
            .iter()
            .map(|n| match n {
                Some(v) => decode_serial(*v).map(Value::DateTime),
                None => Ok(Value::Null),
            })
            .collect::<DatasetResult<Vec<_>>>()?;
        let range = FeatureRange::Date(decode_serial(min)?, decode_serial(max)?);
        (range, values)
    } else {
        let values = numbers
            .iter()
            .map(|n| n.map(Value::Float64).unwrap_or(Value::Null))
            .collect();
        (FeatureRange::Number(min, max), values)
    };

    debug!(
        column = %column.key,
        format = %column.number_format,
        is_date,
        "classified column as continuous"
    );

    Ok(InferredColumn {
        feature: Feature::Continuous {
            key: column.key.clone(),
            range,
        },
        values,
    })
}

fn numeric_cell(row: usize, column: &str, cell: &RawCell) -> DatasetResult<Option<f64>> {
    let invalid = |message: &str| DatasetError::InvalidCell {
        row,
        column: column.to_string(),
        raw: cell.to_string(),
        message: message.to_string(),
    };

    let n = match cell {
        RawCell::Empty => return Ok(None),
        RawCell::Text(s) if s.trim().is_empty() => return Ok(None),
        RawCell::Number(n) => *n,
        RawCell::Text(s) => s.trim().parse::<f64>().map_err(|e| invalid(&e.to_string()))?,
        RawCell::Bool(_) | RawCell::Error(_) => return Err(invalid("expected number")),
    };

    if n.is_finite() {
        Ok(Some(n))
    } else {
        Err(invalid("expected finite number"))
    }
}

fn infer_discrete(column: &RawColumn) -> InferredColumn {
    let texts: Vec<String> = column.cells.iter().map(RawCell::to_string).collect();

    let mut modalities: Vec<String> = Vec::new();
    {
        let mut seen: HashSet<&str> = HashSet::new();
        for text in &texts {
            if seen.insert(text.as_str()) {
                modalities.push(text.clone());
            }
        }
    }

    debug!(
        column = %column.key,
        modalities = modalities.len(),
        "classified column as discrete"
    );

    InferredColumn {
        feature: Feature::Discrete {
            key: column.key.clone(),
            modalities,
        },
        values: texts.into_iter().map(Value::Utf8).collect(),
    }
}
