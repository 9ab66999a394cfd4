//! Dataset over rows already in memory.
//!
//! Feature inference here is deliberately simpler than [`crate::inference`]: each column's type
//! is taken from the first row alone, with no blank handling and no date-format detection.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crate::error::{DatasetError, DatasetResult};
use crate::types::{Data, Dataset, Feature, FeatureRange, Row, Shape, Value};

/// A [`Dataset`] that serves fixed, materialized rows.
#[derive(Debug, Clone)]
pub struct MockDataset {
    dataset: Dataset,
}

/// One JSON object, keys in document order.
type JsonObject = serde_json::Map<String, serde_json::Value>;

impl MockDataset {
    /// Build a mock dataset from rows. Column keys come from the first row, in key order.
    ///
    /// Use [`Self::with_columns`] when the source has its own column order.
    pub fn new(rows: Vec<Row>) -> DatasetResult<Self> {
        let columns: Vec<String> = rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        Self::with_columns(columns, rows)
    }

    /// Build a mock dataset whose features follow `columns`.
    pub fn with_columns(columns: Vec<String>, rows: Vec<Row>) -> DatasetResult<Self> {
        let features = infer_mock_features(&columns, &rows)?;
        let shape = Shape::new(rows.len(), features.len());
        Ok(Self {
            dataset: Dataset::new(features, shape, Data::Materialized(rows)),
        })
    }

    /// Build from a JSON array of flat objects whose values are strings, numbers or `null`.
    ///
    /// Features follow the key order of the first object.
    pub fn from_json_str(json: &str) -> DatasetResult<Self> {
        let objects: Vec<JsonObject> = serde_json::from_str(json)?;
        Self::from_json_objects(objects)
    }

    /// Like [`Self::from_json_str`], reading from `reader`.
    pub fn from_json_reader<R: Read>(reader: R) -> DatasetResult<Self> {
        let objects: Vec<JsonObject> = serde_json::from_reader(reader)?;
        Self::from_json_objects(objects)
    }

    fn from_json_objects(objects: Vec<JsonObject>) -> DatasetResult<Self> {
        let columns: Vec<String> = objects
            .first()
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default();
        let rows = objects
            .into_iter()
            .map(|obj| serde_json::from_value::<Row>(serde_json::Value::Object(obj)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::with_columns(columns, rows)
    }

    /// Build from a CSV file with a header row.
    pub fn from_csv_path(path: impl AsRef<Path>) -> DatasetResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;
        Self::from_csv_reader(&mut rdr)
    }

    /// Build from an existing CSV reader. Features follow the header order.
    ///
    /// Empty fields become [`Value::Null`], numeric fields [`Value::Float64`], anything else
    /// [`Value::Utf8`].
    pub fn from_csv_reader<R: Read>(rdr: &mut csv::Reader<R>) -> DatasetResult<Self> {
        let headers = rdr.headers()?.clone();
        let columns: Vec<String> = headers.iter().map(str::to_string).collect();

        let mut rows: Vec<Row> = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let row = columns
                .iter()
                .enumerate()
                .map(|(idx, key)| (key.clone(), csv_value(record.get(idx).unwrap_or(""))))
                .collect();
            rows.push(row);
        }

        Self::with_columns(columns, rows)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }
}

fn csv_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Value::Float64(n),
        _ => Value::Utf8(raw.to_string()),
    }
}

/// Infer one feature per entry of `columns`, typed by the first row's value for that key.
///
/// - [`Value::Utf8`] first: discrete, over every row's value rendered as text (`null` as `""`).
/// - [`Value::Float64`] / [`Value::DateTime`] first: continuous over the values of that kind;
///   nulls and missing keys are skipped, any other kind is an [`DatasetError::InvalidCell`].
/// - [`Value::Null`] or missing first: [`DatasetError::EmptyHeader`].
///
/// A key listed twice is a [`DatasetError::DuplicateKey`].
pub fn infer_mock_features(columns: &[String], rows: &[Row]) -> DatasetResult<Vec<Feature>> {
    let first = rows.first().ok_or(DatasetError::EmptyDataset)?;
    let mut seen: HashSet<&str> = HashSet::with_capacity(columns.len());
    columns
        .iter()
        .map(|key| {
            if !seen.insert(key.as_str()) {
                return Err(DatasetError::DuplicateKey { key: key.clone() });
            }
            mock_feature(key, first.get(key).unwrap_or(&Value::Null), rows)
        })
        .collect()
}

fn mock_feature(key: &str, first: &Value, rows: &[Row]) -> DatasetResult<Feature> {
    let key_owned = key.to_string();
    match first {
        Value::Null => Err(DatasetError::EmptyHeader { column: key_owned }),
        Value::Utf8(_) => {
            let mut seen: HashSet<String> = HashSet::new();
            let mut modalities = Vec::new();
            for row in rows {
                let text = row.get(key).map(Value::to_string).unwrap_or_default();
                if seen.insert(text.clone()) {
                    modalities.push(text);
                }
            }
            Ok(Feature::Discrete {
                key: key_owned,
                modalities,
            })
        }
        Value::Float64(_) => {
            let (min, max) = column_bounds(key, rows, |v| match v {
                Value::Float64(n) => Some(*n),
                _ => None,
            })?;
            Ok(Feature::Continuous {
                key: key_owned,
                range: FeatureRange::Number(min, max),
            })
        }
        Value::DateTime(_) => {
            let (min, max) = column_bounds(key, rows, |v| match v {
                Value::DateTime(dt) => Some(*dt),
                _ => None,
            })?;
            Ok(Feature::Continuous {
                key: key_owned,
                range: FeatureRange::Date(min, max),
            })
        }
    }
}

fn column_bounds<T, F>(key: &str, rows: &[Row], extract: F) -> DatasetResult<(T, T)>
where
    T: PartialOrd + Copy,
    F: Fn(&Value) -> Option<T>,
{
    let mut acc: Option<(T, T)> = None;
    for (idx0, row) in rows.iter().enumerate() {
        let value = match row.get(key) {
            None | Some(Value::Null) => continue,
            Some(v) => v,
        };
        let v = extract(value).ok_or_else(|| DatasetError::InvalidCell {
            row: idx0 + 1,
            column: key.to_string(),
            raw: value.to_string(),
            message: "value kind differs from the column's first row".to_string(),
        })?;
        acc = Some(match acc {
            Some((lo, hi)) => (
                if v < lo { v } else { lo },
                if v > hi { v } else { hi },
            ),
            None => (v, v),
        });
    }
    acc.ok_or_else(|| DatasetError::EmptyHeader {
        column: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn first_row_type_decides_the_feature() {
        let rows = vec![
            row(&[("name", Value::Utf8("a".into())), ("score", Value::Float64(2.0))]),
            row(&[("name", Value::Utf8("b".into())), ("score", Value::Float64(-1.0))]),
            row(&[("name", Value::Utf8("a".into())), ("score", Value::Float64(5.0))]),
        ];
        let mock = MockDataset::new(rows).unwrap();
        let ds = mock.dataset();

        assert_eq!(ds.shape, Shape::new(3, 2));
        assert_eq!(
            ds.feature("name").unwrap().modalities().unwrap(),
            ["a".to_string(), "b".to_string()].as_slice()
        );
        assert_eq!(
            ds.feature("score").unwrap().range(),
            Some(&FeatureRange::Number(-1.0, 5.0))
        );
    }

    #[test]
    fn no_rows_is_an_error() {
        assert!(matches!(
            MockDataset::new(Vec::new()),
            Err(DatasetError::EmptyDataset)
        ));
    }

    #[test]
    fn mixed_kinds_in_a_continuous_column_fail() {
        let rows = vec![
            row(&[("x", Value::Float64(1.0))]),
            row(&[("x", Value::Utf8("oops".into()))]),
        ];
        match MockDataset::new(rows).unwrap_err() {
            DatasetError::InvalidCell { row, column, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn features_follow_the_given_column_order() {
        let rows = vec![row(&[
            ("zeta", Value::Float64(1.0)),
            ("alpha", Value::Utf8("a".into())),
        ])];
        let columns = vec!["zeta".to_string(), "alpha".to_string()];
        let features = infer_mock_features(&columns, &rows).unwrap();
        let keys: Vec<&str> = features.iter().map(Feature::key).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);

        let missing = vec!["zeta".to_string(), "absent".to_string()];
        assert!(matches!(
            infer_mock_features(&missing, &rows),
            Err(DatasetError::EmptyHeader { column }) if column == "absent"
        ));

        let twice = vec!["zeta".to_string(), "zeta".to_string()];
        assert!(matches!(
            infer_mock_features(&twice, &rows),
            Err(DatasetError::DuplicateKey { key }) if key == "zeta"
        ));
    }

    #[test]
    fn csv_fields_are_typed() {
        assert_eq!(csv_value(""), Value::Null);
        assert_eq!(csv_value(" 4.5 "), Value::Float64(4.5));
        assert_eq!(csv_value("red"), Value::Utf8("red".to_string()));
        assert_eq!(csv_value("NaN"), Value::Utf8("NaN".to_string()));
    }
}
