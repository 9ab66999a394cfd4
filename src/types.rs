//! Core data model types.
//!
//! A [`Dataset`] is the triple handed to consumers: the per-column [`Feature`]s, the
//! [`Shape`] of the data region and the row [`Data`] itself (already materialized, or a deferred
//! producer that performs the read when awaited).

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::DatasetResult;

/// A single cell value in a [`Row`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/blank value.
    Null,
    /// UTF-8 string.
    Utf8(String),
    /// 64-bit float.
    Float64(f64),
    /// Zone-less calendar date-time (decoded from a serial date number).
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Utf8(s) => f.write_str(s),
            Value::Float64(v) => write!(f, "{v}"),
            Value::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

/// A row maps a column key to its cell value.
pub type Row = BTreeMap<String, Value>;

/// Bounds of a continuous feature.
///
/// Serialized as a two-element `[min, max]` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureRange {
    /// Plain numeric bounds.
    Number(f64, f64),
    /// Bounds of a date-formatted column.
    Date(NaiveDateTime, NaiveDateTime),
}

/// Statistical type and value domain of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Feature {
    /// Class data: the distinct values of the column, in first-seen order.
    Discrete { key: String, modalities: Vec<String> },
    /// Numeric or date data with its `(min, max)` range.
    Continuous { key: String, range: FeatureRange },
}

impl Feature {
    /// Column key this feature describes.
    pub fn key(&self) -> &str {
        match self {
            Feature::Discrete { key, .. } | Feature::Continuous { key, .. } => key,
        }
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self, Feature::Discrete { .. })
    }

    pub fn is_continuous(&self) -> bool {
        matches!(self, Feature::Continuous { .. })
    }

    /// Modalities of a discrete feature.
    pub fn modalities(&self) -> Option<&[String]> {
        match self {
            Feature::Discrete { modalities, .. } => Some(modalities),
            Feature::Continuous { .. } => None,
        }
    }

    /// Range of a continuous feature.
    pub fn range(&self) -> Option<&FeatureRange> {
        match self {
            Feature::Discrete { .. } => None,
            Feature::Continuous { range, .. } => Some(range),
        }
    }
}

/// `(rows, columns)` of a dataset, numpy-style. `rows` never counts the header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub columns: usize,
}

impl Shape {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, columns): (usize, usize)) -> Self {
        Self::new(rows, columns)
    }
}

/// Boxed future returned by a [`DeferredRows`] producer.
pub type RowsFuture = Pin<Box<dyn Future<Output = DatasetResult<Vec<Row>>> + Send>>;

/// Zero-argument async producer of rows. Each call performs a fresh read.
#[derive(Clone)]
pub struct DeferredRows {
    producer: Arc<dyn Fn() -> RowsFuture + Send + Sync>,
}

impl DeferredRows {
    pub fn new<F, Fut>(producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DatasetResult<Vec<Row>>> + Send + 'static,
    {
        Self {
            producer: Arc::new(move || Box::pin(producer())),
        }
    }

    /// Run the producer.
    pub async fn fetch(&self) -> DatasetResult<Vec<Row>> {
        (self.producer)().await
    }
}

impl fmt::Debug for DeferredRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredRows").finish_non_exhaustive()
    }
}

/// Row data of a dataset.
#[derive(Debug, Clone)]
pub enum Data {
    /// Rows already in memory.
    Materialized(Vec<Row>),
    /// Rows read on demand (e.g. from a live spreadsheet host).
    Deferred(DeferredRows),
}

impl Data {
    /// Produce the rows, running the deferred read if needed.
    pub async fn resolve(&self) -> DatasetResult<Vec<Row>> {
        match self {
            Data::Materialized(rows) => Ok(rows.clone()),
            Data::Deferred(producer) => producer.fetch().await,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Data::Deferred(_))
    }
}

impl Default for Data {
    fn default() -> Self {
        Data::Materialized(Vec::new())
    }
}

/// Features, shape and data of one read. Immutable once built; a new read builds a new one.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub features: Vec<Feature>,
    pub shape: Shape,
    pub data: Data,
}

impl Dataset {
    pub fn new(features: Vec<Feature>, shape: impl Into<Shape>, data: Data) -> Self {
        Self {
            features,
            shape: shape.into(),
            data,
        }
    }

    /// Look up a feature by key.
    pub fn feature(&self, key: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_serialize_with_type_tag() {
        let discrete = Feature::Discrete {
            key: "Color".to_string(),
            modalities: vec!["Red".to_string(), "Blue".to_string()],
        };
        let continuous = Feature::Continuous {
            key: "Price".to_string(),
            range: FeatureRange::Number(10.0, 30.0),
        };

        assert_eq!(
            serde_json::to_value(&discrete).unwrap(),
            serde_json::json!({"type": "discrete", "key": "Color", "modalities": ["Red", "Blue"]})
        );
        assert_eq!(
            serde_json::to_value(&continuous).unwrap(),
            serde_json::json!({"type": "continuous", "key": "Price", "range": [10.0, 30.0]})
        );
    }

    #[test]
    fn feature_accessors_match_variant() {
        let f = Feature::Continuous {
            key: "x".to_string(),
            range: FeatureRange::Number(1.0, 2.0),
        };
        assert_eq!(f.key(), "x");
        assert!(f.is_continuous());
        assert!(f.modalities().is_none());
        assert_eq!(f.range(), Some(&FeatureRange::Number(1.0, 2.0)));
    }

    #[test]
    fn deferred_data_runs_producer_on_each_resolve() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = Arc::clone(&calls);
        let data = Data::Deferred(DeferredRows::new(move || {
            let calls = Arc::clone(&calls2);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let mut row = Row::new();
                row.insert("a".to_string(), Value::Float64(1.0));
                Ok(vec![row])
            }
        }));

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let first = rt.block_on(data.resolve()).unwrap();
        let second = rt.block_on(data.resolve()).unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(data.is_deferred());
    }
}
