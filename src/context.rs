//! Scoped access to a [`Dataset`].
//!
//! A [`DatasetContext`] is passed down to consumer code explicitly. The root context has no
//! dataset; [`DatasetContext::provide`] returns a child context with one, and refuses to do so
//! if a dataset is already in scope.
//!
//! ```rust
//! use lupa_dataset::context::DatasetContext;
//! use lupa_dataset::types::{Data, Dataset};
//!
//! # fn main() -> Result<(), lupa_dataset::DatasetError> {
//! let dataset = Dataset::new(Vec::new(), (0, 0), Data::default());
//!
//! let columns = DatasetContext::root().render(&dataset, |cx| {
//!     // Consumers read through the scope they were handed.
//!     cx.use_shape().map(|shape| shape.columns)
//! })??;
//! assert_eq!(columns, 0);
//! # Ok(())
//! # }
//! ```

use crate::error::{DatasetError, DatasetResult};
use crate::types::{Data, Dataset, Feature, Shape};

/// Scope handed to consumers of a dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetContext<'a> {
    dataset: Option<&'a Dataset>,
}

impl DatasetContext<'static> {
    /// A scope with no dataset.
    pub fn root() -> Self {
        Self { dataset: None }
    }
}

impl<'a> DatasetContext<'a> {
    /// Return a child scope exposing `dataset`.
    ///
    /// Fails with [`DatasetError::NestedProvider`] if this scope already exposes one.
    pub fn provide<'b>(&self, dataset: &'b Dataset) -> DatasetResult<DatasetContext<'b>> {
        if self.in_dataset_context() {
            return Err(DatasetError::NestedProvider);
        }
        Ok(DatasetContext {
            dataset: Some(dataset),
        })
    }

    /// Provide `dataset` and run `children` inside the new scope.
    pub fn render<R, F>(&self, dataset: &Dataset, children: F) -> DatasetResult<R>
    where
        F: FnOnce(&DatasetContext<'_>) -> R,
    {
        let scope = self.provide(dataset)?;
        Ok(children(&scope))
    }

    /// Returns true if a dataset is in scope.
    pub fn in_dataset_context(&self) -> bool {
        self.dataset.is_some()
    }

    /// Row data of the dataset in scope: materialized rows or a deferred producer.
    pub fn use_data(&self) -> DatasetResult<&'a Data> {
        self.current("use_data").map(|d| &d.data)
    }

    /// Features of the dataset in scope.
    pub fn use_features(&self) -> DatasetResult<&'a [Feature]> {
        self.current("use_features").map(|d| d.features.as_slice())
    }

    /// Shape of the dataset in scope.
    pub fn use_shape(&self) -> DatasetResult<Shape> {
        self.current("use_shape").map(|d| d.shape)
    }

    fn current(&self, accessor: &'static str) -> DatasetResult<&'a Dataset> {
        self.dataset
            .ok_or(DatasetError::OutsideContext { accessor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeatureRange;

    fn dataset() -> Dataset {
        Dataset::new(
            vec![Feature::Continuous {
                key: "x".to_string(),
                range: FeatureRange::Number(0.0, 1.0),
            }],
            (3, 1),
            Data::Materialized(Vec::new()),
        )
    }

    #[test]
    fn accessors_fail_outside_a_provider() {
        let root = DatasetContext::root();
        assert!(!root.in_dataset_context());
        assert!(matches!(
            root.use_data(),
            Err(DatasetError::OutsideContext { accessor: "use_data" })
        ));
        assert!(matches!(
            root.use_features(),
            Err(DatasetError::OutsideContext { accessor: "use_features" })
        ));
        assert!(matches!(
            root.use_shape(),
            Err(DatasetError::OutsideContext { accessor: "use_shape" })
        ));
    }

    #[test]
    fn accessors_read_the_provided_dataset() {
        let ds = dataset();
        let cx = DatasetContext::root().provide(&ds).unwrap();
        assert!(cx.in_dataset_context());
        assert_eq!(cx.use_shape().unwrap(), Shape::new(3, 1));
        assert_eq!(cx.use_features().unwrap()[0].key(), "x");
        assert!(!cx.use_data().unwrap().is_deferred());
    }

    #[test]
    fn nested_provider_is_rejected() {
        let outer = dataset();
        let inner = dataset();
        let result = DatasetContext::root().render(&outer, |cx| cx.provide(&inner).map(|_| ()));
        assert!(matches!(result, Ok(Err(DatasetError::NestedProvider))));
    }

    #[test]
    fn sibling_providers_are_independent() {
        let a = dataset();
        let b = dataset();
        let root = DatasetContext::root();
        assert!(root.provide(&a).is_ok());
        assert!(root.provide(&b).is_ok());
    }
}
