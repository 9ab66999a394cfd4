//! Dataset backed by a live spreadsheet host.
//!
//! [`ExcelDataset::load`] waits for the host, reads the used range in two batches (bounds, then
//! column values/types/formats), classifies every column and publishes a new [`Dataset`]
//! snapshot. The snapshot's row data is deferred: resolving it performs a fresh values read and
//! normalizes cells with the same inference rules as the features.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::error::DatasetResult;
use crate::inference::{infer_columns, rows_from_columns};
use crate::types::{Data, Dataset, DeferredRows, Feature, Row, Shape};

use super::host::{Bounds, SpreadsheetHost};
use super::observability::{
    severity_for_error, DatasetObserver, LoadContext, LoadSeverity, LoadStats,
};

/// Options controlling [`ExcelDataset`] loads.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ExcelDatasetOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn DatasetObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl fmt::Debug for ExcelDatasetOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcelDatasetOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ExcelDatasetOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

/// A dataset read from the active worksheet of a [`SpreadsheetHost`].
pub struct ExcelDataset<H> {
    host: Arc<H>,
    options: ExcelDatasetOptions,
    current: RwLock<Arc<Dataset>>,
    loads: AtomicU64,
}

impl<H> fmt::Debug for ExcelDataset<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcelDataset")
            .field("options", &self.options)
            .field("loads", &self.loads.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<H: SpreadsheetHost + 'static> ExcelDataset<H> {
    pub fn new(host: H) -> Self {
        Self::with_options(host, ExcelDatasetOptions::default())
    }

    pub fn with_options(host: H, options: ExcelDatasetOptions) -> Self {
        Self {
            host: Arc::new(host),
            options,
            current: RwLock::new(Arc::new(Dataset::default())),
            loads: AtomicU64::new(0),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Current snapshot. Before the first successful load it has no features, shape `(0, 0)`
    /// and no rows.
    pub fn snapshot(&self) -> Arc<Dataset> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Read the worksheet and replace the current snapshot.
    ///
    /// On failure the previous snapshot stays in place. When an observer is configured, this
    /// reports `on_success` with row/column stats, or `on_failure` (and `on_alert` at or above
    /// `options.alert_at_or_above`) with a computed severity.
    pub async fn load(&self) -> DatasetResult<Arc<Dataset>> {
        let load_id = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        let mut ctx = LoadContext {
            load_id,
            sheet: None,
        };

        let result = self.read(&mut ctx).await;

        match &result {
            Ok(ds) => {
                debug!(
                    load_id,
                    sheet = ?ctx.sheet,
                    rows = ds.shape.rows,
                    columns = ds.shape.columns,
                    "dataset loaded"
                );
                if let Some(obs) = self.options.observer.as_ref() {
                    obs.on_success(
                        &ctx,
                        LoadStats {
                            rows: ds.shape.rows,
                            columns: ds.shape.columns,
                        },
                    );
                }
            }
            Err(e) => {
                let sev = severity_for_error(e);
                warn!(load_id, sheet = ?ctx.sheet, severity = ?sev, error = %e, "dataset load failed");
                if let Some(obs) = self.options.observer.as_ref() {
                    obs.on_failure(&ctx, sev, e);
                    if sev >= self.options.alert_at_or_above {
                        obs.on_alert(&ctx, sev, e);
                    }
                }
            }
        }

        let dataset = Arc::new(result?);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&dataset);
        Ok(dataset)
    }

    async fn read(&self, ctx: &mut LoadContext) -> DatasetResult<Dataset> {
        self.host.ready().await?;

        let bounds = self.host.load_bounds().await?;
        ctx.sheet = Some(bounds.sheet.clone());

        let features = read_features(self.host.as_ref(), &bounds).await?;
        let shape = Shape::new(bounds.rows, features.len());
        let data = Data::Deferred(deferred_rows(Arc::clone(&self.host), Arc::new(bounds)));

        Ok(Dataset::new(features, shape, data))
    }
}

/// Classify every column within `bounds`.
pub async fn read_features<H>(host: &H, bounds: &Bounds) -> DatasetResult<Vec<Feature>>
where
    H: SpreadsheetHost + ?Sized,
{
    let columns = host.load_columns(bounds).await?;
    Ok(infer_columns(&columns)?
        .into_iter()
        .map(|c| c.feature)
        .collect())
}

/// Read the rows within `bounds`, normalized per column.
pub async fn read_rows<H>(host: &H, bounds: &Bounds) -> DatasetResult<Vec<Row>>
where
    H: SpreadsheetHost + ?Sized,
{
    let columns = host.load_columns(bounds).await?;
    let inferred = infer_columns(&columns)?;
    Ok(rows_from_columns(&inferred))
}

fn deferred_rows<H>(host: Arc<H>, bounds: Arc<Bounds>) -> DeferredRows
where
    H: SpreadsheetHost + 'static,
{
    DeferredRows::new(move || {
        let host = Arc::clone(&host);
        let bounds = Arc::clone(&bounds);
        async move { read_rows(host.as_ref(), &bounds).await }
    })
}
