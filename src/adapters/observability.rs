use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::DatasetError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the source data shape is unsupported).
    Error,
    /// Critical error (host or I/O failures).
    Critical,
}

/// Context about a dataset load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadContext {
    /// Sequence number of the load on its adapter, starting at 1.
    pub load_id: u64,
    /// Worksheet read, once the host has reported its bounds.
    pub sheet: Option<String>,
}

/// Minimal stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows (header excluded).
    pub rows: usize,
    /// Classified columns.
    pub columns: usize,
}

/// Observer interface for dataset load outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait DatasetObserver: Send + Sync {
    /// Called when a load succeeds.
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    /// Called when a load fails.
    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &DatasetError) {}

    /// Called when a load failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &DatasetError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Severity of a load failure: host and I/O faults are critical, unsupported data is an error.
pub fn severity_for_error(e: &DatasetError) -> LoadSeverity {
    match e {
        DatasetError::Io(_) | DatasetError::Host { .. } | DatasetError::HostNotReady => {
            LoadSeverity::Critical
        }
        #[cfg(feature = "excel")]
        DatasetError::Excel(_) => LoadSeverity::Critical,
        DatasetError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => LoadSeverity::Critical,
            _ => LoadSeverity::Error,
        },
        DatasetError::Json(err) if err.is_io() => LoadSeverity::Critical,
        DatasetError::NestedProvider | DatasetError::OutsideContext { .. } => LoadSeverity::Warning,
        _ => LoadSeverity::Error,
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn DatasetObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn DatasetObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl DatasetObserver for CompositeObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &DatasetError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &DatasetError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

fn sheet_label(ctx: &LoadContext) -> &str {
    ctx.sheet.as_deref().unwrap_or("?")
}

/// Logs load events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl DatasetObserver for StdErrObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        eprintln!(
            "[dataset][ok] load={} sheet={} rows={} columns={}",
            ctx.load_id,
            sheet_label(ctx),
            stats.rows,
            stats.columns
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &DatasetError) {
        eprintln!(
            "[dataset][{:?}] load={} sheet={} err={}",
            severity,
            ctx.load_id,
            sheet_label(ctx),
            error
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &DatasetError) {
        eprintln!(
            "[ALERT][dataset][{:?}] load={} sheet={} err={}",
            severity,
            ctx.load_id,
            sheet_label(ctx),
            error
        );
    }
}

/// Appends load events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl DatasetObserver for FileObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.append_line(&format!(
            "{} ok load={} sheet={} rows={} columns={}",
            unix_ts(),
            ctx.load_id,
            sheet_label(ctx),
            stats.rows,
            stats.columns
        ));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &DatasetError) {
        self.append_line(&format!(
            "{} fail severity={:?} load={} sheet={} err={}",
            unix_ts(),
            severity,
            ctx.load_id,
            sheet_label(ctx),
            error
        ));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &DatasetError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} load={} sheet={} err={}",
            unix_ts(),
            severity,
            ctx.load_id,
            sheet_label(ctx),
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_faults_are_critical_and_data_faults_are_errors() {
        assert_eq!(
            severity_for_error(&DatasetError::HostNotReady),
            LoadSeverity::Critical
        );
        assert_eq!(
            severity_for_error(&DatasetError::Host {
                message: "boom".to_string()
            }),
            LoadSeverity::Critical
        );
        assert_eq!(
            severity_for_error(&DatasetError::EmptyHeader {
                column: "a".to_string()
            }),
            LoadSeverity::Error
        );
        assert_eq!(
            severity_for_error(&DatasetError::DuplicateKey {
                key: "a".to_string()
            }),
            LoadSeverity::Error
        );
    }

    #[test]
    fn stderr_observer_handles_every_callback() {
        let obs: Arc<dyn DatasetObserver> = Arc::new(StdErrObserver);
        let before_bounds = LoadContext {
            load_id: 7,
            sheet: None,
        };
        obs.on_success(&before_bounds, LoadStats { rows: 0, columns: 0 });
        obs.on_failure(&before_bounds, LoadSeverity::Critical, &DatasetError::HostNotReady);
        obs.on_alert(&before_bounds, LoadSeverity::Critical, &DatasetError::HostNotReady);
        assert_eq!(sheet_label(&before_bounds), "?");
    }

    #[test]
    fn composite_without_observers_is_a_no_op() {
        let obs = CompositeObserver::default();
        let ctx = LoadContext {
            load_id: 1,
            sheet: Some("Sheet1".to_string()),
        };
        obs.on_failure(&ctx, LoadSeverity::Error, &DatasetError::EmptyDataset);
        assert_eq!(format!("{obs:?}"), "CompositeObserver { observers_len: 0 }");
    }

    #[test]
    fn file_observer_appends_lines() {
        let path = std::env::temp_dir().join(format!(
            "lupa-dataset-observer-{}.log",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let obs = FileObserver::new(&path);
        let ctx = LoadContext {
            load_id: 1,
            sheet: Some("Sheet1".to_string()),
        };
        obs.on_success(&ctx, LoadStats { rows: 2, columns: 3 });
        obs.on_failure(&ctx, LoadSeverity::Error, &DatasetError::EmptyDataset);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("ok load=1 sheet=Sheet1 rows=2 columns=3"));
        assert!(lines[1].contains("fail severity=Error"));

        let _ = std::fs::remove_file(&path);
    }
}
