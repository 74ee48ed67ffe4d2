use crate::data::history::HistoryStore;
use crate::data::snapshot::{Channel, TelemetrySnapshot};
use crate::data::LatestSnapshot;
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Columns of the periodic log, after the timestamp.
pub const LOG_CHANNELS: [Channel; 5] = [
    Channel::VMain,
    Channel::ITotal,
    Channel::IProbe1,
    Channel::IAcs712,
    Channel::IAcs758,
];

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("could not open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not write row: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not flush {path}: {source}")]
    Flush {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("could not create {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not write export: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not flush {path}: {source}")]
    Flush {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    NothingToExport,
    Written { rows: usize },
}

/// Append one log row for `snapshot`, writing the header first if the file
/// does not exist yet.
pub fn append_log_row(
    path: &Path,
    snapshot: &TelemetrySnapshot,
    time: DateTime<Local>,
) -> Result<(), PersistError> {
    let new_file = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| PersistError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let mut writer = csv::Writer::from_writer(file);
    if new_file {
        let mut header = vec!["Time"];
        header.extend(LOG_CHANNELS.iter().map(|c| c.name()));
        writer.write_record(&header)?;
    }

    let mut row = vec![time.format(TIMESTAMP_FORMAT).to_string()];
    row.extend(LOG_CHANNELS.iter().map(|c| log_field(snapshot, *c)));
    writer.write_record(&row)?;

    writer.flush().map_err(|source| PersistError::Flush {
        path: path.to_path_buf(),
        source,
    })
}

/// Raw field as received; numbers and strings verbatim, anything else zero.
fn log_field(snapshot: &TelemetrySnapshot, channel: Channel) -> String {
    match snapshot.raw(channel.name()) {
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        _ => "0".to_string(),
    }
}

/// Write every tracked series as a column. Rows stop at the shortest series.
pub fn export_history(history: &HistoryStore, path: &Path) -> Result<ExportOutcome, ExportError> {
    if history.is_empty() {
        return Ok(ExportOutcome::NothingToExport);
    }

    let file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(file);

    let header: Vec<&str> = history.channels().map(|c| c.name()).collect();
    writer.write_record(&header)?;

    let mut rows = 0;
    for row in history.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
        rows += 1;
    }

    writer.flush().map_err(|source| ExportError::Flush {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ExportOutcome::Written { rows })
}

/// Fixed-cadence task that logs the latest snapshot, independent of polling.
pub struct Persister {
    path: PathBuf,
    every: Duration,
    latest: LatestSnapshot,
}

impl Persister {
    pub fn new(path: PathBuf, every: Duration, latest: LatestSnapshot) -> Self {
        Self {
            path,
            every,
            latest,
        }
    }

    /// Run one tick. Returns whether a row was written.
    pub fn tick(&self) -> bool {
        // Read at fire time so the row is never older than the slot.
        let snapshot = match self.latest.borrow().clone() {
            Some(snapshot) => snapshot,
            None => return false,
        };

        match append_log_row(&self.path, &snapshot, Local::now()) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("failed to append to {}: {}", self.path.display(), err);
                false
            }
        }
    }

    pub fn spawn(self) -> PersisterHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.every, self.every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!("persisting to {} every {:?}", self.path.display(), self.every);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.tick();
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });
        PersisterHandle {
            stop: stop_tx,
            task,
        }
    }
}

pub struct PersisterHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PersisterHandle {
    pub async fn stop(self) {
        self.stop.send_replace(true);
        if let Err(err) = self.task.await {
            tracing::error!("persister task ended abnormally: {}", err);
        }
    }
}
