use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use winpex_common::error::{Result, WinpexError};

use crate::{
    source::{CounterQuery, TelemetrySource},
    types::{CounterSet, PerfObject},
};

const SNAPSHOT_EXTENSION: &str = "json";

/// Telemetry source reading one JSON snapshot file per performance object
/// (`<root>/<object name>.json`). Files are re-read on every scrape, so an
/// external agent can refresh them in place.
#[derive(Debug, Clone)]
pub struct SnapshotDirSource {
    root: PathBuf,
}

impl SnapshotDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, object: &str) -> PathBuf {
        self.root.join(format!("{object}.{SNAPSHOT_EXTENSION}"))
    }
}

impl TelemetrySource for SnapshotDirSource {
    fn snapshot(&self, object: &str) -> Result<Vec<u8>> {
        read_snapshot(&self.object_path(object), object)
    }

    fn open_query(&self, object: &str, counters: &[&str]) -> Result<Box<dyn CounterQuery>> {
        let path = self.object_path(object);
        let blob = read_snapshot(&path, object).map_err(|err| WinpexError::QueryCreate {
            object: object.to_string(),
            reason: err.to_string(),
        })?;
        PerfObject::<BTreeMap<String, f64>>::decode(object, &blob).map_err(
            |err| WinpexError::QueryCreate {
                object: object.to_string(),
                reason: err.to_string(),
            },
        )?;

        tracing::debug!(
            object,
            path = %path.display(),
            counters = counters.len(),
            "opened snapshot query"
        );
        Ok(Box::new(SnapshotDirQuery {
            path,
            object: object.to_string(),
            counters: counters.iter().map(|counter| (*counter).to_string()).collect(),
            closed: false,
        }))
    }
}

struct SnapshotDirQuery {
    path: PathBuf,
    object: String,
    counters: Vec<String>,
    closed: bool,
}

impl CounterQuery for SnapshotDirQuery {
    fn collect(&mut self) -> Result<CounterSet> {
        if self.closed {
            return Err(WinpexError::Closed(format!("{} query", self.object)));
        }

        match read_snapshot(&self.path, &self.object) {
            Ok(blob) => Ok(PerfObject::<BTreeMap<String, f64>>::decode(&self.object, &blob)?
                .counter_set(&self.counters)),
            Err(WinpexError::ObjectNotFound(_)) => Ok(CounterSet::new()),
            Err(err) => Err(err),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

fn read_snapshot(path: &Path, object: &str) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(WinpexError::ObjectNotFound(object.to_string()))
        }
        Err(err) => Err(WinpexError::Io(err)),
    }
}
