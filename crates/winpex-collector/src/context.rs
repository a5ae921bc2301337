use std::collections::HashMap;

use winpex_common::error::{Result, WinpexError};
use winpex_perfdata::TelemetrySource;

/// Per-scrape inputs shared by a collector's acquisition strategies.
#[derive(Debug, Default, Clone)]
pub struct ScrapeContext {
    perf_objects: HashMap<String, Vec<u8>>,
}

impl ScrapeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots every object in `objects` from `source`.
    pub fn from_source(source: &dyn TelemetrySource, objects: &[String]) -> Result<Self> {
        let mut ctx = Self::new();
        for object in objects {
            ctx.insert(object.clone(), source.snapshot(object)?);
        }
        Ok(ctx)
    }

    pub fn insert(&mut self, object: impl Into<String>, blob: Vec<u8>) {
        self.perf_objects.insert(object.into(), blob);
    }

    pub fn perf_object(&self, object: &str) -> Result<&[u8]> {
        self.perf_objects
            .get(object)
            .map(Vec::as_slice)
            .ok_or_else(|| WinpexError::ObjectNotFound(object.to_string()))
    }
}
