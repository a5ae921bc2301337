use std::{
    collections::HashMap,
    sync::{
        Arc, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use winpex_common::error::{Result, WinpexError};

use crate::{
    source::{CounterQuery, TelemetrySource},
    types::{CounterSet, PerfObject},
};

type ObjectTable = Arc<RwLock<HashMap<String, PerfObject>>>;

/// Telemetry source backed by performance objects held in memory.
#[derive(Clone, Default)]
pub struct MemorySource {
    objects: ObjectTable,
    open_queries: Arc<AtomicUsize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_object(&self, object: PerfObject) -> Result<()> {
        self.objects_write()?.insert(object.name.clone(), object);
        Ok(())
    }

    pub fn remove_object(&self, name: &str) -> Result<()> {
        self.objects_write()?.remove(name);
        Ok(())
    }

    /// Number of query handles opened and not yet closed.
    pub fn open_queries(&self) -> usize {
        self.open_queries.load(Ordering::SeqCst)
    }

    fn objects_write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, PerfObject>>> {
        self.objects
            .write()
            .map_err(|_| WinpexError::InternalError("memory source lock poisoned".to_string()))
    }
}

impl TelemetrySource for MemorySource {
    fn snapshot(&self, object: &str) -> Result<Vec<u8>> {
        let objects = read_objects(&self.objects)?;
        objects
            .get(object)
            .ok_or_else(|| WinpexError::ObjectNotFound(object.to_string()))?
            .encode()
    }

    fn open_query(&self, object: &str, counters: &[&str]) -> Result<Box<dyn CounterQuery>> {
        if !read_objects(&self.objects)?.contains_key(object) {
            return Err(WinpexError::QueryCreate {
                object: object.to_string(),
                reason: "performance object is not registered".to_string(),
            });
        }

        self.open_queries.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryQuery {
            objects: Arc::clone(&self.objects),
            open_queries: Arc::clone(&self.open_queries),
            object: object.to_string(),
            counters: counters.iter().map(|counter| (*counter).to_string()).collect(),
            closed: false,
        }))
    }
}

struct MemoryQuery {
    objects: ObjectTable,
    open_queries: Arc<AtomicUsize>,
    object: String,
    counters: Vec<String>,
    closed: bool,
}

impl CounterQuery for MemoryQuery {
    fn collect(&mut self) -> Result<CounterSet> {
        if self.closed {
            return Err(WinpexError::Closed(format!("{} query", self.object)));
        }

        // An object that disappeared after the handle was opened yields an
        // empty result set rather than a handle error.
        let objects = read_objects(&self.objects)?;
        Ok(objects
            .get(&self.object)
            .map(|object| object.counter_set(&self.counters))
            .unwrap_or_default())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.open_queries.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

fn read_objects(
    objects: &ObjectTable,
) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, PerfObject>>> {
    objects
        .read()
        .map_err(|_| WinpexError::InternalError("memory source lock poisoned".to_string()))
}
