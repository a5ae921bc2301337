use std::sync::{Mutex, MutexGuard};

use winpex_common::error::{Result, WinpexError};
use winpex_perfdata::{CounterQuery, EMPTY_INSTANCE, TelemetrySource};

use super::{
    catalog::{Catalog, PERF_OBJECT},
    raw::RawValues,
};

type QuerySlot = Option<Box<dyn CounterQuery>>;

/// Raw-named-lookup strategy: queries the catalog's counters through a
/// handle opened once at build time.
pub struct DirectLookup {
    query: Mutex<QuerySlot>,
}

impl DirectLookup {
    pub fn open(source: &dyn TelemetrySource, catalog: &Catalog) -> Result<Self> {
        let query = source
            .open_query(PERF_OBJECT, &catalog.identifiers())
            .map_err(|err| match err {
                WinpexError::QueryCreate { .. } => err,
                other => WinpexError::QueryCreate {
                    object: PERF_OBJECT.to_string(),
                    reason: other.to_string(),
                },
            })?;

        Ok(Self {
            query: Mutex::new(Some(query)),
        })
    }

    pub fn acquire(&self, catalog: &Catalog) -> Result<RawValues> {
        let counter_set = {
            let mut slot = self.lock_query()?;
            let query = slot
                .as_mut()
                .ok_or_else(|| WinpexError::Closed(format!("{PERF_OBJECT} query")))?;
            query.collect()?
        };

        let instance = counter_set
            .get(EMPTY_INSTANCE)
            .ok_or_else(|| WinpexError::InstanceNotFound {
                object: PERF_OBJECT.to_string(),
                instance: EMPTY_INSTANCE.to_string(),
            })?;

        RawValues::collect(catalog, EMPTY_INSTANCE, |_, entry| {
            instance
                .get(entry.identifier)
                .map(|values| values.first_value)
                .ok_or_else(|| WinpexError::CounterNotFound {
                    object: PERF_OBJECT.to_string(),
                    counter: entry.identifier.to_string(),
                })
        })
    }

    /// Closes the query handle. Later calls are no-ops.
    pub fn close(&self) -> Result<()> {
        let query = self.lock_query()?.take();
        match query {
            Some(mut query) => query.close(),
            None => Ok(()),
        }
    }

    fn lock_query(&self) -> Result<MutexGuard<'_, QuerySlot>> {
        self.query.lock().map_err(|_| {
            WinpexError::InternalError(format!("{PERF_OBJECT} query lock poisoned"))
        })
    }
}

impl std::fmt::Debug for DirectLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectLookup")
            .field("object", &PERF_OBJECT)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use winpex_perfdata::{MemorySource, PerfObject};

    use crate::dhcp::catalog::DHCP_CATALOG;

    use super::*;

    fn full_object(instance: &str) -> PerfObject {
        PerfObject::new(PERF_OBJECT).with_instance(
            instance,
            DHCP_CATALOG
                .entries()
                .iter()
                .enumerate()
                .map(|(position, entry)| (entry.identifier, position as f64)),
        )
    }

    #[test]
    fn reads_first_value_of_empty_instance() {
        let source = MemorySource::new();
        source.set_object(full_object("")).unwrap();
        let lookup = DirectLookup::open(&source, &DHCP_CATALOG).unwrap();

        let values = lookup.acquire(&DHCP_CATALOG).unwrap();

        assert_eq!(values.len(), DHCP_CATALOG.len());
        for (position, sample) in values.samples().iter().enumerate() {
            assert_eq!(sample.value, position as f64);
            assert_eq!(sample.instance, EMPTY_INSTANCE);
        }
    }

    #[test]
    fn missing_instance_is_not_found() {
        let source = MemorySource::new();
        source.set_object(full_object("scope-1")).unwrap();
        let lookup = DirectLookup::open(&source, &DHCP_CATALOG).unwrap();

        let err = lookup.acquire(&DHCP_CATALOG).unwrap_err();

        assert!(matches!(err, WinpexError::InstanceNotFound { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn missing_counter_fails_instead_of_zero() {
        let source = MemorySource::new();
        source
            .set_object(PerfObject::new(PERF_OBJECT).with_instance("", [("Acks/sec", 1.0)]))
            .unwrap();
        let lookup = DirectLookup::open(&source, &DHCP_CATALOG).unwrap();

        let err = lookup.acquire(&DHCP_CATALOG).unwrap_err();

        match err {
            WinpexError::CounterNotFound { counter, .. } => {
                assert_eq!(counter, "Packets Received/sec")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn close_releases_handle_once() {
        let source = MemorySource::new();
        source.set_object(full_object("")).unwrap();
        let lookup = DirectLookup::open(&source, &DHCP_CATALOG).unwrap();
        assert_eq!(source.open_queries(), 1);

        lookup.close().unwrap();
        lookup.close().unwrap();

        assert_eq!(source.open_queries(), 0);
        assert!(matches!(
            lookup.acquire(&DHCP_CATALOG),
            Err(WinpexError::Closed(_))
        ));
    }

    #[test]
    fn open_fails_when_object_is_unavailable() {
        let source = MemorySource::new();

        let err = DirectLookup::open(&source, &DHCP_CATALOG).unwrap_err();

        assert!(err.is_init_failure());
    }
}
