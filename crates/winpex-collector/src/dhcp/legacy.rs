use winpex_common::error::{Result, WinpexError};
use winpex_perfdata::{EMPTY_INSTANCE, PerfObject, types::instance_key};

use crate::context::ScrapeContext;

use super::{
    catalog::{Catalog, PERF_OBJECT},
    raw::RawValues,
    record::DhcpPerf,
};

/// Catalog position → index into the record's field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    field_indexes: Vec<usize>,
}

impl FieldBinding {
    /// Binds every catalog entry to the record field named by its
    /// `source_field`. Fails unless catalog and record fields match
    /// one-to-one.
    pub fn new(catalog: &Catalog, fields: &[&str]) -> Result<Self> {
        let field_indexes = catalog
            .entries()
            .iter()
            .map(|entry| {
                fields
                    .iter()
                    .position(|field| *field == entry.source_field)
                    .ok_or_else(|| {
                        WinpexError::Binding(format!(
                            "counter {:?} has no record field {:?}",
                            entry.identifier, entry.source_field
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(unbound) = fields
            .iter()
            .find(|field| !catalog.entries().iter().any(|entry| entry.source_field == **field))
        {
            return Err(WinpexError::Binding(format!(
                "record field {unbound:?} is not bound to any counter"
            )));
        }

        if fields.len() != field_indexes.len() {
            return Err(WinpexError::Binding(format!(
                "record has {} fields for {} counters",
                fields.len(),
                field_indexes.len()
            )));
        }

        Ok(Self { field_indexes })
    }

    pub fn field_index(&self, position: usize) -> Option<usize> {
        self.field_indexes.get(position).copied()
    }
}

/// Structured-decode strategy: reads the DHCP Server snapshot from the
/// scrape context and decodes it into [`DhcpPerf`] records.
#[derive(Debug)]
pub struct LegacyDecoder {
    binding: FieldBinding,
}

impl LegacyDecoder {
    pub fn new(catalog: &Catalog) -> Result<Self> {
        Ok(Self {
            binding: FieldBinding::new(catalog, &DhcpPerf::FIELDS)?,
        })
    }

    pub fn perf_objects(&self) -> Vec<String> {
        vec![PERF_OBJECT.to_string()]
    }

    pub fn acquire(&self, ctx: &ScrapeContext, catalog: &Catalog) -> Result<RawValues> {
        let blob = ctx.perf_object(PERF_OBJECT)?;
        let object = PerfObject::<DhcpPerf>::decode(PERF_OBJECT, blob)?;

        if object.instances.is_empty() {
            return Err(WinpexError::NoRecords {
                object: PERF_OBJECT.to_string(),
            });
        }
        let total = object.instances.len();
        let record = object
            .instances
            .into_iter()
            .find(|record| instance_key(&record.name) == EMPTY_INSTANCE)
            .ok_or_else(|| WinpexError::InstanceNotFound {
                object: PERF_OBJECT.to_string(),
                instance: EMPTY_INSTANCE.to_string(),
            })?;
        if total > 1 {
            tracing::debug!(
                object = PERF_OBJECT,
                ignored = total - 1,
                "ignoring named instances of singleton object"
            );
        }

        let values = record.counters.values();
        RawValues::collect(catalog, EMPTY_INSTANCE, |position, entry| {
            self.binding
                .field_index(position)
                .and_then(|index| values.get(index).copied())
                .ok_or_else(|| {
                    WinpexError::InternalError(format!(
                        "no bound field for counter {:?}",
                        entry.identifier
                    ))
                })
        })
    }
}
