use winpex_common::error::Result;

use super::catalog::{Catalog, CounterDescriptor};

#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub counter: &'static str,
    pub instance: String,
    pub value: f64,
}

/// One raw sample per catalog entry, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawValues {
    samples: Vec<RawSample>,
}

impl RawValues {
    /// Looks up every catalog entry. The first failed lookup aborts the whole
    /// set, so a partially filled value set never escapes.
    pub fn collect<F>(catalog: &Catalog, instance: &str, mut lookup: F) -> Result<Self>
    where
        F: FnMut(usize, &CounterDescriptor) -> Result<f64>,
    {
        let samples = catalog
            .entries()
            .iter()
            .enumerate()
            .map(|(position, entry)| {
                Ok(RawSample {
                    counter: entry.identifier,
                    instance: instance.to_string(),
                    value: lookup(position, entry)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[RawSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
