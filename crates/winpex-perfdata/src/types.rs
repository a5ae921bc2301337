use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use winpex_common::error::{Result, WinpexError};

/// Instance key reported for performance objects that have a single,
/// unnamed instance.
pub const EMPTY_INSTANCE: &str = "------";

pub type CounterSet = HashMap<String, HashMap<String, CounterValues>>;

/// Snapshot of one performance object. `T` is the per-instance counter
/// layout: an untyped name/value map by default, or a typed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfObject<T = BTreeMap<String, f64>> {
    pub name: String,
    #[serde(default = "Vec::new")]
    pub instances: Vec<PerfInstance<T>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfInstance<T> {
    #[serde(default)]
    pub name: String,
    pub counters: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CounterValues {
    pub counter_type: u32,
    pub first_value: f64,
    pub second_value: f64,
}

impl CounterValues {
    pub fn raw(value: f64) -> Self {
        Self {
            counter_type: 0,
            first_value: value,
            second_value: 0.0,
        }
    }
}

impl<T: DeserializeOwned> PerfObject<T> {
    pub fn decode(object: &str, blob: &[u8]) -> Result<Self> {
        serde_json::from_slice(blob).map_err(|err| WinpexError::Decode {
            object: object.to_string(),
            reason: err.to_string(),
        })
    }
}

impl<T: Serialize> PerfObject<T> {
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|err| {
            WinpexError::InternalError(format!(
                "failed to encode performance object {}: {err}",
                self.name
            ))
        })
    }
}

impl PerfObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instances: Vec::new(),
        }
    }

    pub fn with_instance<I, K>(mut self, instance: &str, counters: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        self.instances.push(PerfInstance {
            name: instance.to_string(),
            counters: counters
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        });
        self
    }

    /// Builds the instance → counter → values table for the requested
    /// counters. Counters the object does not carry are left out.
    pub fn counter_set(&self, counters: &[String]) -> CounterSet {
        self.instances
            .iter()
            .map(|instance| {
                let values = counters
                    .iter()
                    .filter_map(|counter| {
                        instance
                            .counters
                            .get(counter)
                            .map(|value| (counter.clone(), CounterValues::raw(*value)))
                    })
                    .collect::<HashMap<_, _>>();
                (instance_key(&instance.name).to_string(), values)
            })
            .collect()
    }
}

pub fn instance_key(name: &str) -> &str {
    if name.is_empty() { EMPTY_INSTANCE } else { name }
}
