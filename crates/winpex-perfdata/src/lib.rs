//! Contract with the host's performance-counter subsystem.
//!
//! A [`TelemetrySource`] hands out either a snapshot blob of a named
//! performance object (decoded by the caller) or a [`CounterQuery`] handle
//! bound to an explicit list of counters.

pub mod memory;
pub mod snapshot_dir;
pub mod source;
pub mod types;

pub use memory::MemorySource;
pub use snapshot_dir::SnapshotDirSource;
pub use source::{CounterQuery, TelemetrySource};
pub use types::{CounterSet, CounterValues, EMPTY_INSTANCE, PerfInstance, PerfObject};
