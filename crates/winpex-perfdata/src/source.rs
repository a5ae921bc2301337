use winpex_common::error::Result;

use crate::types::CounterSet;

/// Handle bound to one performance object and a fixed counter list.
///
/// Handles are not assumed to be safe for concurrent use; holders serialise
/// access themselves.
pub trait CounterQuery: Send {
    /// Returns instance → counter → values for the counters the handle was
    /// opened with.
    fn collect(&mut self) -> Result<CounterSet>;

    /// Releases the handle. Calling `collect` afterwards is an error.
    fn close(&mut self) -> Result<()>;
}

pub trait TelemetrySource: Send + Sync {
    /// Current snapshot blob of a named performance object.
    fn snapshot(&self, object: &str) -> Result<Vec<u8>>;

    /// Opens a query handle for `counters` of `object`.
    ///
    /// # Errors
    ///
    /// Returns [`WinpexError::QueryCreate`](winpex_common::WinpexError::QueryCreate)
    /// when the object cannot be reached.
    fn open_query(&self, object: &str, counters: &[&str]) -> Result<Box<dyn CounterQuery>>;
}
