pub mod collection;
pub mod config;
pub mod handlers;
pub mod router;

pub use collection::CollectorSet;
pub use config::{Cli, ExporterConfig};
pub use router::{ExporterState, exporter_router};
