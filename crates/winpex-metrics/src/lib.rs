pub mod render;
pub mod types;

pub use render::{TEXT_CONTENT_TYPE, render_prometheus};
pub use types::{Metric, MetricDescriptor, MetricType, build_fq_name};
