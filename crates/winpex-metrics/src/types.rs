use std::sync::Arc;

use winpex_common::error::{Result, WinpexError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    Counter,
    Gauge,
}

impl MetricType {
    pub fn as_prometheus_type(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: String,
    pub help: String,
    pub metric_type: MetricType,
    pub variable_labels: Vec<String>,
}

impl MetricDescriptor {
    pub fn new(name: impl Into<String>, help: impl Into<String>, metric_type: MetricType) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            metric_type,
            variable_labels: Vec::new(),
        }
    }

    pub fn with_labels(mut self, variable_labels: &[&str]) -> Self {
        self.variable_labels = variable_labels
            .iter()
            .map(|label| (*label).to_string())
            .collect();
        self
    }
}

/// One sample of a descriptor, taken at scrape time.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub desc: Arc<MetricDescriptor>,
    pub value: f64,
    pub labels: Vec<(String, String)>,
}

impl Metric {
    pub fn new_const(
        desc: &Arc<MetricDescriptor>,
        value: f64,
        label_values: &[&str],
    ) -> Result<Self> {
        if label_values.len() != desc.variable_labels.len() {
            return Err(WinpexError::InvalidArgument(format!(
                "metric {} expects {} label values, got {}",
                desc.name,
                desc.variable_labels.len(),
                label_values.len()
            )));
        }

        Ok(Self {
            desc: Arc::clone(desc),
            value,
            labels: desc
                .variable_labels
                .iter()
                .zip(label_values.iter())
                .map(|(name, value)| (name.clone(), (*value).to_string()))
                .collect(),
        })
    }

    /// Sample of a descriptor without variable labels.
    pub fn unlabeled(desc: &Arc<MetricDescriptor>, value: f64) -> Self {
        Self {
            desc: Arc::clone(desc),
            value,
            labels: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn metric_type(&self) -> MetricType {
        self.desc.metric_type
    }
}

/// Joins the non-empty parts with `_`.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fq_name_skips_empty_parts() {
        assert_eq!(
            build_fq_name("windows", "dhcp", "acks_total"),
            "windows_dhcp_acks_total"
        );
        assert_eq!(build_fq_name("", "dhcp", "acks_total"), "dhcp_acks_total");
        assert_eq!(build_fq_name("windows", "", "up"), "windows_up");
    }

    #[test]
    fn const_metric_checks_label_cardinality() {
        let desc = Arc::new(
            MetricDescriptor::new("collector_success", "help", MetricType::Gauge)
                .with_labels(&["collector"]),
        );

        let metric = Metric::new_const(&desc, 1.0, &["dhcp"]).unwrap();
        assert_eq!(
            metric.labels,
            vec![("collector".to_string(), "dhcp".to_string())]
        );
        assert!(Metric::new_const(&desc, 1.0, &[]).is_err());
    }
}
